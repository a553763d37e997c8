//! Starting builds in the background and tracking their progress

use super::context::JobRegistry;
use super::types::JobRecord;
use crate::core::builder::{BuildRequest, ChartPdfBuilder};
use crate::models::ChartEvent;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};
use uuid::Uuid;

const MAX_SWEEP_INTERVAL: Duration = Duration::from_secs(60);

/// Register a job and start its build.
///
/// Each job writes into `<builder output dir>/<job id>/` so that concurrent
/// builds for the same scan never overwrite each other.
pub async fn submit_build_job(
    registry: &JobRegistry,
    builder: &ChartPdfBuilder,
    request: BuildRequest,
) -> Uuid {
    let id = Uuid::new_v4();
    let job_builder = Arc::new(builder.for_output_dir(builder.output_dir().join(id.to_string())));

    registry
        .insert(JobRecord::new(id, request.scan.clone(), request.symbols.len()))
        .await;

    info!(
        job_id = %id,
        scan = %request.scan,
        symbols = request.symbols.len(),
        "Submitted chart build job"
    );

    let events = job_builder.start(request);
    tokio::spawn(track_build_events(registry.clone(), id, events));
    id
}

/// Drain a build's events into the registry until the terminal event
pub async fn track_build_events(
    registry: JobRegistry,
    id: Uuid,
    mut events: mpsc::UnboundedReceiver<ChartEvent>,
) {
    while let Some(event) = events.recv().await {
        debug!(job_id = %id, event = %event, "Build event");
        if !registry.apply(&id, &event).await {
            warn!(job_id = %id, "Received event for unknown job");
        }
        if event.is_terminal() {
            break;
        }
    }
}

/// Forget finished jobs older than `ttl` and delete their directories under
/// `output_dir`. Returns how many jobs were removed.
pub async fn sweep_expired_jobs(registry: &JobRegistry, output_dir: &Path, ttl: Duration) -> usize {
    let expired = registry.remove_expired(ttl).await;

    for id in &expired {
        let job_dir = output_dir.join(id.to_string());
        match tokio::fs::remove_dir_all(&job_dir).await {
            Ok(()) => debug!(job_id = %id, path = %job_dir.display(), "Removed job directory"),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {}
            Err(e) => warn!(
                job_id = %id,
                path = %job_dir.display(),
                error = %e,
                "Failed to remove job directory"
            ),
        }
    }

    if !expired.is_empty() {
        info!(removed = expired.len(), "Evicted expired jobs");
    }
    expired.len()
}

/// Periodically sweep expired jobs for the lifetime of the runtime
pub fn spawn_job_sweeper(registry: JobRegistry, output_dir: PathBuf, ttl: Duration) -> JoinHandle<()> {
    let period = ttl.clamp(Duration::from_secs(1), MAX_SWEEP_INTERVAL);
    info!(ttl_secs = ttl.as_secs(), period_secs = period.as_secs(), "Starting job sweeper");
    tokio::spawn(async move {
        loop {
            tokio::time::sleep(period).await;
            sweep_expired_jobs(&registry, &output_dir, ttl).await;
        }
    })
}
