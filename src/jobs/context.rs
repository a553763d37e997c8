//! Shared registry of build jobs

use super::types::JobRecord;
use crate::models::ChartEvent;
use chrono::Utc;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use uuid::Uuid;

/// In-memory job table shared between the HTTP handlers and build trackers.
///
/// Finished jobs stay until [`JobRegistry::remove_expired`] drops them.
#[derive(Clone, Default)]
pub struct JobRegistry {
    jobs: Arc<RwLock<HashMap<Uuid, JobRecord>>>,
}

impl JobRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, record: JobRecord) {
        self.jobs.write().await.insert(record.id, record);
    }

    pub async fn get(&self, id: &Uuid) -> Option<JobRecord> {
        self.jobs.read().await.get(id).cloned()
    }

    /// Apply an event to a job; returns false when the job is unknown
    pub async fn apply(&self, id: &Uuid, event: &ChartEvent) -> bool {
        match self.jobs.write().await.get_mut(id) {
            Some(record) => {
                record.apply(event);
                true
            }
            None => false,
        }
    }

    /// Drop finished jobs older than `ttl` and return their ids
    pub async fn remove_expired(&self, ttl: Duration) -> Vec<Uuid> {
        let now = Utc::now();
        let mut jobs = self.jobs.write().await;
        let expired: Vec<Uuid> = jobs
            .values()
            .filter(|record| record.is_expired(ttl, now))
            .map(|record| record.id)
            .collect();
        for id in &expired {
            jobs.remove(id);
        }
        expired
    }

    pub async fn len(&self) -> usize {
        self.jobs.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.jobs.read().await.is_empty()
    }
}
