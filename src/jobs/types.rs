//! Job records and the snapshots served to the progress endpoint

use crate::models::{ChartEvent, ScanLabel};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::PathBuf;
use std::time::Duration;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Running,
    Completed,
    Failed,
}

/// Server-side state of one build
#[derive(Debug, Clone)]
pub struct JobRecord {
    pub id: Uuid,
    pub scan: ScanLabel,
    pub total: usize,
    pub processed: usize,
    pub messages: Vec<String>,
    pub status: JobStatus,
    pub pdf_path: Option<PathBuf>,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl JobRecord {
    pub fn new(id: Uuid, scan: ScanLabel, total: usize) -> Self {
        Self {
            id,
            scan,
            total,
            processed: 0,
            messages: Vec::new(),
            status: JobStatus::Running,
            pdf_path: None,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        }
    }

    /// Fold one builder event into the record
    pub fn apply(&mut self, event: &ChartEvent) {
        match event {
            ChartEvent::Progress { index, .. } => {
                self.processed = (*index).max(self.processed);
                self.messages.push(event.to_string());
            }
            ChartEvent::Completed { path, .. } => {
                self.status = JobStatus::Completed;
                self.pdf_path = Some(path.clone());
                self.finished_at = Some(Utc::now());
            }
            ChartEvent::Fatal { error } => {
                self.status = JobStatus::Failed;
                self.error = Some(error.clone());
                self.finished_at = Some(Utc::now());
            }
        }
    }

    /// True once the job has been finished for at least `ttl`
    pub fn is_expired(&self, ttl: Duration, now: DateTime<Utc>) -> bool {
        match self.finished_at {
            Some(finished) => (now - finished).to_std().is_ok_and(|age| age >= ttl),
            None => false,
        }
    }

    /// Fraction of symbols processed, capped at 1.0
    pub fn progress(&self) -> f64 {
        if self.total == 0 {
            return if self.status == JobStatus::Running { 0.0 } else { 1.0 };
        }
        (self.processed as f64 / self.total as f64).min(1.0)
    }

    pub fn snapshot(&self) -> JobSnapshot {
        JobSnapshot {
            id: self.id,
            scan: self.scan.to_string(),
            status: self.status,
            processed: self.processed,
            total: self.total,
            progress: self.progress(),
            messages: self.messages.clone(),
            last_message: self.messages.last().cloned(),
            error: self.error.clone(),
            download_url: (self.status == JobStatus::Completed)
                .then(|| format!("/api/jobs/{}/pdf", self.id)),
            created_at: self.created_at,
            finished_at: self.finished_at,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JobSnapshot {
    pub id: Uuid,
    pub scan: String,
    pub status: JobStatus,
    pub processed: usize,
    pub total: usize,
    pub progress: f64,
    pub messages: Vec<String>,
    pub last_message: Option<String>,
    pub error: Option<String>,
    pub download_url: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}
