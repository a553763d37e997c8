//! Background chart builds started from the web form

pub mod context;
pub mod handlers;
pub mod types;

pub use context::JobRegistry;
pub use handlers::{spawn_job_sweeper, submit_build_job, sweep_expired_jobs, track_build_events};
pub use types::{JobRecord, JobSnapshot, JobStatus};
