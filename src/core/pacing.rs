//! Delay applied between consecutive chart requests

use std::time::Duration;

pub const DEFAULT_REQUEST_DELAY: Duration = Duration::from_secs(1);

/// How long to wait after the request for the symbol at 1-based `index`
pub trait DelayPolicy: Send + Sync {
    fn delay_after(&self, index: usize) -> Duration;
}

/// Same pause after every request, regardless of outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FixedDelay(pub Duration);

impl Default for FixedDelay {
    fn default() -> Self {
        Self(DEFAULT_REQUEST_DELAY)
    }
}

impl DelayPolicy for FixedDelay {
    fn delay_after(&self, _index: usize) -> Duration {
        self.0
    }
}

/// No pause at all; for tests and local mirrors of the chart endpoint
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDelay;

impl DelayPolicy for NoDelay {
    fn delay_after(&self, _index: usize) -> Duration {
        Duration::ZERO
    }
}
