//! Typed progress events emitted while a PDF is being built

use super::symbol::Symbol;
use std::fmt;
use std::path::PathBuf;

/// Result of processing a single symbol
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SymbolOutcome {
    Added,
    Failed { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChartEvent {
    /// One symbol finished; `index` is 1-based
    Progress {
        index: usize,
        total: usize,
        symbol: Symbol,
        outcome: SymbolOutcome,
    },
    /// The PDF was written to `path`
    Completed {
        path: PathBuf,
        pages: usize,
        charts: usize,
    },
    /// The build aborted
    Fatal { error: String },
}

impl ChartEvent {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, ChartEvent::Progress { .. })
    }
}

impl fmt::Display for ChartEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChartEvent::Progress {
                symbol,
                outcome: SymbolOutcome::Added,
                ..
            } => write!(f, "Added chart for {}", symbol),
            ChartEvent::Progress {
                symbol,
                outcome: SymbolOutcome::Failed { reason },
                ..
            } => write!(f, "Failed to download {}: {}", symbol, reason),
            ChartEvent::Completed { path, .. } => write!(f, "{}", path.display()),
            ChartEvent::Fatal { error } => write!(f, "Build failed: {}", error),
        }
    }
}
