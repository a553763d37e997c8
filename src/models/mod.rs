//! Shared data models spanning the builder, the web surface and the CLI.

pub mod chart;
pub mod event;
pub mod scan;
pub mod symbol;

pub use chart::{ChartRequest, RenderOptions};
pub use event::{ChartEvent, SymbolOutcome};
pub use scan::{ScanLabel, ScanLabelError};
pub use symbol::{parse_symbol_list, Symbol, SymbolError};
