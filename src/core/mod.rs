//! Chart book building and the web surface around it

pub mod builder;
pub mod http;
pub mod pacing;
pub mod scratch;

pub use builder::{BuildError, BuildRequest, BuiltPdf, ChartPdfBuilder, ChartPlacement};
pub use http::{build_state, create_router, start_server, AppState, HealthStatus};
pub use pacing::{DelayPolicy, FixedDelay, NoDelay};
pub use scratch::ScratchDir;
