//! Outbound integrations

pub mod chart_source;

pub use chart_source::{ChartSource, FetchError, HttpChartSource};
