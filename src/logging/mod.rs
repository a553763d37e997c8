//! Tracing subscriber setup
//!
//! - Production: JSON lines, one object per event
//! - Anything else: ANSI colored, human-readable output

use crate::config::get_environment;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Where log lines are written
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogOutput {
    Stdout,
    /// Used by the CLI so that status lines on stdout stay clean
    Stderr,
}

/// Initialize logging for the web server
pub fn init_logging() {
    init_logging_with(LogOutput::Stdout, "info");
}

/// Initialize logging with an explicit output stream and fallback filter.
///
/// `RUST_LOG` overrides `default_filter` when set. Calling this twice is a
/// no-op for the second call.
pub fn init_logging_with(output: LogOutput, default_filter: &str) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let is_production = matches!(get_environment().as_str(), "production" | "prod");

    let result = match (is_production, output) {
        (true, LogOutput::Stdout) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        (true, LogOutput::Stderr) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .json()
                    .with_target(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
        (false, LogOutput::Stdout) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(true)
                    .with_file(true)
                    .with_line_number(true)
                    .with_ansi(true)
                    .with_writer(std::io::stdout),
            )
            .try_init(),
        (false, LogOutput::Stderr) => tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_target(false)
                    .with_ansi(true)
                    .with_writer(std::io::stderr),
            )
            .try_init(),
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "logging already initialized");
    }
}
