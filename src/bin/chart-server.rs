//! Chartdeck web server
//!
//! Serves the PIN-gated chart form, runs builds in the background and hands
//! out the finished PDFs.

use chartdeck::config::{get_environment, AppConfig};
use chartdeck::core::http::start_server;
use chartdeck::logging;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables from .env if present
    dotenv().ok();

    logging::init_logging();

    let config = AppConfig::from_env()?;
    let port = config.port;

    info!("Starting Chartdeck server");
    info!(environment = %get_environment(), "Environment");
    info!(port = port, "HTTP Server: http://0.0.0.0:{}", port);
    info!(
        chart_endpoint = %config.chart_base_url,
        output_dir = %config.output_dir.display(),
        request_delay_ms = config.request_delay.as_millis() as u64,
        scans = ?config.scans,
        "Chart builder configured"
    );

    let server_handle = tokio::spawn(async move {
        if let Err(e) = start_server(config).await {
            error!(error = %e, "HTTP server error");
        }
    });

    tokio::select! {
        _ = signal::ctrl_c() => {
            info!("Shutting down server...");
        }
        _ = server_handle => {
            error!("HTTP server stopped");
        }
    }

    Ok(())
}
