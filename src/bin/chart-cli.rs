//! Build a chart PDF from a symbol list file without starting the server

use chartdeck::config::AppConfig;
use chartdeck::core::builder::{BuildRequest, ChartPdfBuilder};
use chartdeck::core::pacing::FixedDelay;
use chartdeck::logging::{self, LogOutput};
use chartdeck::models::{parse_symbol_list, ChartEvent, ScanLabel};
use chartdeck::services::HttpChartSource;
use clap::Parser;
use dotenvy::dotenv;
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

#[derive(Parser, Debug)]
#[command(name = "chart-cli", about = "Download charts for a symbol list into a PDF")]
struct Args {
    /// File with one symbol per line, or `-` for stdin
    #[arg(long)]
    symbols: PathBuf,

    /// Horizontal chart shift
    #[arg(long, default_value_t = 0)]
    shift: u32,

    /// Label used in the output file name (charts_<scan>.pdf)
    #[arg(long, default_value = "default")]
    scan: String,

    /// Output directory, defaults to OUTPUT_DIR or charts_download
    #[arg(long)]
    output_dir: Option<PathBuf>,

    /// Pause between chart requests in milliseconds
    #[arg(long)]
    delay_ms: Option<u64>,

    /// Chart endpoint, defaults to CHART_BASE_URL or the public provider
    #[arg(long)]
    base_url: Option<String>,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging_with(LogOutput::Stderr, "warn");

    let args = Args::parse();
    let config = AppConfig::from_env()?;

    let input = if args.symbols.as_os_str() == "-" {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        buf
    } else {
        std::fs::read_to_string(&args.symbols)?
    };
    let symbols = parse_symbol_list(&input)?;
    if symbols.is_empty() {
        return Err("Please enter at least one symbol.".into());
    }
    let scan = ScanLabel::parse(&args.scan)?;

    let base_url = args.base_url.unwrap_or(config.chart_base_url);
    let delay = args
        .delay_ms
        .map(Duration::from_millis)
        .unwrap_or(config.request_delay);

    let source = Arc::new(HttpChartSource::new(&base_url)?);
    let builder = Arc::new(
        ChartPdfBuilder::new(source, args.output_dir.unwrap_or(config.output_dir))
            .with_delay(Arc::new(FixedDelay(delay))),
    );

    let mut events = builder.start(BuildRequest {
        symbols,
        shift: args.shift,
        scan,
    });

    while let Some(event) = events.recv().await {
        match &event {
            ChartEvent::Progress { index, total, .. } => println!("[{}/{}] {}", index, total, event),
            ChartEvent::Completed { path, pages, charts } => {
                println!("Wrote {} charts on {} pages to {}", charts, pages, path.display());
            }
            ChartEvent::Fatal { error } => return Err(error.clone().into()),
        }
    }

    Ok(())
}
