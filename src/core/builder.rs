//! Chart PDF builder
//!
//! Walks a symbol list in order, downloads one chart per symbol, stacks the
//! charts three to a page and writes `charts_<scan>.pdf`. Each symbol is
//! fetched, persisted and placed before the next one starts.

use crate::core::pacing::{DelayPolicy, FixedDelay};
use crate::core::scratch::ScratchDir;
use crate::metrics::Metrics;
use crate::models::{ChartEvent, ChartRequest, ScanLabel, Symbol, SymbolOutcome};
use crate::pdf::{EmbeddedImage, GridLayout, PdfDocument, PdfError};
use crate::services::ChartSource;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

const SCRATCH_PREFIX: &str = "charts-images";

/// Errors that abort a whole build
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("cannot use scratch directory {}: {source}", .path.display())]
    Scratch { path: PathBuf, source: io::Error },
    #[error("cannot render PDF: {0}")]
    Render(#[from] PdfError),
    #[error("cannot write PDF to {}: {source}", .path.display())]
    Write { path: PathBuf, source: io::Error },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BuildRequest {
    pub symbols: Vec<Symbol>,
    pub shift: u32,
    pub scan: ScanLabel,
}

/// Position of one successfully placed chart
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartPlacement {
    pub index: usize,
    pub symbol: Symbol,
    pub page: usize,
    pub slot: usize,
}

#[derive(Debug, Clone)]
pub struct BuiltPdf {
    pub path: PathBuf,
    pub pages: usize,
    pub placements: Vec<ChartPlacement>,
    pub failures: usize,
}

impl BuiltPdf {
    pub fn charts(&self) -> usize {
        self.placements.len()
    }
}

enum ChartAttempt {
    Placed(ChartPlacement),
    Skipped(String),
}

pub struct ChartPdfBuilder {
    source: Arc<dyn ChartSource>,
    delay: Arc<dyn DelayPolicy>,
    layout: GridLayout,
    output_dir: PathBuf,
    metrics: Option<Arc<Metrics>>,
}

impl ChartPdfBuilder {
    /// Builder writing into `output_dir`, pausing one second between requests
    pub fn new(source: Arc<dyn ChartSource>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            delay: Arc::new(FixedDelay::default()),
            layout: GridLayout::a4_three_up(),
            output_dir: output_dir.into(),
            metrics: None,
        }
    }

    pub fn with_delay(mut self, delay: Arc<dyn DelayPolicy>) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<Metrics>) -> Self {
        self.metrics = Some(metrics);
        self
    }

    /// Same source, pacing and metrics, different output directory
    pub fn for_output_dir(&self, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source: self.source.clone(),
            delay: self.delay.clone(),
            layout: self.layout,
            output_dir: output_dir.into(),
            metrics: self.metrics.clone(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Run the build on the current runtime and return its event stream.
    ///
    /// The last event received is always `Completed` or `Fatal`.
    pub fn start(self: Arc<Self>, request: BuildRequest) -> mpsc::UnboundedReceiver<ChartEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        tokio::spawn(async move {
            let _ = self.build(&request, &tx).await;
        });
        rx
    }

    /// Build the PDF, reporting every symbol on `events`.
    ///
    /// A `Completed` or `Fatal` event is sent before this returns. Per-symbol
    /// failures never make this return `Err`.
    pub async fn build(
        &self,
        request: &BuildRequest,
        events: &mpsc::UnboundedSender<ChartEvent>,
    ) -> Result<BuiltPdf, BuildError> {
        let result = self.run(request, events).await;

        match &result {
            Ok(built) => {
                info!(
                    path = %built.path.display(),
                    pages = built.pages,
                    charts = built.charts(),
                    failures = built.failures,
                    "PDF build completed"
                );
                if let Some(metrics) = &self.metrics {
                    metrics.pdf_builds_total.inc();
                }
                let _ = events.send(ChartEvent::Completed {
                    path: built.path.clone(),
                    pages: built.pages,
                    charts: built.charts(),
                });
            }
            Err(e) => {
                error!(error = %e, scan = %request.scan, "PDF build aborted");
                if let Some(metrics) = &self.metrics {
                    metrics.pdf_build_failures_total.inc();
                }
                let _ = events.send(ChartEvent::Fatal {
                    error: e.to_string(),
                });
            }
        }

        result
    }

    async fn run(
        &self,
        request: &BuildRequest,
        events: &mpsc::UnboundedSender<ChartEvent>,
    ) -> Result<BuiltPdf, BuildError> {
        let output_dir = self.output_dir.clone();
        let scratch = tokio::task::spawn_blocking(move || {
            ScratchDir::create_in(output_dir, SCRATCH_PREFIX)
        })
        .await
        .map_err(io::Error::other)
        .and_then(|created| created)
        .map_err(|e| BuildError::Scratch {
            path: self.output_dir.clone(),
            source: e,
        })?;

        let total = request.symbols.len();
        info!(
            symbols = total,
            shift = request.shift,
            scan = %request.scan,
            "Starting PDF build"
        );

        let mut document = PdfDocument::new(self.layout.page_width, self.layout.page_height);
        let mut placements = Vec::new();
        let mut failures = 0;

        for (position, symbol) in request.symbols.iter().enumerate() {
            let index = position + 1;
            let attempt = self
                .add_chart(index, symbol, request.shift, &scratch, &mut document)
                .await?;

            let outcome = match attempt {
                ChartAttempt::Placed(placement) => {
                    info!(symbol = %symbol, index, page = placement.page, slot = placement.slot, "Added chart");
                    if let Some(metrics) = &self.metrics {
                        metrics.charts_downloaded_total.inc();
                    }
                    placements.push(placement);
                    SymbolOutcome::Added
                }
                ChartAttempt::Skipped(reason) => {
                    warn!(symbol = %symbol, index, reason = %reason, "Failed to download chart");
                    if let Some(metrics) = &self.metrics {
                        metrics.charts_failed_total.inc();
                    }
                    failures += 1;
                    SymbolOutcome::Failed { reason }
                }
            };

            let _ = events.send(ChartEvent::Progress {
                index,
                total,
                symbol: symbol.clone(),
                outcome,
            });

            let pause = self.delay.delay_after(index);
            if !pause.is_zero() {
                tokio::time::sleep(pause).await;
            }
        }

        let path = self.output_dir.join(request.scan.pdf_file_name());
        let bytes = document.to_bytes()?;
        tokio::fs::write(&path, bytes)
            .await
            .map_err(|e| BuildError::Write {
                path: path.clone(),
                source: e,
            })?;

        // Removal walks the directory tree
        let _ = tokio::task::spawn_blocking(move || drop(scratch)).await;

        Ok(BuiltPdf {
            path,
            pages: document.page_count(),
            placements,
            failures,
        })
    }

    async fn add_chart(
        &self,
        index: usize,
        symbol: &Symbol,
        shift: u32,
        scratch: &ScratchDir,
        document: &mut PdfDocument,
    ) -> Result<ChartAttempt, BuildError> {
        let request = ChartRequest::new(symbol.clone(), shift);
        let body = match self.source.fetch(&request).await {
            Ok(body) => body,
            Err(e) => return Ok(ChartAttempt::Skipped(e.to_string())),
        };

        let file = scratch.file(&format!("{:04}_{}.png", index, symbol.file_stem()));
        tokio::fs::write(&file, &body)
            .await
            .map_err(|e| BuildError::Scratch {
                path: file.clone(),
                source: e,
            })?;
        debug!(symbol = %symbol, path = %file.display(), bytes = body.len(), "Saved chart image");

        // Decoding and deflating are CPU-bound
        let decode_path = file.clone();
        let decoded = tokio::task::spawn_blocking(move || EmbeddedImage::from_file(decode_path))
            .await
            .map_err(|e| e.to_string())
            .and_then(|decoded| decoded.map_err(|e| e.to_string()));

        let image = match decoded {
            Ok(image) => image,
            Err(e) => {
                if let Err(remove_err) = tokio::fs::remove_file(&file).await {
                    warn!(path = %file.display(), error = %remove_err, "Failed to remove unusable chart image");
                }
                return Ok(ChartAttempt::Skipped(e));
            }
        };

        let placement = self.layout.placement(index);
        document.place_image(placement.page, symbol.as_str(), image, placement.rect);

        Ok(ChartAttempt::Placed(ChartPlacement {
            index,
            symbol: symbol.clone(),
            page: placement.page,
            slot: placement.slot,
        }))
    }
}
