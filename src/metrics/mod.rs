//! Prometheus metrics for chart builds and the HTTP surface

use prometheus::{Encoder, Histogram, HistogramOpts, IntCounter, IntGauge, Registry, TextEncoder};

pub struct Metrics {
    registry: Registry,
    pub charts_downloaded_total: IntCounter,
    pub charts_failed_total: IntCounter,
    pub pdf_builds_total: IntCounter,
    pub pdf_build_failures_total: IntCounter,
    pub http_requests_total: IntCounter,
    pub http_request_duration_seconds: Histogram,
    pub http_requests_in_flight: IntGauge,
}

impl Metrics {
    pub fn new() -> Result<Self, prometheus::Error> {
        let registry = Registry::new();

        let charts_downloaded_total = IntCounter::new(
            "charts_downloaded_total",
            "Chart images downloaded and placed into a PDF",
        )?;
        let charts_failed_total = IntCounter::new(
            "charts_failed_total",
            "Chart downloads that failed or returned an unusable image",
        )?;
        let pdf_builds_total = IntCounter::new("pdf_builds_total", "Completed PDF builds")?;
        let pdf_build_failures_total = IntCounter::new(
            "pdf_build_failures_total",
            "PDF builds aborted by a fatal error",
        )?;
        let http_requests_total =
            IntCounter::new("http_requests_total", "HTTP requests served")?;
        let http_request_duration_seconds = Histogram::with_opts(HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request latency in seconds",
        ))?;
        let http_requests_in_flight = IntGauge::new(
            "http_requests_in_flight",
            "HTTP requests currently being served",
        )?;

        registry.register(Box::new(charts_downloaded_total.clone()))?;
        registry.register(Box::new(charts_failed_total.clone()))?;
        registry.register(Box::new(pdf_builds_total.clone()))?;
        registry.register(Box::new(pdf_build_failures_total.clone()))?;
        registry.register(Box::new(http_requests_total.clone()))?;
        registry.register(Box::new(http_request_duration_seconds.clone()))?;
        registry.register(Box::new(http_requests_in_flight.clone()))?;

        Ok(Self {
            registry,
            charts_downloaded_total,
            charts_failed_total,
            pdf_builds_total,
            pdf_build_failures_total,
            http_requests_total,
            http_request_duration_seconds,
            http_requests_in_flight,
        })
    }

    /// Render all metrics in the Prometheus text exposition format
    pub fn export(&self) -> Result<String, prometheus::Error> {
        let mut buffer = Vec::new();
        TextEncoder::new().encode(&self.registry.gather(), &mut buffer)?;
        String::from_utf8(buffer).map_err(|e| prometheus::Error::Msg(e.to_string()))
    }
}
