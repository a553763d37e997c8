//! Test utilities for API server integration tests

use crate::test_utils::{servlet_url, TestDir};
use axum_test::TestServer;
use chartdeck::config::AppConfig;
use chartdeck::core::builder::ChartPdfBuilder;
use chartdeck::core::http::{create_router, AppState, HealthStatus};
use chartdeck::core::pacing::NoDelay;
use chartdeck::jobs::JobRegistry;
use chartdeck::metrics::Metrics;
use chartdeck::services::HttpChartSource;
use serde_json::Value;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;
use wiremock::MockServer;

pub const TEST_PIN: &str = "2468";

/// Router wired to a mocked chart provider and a temporary output directory
#[allow(dead_code)]
pub struct TestApiServer {
    pub server: TestServer,
    pub metrics: Arc<Metrics>,
    pub provider: MockServer,
    pub jobs: JobRegistry,
    pub output: TestDir,
}

impl TestApiServer {
    pub async fn new() -> Self {
        let provider = MockServer::start().await;
        let output = TestDir::new();

        let config = AppConfig {
            access_pin: TEST_PIN.to_string(),
            chart_base_url: servlet_url(&provider),
            output_dir: output.path().to_path_buf(),
            request_delay: Duration::ZERO,
            ..AppConfig::default()
        };

        let metrics = Arc::new(Metrics::new().expect("metrics initialization"));
        let source = Arc::new(HttpChartSource::new(&config.chart_base_url).expect("chart source"));
        let builder = ChartPdfBuilder::new(source, config.output_dir.clone())
            .with_delay(Arc::new(NoDelay))
            .with_metrics(metrics.clone());
        let jobs = JobRegistry::new();

        let state = AppState {
            health: Arc::new(RwLock::new(HealthStatus::default())),
            metrics: metrics.clone(),
            start_time: Arc::new(Instant::now()),
            config: Arc::new(config),
            builder: Arc::new(builder),
            jobs: jobs.clone(),
        };

        let router = create_router(state);
        let server = TestServer::new(router).expect("start test server");

        Self {
            server,
            metrics,
            provider,
            jobs,
            output,
        }
    }

    /// Submit the form and return the response body
    pub async fn submit(&self, pin: &str, scan: &str, symbols: &str, shift: &str) -> (u16, Value) {
        let response = self
            .server
            .post("/api/jobs")
            .form(&[
                ("pin", pin),
                ("scan", scan),
                ("symbols", symbols),
                ("shift", shift),
            ])
            .await;
        (response.status_code().as_u16(), response.json())
    }

    /// Poll a job until it leaves the running state
    pub async fn wait_for_job(&self, id: &str) -> Value {
        for _ in 0..200 {
            let body: Value = self.server.get(&format!("/api/jobs/{}", id)).await.json();
            if body["status"] != "running" {
                return body;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
        panic!("job {id} did not finish");
    }
}
