//! Shared helpers: temporary directories, test images and a mocked chart provider
#![allow(dead_code)]

use async_trait::async_trait;
use chartdeck::core::pacing::DelayPolicy;
use chartdeck::models::{ChartEvent, ChartRequest, Symbol};
use chartdeck::services::{ChartSource, FetchError};
use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use std::collections::HashSet;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::mpsc;
use uuid::Uuid;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const SERVLET_PATH: &str = "/chart/servlet.php";

/// Temporary directory removed on drop
pub struct TestDir {
    path: PathBuf,
}

impl TestDir {
    pub fn new() -> Self {
        let path = std::env::temp_dir().join(format!("chartdeck-test-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&path).expect("create test dir");
        Self { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Names of the entries directly under the directory
    pub fn entries(&self) -> Vec<String> {
        list_dir(&self.path)
    }
}

impl Drop for TestDir {
    fn drop(&mut self) {
        let _ = std::fs::remove_dir_all(&self.path);
    }
}

pub fn list_dir(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = std::fs::read_dir(dir)
        .map(|rd| {
            rd.filter_map(|e| e.ok())
                .map(|e| e.file_name().to_string_lossy().into_owned())
                .collect()
        })
        .unwrap_or_default();
    names.sort();
    names
}

/// Small opaque PNG standing in for a rendered chart
pub fn chart_png() -> Vec<u8> {
    let img = DynamicImage::ImageRgb8(RgbImage::from_pixel(12, 6, Rgb([0, 0, 0])));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), ImageFormat::Png)
        .expect("encode png");
    buf
}

pub fn symbols(names: &[&str]) -> Vec<Symbol> {
    names
        .iter()
        .map(|n| Symbol::parse(n).expect("valid symbol"))
        .collect()
}

/// Serve a chart PNG for each symbol from the mock provider
pub async fn mount_charts(server: &MockServer, names: &[&str]) {
    let png = chart_png();
    for name in names {
        Mock::given(method("GET"))
            .and(path(SERVLET_PATH))
            .and(query_param("symbol", *name))
            .respond_with(
                ResponseTemplate::new(200)
                    .insert_header("content-type", "image/png")
                    .set_body_bytes(png.clone()),
            )
            .mount(server)
            .await;
    }
}

/// Make the mock provider answer `status` for one symbol
pub async fn mount_status(server: &MockServer, name: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(SERVLET_PATH))
        .and(query_param("symbol", name))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}

pub fn servlet_url(server: &MockServer) -> String {
    format!("{}{}", server.uri(), SERVLET_PATH)
}

/// In-memory chart source: every symbol succeeds unless listed in `failing`
pub struct StaticChartSource {
    png: Vec<u8>,
    failing: HashSet<String>,
    pub requested: Mutex<Vec<String>>,
}

impl StaticChartSource {
    pub fn new(failing: &[&str]) -> Self {
        Self {
            png: chart_png(),
            failing: failing.iter().map(|s| s.to_string()).collect(),
            requested: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ChartSource for StaticChartSource {
    async fn fetch(&self, request: &ChartRequest) -> Result<Vec<u8>, FetchError> {
        let symbol = request.symbol.as_str().to_string();
        self.requested.lock().unwrap().push(symbol.clone());
        if self.failing.contains(&symbol) {
            return Err(FetchError::Status {
                status: "503 Service Unavailable".to_string(),
                url: format!("mock://{}", symbol),
            });
        }
        Ok(self.png.clone())
    }
}

/// Delay policy that records when it was consulted and never sleeps
#[derive(Default)]
pub struct RecordingDelay {
    pub calls: Mutex<Vec<usize>>,
}

impl DelayPolicy for RecordingDelay {
    fn delay_after(&self, index: usize) -> Duration {
        self.calls.lock().unwrap().push(index);
        Duration::ZERO
    }
}

/// Collect everything sent on an event channel so far
pub fn drain(mut rx: mpsc::UnboundedReceiver<ChartEvent>) -> Vec<ChartEvent> {
    let mut events = Vec::new();
    while let Ok(event) = rx.try_recv() {
        events.push(event);
    }
    events
}
