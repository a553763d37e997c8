//! Web surface: PIN-gated form, build jobs, PDF download, health and metrics

use axum::{
    extract::{Path, Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{Html, IntoResponse, Json, Response},
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::RwLock;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    trace::{DefaultMakeSpan, DefaultOnRequest, DefaultOnResponse, TraceLayer},
};
use tracing::{error, info, warn, Level};
use uuid::Uuid;

use crate::config::AppConfig;
use crate::core::builder::{BuildRequest, ChartPdfBuilder};
use crate::core::pacing::FixedDelay;
use crate::jobs::{spawn_job_sweeper, submit_build_job, JobRegistry, JobStatus};
use crate::metrics::Metrics;
use crate::models::{parse_symbol_list, ScanLabel};
use crate::services::HttpChartSource;

const SERVICE_NAME: &str = "chartdeck";

#[derive(Clone)]
pub struct AppState {
    pub health: Arc<RwLock<HealthStatus>>,
    pub metrics: Arc<Metrics>,
    pub start_time: Arc<Instant>,
    pub config: Arc<AppConfig>,
    pub builder: Arc<ChartPdfBuilder>,
    pub jobs: JobRegistry,
}

#[derive(Clone, Debug)]
pub struct HealthStatus {
    pub status: String,
}

impl Default for HealthStatus {
    fn default() -> Self {
        Self {
            status: "healthy".to_string(),
        }
    }
}

type ApiError = (StatusCode, Json<Value>);

fn reject(status: StatusCode, message: &str) -> ApiError {
    (status, Json(json!({ "error": message })))
}

/// Compare two PINs without short-circuiting on the first differing byte
fn pin_matches(entered: &str, expected: &str) -> bool {
    let (a, b) = (entered.as_bytes(), expected.as_bytes());
    if a.len() != b.len() {
        return false;
    }
    a.iter().zip(b).fold(0u8, |acc, (x, y)| acc | (x ^ y)) == 0
}

pub async fn health_check(State(state): State<AppState>) -> Result<Json<Value>, StatusCode> {
    let health = state.health.read().await;
    let uptime_seconds = state.start_time.elapsed().as_secs();
    Ok(Json(json!({
        "status": health.status,
        "uptime_seconds": uptime_seconds,
        "service": SERVICE_NAME
    })))
}

pub async fn metrics_handler(State(state): State<AppState>) -> Result<String, StatusCode> {
    state
        .metrics
        .export()
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)
}

/// Middleware to track HTTP request metrics
async fn metrics_middleware(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let start = Instant::now();
    let method = request.method().clone();
    let path = request.uri().path().to_string();

    state.metrics.http_requests_in_flight.inc();
    let response = next.run(request).await;
    let status = response.status();
    let duration = start.elapsed();
    state.metrics.http_requests_in_flight.dec();

    state.metrics.http_requests_total.inc();
    state
        .metrics
        .http_request_duration_seconds
        .observe(duration.as_secs_f64());

    if status.is_server_error() {
        error!(
            method = %method,
            path = %path,
            status = %status,
            duration_ms = duration.as_millis(),
            "HTTP request error"
        );
    }

    response
}

async fn index(State(state): State<AppState>) -> Html<String> {
    Html(render_form(&state.config.scans))
}

#[derive(Debug, Deserialize)]
struct CreateJobForm {
    #[serde(default)]
    pin: String,
    #[serde(default)]
    scan: String,
    #[serde(default)]
    symbols: String,
    #[serde(default)]
    shift: String,
}

/// Validate the form and start a build in the background
async fn create_job(
    State(state): State<AppState>,
    Form(form): Form<CreateJobForm>,
) -> Result<(StatusCode, Json<Value>), ApiError> {
    if !pin_matches(&form.pin, &state.config.access_pin) {
        warn!("Rejected build request with incorrect PIN");
        return Err(reject(
            StatusCode::UNAUTHORIZED,
            "Incorrect PIN. Please try again.",
        ));
    }

    let scan = form.scan.trim();
    if !state.config.is_known_scan(scan) {
        return Err(reject(StatusCode::BAD_REQUEST, "Unknown scan."));
    }
    let scan = ScanLabel::parse(scan).map_err(|e| {
        error!(error = %e, "Configured scan label is not usable in a file name");
        reject(StatusCode::BAD_REQUEST, "Unknown scan.")
    })?;

    let shift = match form.shift.trim() {
        "" => 0,
        raw => raw.parse::<u32>().map_err(|_| {
            reject(
                StatusCode::BAD_REQUEST,
                "Shift must be a non-negative integer.",
            )
        })?,
    };

    let symbols = parse_symbol_list(&form.symbols)
        .map_err(|e| reject(StatusCode::BAD_REQUEST, &format!("Invalid symbol list: {}", e)))?;
    if symbols.is_empty() {
        return Err(reject(
            StatusCode::BAD_REQUEST,
            "Please enter at least one symbol.",
        ));
    }

    let total = symbols.len();
    let request = BuildRequest {
        symbols,
        shift,
        scan: scan.clone(),
    };
    let id = submit_build_job(&state.jobs, &state.builder, request).await;

    Ok((
        StatusCode::ACCEPTED,
        Json(json!({
            "id": id,
            "scan": scan.as_str(),
            "total": total,
        })),
    ))
}

/// Progress snapshot of a build job
async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Value>, ApiError> {
    let record = state
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Job not found."))?;
    Ok(Json(json!(record.snapshot())))
}

/// Download the finished PDF
async fn download_pdf(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let record = state
        .jobs
        .get(&id)
        .await
        .ok_or_else(|| reject(StatusCode::NOT_FOUND, "Job not found."))?;

    let path = match (record.status, &record.pdf_path) {
        (JobStatus::Completed, Some(path)) => path.clone(),
        (JobStatus::Failed, _) => {
            return Err(reject(StatusCode::CONFLICT, "Job failed; no PDF available."))
        }
        _ => return Err(reject(StatusCode::CONFLICT, "Job is still running.")),
    };

    let bytes = tokio::fs::read(&path).await.map_err(|e| {
        error!(error = %e, job_id = %id, path = %path.display(), "Failed to read finished PDF");
        reject(StatusCode::INTERNAL_SERVER_ERROR, "PDF is no longer available.")
    })?;

    let disposition = format!("attachment; filename=\"{}\"", record.scan.pdf_file_name());
    Ok((
        [
            (header::CONTENT_TYPE, "application/pdf".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        bytes,
    )
        .into_response())
}

pub fn create_router(state: AppState) -> Router {
    Router::new()
        .route("/", get(index))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics_handler))
        .route("/api/jobs", post(create_job))
        .route("/api/jobs/{id}", get(get_job))
        .route("/api/jobs/{id}/pdf", get(download_pdf))
        .layer(
            ServiceBuilder::new()
                .layer(
                    TraceLayer::new_for_http()
                        .make_span_with(DefaultMakeSpan::new().level(Level::DEBUG))
                        .on_request(DefaultOnRequest::new().level(Level::DEBUG))
                        .on_response(DefaultOnResponse::new().level(Level::DEBUG)),
                )
                .layer(axum::middleware::from_fn_with_state(
                    state.clone(),
                    metrics_middleware,
                ))
                .layer(CorsLayer::permissive()),
        )
        .with_state(state)
}

/// Wire the real chart provider into a fresh application state
pub fn build_state(config: AppConfig) -> Result<AppState, Box<dyn std::error::Error>> {
    let metrics = Arc::new(Metrics::new()?);
    let source = Arc::new(HttpChartSource::new(&config.chart_base_url)?);
    let builder = ChartPdfBuilder::new(source, config.output_dir.clone())
        .with_delay(Arc::new(FixedDelay(config.request_delay)))
        .with_metrics(metrics.clone());

    Ok(AppState {
        health: Arc::new(RwLock::new(HealthStatus::default())),
        metrics,
        start_time: Arc::new(Instant::now()),
        config: Arc::new(config),
        builder: Arc::new(builder),
        jobs: JobRegistry::new(),
    })
}

pub async fn start_server(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let port = config.port;
    let job_ttl = config.job_ttl;
    let state = build_state(config)?;
    spawn_job_sweeper(
        state.jobs.clone(),
        state.builder.output_dir().to_path_buf(),
        job_ttl,
    );
    let app = create_router(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{}", port)).await?;

    info!(port = port, "HTTP server listening on port {}", port);
    axum::serve(listener, app).await?;

    Ok(())
}

fn render_form(scans: &[String]) -> String {
    let options: String = scans
        .iter()
        .map(|s| format!("<option value=\"{0}\">{0}</option>", html_escape(s)))
        .collect();
    FORM_TEMPLATE.replace("{{SCAN_OPTIONS}}", &options)
}

fn html_escape(raw: &str) -> String {
    raw.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

const FORM_TEMPLATE: &str = r#"<!doctype html>
<html lang="en">
<head>
<meta charset="utf-8">
<title>Chart Downloader</title>
<style>
body { font-family: sans-serif; max-width: 40rem; margin: 2rem auto; }
label { display: block; margin-top: 1rem; }
textarea { width: 100%; height: 12rem; }
progress { width: 100%; }
.error { color: #b00020; }
</style>
</head>
<body>
<h1>Chart Downloader</h1>
<form id="build">
  <label>PIN <input type="password" name="pin" placeholder="Enter 4-digit PIN" required></label>
  <label>Scan <select name="scan">{{SCAN_OPTIONS}}</select></label>
  <label>Symbols
    <textarea name="symbols" placeholder="Paste one symbol per line, including header if present..."></textarea>
  </label>
  <label>Shift (optional) <input type="number" name="shift" min="0" value="0"></label>
  <button type="submit">Download Charts</button>
</form>
<p id="error" class="error"></p>
<progress id="progress" max="1" value="0" hidden></progress>
<p id="status"></p>
<p><a id="download" hidden>Download PDF</a></p>
<script>
const form = document.getElementById("build");
const errorBox = document.getElementById("error");
const bar = document.getElementById("progress");
const statusText = document.getElementById("status");
const download = document.getElementById("download");

async function poll(id) {
  const res = await fetch(`/api/jobs/${id}`);
  const job = await res.json();
  bar.value = job.progress;
  statusText.textContent = job.last_message || "Starting download...";
  if (job.status === "running") {
    setTimeout(() => poll(id), 1000);
  } else if (job.status === "completed") {
    statusText.textContent = "Download complete!";
    download.href = job.download_url;
    download.hidden = false;
  } else {
    errorBox.textContent = job.error;
  }
}

form.addEventListener("submit", async (event) => {
  event.preventDefault();
  errorBox.textContent = "";
  download.hidden = true;
  const res = await fetch("/api/jobs", {
    method: "POST",
    body: new URLSearchParams(new FormData(form)),
  });
  const body = await res.json();
  if (!res.ok) {
    errorBox.textContent = body.error;
    return;
  }
  bar.hidden = false;
  bar.value = 0;
  poll(body.id);
});
</script>
</body>
</html>
"#;
