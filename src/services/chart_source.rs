//! Chart image provider client

use crate::models::ChartRequest;
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, USER_AGENT};
use reqwest::Client as HttpClient;
use thiserror::Error;
use tracing::debug;
use url::Url;

const BROWSER_ACCEPT: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,image/apng,*/*;q=0.8,application/signed-exchange;v=b3;q=0.7";
const BROWSER_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36";

/// A single chart download that did not produce a body
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("{status} for url: {url}")]
    Status { status: String, url: String },
    #[error("{0}")]
    Network(#[from] reqwest::Error),
    #[error("invalid chart endpoint {url:?}: {reason}")]
    InvalidEndpoint { url: String, reason: String },
}

/// Source of chart images, one request per symbol
#[async_trait]
pub trait ChartSource: Send + Sync {
    async fn fetch(&self, request: &ChartRequest) -> Result<Vec<u8>, FetchError>;
}

/// Chart source backed by the provider's HTTP servlet.
///
/// Holds a single pooled client, so every symbol in a build reuses the same
/// connections.
pub struct HttpChartSource {
    http_client: HttpClient,
    base_url: Url,
}

impl HttpChartSource {
    pub fn new(base_url: &str) -> Result<Self, FetchError> {
        let http_client = HttpClient::builder()
            .default_headers(Self::browser_headers())
            .build()?;
        Self::with_client(base_url, http_client)
    }

    /// Use a preconfigured client. The browser headers are still sent per request.
    pub fn with_client(base_url: &str, http_client: HttpClient) -> Result<Self, FetchError> {
        let base_url = Url::parse(base_url).map_err(|e| FetchError::InvalidEndpoint {
            url: base_url.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            http_client,
            base_url,
        })
    }

    fn browser_headers() -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static(BROWSER_ACCEPT));
        headers.insert(USER_AGENT, HeaderValue::from_static(BROWSER_USER_AGENT));
        headers
    }
}

#[async_trait]
impl ChartSource for HttpChartSource {
    async fn fetch(&self, request: &ChartRequest) -> Result<Vec<u8>, FetchError> {
        let url = request.url(&self.base_url);
        debug!(symbol = %request.symbol, url = %url, "Requesting chart");

        let response = self
            .http_client
            .get(url.clone())
            .headers(Self::browser_headers())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let status = match status.canonical_reason() {
                Some(reason) => format!("{} {}", status.as_u16(), reason),
                None => status.as_u16().to_string(),
            };
            return Err(FetchError::Status {
                status,
                url: url.to_string(),
            });
        }

        let body = response.bytes().await?;
        Ok(body.to_vec())
    }
}
