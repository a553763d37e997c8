//! Integration tests for the HTTP chart source

use crate::test_utils::{chart_png, mount_charts, mount_status, servlet_url, symbols};
use chartdeck::models::ChartRequest;
use chartdeck::services::{ChartSource, FetchError, HttpChartSource};
use wiremock::matchers::{header_exists, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn request(symbol: &str, shift: u32) -> ChartRequest {
    ChartRequest::new(symbols(&[symbol]).remove(0), shift)
}

#[tokio::test]
async fn fetch_returns_chart_body() {
    let server = MockServer::start().await;
    mount_charts(&server, &["AAPL"]).await;

    let source = HttpChartSource::new(&servlet_url(&server)).unwrap();
    let body = source.fetch(&request("AAPL", 0)).await.unwrap();
    assert_eq!(body, chart_png());
}

#[tokio::test]
async fn fetch_sends_browser_headers_and_render_flags() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/chart/servlet.php"))
        .and(query_param("symbol", "MSFT"))
        .and(query_param("shift", "7"))
        .and(query_param("s", "small"))
        .and(query_param("tscale", "log"))
        .and(query_param("show_ohlc", "1"))
        .and(header_exists("accept"))
        .and(header_exists("user-agent"))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(chart_png()))
        .expect(1)
        .mount(&server)
        .await;

    let source = HttpChartSource::new(&servlet_url(&server)).unwrap();
    source.fetch(&request("MSFT", 7)).await.unwrap();

    let requests = server.received_requests().await.expect("wiremock requests");
    let user_agent = requests[0]
        .headers
        .get("user-agent")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(user_agent.starts_with("Mozilla/5.0"), "got {user_agent}");
    let accept = requests[0]
        .headers
        .get("accept")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    assert!(accept.contains("image/webp"), "got {accept}");
}

#[tokio::test]
async fn non_success_status_is_an_error_with_reason() {
    let server = MockServer::start().await;
    mount_status(&server, "GOOG", 404).await;

    let source = HttpChartSource::new(&servlet_url(&server)).unwrap();
    let err = source.fetch(&request("GOOG", 0)).await.unwrap_err();

    assert!(matches!(err, FetchError::Status { .. }));
    let message = err.to_string();
    assert!(message.starts_with("404 Not Found for url: "), "got {message}");
    assert!(message.contains("symbol=GOOG"));
}

#[tokio::test]
async fn connection_failure_is_a_network_error() {
    // Nothing listens on the discard port
    let source = HttpChartSource::new("http://127.0.0.1:9/chart/servlet.php").unwrap();
    let err = source.fetch(&request("TSLA", 0)).await.unwrap_err();
    assert!(matches!(err, FetchError::Network(_)));
}

#[test]
fn invalid_endpoint_is_rejected() {
    assert!(matches!(
        HttpChartSource::new("not a url"),
        Err(FetchError::InvalidEndpoint { .. })
    ));
}
