//! Integration tests for `HttpFetcher` against a wiremock server.

use std::sync::Arc;
use std::time::Duration;

use larder_enrich::{EnrichError, HostLimiter, HttpFetcher, PageFetcher};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_fetcher() -> HttpFetcher {
    HttpFetcher::new(
        5,
        "larder-test/0.1",
        Arc::new(HostLimiter::new(Duration::ZERO)),
        0,
        0,
    )
    .expect("failed to build test HttpFetcher")
}

#[tokio::test]
async fn fetch_returns_html_body() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/miso"))
        .and(header("user-agent", "larder-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Brown Rice Miso</h1>"))
        .mount(&server)
        .await;

    let url = format!("{}/products/miso", server.uri());
    let body = test_fetcher().fetch(&url).await;
    assert_eq!(body.ok().as_deref(), Some("<h1>Brown Rice Miso</h1>"));
}

#[tokio::test]
async fn fetch_reports_404_as_not_found_without_second_attempt() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/gone"))
        .respond_with(ResponseTemplate::new(404))
        .expect(1)
        .mount(&server)
        .await;

    let url = format!("{}/products/gone", server.uri());
    let result = test_fetcher().fetch(&url).await;
    assert!(
        matches!(result, Err(EnrichError::NotFound { .. })),
        "expected NotFound, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_retries_challenge_page_with_browser_user_agent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/tofu"))
        .and(header("user-agent", "larder-test/0.1"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<title>Just a moment...</title><p>Please enable cookies.</p>",
        ))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/products/tofu"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<h1>Smoked Tofu</h1>"))
        .mount(&server)
        .await;

    let url = format!("{}/products/tofu", server.uri());
    let body = test_fetcher().fetch(&url).await;
    assert_eq!(body.ok().as_deref(), Some("<h1>Smoked Tofu</h1>"));
}

#[tokio::test]
async fn fetch_reports_unusable_html_when_every_agent_is_challenged() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/tempeh"))
        .respond_with(ResponseTemplate::new(200).set_body_string(
            "<script src=\"/cdn-cgi/challenge-platform/h/b\"></script>",
        ))
        .expect(2)
        .mount(&server)
        .await;

    let url = format!("{}/products/tempeh", server.uri());
    let result = test_fetcher().fetch(&url).await;
    assert!(
        matches!(result, Err(EnrichError::UnusableHtml { .. })),
        "expected UnusableHtml, got: {result:?}"
    );
}

#[tokio::test]
async fn fetch_reports_server_errors_with_status() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/products/broken"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let url = format!("{}/products/broken", server.uri());
    match test_fetcher().fetch(&url).await {
        Err(EnrichError::UnexpectedStatus { status, .. }) => assert_eq!(status, 503),
        other => panic!("expected UnexpectedStatus, got: {other:?}"),
    }
}
