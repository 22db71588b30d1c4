use std::time::Duration;

use restock_core::PresenceSelector;
use restock_engine::{Browser, FetchSettings, HttpBrowser, ProbeFailure, TextMatch};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const IN_STOCK: &str = r#"<html><body>
    <h1>PlayStation 5</h1>
    <button class="buy">Add to basket</button>
</body></html>"#;

const OUT_OF_STOCK: &str = r#"<html><body>
    <h1>PlayStation 5</h1>
    <p class="stock">Currently unavailable</p>
</body></html>"#;

fn fast_settings() -> FetchSettings {
    FetchSettings {
        poll_interval: Duration::from_millis(20),
        request_timeout: Duration::from_secs(2),
        ..FetchSettings::default()
    }
}

async fn serve(server: &MockServer, route: &str, body: &str) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_raw(body, "text/html; charset=utf-8"))
        .mount(server)
        .await;
}

#[tokio::test]
async fn finds_presence_element_and_phrases() {
    let server = MockServer::start().await;
    serve(&server, "/ps5", OUT_OF_STOCK).await;
    let browser = HttpBrowser::new(fast_settings()).unwrap();

    let page = browser.open(&format!("{}/ps5", server.uri())).await.unwrap();

    page.wait_for_element(
        &PresenceSelector::new("h1", "PlayStation"),
        Duration::from_millis(200),
    )
    .await
    .unwrap();
    assert_eq!(
        page.search_text("Currently unavailable", Duration::from_millis(100))
            .await
            .unwrap(),
        TextMatch::Found
    );
}

#[tokio::test]
async fn absent_phrase_is_not_found_after_timeout() {
    let server = MockServer::start().await;
    serve(&server, "/ps5", IN_STOCK).await;
    let browser = HttpBrowser::new(fast_settings()).unwrap();
    let page = browser.open(&format!("{}/ps5", server.uri())).await.unwrap();

    let result = page
        .search_text("Currently unavailable", Duration::from_millis(100))
        .await
        .unwrap();

    assert_eq!(result, TextMatch::NotFound);
}

#[tokio::test]
async fn missing_presence_element_times_out() {
    let server = MockServer::start().await;
    serve(&server, "/ps5", IN_STOCK).await;
    let browser = HttpBrowser::new(fast_settings()).unwrap();
    let page = browser.open(&format!("{}/ps5", server.uri())).await.unwrap();

    let err = page
        .wait_for_element(
            &PresenceSelector::new("div.product", ""),
            Duration::from_millis(100),
        )
        .await
        .unwrap_err();

    assert_eq!(err.kind, ProbeFailure::Timeout);
}

#[tokio::test]
async fn waiting_refetches_until_content_appears() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/ps5"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("<html><body>Loading</body></html>", "text/html"))
        .up_to_n_times(2)
        .with_priority(1)
        .mount(&server)
        .await;
    serve(&server, "/ps5", IN_STOCK).await;
    let browser = HttpBrowser::new(fast_settings()).unwrap();
    let page = browser.open(&format!("{}/ps5", server.uri())).await.unwrap();

    page.wait_for_element(
        &PresenceSelector::new("button", "Add to"),
        Duration::from_secs(2),
    )
    .await
    .unwrap();
}

#[tokio::test]
async fn http_error_status_fails_open() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;
    let browser = HttpBrowser::new(fast_settings()).unwrap();

    let err = browser
        .open(&format!("{}/gone", server.uri()))
        .await
        .err()
        .unwrap();

    assert_eq!(err.kind, ProbeFailure::HttpStatus(503));
}

#[tokio::test]
async fn non_html_content_is_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/api"))
        .respond_with(ResponseTemplate::new(200).set_body_raw("{}", "application/json"))
        .mount(&server)
        .await;
    let browser = HttpBrowser::new(fast_settings()).unwrap();

    let err = browser
        .open(&format!("{}/api", server.uri()))
        .await
        .err()
        .unwrap();

    assert!(matches!(
        err.kind,
        ProbeFailure::UnsupportedContentType { .. }
    ));
}

#[tokio::test]
async fn invalid_url_fails_before_fetching() {
    let browser = HttpBrowser::new(fast_settings()).unwrap();
    let err = browser.open("not a url").await.err().unwrap();
    assert_eq!(err.kind, ProbeFailure::InvalidUrl);
}

#[tokio::test]
async fn capture_returns_current_html() {
    let server = MockServer::start().await;
    serve(&server, "/ps5", IN_STOCK).await;
    let browser = HttpBrowser::new(fast_settings()).unwrap();
    let page = browser.open(&format!("{}/ps5", server.uri())).await.unwrap();

    page.wait_for_network_idle(Duration::from_millis(10))
        .await
        .unwrap();
    let capture = page.capture(Duration::from_millis(10)).await.unwrap();

    assert_eq!(capture.extension, "html");
    assert_eq!(capture.bytes, IN_STOCK.as_bytes());
}
