// Fetcher behaviour over real HTTP

use std::time::Duration;

use price_monitor::config::FetcherConfig;
use price_monitor::fetcher::{FetchError, PageFetcher, PriceSource};
use wiremock::matchers::{header, method, path};
use wiremock::{Mock, ResponseTemplate};

use super::*;

fn fetcher() -> PageFetcher {
    PageFetcher::new(&FetcherConfig::default()).expect("build fetcher")
}

#[tokio::test]
async fn test_fetches_and_parses_price() {
    let server = start_shop().await;
    mount_page(&server, "/laptop", price_page("$1,299.00")).await;

    let price = fetcher()
        .fetch(&format!("{}/laptop", server.uri()), ".price")
        .await;

    assert_eq!(price, Ok(dec("1299.00")));
}

#[tokio::test]
async fn test_non_success_status_is_transport_error() {
    let server = start_shop().await;
    Mock::given(method("GET"))
        .and(path("/gone"))
        .respond_with(ResponseTemplate::new(404))
        .mount(&server)
        .await;

    let result = fetcher().fetch(&format!("{}/gone", server.uri()), ".price").await;

    match result {
        Err(FetchError::Transport(message)) => assert!(message.contains("404"), "message: {}", message),
        other => panic!("expected transport error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_transport_error() {
    let result = fetcher().fetch("http://127.0.0.1:9/product", ".price").await;
    assert!(matches!(result, Err(FetchError::Transport(_))));
}

#[tokio::test]
async fn test_missing_selector() {
    let server = start_shop().await;
    mount_page(&server, "/widget", price_page("$5.00")).await;

    let result = fetcher()
        .fetch(&format!("{}/widget", server.uri()), ".sale-price")
        .await;

    assert_eq!(
        result,
        Err(FetchError::SelectorNotFound { selector: ".sale-price".to_string() })
    );
}

#[tokio::test]
async fn test_unparseable_price_text() {
    let server = start_shop().await;
    mount_page(&server, "/widget", price_page("Call for price")).await;

    let result = fetcher().fetch(&format!("{}/widget", server.uri()), ".price").await;

    assert_eq!(
        result,
        Err(FetchError::ParseFailure { raw_text: "Call for price".to_string() })
    );
}

#[tokio::test]
async fn test_sends_configured_user_agent() {
    let server = start_shop().await;
    Mock::given(method("GET"))
        .and(path("/widget"))
        .and(header("user-agent", "price-monitor-test/1.0"))
        .respond_with(ResponseTemplate::new(200).set_body_string(price_page("$3.50")))
        .expect(1)
        .mount(&server)
        .await;

    let config = FetcherConfig {
        user_agent: "price-monitor-test/1.0".to_string(),
        ..FetcherConfig::default()
    };
    let result = PageFetcher::new(&config)
        .expect("build fetcher")
        .fetch(&format!("{}/widget", server.uri()), ".price")
        .await;

    assert_eq!(result, Ok(dec("3.50")));
}

#[tokio::test]
async fn test_slow_response_times_out() {
    let server = start_shop().await;
    Mock::given(method("GET"))
        .and(path("/slow"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string(price_page("$1.00"))
                .set_delay(Duration::from_secs(5)),
        )
        .mount(&server)
        .await;

    let config = FetcherConfig {
        request_timeout: 1,
        ..FetcherConfig::default()
    };
    let result = PageFetcher::new(&config)
        .expect("build fetcher")
        .fetch(&format!("{}/slow", server.uri()), ".price")
        .await;

    assert!(matches!(result, Err(FetchError::Transport(_))));
}
