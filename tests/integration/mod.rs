// Shared helpers for the integration tests

pub mod fetcher_tests;
pub mod product_lifecycle_tests;
pub mod scheduler_tests;

use rust_decimal::Decimal;
use std::str::FromStr;
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use price_monitor::models::NewProduct;
use price_monitor::AppConfig;

/// Config pointing both data files into a fresh temp directory. Keep the
/// directory alive for the duration of the test.
pub struct TestEnv {
    pub dir: TempDir,
    pub config: AppConfig,
}

pub fn test_env() -> TestEnv {
    let dir = tempfile::tempdir().expect("create temp dir");
    let mut config = AppConfig::default();
    config.storage.data_file = dir.path().join("price_monitor_data.json");
    config.storage.history_file = dir.path().join("price_history.csv");
    config.fetcher.request_timeout = 5;
    TestEnv { dir, config }
}

pub fn dec(s: &str) -> Decimal {
    Decimal::from_str(s).expect("valid decimal literal")
}

pub fn new_product(name: &str, url: &str, target: &str) -> NewProduct {
    NewProduct {
        name: name.to_string(),
        url: url.to_string(),
        selector: ".price".to_string(),
        target_price: dec(target),
    }
}

/// A minimal product page with the price inside `.price`.
pub fn price_page(price_text: &str) -> String {
    format!(
        r#"<html>
            <head><title>Test Shop</title></head>
            <body>
                <h1 class="title">Widget</h1>
                <div class="buy-box"><span class="price">{}</span></div>
            </body>
        </html>"#,
        price_text
    )
}

pub async fn start_shop() -> MockServer {
    MockServer::start().await
}

pub async fn mount_page(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .mount(server)
        .await;
}

/// Serves `body` for the next request to `route` only. Mount in the order the
/// responses should be seen.
pub async fn mount_page_once(server: &MockServer, route: &str, body: String) {
    Mock::given(method("GET"))
        .and(path(route))
        .respond_with(ResponseTemplate::new(200).set_body_string(body))
        .up_to_n_times(1)
        .mount(server)
        .await;
}
