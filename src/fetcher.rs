use async_trait::async_trait;
use reqwest::Client;
use rust_decimal::Decimal;
use scraper::{Html, Selector};
use std::time::Duration;
use thiserror::Error;

use crate::config::FetcherConfig;
use crate::plugins::{PriceTracker, TrackerPlugin};

/// Why a single product check produced no price. None of these abort a pass.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    #[error("Selector '{selector}' not found on page.")]
    SelectorNotFound { selector: String },

    #[error("Invalid selector '{selector}': {message}")]
    InvalidSelector { selector: String, message: String },

    #[error("Could not parse price from: '{raw_text}'")]
    ParseFailure { raw_text: String },

    #[error("Request error: {0}")]
    Transport(String),
}

pub type FetchResult = std::result::Result<Decimal, FetchError>;

/// Anything that can turn a `(url, selector)` pair into a price.
#[async_trait]
pub trait PriceSource: Send + Sync {
    async fn fetch(&self, url: &str, selector: &str) -> FetchResult;
}

pub struct PageFetcher {
    client: Client,
    tracker: Box<dyn TrackerPlugin>,
}

impl PageFetcher {
    pub fn new(config: &FetcherConfig) -> crate::Result<Self> {
        Self::with_tracker(config, Box::new(PriceTracker::new()))
    }

    pub fn with_tracker(config: &FetcherConfig, tracker: Box<dyn TrackerPlugin>) -> crate::Result<Self> {
        let client = Client::builder()
            .user_agent(config.user_agent.as_str())
            .timeout(Duration::from_secs(config.request_timeout))
            .build()?;

        tracing::debug!("Price extraction uses {} ({})", tracker.name(), tracker.plugin_type());
        Ok(Self { client, tracker })
    }

    async fn fetch_page(&self, url: &str) -> Result<String, FetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .await
            .and_then(|response| response.error_for_status())
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        response.text().await.map_err(|e| FetchError::Transport(e.to_string()))
    }

    /// Runs the selector against fetched markup and parses the first match.
    pub fn extract(&self, html: &str, selector: &str) -> FetchResult {
        let raw_text = select_text(html, selector)?.ok_or_else(|| FetchError::SelectorNotFound {
            selector: selector.to_string(),
        })?;

        let parsed = self.tracker.parse(&raw_text);
        match parsed.value {
            Some(price) if parsed.success => Ok(price),
            _ => Err(FetchError::ParseFailure {
                raw_text: raw_text.trim().to_string(),
            }),
        }
    }
}

#[async_trait]
impl PriceSource for PageFetcher {
    async fn fetch(&self, url: &str, selector: &str) -> FetchResult {
        tracing::debug!("Fetching {} (selector: {})", url, selector);

        let body = self.fetch_page(url).await?;
        let result = self.extract(&body, selector);

        if let Ok(price) = &result {
            tracing::debug!("Parsed price {} from {}", price, url);
        }
        result
    }
}

/// Text content of the first element matching `selector`, or `None` when
/// nothing matches.
pub fn select_text(html: &str, selector: &str) -> Result<Option<String>, FetchError> {
    let css_selector = Selector::parse(selector).map_err(|e| FetchError::InvalidSelector {
        selector: selector.to_string(),
        message: format!("{:?}", e),
    })?;

    let document = Html::parse_document(html);
    let text = document
        .select(&css_selector)
        .next()
        .map(|element| element.text().collect::<String>());

    Ok(text)
}
