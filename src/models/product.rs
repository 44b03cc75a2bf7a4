use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use validator::{Validate, ValidationError};

/// A tracked price target. `name` is the unique key within a store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Product {
    pub name: String,
    pub url: String,
    pub selector: String,
    pub target_price: Decimal,
    #[serde(deserialize_with = "deserialize_timestamp")]
    pub added: DateTime<Utc>,
    
    // Both absent until the first successful check, then set together
    pub last_price: Option<Decimal>,
    #[serde(default, deserialize_with = "deserialize_optional_timestamp")]
    pub last_checked: Option<DateTime<Utc>>,
}

#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct NewProduct {
    #[validate(length(min = 1, message = "name must not be empty"))]
    pub name: String,
    #[validate(url(message = "url must be an absolute URL"))]
    pub url: String,
    #[validate(custom(function = "validate_selector"))]
    pub selector: String,
    #[validate(custom(function = "validate_target_price"))]
    pub target_price: Decimal,
}

impl Product {
    pub fn new(new_product: NewProduct) -> Self {
        Self {
            name: new_product.name,
            url: new_product.url,
            selector: new_product.selector,
            target_price: new_product.target_price,
            added: Utc::now(),
            last_price: None,
            last_checked: None,
        }
    }
    
    pub fn record_check(&mut self, price: Decimal, checked_at: DateTime<Utc>) {
        self.last_price = Some(price);
        self.last_checked = Some(checked_at);
    }
    
    pub fn is_checked(&self) -> bool {
        self.last_price.is_some() && self.last_checked.is_some()
    }
    
    /// Inclusive: a price equal to the target alerts.
    pub fn meets_target(&self, price: Decimal) -> bool {
        price <= self.target_price
    }
}

/// RFC 3339, or an ISO 8601 timestamp without an offset, which is read as
/// local time.
fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(at) = DateTime::parse_from_rfc3339(raw) {
        return Some(at.with_timezone(&Utc));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f").ok()?;
    let local = Local
        .from_local_datetime(&naive)
        .earliest()
        .map(|at| at.with_timezone(&Utc))
        .unwrap_or_else(|| naive.and_utc());
    Some(local)
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(raw.trim())
        .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw)))
}

fn deserialize_optional_timestamp<'de, D: Deserializer<'de>>(
    deserializer: D,
) -> Result<Option<DateTime<Utc>>, D::Error> {
    match Option::<String>::deserialize(deserializer)? {
        Some(raw) => parse_timestamp(raw.trim())
            .map(Some)
            .ok_or_else(|| serde::de::Error::custom(format!("invalid timestamp '{}'", raw))),
        None => Ok(None),
    }
}

fn validate_selector(selector: &str) -> Result<(), ValidationError> {
    if selector.trim().is_empty() || scraper::Selector::parse(selector).is_err() {
        let mut err = ValidationError::new("selector");
        err.message = Some(format!("'{}' is not a valid CSS selector", selector).into());
        return Err(err);
    }
    Ok(())
}

fn validate_target_price(target: &Decimal) -> Result<(), ValidationError> {
    if target.is_sign_negative() {
        let mut err = ValidationError::new("target_price");
        err.message = Some("target price must not be negative".into());
        return Err(err);
    }
    Ok(())
}
