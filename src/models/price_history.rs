use chrono::{DateTime, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};

pub const HISTORY_HEADER: [&str; 6] = ["timestamp", "name", "url", "price", "target", "alert_triggered"];

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One successful check, as stored in the history log.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HistoryRecord {
    #[serde(serialize_with = "serialize_timestamp", deserialize_with = "deserialize_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub name: String,
    pub url: String,
    pub price: Decimal,
    pub target: Decimal,
    #[serde(deserialize_with = "deserialize_flag")]
    pub alert_triggered: bool,
}

impl HistoryRecord {
    pub fn new(name: &str, url: &str, price: Decimal, target: Decimal, alert_triggered: bool, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            name: name.to_string(),
            url: url.to_string(),
            price,
            target,
            alert_triggered,
        }
    }
}

fn serialize_timestamp<S: Serializer>(timestamp: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(&timestamp.format(TIMESTAMP_FORMAT))
}

fn deserialize_timestamp<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    NaiveDateTime::parse_from_str(raw.trim(), TIMESTAMP_FORMAT)
        .map(|naive| naive.and_utc())
        .map_err(serde::de::Error::custom)
}

// Older logs spell booleans "True"/"False"
fn deserialize_flag<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
    let raw = String::deserialize(deserializer)?;
    match raw.trim().to_ascii_lowercase().as_str() {
        "true" => Ok(true),
        "false" | "" => Ok(false),
        other => Err(serde::de::Error::custom(format!("invalid alert flag '{}'", other))),
    }
}
