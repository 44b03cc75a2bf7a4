use crate::plugins::traits::{TrackerPlugin, ParseResult, ComparisonResult, ChangeType};
use regex::Regex;
use rust_decimal::{Decimal, RoundingStrategy};
use std::str::FromStr;
use std::sync::LazyLock;

// Anything that is not a digit, comma or period is dropped, minus signs included
static NON_PRICE_CHARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^0-9.,]").expect("static price pattern"));

/// Parses prices written with `,` as a thousands separator and `.` as the
/// decimal point. Comma-decimal locales ("12,50") are read as 1250.
///
/// Values are `Decimal`, which holds at most 28 significant digits (about
/// 7.9e28). Longer digit runs are reported as unparseable rather than
/// rounded.
#[derive(Debug, Clone, Default)]
pub struct PriceTracker;

impl PriceTracker {
    pub fn new() -> Self {
        Self
    }
    
    pub fn extract_price(&self, text: &str) -> Option<Decimal> {
        let cleaned = NON_PRICE_CHARS.replace_all(text.trim(), "").replace(',', "");
        
        if cleaned.matches('.').count() > 1 || !cleaned.chars().any(|c| c.is_ascii_digit()) {
            return None;
        }
        
        // "12." and ".5" are valid numbers; Decimal wants digits on both sides
        let mut normalized = cleaned;
        if normalized.starts_with('.') {
            normalized.insert(0, '0');
        }
        if normalized.ends_with('.') {
            normalized.pop();
        }
        
        Decimal::from_str(&normalized).ok()
    }
}

/// Renders an amount as `$12.34`.
pub fn format_money(value: Decimal) -> String {
    format!("${:.2}", value.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero))
}

impl TrackerPlugin for PriceTracker {
    fn name(&self) -> &str {
        "Price Tracker"
    }
    
    fn plugin_type(&self) -> &str {
        "price"
    }
    
    fn parse(&self, text: &str) -> ParseResult {
        match self.extract_price(text) {
            Some(price) => ParseResult {
                success: true,
                value: Some(price),
            },
            None => ParseResult {
                success: false,
                value: None,
            },
        }
    }
    
    fn compare(&self, old_value: Decimal, new_value: Decimal) -> ComparisonResult {
        let change_type = if new_value > old_value {
            ChangeType::Increased
        } else if new_value < old_value {
            ChangeType::Decreased
        } else {
            ChangeType::Unchanged
        };
        
        ComparisonResult {
            changed: change_type != ChangeType::Unchanged,
            change_type,
            difference: new_value - old_value,
        }
    }
}
