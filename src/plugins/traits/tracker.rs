use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseResult {
    pub success: bool,
    pub value: Option<Decimal>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComparisonResult {
    pub changed: bool,
    pub change_type: ChangeType,
    pub difference: Decimal,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub enum ChangeType {
    Increased,
    Decreased,
    Unchanged,
}

/// Trait for implementing value trackers that turn matched element text into a number
pub trait TrackerPlugin: Send + Sync {
    /// Plugin metadata
    fn name(&self) -> &str;
    fn plugin_type(&self) -> &str;
    
    /// Core functionality
    fn parse(&self, text: &str) -> ParseResult;
    fn compare(&self, old_value: Decimal, new_value: Decimal) -> ComparisonResult;
}
