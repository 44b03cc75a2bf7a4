pub mod tracker;

pub use tracker::{TrackerPlugin, ParseResult, ComparisonResult, ChangeType};
