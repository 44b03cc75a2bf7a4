pub mod traits;
pub mod trackers;

pub use traits::TrackerPlugin;
pub use trackers::PriceTracker;
