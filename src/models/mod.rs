pub mod product;
pub mod price_history;

// Re-exports for convenience
pub use product::*;
pub use price_history::*;
