pub mod check_engine;
pub mod cli;
pub mod config;
pub mod fetcher;
pub mod history;
pub mod models;
pub mod plugins;
pub mod report;
pub mod scheduler;
pub mod store;
pub mod utils;

// Re-export commonly used types
pub use config::AppConfig;
pub use utils::error::AppError;

pub type Result<T> = std::result::Result<T, AppError>;
