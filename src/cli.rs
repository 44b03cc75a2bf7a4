//! Command surface: argument definitions and the handlers behind them.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Parser, Subcommand};
use rust_decimal::Decimal;
use validator::Validate;

use crate::check_engine::{CheckEngine, CheckOutcome, PassReport};
use crate::config::AppConfig;
use crate::fetcher::PageFetcher;
use crate::history::HistoryLog;
use crate::models::{NewProduct, Product};
use crate::report;
use crate::scheduler::{PassObserver, Scheduler};
use crate::store::ProductStore;
use crate::utils::error::AppError;
use crate::Result;

#[derive(Debug, Parser)]
#[command(name = "price-monitor", version, about = "Monitor product prices on any website.")]
pub struct Cli {
    /// Config file (TOML); defaults to ./price-monitor.toml when present
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Product document path (overrides storage.data_file)
    #[arg(long, global = true)]
    pub data_file: Option<PathBuf>,

    /// History log path (overrides storage.history_file)
    #[arg(long, global = true)]
    pub history_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Clone, Subcommand)]
pub enum Command {
    /// Add a product to monitor
    Add {
        #[arg(long)]
        url: String,
        /// CSS selector for the price element
        #[arg(long)]
        selector: String,
        /// Alert when price drops to this value
        #[arg(long)]
        target: Decimal,
        /// Friendly name for this product
        #[arg(long)]
        name: String,
    },
    /// List all tracked products
    List,
    /// Check all prices once
    Check,
    /// Continuously monitor prices
    Watch {
        /// Check interval in minutes (default: scheduler.default_interval)
        #[arg(long)]
        interval: Option<u64>,
    },
    /// Show price history
    History {
        /// Filter by product name
        #[arg(long)]
        name: Option<String>,
    },
    /// Remove a tracked product
    Remove {
        #[arg(long)]
        name: String,
    },
}

impl Cli {
    /// Folds the path flags into the loaded configuration.
    pub fn apply_overrides(&self, config: &mut AppConfig) {
        if let Some(path) = &self.data_file {
            config.storage.data_file = path.clone();
        }
        if let Some(path) = &self.history_file {
            config.storage.history_file = path.clone();
        }
    }
}

pub async fn run(command: Command, config: &AppConfig) -> Result<()> {
    match command {
        Command::Add { url, selector, target, name } => {
            let product = add_product(
                config,
                NewProduct {
                    name,
                    url,
                    selector,
                    target_price: target,
                },
            )?;
            println!("{}", report::render_added(&product));
        }
        Command::List => {
            let store = ProductStore::load(&config.storage.data_file)?;
            println!("{}", report::render_product_table(store.products()));
        }
        Command::Check => check(config).await?,
        Command::Watch { interval } => {
            watch(config, interval.unwrap_or(config.scheduler.default_interval)).await?;
        }
        Command::History { name } => {
            let log = HistoryLog::new(&config.storage.history_file);
            if !log.exists() {
                println!("No history recorded yet.");
                return Ok(());
            }
            let records = log.recent(name.as_deref(), config.history.display_limit)?;
            println!("{}", report::render_history(&records, name.as_deref()));
        }
        Command::Remove { name } => {
            let removed = remove_product(config, &name)?;
            println!("{}", report::render_removed(&name, removed));
        }
    }
    Ok(())
}

pub fn add_product(config: &AppConfig, new_product: NewProduct) -> Result<Product> {
    new_product.validate()?;

    let mut store = ProductStore::load(&config.storage.data_file)?;
    let product = Product::new(new_product);
    store.add(product.clone())?;
    Ok(product)
}

pub fn remove_product(config: &AppConfig, name: &str) -> Result<usize> {
    let mut store = ProductStore::load(&config.storage.data_file)?;
    store.remove(name)
}

/// Minutes to a sleep duration. Zero and values too large to express in
/// seconds are rejected.
fn watch_interval(interval_minutes: u64) -> Result<Duration> {
    if interval_minutes == 0 {
        return Err(AppError::Validation("watch interval must be at least 1 minute".to_string()));
    }

    interval_minutes
        .checked_mul(60)
        .map(Duration::from_secs)
        .ok_or_else(|| AppError::Validation(format!("watch interval of {} minutes is too large", interval_minutes)))
}

fn build_scheduler(config: &AppConfig, interval: Duration) -> Result<Scheduler<PageFetcher>> {
    let fetcher = PageFetcher::new(&config.fetcher)?;
    Ok(Scheduler::new(CheckEngine::new(fetcher), interval))
}

/// Prints each product line as soon as it is checked, then the alert block.
/// In watch mode it also prints the pass banner and the next-check line.
struct ConsoleObserver {
    watch_interval_minutes: Option<u64>,
}

impl PassObserver for ConsoleObserver {
    fn pass_started(&mut self, _pass: u64) {
        if self.watch_interval_minutes.is_some() {
            println!(
                "\n[{}] Running price check...",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
            );
        }
    }

    fn product_checked(&mut self, outcome: &CheckOutcome) {
        println!("{}", report::render_outcome(outcome));
    }

    fn pass_finished(&mut self, _pass: u64, pass: &PassReport) {
        if pass.outcomes.is_empty() {
            println!("No products to check.");
        } else {
            println!("{}", report::render_alert_summary(&pass.alerts));
        }
        if let Some(minutes) = self.watch_interval_minutes {
            println!("Next check in {} minutes...", minutes);
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum InterruptAction {
    /// Let the running pass finish, then stop.
    Stop,
    /// Leave immediately with status 130.
    Exit,
}

fn interrupt_action(received: u32) -> InterruptAction {
    if received <= 1 {
        InterruptAction::Stop
    } else {
        InterruptAction::Exit
    }
}

async fn check(config: &AppConfig) -> Result<()> {
    let mut store = ProductStore::load(&config.storage.data_file)?;
    if store.is_empty() {
        println!("No products to check.");
        return Ok(());
    }

    let history = HistoryLog::new(&config.storage.history_file);
    let scheduler = build_scheduler(config, Duration::ZERO)?;
    let mut console = ConsoleObserver {
        watch_interval_minutes: None,
    };
    scheduler.run_once_with(&mut store, &history, &mut console).await?;
    Ok(())
}

async fn watch(config: &AppConfig, interval_minutes: u64) -> Result<()> {
    let interval = watch_interval(interval_minutes)?;

    let mut store = ProductStore::load(&config.storage.data_file)?;
    let history = HistoryLog::new(&config.storage.history_file);
    let scheduler = build_scheduler(config, interval)?;

    let token = scheduler.cancellation_token();
    tokio::spawn(async move {
        let mut received = 0;
        while tokio::signal::ctrl_c().await.is_ok() {
            received += 1;
            match interrupt_action(received) {
                InterruptAction::Stop => {
                    tracing::info!("Interrupt received, stopping after the current pass (Ctrl+C again to exit now)");
                    token.cancel();
                }
                InterruptAction::Exit => {
                    tracing::warn!("Second interrupt received, exiting without finishing the pass");
                    std::process::exit(130);
                }
            }
        }
    });

    println!(
        "Starting price monitor (interval: {} minutes). Press Ctrl+C to stop.\n",
        interval_minutes
    );

    let mut console = ConsoleObserver {
        watch_interval_minutes: Some(interval_minutes),
    };
    let passes = scheduler.watch_with(&mut store, &history, &mut console).await?;

    println!("Stopped after {} pass(es).", passes);
    Ok(())
}
