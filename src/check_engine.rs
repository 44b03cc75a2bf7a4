use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tokio::time::Instant;
use tracing::{error, info, warn};

use crate::fetcher::{FetchError, PriceSource};
use crate::history::HistoryLog;
use crate::models::HistoryRecord;
use crate::store::ProductStore;
use crate::Result;

#[derive(Debug, Clone, PartialEq)]
pub enum CheckStatus {
    Priced {
        price: Decimal,
        target: Decimal,
        /// `last_price` before this check
        previous: Option<Decimal>,
        alerted: bool,
    },
    Failed(FetchError),
}

#[derive(Debug, Clone, PartialEq)]
pub struct CheckOutcome {
    pub name: String,
    pub url: String,
    pub status: CheckStatus,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AlertedProduct {
    pub name: String,
    pub url: String,
    pub price: Decimal,
    pub target_price: Decimal,
}

/// Everything one pass observed, in stored product order.
#[derive(Debug, Clone)]
pub struct PassReport {
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<CheckOutcome>,
    pub alerts: Vec<AlertedProduct>,
    pub total_time_ms: u64,
}

impl PassReport {
    pub fn products_checked(&self) -> usize {
        self.outcomes.len()
    }

    pub fn succeeded(&self) -> usize {
        self.outcomes
            .iter()
            .filter(|o| matches!(o.status, CheckStatus::Priced { .. }))
            .count()
    }

    pub fn failed(&self) -> usize {
        self.products_checked() - self.succeeded()
    }
}

/// Runs check passes over a store. Products are fetched one at a time, in
/// stored order.
pub struct CheckEngine<P: PriceSource> {
    source: P,
}

impl<P: PriceSource> CheckEngine<P> {
    pub fn new(source: P) -> Self {
        Self { source }
    }

    pub fn source(&self) -> &P {
        &self.source
    }

    /// Checks every product, appending one history row per parsed price and
    /// saving the store once at the end. A failed fetch only produces a
    /// `Failed` outcome; persistence errors abort the pass.
    pub async fn run_check_pass(&self, store: &mut ProductStore, history: &HistoryLog) -> Result<PassReport> {
        self.run_check_pass_with(store, history, |_| {}).await
    }

    /// `run_check_pass`, calling `on_outcome` as each product finishes.
    pub async fn run_check_pass_with<F>(
        &self,
        store: &mut ProductStore,
        history: &HistoryLog,
        mut on_outcome: F,
    ) -> Result<PassReport>
    where
        F: FnMut(&CheckOutcome),
    {
        let started_at = Utc::now();
        let start_time = Instant::now();
        let mut outcomes = Vec::with_capacity(store.len());
        let mut alerts = Vec::new();

        if store.is_empty() {
            return Ok(PassReport {
                started_at,
                outcomes,
                alerts,
                total_time_ms: 0,
            });
        }

        let targets: Vec<_> = store.products().to_vec();

        for (index, product) in targets.into_iter().enumerate() {
            let status = match self.source.fetch(&product.url, &product.selector).await {
                Ok(price) => {
                    let checked_at = Utc::now();
                    let alerted = product.meets_target(price);

                    store.update_check_result_at(index, price, checked_at);
                    history.append(&HistoryRecord::new(
                        &product.name,
                        &product.url,
                        price,
                        product.target_price,
                        alerted,
                        checked_at,
                    ))
                    .inspect_err(|e| error!("Failed to append history for '{}': {}", product.name, e))?;

                    if alerted {
                        info!("Price alert for '{}': {} <= {}", product.name, price, product.target_price);
                        alerts.push(AlertedProduct {
                            name: product.name.clone(),
                            url: product.url.clone(),
                            price,
                            target_price: product.target_price,
                        });
                    }

                    CheckStatus::Priced {
                        price,
                        target: product.target_price,
                        previous: product.last_price,
                        alerted,
                    }
                }
                Err(e) => {
                    warn!("Check failed for '{}': {}", product.name, e);
                    CheckStatus::Failed(e)
                }
            };

            let outcome = CheckOutcome {
                name: product.name,
                url: product.url,
                status,
            };
            on_outcome(&outcome);
            outcomes.push(outcome);
        }

        store
            .save()
            .inspect_err(|e| error!("Failed to save {}: {}", store.path().display(), e))?;

        let report = PassReport {
            started_at,
            outcomes,
            alerts,
            total_time_ms: start_time.elapsed().as_millis() as u64,
        };

        info!(
            "Check pass complete: {} checked, {} failed, {} alert(s) in {}ms",
            report.products_checked(),
            report.failed(),
            report.alerts.len(),
            report.total_time_ms
        );
        Ok(report)
    }
}
