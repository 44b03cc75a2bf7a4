use std::time::Duration;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

use crate::check_engine::{CheckEngine, CheckOutcome, PassReport};
use crate::fetcher::PriceSource;
use crate::history::HistoryLog;
use crate::store::ProductStore;
use crate::Result;

/// Hooks around each pass. `pass` counts from 1.
pub trait PassObserver {
    fn pass_started(&mut self, _pass: u64) {}
    fn product_checked(&mut self, _outcome: &CheckOutcome) {}
    fn pass_finished(&mut self, _pass: u64, _report: &PassReport) {}
}

impl PassObserver for () {}

struct AfterPass<F>(F);

impl<F: FnMut(u64, &PassReport)> PassObserver for AfterPass<F> {
    fn pass_finished(&mut self, pass: u64, report: &PassReport) {
        (self.0)(pass, report)
    }
}

/// Drives check passes: once, or repeatedly with a fixed sleep between passes
/// until cancelled.
pub struct Scheduler<P: PriceSource> {
    engine: CheckEngine<P>,
    interval: Duration,
    cancel_token: CancellationToken,
    max_passes: Option<u64>,
}

impl<P: PriceSource> Scheduler<P> {
    pub fn new(engine: CheckEngine<P>, interval: Duration) -> Self {
        Self {
            engine,
            interval,
            cancel_token: CancellationToken::new(),
            max_passes: None,
        }
    }

    /// Stop `watch` after this many passes.
    pub fn with_max_passes(mut self, max_passes: u64) -> Self {
        self.max_passes = Some(max_passes);
        self
    }

    pub fn with_cancellation_token(mut self, cancel_token: CancellationToken) -> Self {
        self.cancel_token = cancel_token;
        self
    }

    /// Cancelling interrupts the sleep between passes. A pass that is already
    /// running completes first.
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel_token.clone()
    }

    pub fn engine(&self) -> &CheckEngine<P> {
        &self.engine
    }

    pub async fn run_once(&self, store: &mut ProductStore, history: &HistoryLog) -> Result<PassReport> {
        self.run_once_with(store, history, &mut ()).await
    }

    pub async fn run_once_with<O: PassObserver>(
        &self,
        store: &mut ProductStore,
        history: &HistoryLog,
        observer: &mut O,
    ) -> Result<PassReport> {
        self.observed_pass(1, store, history, observer).await
    }

    async fn observed_pass<O: PassObserver>(
        &self,
        pass: u64,
        store: &mut ProductStore,
        history: &HistoryLog,
        observer: &mut O,
    ) -> Result<PassReport> {
        observer.pass_started(pass);
        let report = self
            .engine
            .run_check_pass_with(store, history, |outcome| observer.product_checked(outcome))
            .await?;
        observer.pass_finished(pass, &report);
        Ok(report)
    }

    /// Runs passes over the same in-memory store until cancelled or the pass
    /// limit is hit, calling `on_pass` after each. The store is not reloaded
    /// between passes. Returns the number of completed passes; a persistence
    /// error ends the loop.
    pub async fn watch<F>(&self, store: &mut ProductStore, history: &HistoryLog, on_pass: F) -> Result<u64>
    where
        F: FnMut(u64, &PassReport),
    {
        self.watch_with(store, history, &mut AfterPass(on_pass)).await
    }

    /// `watch` with hooks before each pass and per product as well as after.
    pub async fn watch_with<O: PassObserver>(
        &self,
        store: &mut ProductStore,
        history: &HistoryLog,
        observer: &mut O,
    ) -> Result<u64> {
        let mut passes = 0u64;

        loop {
            if self.cancel_token.is_cancelled() {
                break;
            }

            self.observed_pass(passes + 1, store, history, observer).await?;
            passes += 1;

            if self.max_passes.is_some_and(|max| passes >= max) {
                debug!("Reached pass limit of {}", passes);
                break;
            }

            tokio::select! {
                _ = self.cancel_token.cancelled() => {
                    break;
                }
                _ = tokio::time::sleep(self.interval) => {}
            }
        }

        info!("Watch stopped after {} pass(es)", passes);
        Ok(passes)
    }
}
