// Watch loop against a mock shop

use std::time::Duration;

use price_monitor::check_engine::CheckEngine;
use price_monitor::fetcher::PageFetcher;
use price_monitor::history::HistoryLog;
use price_monitor::models::Product;
use price_monitor::scheduler::Scheduler;
use price_monitor::store::ProductStore;

use super::*;

fn scheduler(env: &TestEnv, interval: Duration) -> Scheduler<PageFetcher> {
    let fetcher = PageFetcher::new(&env.config.fetcher).expect("build fetcher");
    Scheduler::new(CheckEngine::new(fetcher), interval)
}

#[tokio::test]
async fn test_watch_runs_repeated_passes() -> anyhow::Result<()> {
    let server = start_shop().await;
    mount_page_once(&server, "/widget", price_page("$15.00")).await;
    mount_page_once(&server, "/widget", price_page("$12.00")).await;
    mount_page_once(&server, "/widget", price_page("$9.00")).await;

    let env = test_env();
    let mut store = ProductStore::load(&env.config.storage.data_file)?;
    store.add(Product::new(new_product("Widget", &format!("{}/widget", server.uri()), "10")))?;
    let history = HistoryLog::new(&env.config.storage.history_file);

    let mut alerts = Vec::new();
    let passes = scheduler(&env, Duration::ZERO)
        .with_max_passes(3)
        .watch(&mut store, &history, |_, pass| alerts.push(pass.alerts.len()))
        .await?;

    assert_eq!(passes, 3);
    assert_eq!(alerts, vec![0, 0, 1]);

    let prices: Vec<_> = history.recent(None, 20)?.into_iter().map(|r| r.price).collect();
    assert_eq!(prices, vec![dec("15.00"), dec("12.00"), dec("9.00")]);
    assert_eq!(
        ProductStore::load(&env.config.storage.data_file)?.get("Widget").unwrap().last_price,
        Some(dec("9.00"))
    );

    Ok(())
}

#[tokio::test]
async fn test_cancel_from_another_task_stops_watch() -> anyhow::Result<()> {
    let server = start_shop().await;
    mount_page(&server, "/widget", price_page("$15.00")).await;

    let env = test_env();
    let mut store = ProductStore::load(&env.config.storage.data_file)?;
    store.add(Product::new(new_product("Widget", &format!("{}/widget", server.uri()), "10")))?;
    let history = HistoryLog::new(&env.config.storage.history_file);

    let scheduler = scheduler(&env, Duration::from_secs(3600));
    let token = scheduler.cancellation_token();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(500)).await;
        token.cancel();
    });

    let passes = tokio::time::timeout(
        Duration::from_secs(10),
        scheduler.watch(&mut store, &history, |_, _| {}),
    )
    .await??;

    assert_eq!(passes, 1);
    assert_eq!(history.recent(None, 20)?.len(), 1);
    Ok(())
}
