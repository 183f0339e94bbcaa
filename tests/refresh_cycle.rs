//! Cache refresh behaviour observed through the API.

use std::sync::atomic::Ordering;
use std::sync::Arc;
use std::time::Duration;

use market_gateway::cache::Refresher;
use market_gateway::config::StalePolicy;
use market_gateway::market::QuoteFetcher;
use reqwest::StatusCode;
use serde_json::Value;

mod common;

#[tokio::test]
async fn test_empty_before_first_refresh() {
    let gateway = common::start_gateway(common::test_config(), common::StubMarket::with_prices(&[]), None).await;
    let sdk = gateway.sdk();

    let stocks = sdk.stocks().await.unwrap();
    assert!(stocks.stocks.is_empty());
    assert_eq!(stocks.count, 0);
    assert!(stocks.last_update.is_none());

    let health = sdk.health().await.unwrap();
    assert_eq!(health.status, "running");
    assert_eq!(health.stocks_in_cache, 0);
    assert!(health.last_update.is_none());
}

#[tokio::test]
async fn test_background_refresh_populates_cache() {
    let market = common::StubMarket::with_prices(&[("TCS.NS", 4100.0), ("INFY.NS", 1600.0)]);
    let mut config = common::test_config();
    config.refresh.symbols = vec!["TCS.NS".to_string(), "INFY.NS".to_string()];
    let gateway = common::start_gateway_with_tasks(config, market).await;

    let cache = gateway.state.cache.clone();
    assert!(common::eventually(|| cache.len() == 2, Duration::from_secs(5)).await);

    let stocks = gateway.sdk().stocks().await.unwrap();
    assert_eq!(stocks.count, 2);
    assert!(stocks.last_update.is_some());
    let symbols: Vec<_> = stocks.stocks.iter().map(|q| q.symbol.as_str()).collect();
    assert_eq!(symbols, vec!["TCS.NS", "INFY.NS"]);
}

#[tokio::test]
async fn test_partial_failure_keeps_other_symbols() {
    let market = common::StubMarket::with_prices(&[("TCS.NS", 4100.0), ("INFY.NS", 1600.0)]);
    market.fail("INFY.NS");

    let mut config = common::test_config();
    config.refresh.symbols = vec!["TCS.NS".to_string(), "INFY.NS".to_string()];
    config.refresh.stale_policy = StalePolicy::Drop;
    let gateway = common::start_gateway(config.clone(), market.clone(), None).await;

    let refresher = Refresher::new(
        gateway.state.cache.clone(),
        Arc::new(QuoteFetcher::new(market.clone())),
        &config.refresh,
    );
    let report = refresher.refresh_once().await;
    assert_eq!(report.fetched, 1);
    assert_eq!(report.failed, vec!["INFY.NS".to_string()]);

    let sdk = gateway.sdk();
    assert_eq!(sdk.stocks().await.unwrap().count, 1);
    assert_eq!(sdk.stock("TCS.NS").await.unwrap().price, 4100.0);

    // Not cached, and the direct fallback also fails upstream.
    let err = sdk.stock("INFY.NS").await.unwrap_err();
    assert_eq!(err.status(), Some(502));
}

#[tokio::test]
async fn test_retained_value_survives_failure() {
    let market = common::StubMarket::with_prices(&[("SBIN.NS", 820.0)]);
    let mut config = common::test_config();
    config.refresh.symbols = vec!["SBIN.NS".to_string()];
    let gateway = common::start_gateway(config.clone(), market.clone(), None).await;

    let refresher = Refresher::new(
        gateway.state.cache.clone(),
        Arc::new(QuoteFetcher::new(market.clone())),
        &config.refresh,
    );
    refresher.refresh_once().await;
    let first = gateway.state.cache.last_update().unwrap();

    market.fail("SBIN.NS");
    let report = refresher.refresh_once().await;
    assert_eq!(report.retained, 1);

    let stocks = gateway.sdk().stocks().await.unwrap();
    assert_eq!(stocks.count, 1);
    assert_eq!(stocks.stocks[0].price, 820.0);
    assert!(gateway.state.cache.last_update().unwrap() >= first);
}

#[tokio::test]
async fn test_cache_miss_falls_back_without_caching() {
    let market = common::StubMarket::with_prices(&[("WIPRO.NS", 480.0)]);
    let gateway = common::start_gateway(common::test_config(), market.clone(), None).await;
    let sdk = gateway.sdk();

    let quote = sdk.stock("WIPRO.NS").await.unwrap();
    assert_eq!(quote.symbol, "WIPRO.NS");
    assert_eq!(market.quote_calls.load(Ordering::SeqCst), 1);
    assert!(gateway.state.cache.get("WIPRO.NS").is_none());

    sdk.stock("WIPRO.NS").await.unwrap();
    assert_eq!(market.quote_calls.load(Ordering::SeqCst), 2);

    let res = common::client()
        .get(gateway.url("/api/stocks/NOPE.NS"))
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::NOT_FOUND);
    let body: Value = res.json().await.unwrap();
    assert_eq!(body["error"], "Stock not found");
}
