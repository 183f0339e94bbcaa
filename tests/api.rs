//! Handler behaviour for history, search, news and predictions.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use market_gateway::predict::{PredictError, Predictor, TextModel};
use reqwest::StatusCode;
use serde_json::{json, Value};

mod common;

struct CannedModel(Result<String, ()>);

#[async_trait]
impl TextModel for CannedModel {
    fn name(&self) -> &str {
        "canned"
    }

    async fn generate(&self, _prompt: &str) -> Result<String, PredictError> {
        self.0.clone().map_err(|_| PredictError::EmptyResponse)
    }
}

async fn gateway_with_model(answer: Result<String, ()>) -> common::Gateway {
    let market = common::StubMarket::with_prices(&[("TCS.NS", 4100.0)]);
    let predictor = Predictor::new(Arc::new(CannedModel(answer)), market.clone());
    common::start_gateway(common::test_config(), market, Some(Arc::new(predictor))).await
}

#[tokio::test]
async fn test_history_defaults_and_validation() {
    let market = common::StubMarket::with_prices(&[("TCS.NS", 4100.0)]);
    let gateway = common::start_gateway(common::test_config(), market, None).await;
    let sdk = gateway.sdk();

    let history = sdk.history("TCS.NS", None, None).await.unwrap();
    assert_eq!(history.period, "1mo");
    assert_eq!(history.interval, "1d");
    assert_eq!(history.count, 5);
    assert_eq!(history.data[4].close, 105.0);

    let unknown = sdk.history("NOPE.NS", Some("5d"), None).await.unwrap();
    assert_eq!(unknown.count, 0);

    let err = sdk.history("TCS.NS", Some("7w"), None).await.unwrap_err();
    assert_eq!(err.status(), Some(400));
}

#[tokio::test]
async fn test_search_catalog_and_short_query() {
    let gateway = common::start_gateway(common::test_config(), common::StubMarket::with_prices(&[]), None).await;
    let sdk = gateway.sdk();

    let hits = sdk.search("infy", Some("bse")).await.unwrap();
    assert_eq!(hits.query.as_deref(), Some("INFY"));
    assert_eq!(hits.exchange.as_deref(), Some("BSE"));
    assert_eq!(hits.results[0].symbol, "INFY.BO");

    let short = sdk.search("a", None).await.unwrap();
    assert!(short.results.is_empty());
    assert_eq!(short.error.as_deref(), Some("Query too short"));
}

#[tokio::test]
async fn test_search_asks_upstream_when_catalog_misses() {
    let market = common::StubMarket::with_prices(&[("ZOMATO.NS", 190.0)]);
    let gateway = common::start_gateway(common::test_config(), market, None).await;

    let hits = gateway.sdk().search("zomato", None).await.unwrap();
    assert_eq!(hits.count, Some(1));
    assert_eq!(hits.results[0].symbol, "ZOMATO.NS");
    assert_eq!(hits.results[0].name, "ZOMATO Ltd");
}

#[tokio::test]
async fn test_news() {
    let gateway = common::start_gateway(common::test_config(), common::StubMarket::with_prices(&[]), None).await;
    let news = gateway.sdk().news().await.unwrap();
    assert_eq!(news.count, 1);
    assert_eq!(news.news[0].time, "15:30");
}

#[tokio::test]
async fn test_predict_success() {
    let gateway = gateway_with_model(Ok(
        "TARGET_PRICE: ₹4,250.00\nCONFIDENCE: 81%\nRECOMMENDATION: BUY\nREASONING: Momentum.".to_string(),
    ))
    .await;

    let prediction = gateway.sdk().predict("TCS.NS").await.unwrap();
    assert!(prediction.success);
    assert_eq!(prediction.symbol, "TCS.NS");
    assert_eq!(prediction.current_price, 4100.0);
    assert_eq!(prediction.target_price, 4250.0);
    assert_eq!(prediction.confidence, 81);
    assert_eq!(prediction.recommendation, "BUY");
    assert_eq!(prediction.model, "canned");
}

#[tokio::test]
async fn test_predict_errors() {
    let gateway = gateway_with_model(Err(())).await;
    let client = common::client();

    let missing = client
        .post(gateway.url("/api/predict"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(missing.status(), StatusCode::BAD_REQUEST);
    let body: Value = missing.json().await.unwrap();
    assert_eq!(body["error"], "Symbol required");

    let unknown = client
        .post(gateway.url("/api/predict"))
        .json(&json!({ "symbol": "NOPE.NS" }))
        .send()
        .await
        .unwrap();
    assert_eq!(unknown.status(), StatusCode::NOT_FOUND);
    let body: Value = unknown.json().await.unwrap();
    assert_eq!(body["error"], "Could not fetch stock data");

    let failed = client
        .post(gateway.url("/api/predict"))
        .json(&json!({ "symbol": "TCS.NS" }))
        .send()
        .await
        .unwrap();
    assert_eq!(failed.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = failed.json().await.unwrap();
    assert_eq!(body["success"], false);
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn test_predict_unconfigured() {
    let gateway = common::start_gateway(common::test_config(), common::StubMarket::with_prices(&[]), None).await;
    let err = gateway.sdk().predict("TCS.NS").await.unwrap_err();
    assert_eq!(err.status(), Some(503));
}

#[tokio::test]
async fn test_request_id_and_cors_headers() {
    let gateway = common::start_gateway(common::test_config(), common::StubMarket::with_prices(&[]), None).await;
    let client = common::client();

    let res = client
        .get(gateway.url("/api/health"))
        .header("origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert!(res.headers().contains_key("x-request-id"));
    assert_eq!(res.headers()["access-control-allow-origin"], "*");

    let res = client
        .get(gateway.url("/api/health"))
        .header("x-request-id", "trace-me")
        .send()
        .await
        .unwrap();
    assert_eq!(res.headers()["x-request-id"], "trace-me");
}

#[tokio::test]
async fn test_slow_request_times_out_with_cors_headers() {
    let market = common::StubMarket::with_prices(&[]);
    market.slow_news(Duration::from_secs(5));
    let mut config = common::test_config();
    config.timeouts.request_secs = 1;
    let gateway = common::start_gateway(config, market, None).await;

    let res = common::client()
        .get(gateway.url("/api/news"))
        .header("origin", "http://localhost:3000")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), StatusCode::REQUEST_TIMEOUT);
    assert_eq!(res.headers()["access-control-allow-origin"], "*");
    assert!(res.headers().contains_key("x-request-id"));
}
