//! Market data handlers.

use axum::{
    extract::{Path, Query, State},
    Json,
};
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::market::{catalog, Exchange, HistoryRange, Quote};
use crate::observability::metrics;

/// `GET /api/stocks`
pub async fn list_stocks(State(state): State<AppState>) -> Json<Value> {
    let (stocks, last_update) = state.cache.get_all();
    let count = stocks.len();
    Json(json!({
        "stocks": stocks,
        "lastUpdate": last_update,
        "count": count,
    }))
}

/// `GET /api/stocks/{symbol}`
///
/// Served from the cache when present; otherwise fetched directly. A
/// direct fetch is never written back, the refresher owns the cache.
pub async fn get_stock(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
) -> Result<Json<Quote>, ApiError> {
    if let Some(quote) = state.cache.get(&symbol) {
        metrics::record_cache_lookup(true);
        return Ok(Json(quote));
    }
    metrics::record_cache_lookup(false);
    tracing::debug!(symbol = %symbol, "Cache miss, fetching directly");

    let quote = state.market.quote(&symbol).await?;
    Ok(Json(quote))
}

#[derive(Debug, Deserialize)]
pub struct HistoryParams {
    period: Option<String>,
    interval: Option<String>,
}

/// `GET /api/stocks/{symbol}/history`
pub async fn get_history(
    State(state): State<AppState>,
    Path(symbol): Path<String>,
    Query(params): Query<HistoryParams>,
) -> Result<Json<Value>, ApiError> {
    let range = HistoryRange::new(
        params.period.as_deref().unwrap_or("1mo"),
        params.interval.as_deref().unwrap_or("1d"),
    )
    .map_err(|e| ApiError::BadRequest(e.to_string()))?;

    let data = match state.market.history(&symbol, &range).await {
        Ok(candles) => candles,
        Err(e) => {
            tracing::warn!(symbol = %symbol, error = %e, "History unavailable");
            Vec::new()
        }
    };

    Ok(Json(json!({
        "symbol": symbol,
        "period": range.period(),
        "interval": range.interval(),
        "count": data.len(),
        "data": data,
    })))
}

/// `GET /api/health`
pub async fn health(State(state): State<AppState>) -> Json<Value> {
    let snapshot = state.cache.snapshot();
    Json(json!({
        "status": "running",
        "lastUpdate": snapshot.published_at(),
        "stocksInCache": snapshot.len(),
        "serverTime": Utc::now(),
    }))
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    #[serde(default)]
    q: String,
    exchange: Option<String>,
}

/// `GET /api/search`
pub async fn search(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> Json<Value> {
    let Some(query) = catalog::normalize_query(&params.q) else {
        return Json(json!({ "results": [], "error": "Query too short" }));
    };
    let exchange = Exchange::from_param(params.exchange.as_deref().unwrap_or("NSE"));

    let results = catalog::search(state.market.as_ref(), &query, exchange).await;
    Json(json!({
        "query": query,
        "exchange": exchange.name(),
        "count": results.len(),
        "results": results,
    }))
}

/// `GET /api/news`
pub async fn news(State(state): State<AppState>) -> Json<Value> {
    let news = match state.market.news().await {
        Ok(items) => items,
        Err(e) => {
            tracing::warn!(error = %e, "News unavailable");
            Vec::new()
        }
    };
    Json(json!({
        "count": news.len(),
        "news": news,
        "timestamp": Utc::now(),
    }))
}
