//! Startup orchestration.
//!
//! # Responsibilities
//! - Build the shared state: upstream client, cache, limiter, predictor
//! - Start background tasks (cache refresher, rate-limit sweeper)
//!
//! # Design Decisions
//! - Fail fast: an unusable upstream or model URL is fatal
//! - Predictions are optional; a missing API key disables them with a warning

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::task::JoinHandle;

use crate::cache::{RefreshingCache, Refresher};
use crate::config::GatewayConfig;
use crate::http::AppState;
use crate::lifecycle::Shutdown;
use crate::market::{FetchError, MarketData, QuoteFetcher, YahooClient};
use crate::predict::{GeminiClient, PredictError, Predictor};
use crate::security::SlidingWindowLimiter;

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("market data client: {0}")]
    Market(#[from] FetchError),

    #[error("prediction client: {0}")]
    Predictor(#[from] PredictError),
}

/// Build application state against the real upstream services.
pub fn build_state(config: &GatewayConfig) -> Result<AppState, StartupError> {
    let market: Arc<dyn MarketData> = Arc::new(YahooClient::new(&config.upstream)?);

    let predictor = if !config.predictor.enabled {
        tracing::info!("Predictions disabled by configuration");
        None
    } else if config.predictor.api_key.is_empty() {
        tracing::warn!("No model API key configured, predictions disabled");
        None
    } else {
        let model = Arc::new(GeminiClient::new(&config.predictor)?);
        Some(Arc::new(Predictor::new(model, market.clone())))
    };

    Ok(state_with(market, predictor))
}

/// State around an arbitrary market source. Integration tests use this
/// with stub sources.
pub fn state_with(market: Arc<dyn MarketData>, predictor: Option<Arc<Predictor>>) -> AppState {
    AppState {
        cache: Arc::new(RefreshingCache::new()),
        market,
        predictor,
        limiter: Arc::new(SlidingWindowLimiter::new()),
    }
}

/// Spawn the cache refresher and, when limiting is on, the idle-key sweeper.
pub fn spawn_background_tasks(
    config: &GatewayConfig,
    state: &AppState,
    shutdown: &Shutdown,
) -> Vec<JoinHandle<()>> {
    let mut handles = Vec::with_capacity(2);

    let fetcher = Arc::new(QuoteFetcher::new(state.market.clone()));
    let refresher = Refresher::new(state.cache.clone(), fetcher, &config.refresh);
    handles.push(tokio::spawn(refresher.run(shutdown.subscribe())));

    if config.rate_limit.enabled {
        let every = Duration::from_secs(config.rate_limit.sweep_interval_secs);
        handles.push(tokio::spawn(
            state.limiter.clone().run_sweeper(every, shutdown.subscribe()),
        ));
    }

    handles
}
