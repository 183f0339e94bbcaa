//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create the Axum router with every API route
//! - Attach a rate-limit policy to each limited route
//! - Wire up middleware (request ID, tracing, CORS, timeout)
//! - Serve until the shutdown signal, then drain

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    http::StatusCode,
    middleware::from_fn_with_state,
    routing::{get, post, MethodRouter},
    Router,
};
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower::ServiceBuilder;
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::cache::RefreshingCache;
use crate::config::{GatewayConfig, RouteLimit};
use crate::http::{predict, stocks};
use crate::market::{MarketData, Quote};
use crate::predict::Predictor;
use crate::security::rate_limit::rate_limit_middleware;
use crate::security::{RoutePolicy, SlidingWindowLimiter};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub cache: Arc<RefreshingCache<Quote>>,
    pub market: Arc<dyn MarketData>,
    /// `None` when no model API key is configured.
    pub predictor: Option<Arc<Predictor>>,
    pub limiter: Arc<SlidingWindowLimiter>,
}

/// HTTP server for the gateway API.
pub struct HttpServer {
    router: Router,
    config: GatewayConfig,
}

impl HttpServer {
    pub fn new(config: GatewayConfig, state: AppState) -> Self {
        let router = Self::build_router(&config, state);
        Self { router, config }
    }

    /// Build the Axum router with all middleware layers.
    fn build_router(config: &GatewayConfig, state: AppState) -> Router {
        let limits = &config.rate_limit;
        let limiter = limits.enabled.then(|| state.limiter.clone());
        let limited = |endpoint: &'static str, route: RouteLimit, handler: MethodRouter<AppState>| {
            match &limiter {
                Some(limiter) => handler.layer(from_fn_with_state(
                    RoutePolicy::new(endpoint, route, limiter.clone())
                        .trust_forwarded_for(limits.trust_forwarded_for),
                    rate_limit_middleware,
                )),
                None => handler,
            }
        };

        Router::new()
            .route(
                "/api/stocks",
                limited("stocks", limits.stocks, get(stocks::list_stocks)),
            )
            .route(
                "/api/stocks/{symbol}",
                limited("stock", limits.stock, get(stocks::get_stock)),
            )
            .route("/api/stocks/{symbol}/history", get(stocks::get_history))
            .route("/api/health", get(stocks::health))
            .route(
                "/api/search",
                limited("search", limits.search, get(stocks::search)),
            )
            .route(
                "/api/predict",
                limited("predict", limits.predict, post(predict::predict)),
            )
            .route("/api/news", limited("news", limits.news, get(stocks::news)))
            .with_state(state)
            .layer(
                ServiceBuilder::new()
                    .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
                    .layer(TraceLayer::new_for_http())
                    .layer(CorsLayer::permissive())
                    .layer(PropagateRequestIdLayer::x_request_id())
                    .layer(TimeoutLayer::with_status_code(
                        StatusCode::REQUEST_TIMEOUT,
                        Duration::from_secs(config.timeouts.request_secs),
                    )),
            )
    }

    /// Run the server until `shutdown` fires, then finish in-flight requests.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(
            address = %addr,
            rate_limiting = self.config.rate_limit.enabled,
            "HTTP server starting"
        );

        let app = self.router.into_make_service_with_connect_info::<SocketAddr>();

        axum::serve(listener, app)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("Shutdown signal received");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}
