//! Shared utilities for integration testing.

#![allow(dead_code)]

use std::collections::{HashMap, HashSet};
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use tokio::net::TcpListener;

use market_gateway::config::GatewayConfig;
use market_gateway::http::{AppState, HttpServer};
use market_gateway::lifecycle::{self, Shutdown};
use market_gateway::market::{
    Candle, FetchError, HistoryRange, MarketData, NewsItem, Quote, RawQuote,
};
use market_gateway::predict::Predictor;

/// In-memory market data with switchable failures.
#[derive(Default)]
pub struct StubMarket {
    quotes: Mutex<HashMap<String, Quote>>,
    failing: Mutex<HashSet<String>>,
    news_delay: Mutex<Option<Duration>>,
    pub quote_calls: AtomicUsize,
}

impl StubMarket {
    pub fn with_prices(prices: &[(&str, f64)]) -> Arc<Self> {
        let market = Arc::new(Self::default());
        for (symbol, price) in prices {
            market.set_price(symbol, *price);
        }
        market
    }

    pub fn set_price(&self, symbol: &str, price: f64) {
        let quote = Quote::from_raw(
            symbol,
            RawQuote {
                name: Some(format!("{} Ltd", symbol.trim_end_matches(".NS"))),
                price: Some(price),
                previous_close: Some(price - 1.0),
                volume: Some(1_500_000),
                ..Default::default()
            },
        );
        self.quotes.lock().unwrap().insert(symbol.to_string(), quote);
    }

    pub fn fail(&self, symbol: &str) {
        self.failing.lock().unwrap().insert(symbol.to_string());
    }

    /// Make every news request take `delay`.
    pub fn slow_news(&self, delay: Duration) {
        *self.news_delay.lock().unwrap() = Some(delay);
    }

    pub fn recover(&self, symbol: &str) {
        self.failing.lock().unwrap().remove(symbol);
    }
}

#[async_trait]
impl MarketData for StubMarket {
    async fn quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        self.quote_calls.fetch_add(1, Ordering::SeqCst);
        if self.failing.lock().unwrap().contains(symbol) {
            return Err(FetchError::Status(500));
        }
        self.quotes
            .lock()
            .unwrap()
            .get(symbol)
            .cloned()
            .ok_or_else(|| FetchError::NotFound(symbol.to_string()))
    }

    async fn history(&self, symbol: &str, _range: &HistoryRange) -> Result<Vec<Candle>, FetchError> {
        if !self.quotes.lock().unwrap().contains_key(symbol) {
            return Err(FetchError::NotFound(symbol.to_string()));
        }
        Ok((1..=5)
            .map(|day| Candle {
                date: format!("2024-06-0{}", day),
                open: 100.0,
                high: 101.0,
                low: 99.0,
                close: 100.0 + day as f64,
                volume: 1_000,
            })
            .collect())
    }

    async fn news(&self) -> Result<Vec<NewsItem>, FetchError> {
        let delay = *self.news_delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        Ok(vec![NewsItem {
            title: Some("Markets close higher".to_string()),
            link: Some("https://example.com/markets".to_string()),
            publisher: Some("Wire".to_string()),
            time: "15:30".to_string(),
            provider_publish_time: 1_718_000_000,
        }])
    }
}

/// A gateway serving on an ephemeral port.
pub struct Gateway {
    pub addr: SocketAddr,
    pub state: AppState,
    pub shutdown: Shutdown,
}

impl Gateway {
    pub fn url(&self, path: &str) -> String {
        format!("http://{}{}", self.addr, path)
    }

    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub fn sdk(&self) -> market_sdk::MarketClient {
        market_sdk::MarketClient::with_client(client(), &self.base_url())
    }
}

impl Drop for Gateway {
    fn drop(&mut self) {
        self.shutdown.trigger();
    }
}

/// A configuration with nothing tracked and long refresh intervals, so
/// tests drive refreshes themselves unless they opt in.
pub fn test_config() -> GatewayConfig {
    let mut config = GatewayConfig::default();
    config.refresh.symbols = Vec::new();
    config.refresh.interval_secs = 3600;
    config.listener.bind_address = "127.0.0.1:0".to_string();
    config
}

/// Start the HTTP server only. No background tasks run.
pub async fn start_gateway(
    config: GatewayConfig,
    market: Arc<dyn MarketData>,
    predictor: Option<Arc<Predictor>>,
) -> Gateway {
    let state = lifecycle::state_with(market, predictor);
    serve(config, state, false).await
}

/// Start the HTTP server plus the refresher and sweeper.
pub async fn start_gateway_with_tasks(config: GatewayConfig, market: Arc<dyn MarketData>) -> Gateway {
    let state = lifecycle::state_with(market, None);
    serve(config, state, true).await
}

async fn serve(config: GatewayConfig, state: AppState, background: bool) -> Gateway {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    let shutdown = Shutdown::new();

    if background {
        lifecycle::spawn_background_tasks(&config, &state, &shutdown);
    }

    let server = HttpServer::new(config, state.clone());
    let server_shutdown = shutdown.subscribe();
    tokio::spawn(async move {
        let _ = server.run(listener, server_shutdown).await;
    });

    Gateway {
        addr,
        state,
        shutdown,
    }
}

pub fn client() -> reqwest::Client {
    reqwest::Client::builder()
        .no_proxy()
        .timeout(Duration::from_secs(10))
        .build()
        .unwrap()
}

/// Poll until `check` holds or the deadline passes.
pub async fn eventually<F: Fn() -> bool>(check: F, deadline: Duration) -> bool {
    let start = std::time::Instant::now();
    while start.elapsed() < deadline {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    check()
}
