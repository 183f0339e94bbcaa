//! Configuration schema definitions.
//!
//! This module defines the complete configuration structure for the gateway.
//! All types derive Serde traits for deserialization from config files.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Root configuration for the market gateway.
#[derive(Debug, Clone, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct GatewayConfig {
    /// Listener configuration (bind address).
    pub listener: ListenerConfig,

    /// Background cache refresh settings.
    pub refresh: RefreshConfig,

    /// Per-route rate limiting.
    pub rate_limit: RateLimitConfig,

    /// Upstream market data provider.
    pub upstream: UpstreamConfig,

    /// AI prediction model settings.
    pub predictor: PredictorConfig,

    /// Timeout configuration.
    pub timeouts: TimeoutConfig,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

/// Listener configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ListenerConfig {
    /// Bind address (e.g., "0.0.0.0:5000").
    pub bind_address: String,
}

impl Default for ListenerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:5000".to_string(),
        }
    }
}

/// What happens to a symbol whose fetch failed during a refresh cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum StalePolicy {
    /// Carry the previous value forward while it is younger than `max_stale_secs`.
    Retain,
    /// Leave the symbol out of the new snapshot.
    Drop,
}

/// Background refresh configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RefreshConfig {
    /// Seconds to sleep between refresh cycles.
    pub interval_secs: u64,

    /// Upper bound on a single symbol fetch in seconds.
    pub fetch_timeout_secs: u64,

    /// Symbols kept warm in the cache.
    pub symbols: Vec<String>,

    /// Handling of symbols that fail to refresh.
    pub stale_policy: StalePolicy,

    /// Maximum age of a retained value in seconds.
    pub max_stale_secs: u64,
}

impl RefreshConfig {
    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    /// Maximum age of a carried-forward value, or `None` when failed
    /// symbols are dropped.
    pub fn retention(&self) -> Option<Duration> {
        match self.stale_policy {
            StalePolicy::Retain => Some(Duration::from_secs(self.max_stale_secs)),
            StalePolicy::Drop => None,
        }
    }
}

impl Default for RefreshConfig {
    fn default() -> Self {
        Self {
            interval_secs: 30,
            fetch_timeout_secs: 10,
            symbols: [
                "RELIANCE.NS",
                "TCS.NS",
                "HDFCBANK.NS",
                "INFY.NS",
                "ICICIBANK.NS",
                "SBIN.NS",
                "BHARTIARTL.NS",
                "ITC.NS",
            ]
            .iter()
            .map(|s| s.to_string())
            .collect(),
            stale_policy: StalePolicy::Retain,
            max_stale_secs: 300,
        }
    }
}

/// Limit for a single rate-limited route.
#[derive(Debug, Clone, Copy, Deserialize, Serialize)]
pub struct RouteLimit {
    /// Requests admitted per window.
    pub limit: usize,

    /// Trailing window length in seconds.
    pub window_secs: u64,
}

impl RouteLimit {
    pub const fn new(limit: usize, window_secs: u64) -> Self {
        Self { limit, window_secs }
    }

    pub fn window(&self) -> Duration {
        Duration::from_secs(self.window_secs)
    }
}

/// Rate limiting configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RateLimitConfig {
    /// Enable rate limiting.
    pub enabled: bool,

    /// How often idle client keys are evicted, in seconds.
    pub sweep_interval_secs: u64,

    /// Key clients by the first `X-Forwarded-For` hop. Enable only behind
    /// a proxy that overwrites the header; otherwise clients can pick
    /// their own identity.
    pub trust_forwarded_for: bool,

    /// `GET /api/stocks`
    pub stocks: RouteLimit,

    /// `GET /api/stocks/{symbol}`
    pub stock: RouteLimit,

    /// `GET /api/search`
    pub search: RouteLimit,

    /// `POST /api/predict`
    pub predict: RouteLimit,

    /// `GET /api/news`
    pub news: RouteLimit,
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            sweep_interval_secs: 60,
            trust_forwarded_for: false,
            stocks: RouteLimit::new(60, 60),
            stock: RouteLimit::new(60, 60),
            search: RouteLimit::new(30, 60),
            predict: RouteLimit::new(10, 60),
            news: RouteLimit::new(20, 60),
        }
    }
}

/// Upstream market data configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct UpstreamConfig {
    /// Base URL of the quote provider.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,

    /// User agent sent upstream.
    pub user_agent: String,

    /// Index whose headlines back `/api/news`.
    pub news_symbol: String,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            base_url: "https://query1.finance.yahoo.com".to_string(),
            timeout_secs: 10,
            user_agent: concat!("market-gateway/", env!("CARGO_PKG_VERSION")).to_string(),
            news_symbol: "^NSEI".to_string(),
        }
    }
}

/// AI prediction configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PredictorConfig {
    /// Enable the prediction endpoint.
    pub enabled: bool,

    /// API key. Falls back to `GEMINI_API_KEY` when empty.
    pub api_key: String,

    /// Model identifier.
    pub model: String,

    /// Base URL of the generative language API.
    pub base_url: String,

    /// Per-request timeout in seconds.
    pub timeout_secs: u64,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            api_key: String::new(),
            model: "gemini-1.5-flash".to_string(),
            base_url: "https://generativelanguage.googleapis.com".to_string(),
            timeout_secs: 30,
        }
    }
}

/// Timeout configuration for inbound requests.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeoutConfig {
    /// Request timeout (total time for request/response) in seconds.
    pub request_secs: u64,
}

impl Default for TimeoutConfig {
    fn default() -> Self {
        Self { request_secs: 60 }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit JSON log lines instead of the human-readable format.
    pub json_logs: bool,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config: GatewayConfig = toml::from_str(
            r#"
            [refresh]
            interval_secs = 5
            stale_policy = "drop"

            [rate_limit.predict]
            limit = 2
            window_secs = 30
            "#,
        )
        .unwrap();

        assert_eq!(config.refresh.interval_secs, 5);
        assert_eq!(config.refresh.retention(), None);
        assert_eq!(config.refresh.symbols.len(), 8);
        assert_eq!(config.rate_limit.predict.limit, 2);
        assert_eq!(config.rate_limit.stocks.limit, 60);
        assert!(!config.rate_limit.trust_forwarded_for);
        assert_eq!(config.listener.bind_address, "0.0.0.0:5000");
    }

    #[test]
    fn test_default_retention() {
        let refresh = RefreshConfig::default();
        assert_eq!(refresh.retention(), Some(Duration::from_secs(300)));
        assert_eq!(refresh.interval(), Duration::from_secs(30));
    }
}
