//! Market data gateway.
//!
//! Serves cached Indian equity quotes, history, news, symbol search and
//! AI price predictions over a JSON API.
//!
//! # Architecture Overview
//!
//! ```text
//!     Client ──▶ http::server ──▶ security::rate_limit ──▶ handlers
//!                                                           │   │
//!                          ┌────────────────────────────────┘   │
//!                          ▼                                    ▼
//!                cache::RefreshingCache ◀── cache::Refresher   predict::Predictor
//!                                                 │                 │
//!                                                 ▼                 ▼
//!                                         market::MarketData   predict::TextModel
//!                                          (YahooClient)        (GeminiClient)
//! ```
//!
//! Cross-cutting: `config` (TOML + env), `observability` (tracing,
//! Prometheus metrics), `lifecycle` (startup, signals, shutdown).

// Core subsystems
pub mod cache;
pub mod config;
pub mod http;
pub mod market;
pub mod predict;

// Cross-cutting concerns
pub mod lifecycle;
pub mod observability;
pub mod security;

pub use config::GatewayConfig;
pub use http::HttpServer;
pub use lifecycle::Shutdown;
