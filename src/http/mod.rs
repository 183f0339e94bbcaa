//! HTTP API subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (CORS, request ID, trace, timeout)
//!     → per-route rate limit (security::rate_limit)
//!     → stocks.rs / predict.rs handlers
//!     → response.rs (ApiError → JSON error body)
//! ```

pub mod predict;
pub mod response;
pub mod server;
pub mod stocks;

pub use response::ApiError;
pub use server::{AppState, HttpServer};
