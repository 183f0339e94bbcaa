//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Incoming request on a limited route:
//!     → rate_limit.rs (derive identity, check identity:endpoint bucket)
//!     → 429 with retry hint, or pass to the handler
//! Background:
//!     → rate_limit.rs sweeper evicts idle buckets
//! ```
//!
//! # Design Decisions
//! - Limits are composed per route, not baked into handlers
//! - Buckets are never shared between endpoints

pub mod rate_limit;

pub use rate_limit::{ClientKey, Decision, RoutePolicy, SlidingWindowLimiter};
