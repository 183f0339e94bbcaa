//! Background-refreshed snapshot cache.
//!
//! # Data Flow
//! ```text
//! Refresh loop (refresher.rs), one task:
//!     Timer
//!     → fetch every tracked key concurrently (per-key timeout)
//!     → build Snapshot (snapshot.rs)
//!     → publish into RefreshingCache (store.rs), one pointer swap
//!
//! Request handlers, many tasks:
//!     → RefreshingCache::get / get_all (lock-free load of current snapshot)
//! ```
//!
//! # Design Decisions
//! - Snapshots are immutable; a publish replaces the whole map
//! - Readers never wait on fetches
//! - A failed key is never retried mid-cycle; the next cycle retries it

pub mod refresher;
pub mod snapshot;
pub mod store;

pub use refresher::{EntityFetcher, RefreshReport, Refresher};
pub use snapshot::{Entry, Snapshot};
pub use store::RefreshingCache;
