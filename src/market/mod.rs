//! Market data domain.
//!
//! # Data Flow
//! ```text
//! YahooClient (yahoo.rs) implements MarketData (source.rs)
//!     → QuoteFetcher feeds the cache refresher
//!     → handlers call quote/history/news directly on a cache miss
//! catalog.rs answers symbol searches
//! format.rs renders volumes and market caps
//! ```

pub mod catalog;
pub mod format;
pub mod source;
pub mod types;
pub mod yahoo;

pub use catalog::Exchange;
pub use source::{MarketData, QuoteFetcher};
pub use types::{Candle, FetchError, HistoryRange, NewsItem, Quote, RawQuote, SearchResult};
pub use yahoo::YahooClient;
