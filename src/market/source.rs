//! The market data seam.

use std::sync::Arc;

use async_trait::async_trait;

use crate::cache::EntityFetcher;
use crate::market::types::{Candle, FetchError, HistoryRange, NewsItem, Quote};

/// Anything that can answer quote, history and news requests.
#[async_trait]
pub trait MarketData: Send + Sync + 'static {
    async fn quote(&self, symbol: &str) -> Result<Quote, FetchError>;

    async fn history(&self, symbol: &str, range: &HistoryRange) -> Result<Vec<Candle>, FetchError>;

    async fn news(&self) -> Result<Vec<NewsItem>, FetchError>;
}

/// Feeds quotes from a `MarketData` source into the refresh loop.
#[derive(Clone)]
pub struct QuoteFetcher {
    source: Arc<dyn MarketData>,
}

impl QuoteFetcher {
    pub fn new(source: Arc<dyn MarketData>) -> Self {
        Self { source }
    }
}

#[async_trait]
impl EntityFetcher for QuoteFetcher {
    type Entity = Quote;
    type Error = FetchError;

    async fn fetch(&self, key: &str) -> Result<Quote, FetchError> {
        self.source.quote(key).await
    }
}
