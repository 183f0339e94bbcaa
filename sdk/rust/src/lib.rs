//! Typed client for the market gateway API.

mod client;
mod types;

pub use client::{MarketClient, SdkError};
pub use types::{
    Candle, HealthResponse, HistoryResponse, NewsItem, NewsResponse, Prediction, Quote,
    SearchResponse, SearchResult, StocksResponse,
};
