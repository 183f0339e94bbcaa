use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
    pub change: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub previous_close: f64,
    pub volume: String,
    pub pe: String,
    pub market_cap: String,
    pub fifty_two_week_high: f64,
    pub fifty_two_week_low: f64,
    pub avg_volume: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StocksResponse {
    pub stocks: Vec<Quote>,
    /// RFC 3339; `None` until the first refresh completes.
    pub last_update: Option<String>,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryResponse {
    pub symbol: String,
    pub period: String,
    pub interval: String,
    pub data: Vec<Candle>,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HealthResponse {
    pub status: String,
    pub last_update: Option<String>,
    pub stocks_in_cache: usize,
    pub server_time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub exchange: String,
}

/// A short query yields only `results` (empty) and `error`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SearchResponse {
    pub query: Option<String>,
    pub exchange: Option<String>,
    pub results: Vec<SearchResult>,
    pub count: Option<usize>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub publisher: Option<String>,
    pub time: String,
    pub provider_publish_time: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewsResponse {
    pub news: Vec<NewsItem>,
    pub count: usize,
    pub timestamp: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub symbol: String,
    pub current_price: f64,
    pub target_price: f64,
    pub confidence: u32,
    pub recommendation: String,
    pub reasoning: String,
    pub raw_response: String,
    pub success: bool,
    pub model: String,
    pub timestamp: String,
}
