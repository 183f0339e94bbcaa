//! Market data types served by the gateway.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::market::format::{format_market_cap, format_volume, round1, round2};

/// Errors from the upstream market data provider.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("no data for {0}")]
    NotFound(String),

    #[error("malformed upstream response: {0}")]
    Malformed(String),

    #[error("invalid request: {0}")]
    Invalid(String),
}

/// A formatted quote for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Quote {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub price: f64,
    /// Percent change against the previous close.
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

/// Unformatted quote fields as reported upstream. Missing numbers
/// default to zero, matching how the quote page renders them.
#[derive(Debug, Clone, Default)]
pub struct RawQuote {
    pub name: Option<String>,
    pub sector: Option<String>,
    pub price: Option<f64>,
    pub previous_close: Option<f64>,
    pub open: Option<f64>,
    pub high: Option<f64>,
    pub low: Option<f64>,
    pub volume: Option<u64>,
    pub trailing_pe: Option<f64>,
    pub market_cap: Option<u64>,
    pub fifty_two_week_high: Option<f64>,
    pub fifty_two_week_low: Option<f64>,
    pub average_volume: Option<u64>,
}

impl Quote {
    pub fn from_raw(symbol: &str, raw: RawQuote) -> Self {
        let price = raw.price.unwrap_or(0.0);
        let previous_close = raw.previous_close.unwrap_or(0.0);
        let change = if previous_close > 0.0 {
            (price - previous_close) / previous_close * 100.0
        } else {
            0.0
        };

        Self {
            symbol: symbol.to_string(),
            name: raw.name.unwrap_or_else(|| symbol.to_string()),
            sector: raw.sector.unwrap_or_else(|| "N/A".to_string()),
            price: round2(price),
            change: round2(change),
            open: round2(raw.open.unwrap_or(0.0)),
            high: round2(raw.high.unwrap_or(0.0)),
            low: round2(raw.low.unwrap_or(0.0)),
            previous_close: round2(previous_close),
            volume: format_volume(raw.volume.unwrap_or(0)),
            pe: raw
                .trailing_pe
                .filter(|pe| *pe != 0.0)
                .map(|pe| format!("{}", round1(pe)))
                .unwrap_or_else(|| "N/A".to_string()),
            market_cap: raw
                .market_cap
                .map(format_market_cap)
                .unwrap_or_else(|| "N/A".to_string()),
            fifty_two_week_high: round2(raw.fifty_two_week_high.unwrap_or(0.0)),
            fifty_two_week_low: round2(raw.fifty_two_week_low.unwrap_or(0.0)),
            avg_volume: format_volume(raw.average_volume.unwrap_or(0)),
        }
    }
}

/// One OHLCV bar.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    /// `YYYY-MM-DD` in the exchange's local time.
    pub date: String,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
}

const PERIODS: &[&str] = &[
    "1d", "5d", "1mo", "3mo", "6mo", "1y", "2y", "5y", "10y", "ytd", "max",
];
const INTERVALS: &[&str] = &[
    "1m", "2m", "5m", "15m", "30m", "60m", "90m", "1h", "1d", "5d", "1wk", "1mo", "3mo",
];

/// Validated history request parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryRange {
    period: String,
    interval: String,
}

impl HistoryRange {
    pub fn new(period: &str, interval: &str) -> Result<Self, FetchError> {
        if !PERIODS.contains(&period) {
            return Err(FetchError::Invalid(format!("unsupported period '{}'", period)));
        }
        if !INTERVALS.contains(&interval) {
            return Err(FetchError::Invalid(format!("unsupported interval '{}'", interval)));
        }
        Ok(Self {
            period: period.to_string(),
            interval: interval.to_string(),
        })
    }

    pub fn period(&self) -> &str {
        &self.period
    }

    pub fn interval(&self) -> &str {
        &self.interval
    }
}

impl Default for HistoryRange {
    fn default() -> Self {
        Self {
            period: "1mo".to_string(),
            interval: "1d".to_string(),
        }
    }
}

/// A market headline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsItem {
    pub title: Option<String>,
    pub link: Option<String>,
    pub publisher: Option<String>,
    /// `HH:MM` local time, or `Recent` when unknown.
    pub time: String,
    pub provider_publish_time: i64,
}

/// One symbol search hit.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResult {
    pub symbol: String,
    pub name: String,
    pub sector: String,
    pub exchange: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quote_derivations() {
        let quote = Quote::from_raw(
            "TCS.NS",
            RawQuote {
                name: Some("Tata Consultancy".to_string()),
                price: Some(4120.204),
                previous_close: Some(4190.0),
                volume: Some(2_100_000),
                trailing_pe: Some(32.14),
                ..Default::default()
            },
        );

        assert_eq!(quote.price, 4120.2);
        assert_eq!(quote.change, -1.67);
        assert_eq!(quote.volume, "2.10M");
        assert_eq!(quote.pe, "32.1");
        assert_eq!(quote.market_cap, "N/A");
        assert_eq!(quote.sector, "N/A");
        assert_eq!(quote.avg_volume, "0");
    }

    #[test]
    fn test_quote_without_previous_close() {
        let quote = Quote::from_raw("X.NS", RawQuote { price: Some(10.0), ..Default::default() });
        assert_eq!(quote.change, 0.0);
        assert_eq!(quote.name, "X.NS");
        assert_eq!(quote.pe, "N/A");
    }

    #[test]
    fn test_quote_serializes_camel_case() {
        let quote = Quote::from_raw("X.NS", RawQuote::default());
        let json = serde_json::to_value(&quote).unwrap();
        assert!(json.get("previousClose").is_some());
        assert!(json.get("fiftyTwoWeekHigh").is_some());
        assert!(json.get("marketCap").is_some());
    }

    #[test]
    fn test_history_range_validation() {
        assert!(HistoryRange::new("1mo", "1d").is_ok());
        assert!(HistoryRange::new("1mo", "1d").unwrap() == HistoryRange::default());
        assert!(matches!(HistoryRange::new("2w", "1d"), Err(FetchError::Invalid(_))));
        assert!(matches!(HistoryRange::new("1y", "7m"), Err(FetchError::Invalid(_))));
    }
}
