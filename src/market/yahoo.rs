//! Yahoo Finance client.
//!
//! Quotes and history come from the v8 chart endpoint, headlines from the
//! v1 search endpoint. Response shapes are deserialized leniently: every
//! field is optional and series values may be null.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use serde::Deserialize;
use url::Url;

use crate::config::UpstreamConfig;
use crate::market::catalog;
use crate::market::source::MarketData;
use crate::market::types::{Candle, FetchError, HistoryRange, NewsItem, Quote, RawQuote};

/// Range used for quotes; long enough for a meaningful average volume.
const QUOTE_RANGE: &str = "3mo";
const NEWS_COUNT: usize = 10;

#[derive(Debug, Deserialize)]
struct ChartEnvelope {
    chart: ChartBody,
}

#[derive(Debug, Deserialize)]
struct ChartBody {
    result: Option<Vec<ChartResult>>,
    error: Option<ChartError>,
}

#[derive(Debug, Deserialize)]
struct ChartError {
    code: Option<String>,
    description: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ChartMeta {
    short_name: Option<String>,
    long_name: Option<String>,
    regular_market_price: Option<f64>,
    previous_close: Option<f64>,
    chart_previous_close: Option<f64>,
    regular_market_day_high: Option<f64>,
    regular_market_day_low: Option<f64>,
    regular_market_volume: Option<f64>,
    fifty_two_week_high: Option<f64>,
    fifty_two_week_low: Option<f64>,
    market_cap: Option<f64>,
    #[serde(rename = "trailingPE")]
    trailing_pe: Option<f64>,
    gmtoffset: Option<i64>,
}

#[derive(Debug, Default, Deserialize)]
struct ChartResult {
    #[serde(default)]
    meta: ChartMeta,
    #[serde(default)]
    timestamp: Vec<i64>,
    #[serde(default)]
    indicators: Indicators,
}

#[derive(Debug, Default, Deserialize)]
struct Indicators {
    #[serde(default)]
    quote: Vec<QuoteSeries>,
}

#[derive(Debug, Default, Deserialize)]
struct QuoteSeries {
    #[serde(default)]
    open: Vec<Option<f64>>,
    #[serde(default)]
    high: Vec<Option<f64>>,
    #[serde(default)]
    low: Vec<Option<f64>>,
    #[serde(default)]
    close: Vec<Option<f64>>,
    #[serde(default)]
    volume: Vec<Option<f64>>,
}

#[derive(Debug, Deserialize)]
struct SearchEnvelope {
    #[serde(default)]
    news: Vec<RawNews>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawNews {
    title: Option<String>,
    link: Option<String>,
    publisher: Option<String>,
    provider_publish_time: Option<i64>,
}

fn at(series: &[Option<f64>], i: usize) -> Option<f64> {
    series.get(i).copied().flatten()
}

/// Complete bars only; a bar with any missing price is skipped.
fn candles(result: &ChartResult) -> Vec<Candle> {
    let Some(series) = result.indicators.quote.first() else {
        return Vec::new();
    };
    let offset = result.meta.gmtoffset.unwrap_or(0);

    result
        .timestamp
        .iter()
        .enumerate()
        .filter_map(|(i, ts)| {
            let date = DateTime::from_timestamp(ts + offset, 0)?
                .format("%Y-%m-%d")
                .to_string();
            Some(Candle {
                date,
                open: round(at(&series.open, i)?),
                high: round(at(&series.high, i)?),
                low: round(at(&series.low, i)?),
                close: round(at(&series.close, i)?),
                volume: at(&series.volume, i).unwrap_or(0.0) as u64,
            })
        })
        .collect()
}

fn round(value: f64) -> f64 {
    crate::market::format::round2(value)
}

fn quote_from_chart(symbol: &str, result: &ChartResult) -> Result<Quote, FetchError> {
    let meta = &result.meta;
    let price = meta
        .regular_market_price
        .ok_or_else(|| FetchError::NotFound(symbol.to_string()))?;

    // The latest bar is today's session; its close is often still null.
    let series = result.indicators.quote.first();
    let last = result.timestamp.len().checked_sub(1);
    let today = |values: &[Option<f64>]| last.and_then(|i| at(values, i));
    let prior_close = series
        .zip(last)
        .and_then(|(s, last)| (0..last).rev().find_map(|i| at(&s.close, i)));

    let bars = candles(result);
    let average_volume = if bars.is_empty() {
        None
    } else {
        Some(bars.iter().map(|c| c.volume).sum::<u64>() / bars.len() as u64)
    };

    Ok(Quote::from_raw(
        symbol,
        RawQuote {
            name: meta.short_name.clone().or_else(|| meta.long_name.clone()),
            sector: catalog::sector_of(symbol).map(str::to_string),
            price: Some(price),
            previous_close: meta
                .previous_close
                .or(prior_close)
                .or(meta.chart_previous_close),
            open: series.and_then(|s| today(&s.open)),
            high: meta
                .regular_market_day_high
                .or_else(|| series.and_then(|s| today(&s.high))),
            low: meta
                .regular_market_day_low
                .or_else(|| series.and_then(|s| today(&s.low))),
            volume: meta
                .regular_market_volume
                .or_else(|| series.and_then(|s| today(&s.volume)))
                .map(|v| v as u64),
            trailing_pe: meta.trailing_pe,
            market_cap: meta.market_cap.map(|v| v as u64),
            fifty_two_week_high: meta.fifty_two_week_high,
            fifty_two_week_low: meta.fifty_two_week_low,
            average_volume,
        },
    ))
}

fn news_item(raw: RawNews) -> NewsItem {
    let published = raw.provider_publish_time.unwrap_or(0);
    let time = DateTime::from_timestamp(published, 0)
        .filter(|_| published > 0)
        .map(|t| t.with_timezone(&Local).format("%H:%M").to_string())
        .unwrap_or_else(|| "Recent".to_string());

    NewsItem {
        title: raw.title,
        link: raw.link,
        publisher: raw.publisher,
        time,
        provider_publish_time: published,
    }
}

/// `MarketData` over the Yahoo Finance HTTP API.
pub struct YahooClient {
    http: reqwest::Client,
    base: Url,
    news_symbol: String,
}

impl YahooClient {
    pub fn new(config: &UpstreamConfig) -> Result<Self, FetchError> {
        let base = Url::parse(&config.base_url)
            .map_err(|e| FetchError::Invalid(format!("upstream base URL: {}", e)))?;
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.as_str())
            .build()?;

        Ok(Self {
            http,
            base,
            news_symbol: config.news_symbol.clone(),
        })
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base.clone();
        url.path_segments_mut()
            .map_err(|_| FetchError::Invalid(format!("base URL cannot hold a path: {}", self.base)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    async fn get_json<T: serde::de::DeserializeOwned>(&self, url: Url, symbol: &str) -> Result<T, FetchError> {
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(symbol.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }
        response
            .json::<T>()
            .await
            .map_err(|e| FetchError::Malformed(e.to_string()))
    }

    async fn chart(&self, symbol: &str, range: &str, interval: &str) -> Result<ChartResult, FetchError> {
        let mut url = self.endpoint(&["v8", "finance", "chart", symbol])?;
        url.query_pairs_mut()
            .append_pair("range", range)
            .append_pair("interval", interval);

        let envelope: ChartEnvelope = self.get_json(url, symbol).await?;
        if let Some(error) = envelope.chart.error {
            tracing::debug!(
                symbol = %symbol,
                code = ?error.code,
                description = ?error.description,
                "Chart endpoint reported an error"
            );
            return Err(FetchError::NotFound(symbol.to_string()));
        }
        envelope
            .chart
            .result
            .and_then(|results| results.into_iter().next())
            .ok_or_else(|| FetchError::NotFound(symbol.to_string()))
    }
}

#[async_trait]
impl MarketData for YahooClient {
    async fn quote(&self, symbol: &str) -> Result<Quote, FetchError> {
        let result = self.chart(symbol, QUOTE_RANGE, "1d").await?;
        quote_from_chart(symbol, &result)
    }

    async fn history(&self, symbol: &str, range: &HistoryRange) -> Result<Vec<Candle>, FetchError> {
        let result = self.chart(symbol, range.period(), range.interval()).await?;
        Ok(candles(&result))
    }

    async fn news(&self) -> Result<Vec<NewsItem>, FetchError> {
        let mut url = self.endpoint(&["v1", "finance", "search"])?;
        url.query_pairs_mut()
            .append_pair("q", &self.news_symbol)
            .append_pair("quotesCount", "0")
            .append_pair("newsCount", &NEWS_COUNT.to_string());

        let envelope: SearchEnvelope = self.get_json(url, &self.news_symbol).await?;
        Ok(envelope
            .news
            .into_iter()
            .take(NEWS_COUNT)
            .map(news_item)
            .collect())
    }
}
