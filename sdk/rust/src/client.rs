use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use thiserror::Error;

use crate::types::{
    HealthResponse, HistoryResponse, NewsResponse, Prediction, Quote, SearchResponse,
    StocksResponse,
};

#[derive(Debug, Error)]
pub enum SdkError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited, retry after {retry_after}s")]
    RateLimited { retry_after: u64 },

    #[error("gateway returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl SdkError {
    pub fn status(&self) -> Option<u16> {
        match self {
            SdkError::Http(e) => e.status().map(|s| s.as_u16()),
            SdkError::RateLimited { .. } => Some(429),
            SdkError::Api { status, .. } => Some(*status),
        }
    }
}

pub struct MarketClient {
    client: Client,
    base_url: String,
    forwarded_for: Option<String>,
}

impl MarketClient {
    pub fn new(base_url: &str) -> Self {
        Self::with_client(Client::new(), base_url)
    }

    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
            forwarded_for: None,
        }
    }

    /// Send every request as if from `ip`, via `X-Forwarded-For`.
    pub fn forwarded_for(mut self, ip: &str) -> Self {
        self.forwarded_for = Some(ip.to_string());
        self
    }

    fn get(&self, path: &str) -> RequestBuilder {
        self.decorate(self.client.get(format!("{}{}", self.base_url, path)))
    }

    fn decorate(&self, builder: RequestBuilder) -> RequestBuilder {
        match &self.forwarded_for {
            Some(ip) => builder.header("x-forwarded-for", ip),
            None => builder,
        }
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, SdkError> {
        let resp = request.send().await?;
        let status = resp.status();

        if status == StatusCode::TOO_MANY_REQUESTS {
            let retry_after = resp
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(0);
            return Err(SdkError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            let message = serde_json::from_str::<serde_json::Value>(&text)
                .ok()
                .and_then(|v| v.get("error").and_then(|e| e.as_str()).map(String::from))
                .unwrap_or(text);
            return Err(SdkError::Api {
                status: status.as_u16(),
                message,
            });
        }

        Ok(resp.json().await?)
    }

    /// All cached quotes.
    pub async fn stocks(&self) -> Result<StocksResponse, SdkError> {
        self.send(self.get("/api/stocks")).await
    }

    pub async fn stock(&self, symbol: &str) -> Result<Quote, SdkError> {
        self.send(self.get(&format!("/api/stocks/{}", symbol))).await
    }

    pub async fn history(
        &self,
        symbol: &str,
        period: Option<&str>,
        interval: Option<&str>,
    ) -> Result<HistoryResponse, SdkError> {
        let mut query = Vec::new();
        if let Some(period) = period {
            query.push(("period", period));
        }
        if let Some(interval) = interval {
            query.push(("interval", interval));
        }
        let request = self
            .get(&format!("/api/stocks/{}/history", symbol))
            .query(&query);
        self.send(request).await
    }

    pub async fn health(&self) -> Result<HealthResponse, SdkError> {
        self.send(self.get("/api/health")).await
    }

    pub async fn search(&self, query: &str, exchange: Option<&str>) -> Result<SearchResponse, SdkError> {
        let mut params = vec![("q", query)];
        if let Some(exchange) = exchange {
            params.push(("exchange", exchange));
        }
        self.send(self.get("/api/search").query(&params)).await
    }

    pub async fn news(&self) -> Result<NewsResponse, SdkError> {
        self.send(self.get("/api/news")).await
    }

    pub async fn predict(&self, symbol: &str) -> Result<Prediction, SdkError> {
        let request = self.decorate(
            self.client
                .post(format!("{}/api/predict", self.base_url))
                .json(&serde_json::json!({ "symbol": symbol })),
        );
        self.send(request).await
    }
}
