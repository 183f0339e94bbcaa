//! AI price predictions.
//!
//! # Data Flow
//! ```text
//! POST /api/predict {symbol}
//!     → fresh quote from MarketData (never the cache)
//!     → one month of daily candles → indicators::summarize
//!     → prompt::build_prompt → TextModel::generate
//!     → parse::interpret (defaults fill anything the model omitted)
//! ```
//!
//! # Design Decisions
//! - The model sits behind `TextModel` so handlers and tests never talk to Gemini directly
//! - Missing history degrades the prompt instead of failing the request

pub mod gemini;
pub mod indicators;
pub mod parse;
pub mod prompt;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tracing::{debug, warn};

use crate::market::{FetchError, HistoryRange, MarketData};

pub use gemini::GeminiClient;
pub use parse::Prediction;

#[derive(Debug, Error)]
pub enum PredictError {
    #[error("model request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("model returned status {status}: {detail}")]
    Status { status: u16, detail: String },

    #[error("model returned no text")]
    EmptyResponse,

    #[error("market data unavailable: {0}")]
    Market(#[from] FetchError),

    #[error("predictor misconfigured: {0}")]
    Config(String),
}

/// A text-completion backend.
#[async_trait]
pub trait TextModel: Send + Sync + 'static {
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &str) -> Result<String, PredictError>;
}

pub struct Predictor {
    model: Arc<dyn TextModel>,
    market: Arc<dyn MarketData>,
}

impl Predictor {
    pub fn new(model: Arc<dyn TextModel>, market: Arc<dyn MarketData>) -> Self {
        Self { model, market }
    }

    pub fn model_name(&self) -> &str {
        self.model.name()
    }

    pub async fn predict(&self, symbol: &str) -> Result<Prediction, PredictError> {
        let quote = self.market.quote(symbol).await?;

        let summary = match self.market.history(symbol, &HistoryRange::default()).await {
            Ok(candles) => indicators::summarize(&candles),
            Err(e) => {
                warn!(symbol, error = %e, "History unavailable for prediction");
                None
            }
        };

        let prompt = prompt::build_prompt(&quote, summary.as_ref());
        let raw = self.model.generate(&prompt).await?;
        debug!(symbol, chars = raw.len(), "Model answered");

        Ok(parse::interpret(&raw, &quote, self.model.name()))
    }
}
