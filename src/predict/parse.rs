//! Interpretation of the model's line-formatted answer.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::market::Quote;

const DEFAULT_CONFIDENCE: u32 = 70;
const DEFAULT_RECOMMENDATION: &str = "HOLD";
const DEFAULT_REASONING: &str = "Analysis based on current market conditions.";
const REASONING_FALLBACK_CHARS: usize = 200;

/// A seven-day outlook for one symbol.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
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
    pub timestamp: DateTime<Utc>,
}

/// Fields found in the answer; anything absent or unparsable stays `None`.
#[derive(Debug, Default, PartialEq)]
pub struct ParsedFields {
    pub target_price: Option<f64>,
    pub confidence: Option<u32>,
    pub recommendation: Option<String>,
    pub reasoning: Option<String>,
}

fn parse_price(value: &str) -> Option<f64> {
    value
        .replace(['₹', ','], "")
        .trim()
        .parse::<f64>()
        .ok()
        .filter(|p| p.is_finite())
}

fn parse_confidence(value: &str) -> Option<u32> {
    let number = value.replace('%', "").trim().parse::<f64>().ok()?;
    if !number.is_finite() {
        return None;
    }
    Some(number.clamp(0.0, 100.0) as u32)
}

pub fn parse_fields(raw: &str) -> ParsedFields {
    let mut fields = ParsedFields::default();
    for line in raw.lines().map(str::trim) {
        if let Some(rest) = line.strip_prefix("TARGET_PRICE:") {
            fields.target_price = parse_price(rest);
        } else if let Some(rest) = line.strip_prefix("CONFIDENCE:") {
            fields.confidence = parse_confidence(rest);
        } else if let Some(rest) = line.strip_prefix("RECOMMENDATION:") {
            fields.recommendation = Some(rest.trim().to_string());
        } else if let Some(rest) = line.strip_prefix("REASONING:") {
            fields.reasoning = Some(rest.trim().to_string());
        }
    }
    fields
}

/// Build a complete prediction, filling gaps with conservative defaults.
pub fn interpret(raw: &str, quote: &Quote, model: &str) -> Prediction {
    let fields = parse_fields(raw);

    let target_price = fields.target_price.unwrap_or_else(|| {
        let drift = if quote.change > 0.0 { 0.05 } else { -0.02 };
        quote.price * (1.0 + drift)
    });
    let reasoning = fields.reasoning.unwrap_or_else(|| {
        if raw.is_empty() {
            DEFAULT_REASONING.to_string()
        } else {
            raw.chars().take(REASONING_FALLBACK_CHARS).collect()
        }
    });

    Prediction {
        symbol: quote.symbol.clone(),
        current_price: quote.price,
        target_price,
        confidence: fields.confidence.unwrap_or(DEFAULT_CONFIDENCE),
        recommendation: fields
            .recommendation
            .filter(|r| !r.is_empty())
            .unwrap_or_else(|| DEFAULT_RECOMMENDATION.to_string()),
        reasoning,
        raw_response: raw.to_string(),
        success: true,
        model: model.to_string(),
        timestamp: Utc::now(),
    }
}
