//! Simple technical context derived from recent closes.

use std::fmt;

use crate::market::format::round2;
use crate::market::Candle;

/// Closes considered for the summary.
const LOOKBACK: usize = 10;
/// Fewer candles than this yields no summary.
const MIN_CANDLES: usize = 5;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trend {
    Upward,
    Downward,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Upward => f.write_str("upward"),
            Trend::Downward => f.write_str("downward"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistorySummary {
    /// Up to the last ten closes, oldest first.
    pub recent: Vec<f64>,
    pub average: f64,
    pub trend: Trend,
    /// Highest minus lowest recent close.
    pub volatility: f64,
}

pub fn summarize(candles: &[Candle]) -> Option<HistorySummary> {
    if candles.len() < MIN_CANDLES {
        return None;
    }

    let recent: Vec<f64> = candles[candles.len().saturating_sub(LOOKBACK)..]
        .iter()
        .map(|c| c.close)
        .collect();
    let first = *recent.first()?;
    let last = *recent.last()?;
    let average = recent.iter().sum::<f64>() / recent.len() as f64;
    let max = recent.iter().copied().fold(f64::MIN, f64::max);
    let min = recent.iter().copied().fold(f64::MAX, f64::min);

    Some(HistorySummary {
        recent: recent.iter().copied().map(round2).collect(),
        average,
        trend: if last > first { Trend::Upward } else { Trend::Downward },
        volatility: max - min,
    })
}
