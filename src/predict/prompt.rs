//! Analyst prompt construction.

use std::fmt::Write;

use crate::market::Quote;
use crate::predict::indicators::HistorySummary;

fn history_block(summary: Option<&HistorySummary>) -> String {
    let Some(summary) = summary else {
        return "Limited historical data available".to_string();
    };

    let prices = summary
        .recent
        .iter()
        .map(|p| format!("{:.2}", p))
        .collect::<Vec<_>>()
        .join(", ");
    format!(
        "Recent {}-day prices: [{}]\nAverage: ₹{:.2}\nTrend: {}\nVolatility: ₹{:.2}",
        summary.recent.len(),
        prices,
        summary.average,
        summary.trend,
        summary.volatility
    )
}

/// Prompt asking for a seven-day outlook in a fixed line format.
pub fn build_prompt(quote: &Quote, summary: Option<&HistorySummary>) -> String {
    let mut prompt = String::with_capacity(1024);
    prompt.push_str(
        "You are a professional stock market analyst. Analyze this Indian stock and provide a prediction.\n\n",
    );

    // Writing into a String cannot fail.
    let _ = write!(
        prompt,
        "Stock: {name} ({symbol})\n\
         Sector: {sector}\n\
         Current Price: ₹{price}\n\
         Today's Change: {change}%\n\
         Open: ₹{open}\n\
         High: ₹{high}\n\
         Low: ₹{low}\n\
         P/E Ratio: {pe}\n\
         Market Cap: {cap}\n\
         Volume: {volume}\n\n\
         Historical Data (1 month):\n{history}\n\n",
        name = quote.name,
        symbol = quote.symbol,
        sector = quote.sector,
        price = quote.price,
        change = quote.change,
        open = quote.open,
        high = quote.high,
        low = quote.low,
        pe = quote.pe,
        cap = quote.market_cap,
        volume = quote.volume,
        history = history_block(summary),
    );

    prompt.push_str(
        "Based on this data, provide a SHORT analysis with:\n\
         1. TARGET PRICE (7-day): Give a specific price number\n\
         2. CONFIDENCE: A percentage (50-95%)\n\
         3. RECOMMENDATION: One of: STRONG BUY, BUY, HOLD, SELL, STRONG SELL\n\
         4. BRIEF REASONING: 2-3 sentences max\n\n\
         Format your response EXACTLY like this (with actual values):\n\
         TARGET_PRICE: ₹XXXX.XX\n\
         CONFIDENCE: XX%\n\
         RECOMMENDATION: XXXXX\n\
         REASONING: Your brief analysis here.\n\n\
         Important: Be realistic and base predictions on the data provided. \
         Do not give financial advice disclaimers.",
    );
    prompt
}
