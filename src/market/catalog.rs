//! Symbol search over a fixed list of widely traded Indian companies.

use crate::market::source::MarketData;
use crate::market::types::SearchResult;

/// Maximum hits returned by a search.
pub const MAX_RESULTS: usize = 10;

/// Shortest query that is searched at all.
pub const MIN_QUERY_LEN: usize = 2;

/// `(ticker, company, sector)`
const POPULAR_STOCKS: &[(&str, &str, &str)] = &[
    ("RELIANCE", "Reliance Industries Ltd", "Energy"),
    ("TCS", "Tata Consultancy Services", "IT"),
    ("HDFCBANK", "HDFC Bank Ltd", "Banking"),
    ("INFY", "Infosys Ltd", "IT"),
    ("ICICIBANK", "ICICI Bank Ltd", "Banking"),
    ("SBIN", "State Bank of India", "Banking"),
    ("BHARTIARTL", "Bharti Airtel Ltd", "Telecom"),
    ("ITC", "ITC Ltd", "FMCG"),
    ("KOTAKBANK", "Kotak Mahindra Bank", "Banking"),
    ("LT", "Larsen & Toubro", "Infrastructure"),
    ("HINDUNILVR", "Hindustan Unilever", "FMCG"),
    ("AXISBANK", "Axis Bank Ltd", "Banking"),
    ("BAJFINANCE", "Bajaj Finance Ltd", "Finance"),
    ("MARUTI", "Maruti Suzuki India", "Automobile"),
    ("TITAN", "Titan Company Ltd", "Consumer"),
    ("ASIANPAINT", "Asian Paints Ltd", "Chemicals"),
    ("WIPRO", "Wipro Ltd", "IT"),
    ("HCLTECH", "HCL Technologies", "IT"),
    ("SUNPHARMA", "Sun Pharmaceutical", "Pharma"),
    ("TATAMOTORS", "Tata Motors Ltd", "Automobile"),
    ("TATASTEEL", "Tata Steel Ltd", "Metal"),
    ("POWERGRID", "Power Grid Corp", "Power"),
    ("NTPC", "NTPC Ltd", "Power"),
    ("ONGC", "Oil & Natural Gas Corp", "Energy"),
    ("TECHM", "Tech Mahindra Ltd", "IT"),
    ("ULTRACEMCO", "UltraTech Cement", "Cement"),
    ("ADANIENT", "Adani Enterprises", "Diversified"),
    ("ADANIPORTS", "Adani Ports & SEZ", "Infrastructure"),
    ("JSWSTEEL", "JSW Steel Ltd", "Metal"),
    ("COALINDIA", "Coal India Ltd", "Mining"),
];

/// Listing venue; decides the ticker suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Exchange {
    Nse,
    Bse,
}

impl Exchange {
    /// `NSE` (any case) selects the National Stock Exchange; anything else BSE.
    pub fn from_param(value: &str) -> Self {
        if value.trim().eq_ignore_ascii_case("NSE") {
            Exchange::Nse
        } else {
            Exchange::Bse
        }
    }

    pub fn suffix(&self) -> &'static str {
        match self {
            Exchange::Nse => ".NS",
            Exchange::Bse => ".BO",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Exchange::Nse => "NSE",
            Exchange::Bse => "BSE",
        }
    }
}

/// Sector of a catalog company, by exchange symbol (`TCS.NS`) or bare ticker.
pub fn sector_of(symbol: &str) -> Option<&'static str> {
    let ticker = symbol.split('.').next().unwrap_or(symbol);
    POPULAR_STOCKS
        .iter()
        .find(|(t, _, _)| t.eq_ignore_ascii_case(ticker))
        .map(|(_, _, sector)| *sector)
}

/// Normalize a raw query: trimmed and upper-cased, `None` if too short.
pub fn normalize_query(raw: &str) -> Option<String> {
    let query = raw.trim().to_uppercase();
    if query.chars().count() < MIN_QUERY_LEN {
        None
    } else {
        Some(query)
    }
}

/// Catalog entries whose ticker or company name contains `query`.
pub fn search_catalog(query: &str, exchange: Exchange) -> Vec<SearchResult> {
    POPULAR_STOCKS
        .iter()
        .filter(|(ticker, name, _)| ticker.contains(query) || name.to_uppercase().contains(query))
        .take(MAX_RESULTS)
        .map(|(ticker, name, sector)| SearchResult {
            symbol: format!("{}{}", ticker, exchange.suffix()),
            name: name.to_string(),
            sector: sector.to_string(),
            exchange: exchange.name().to_string(),
        })
        .collect()
}

/// Search the catalog, falling back to probing the upstream for
/// `{query}{suffix}` when the catalog has no match.
pub async fn search(source: &dyn MarketData, query: &str, exchange: Exchange) -> Vec<SearchResult> {
    let results = search_catalog(query, exchange);
    if !results.is_empty() {
        return results;
    }

    let symbol = format!("{}{}", query, exchange.suffix());
    match source.quote(&symbol).await {
        Ok(quote) if quote.price > 0.0 => vec![SearchResult {
            symbol,
            name: quote.name,
            sector: quote.sector,
            exchange: exchange.name().to_string(),
        }],
        Ok(_) => Vec::new(),
        Err(e) => {
            tracing::debug!(symbol = %symbol, error = %e, "Search lookup found nothing");
            Vec::new()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sector_of() {
        assert_eq!(sector_of("TCS.NS"), Some("IT"));
        assert_eq!(sector_of("sbin.bo"), Some("Banking"));
        assert_eq!(sector_of("ITC"), Some("FMCG"));
        assert_eq!(sector_of("ZOMATO.NS"), None);
    }

    #[test]
    fn test_matches_ticker_and_name() {
        let hits = search_catalog("TATA", Exchange::Nse);
        let symbols: Vec<_> = hits.iter().map(|h| h.symbol.as_str()).collect();
        assert_eq!(symbols, vec!["TCS.NS", "TATAMOTORS.NS", "TATASTEEL.NS"]);

        let hits = search_catalog("BANK", Exchange::Bse);
        assert!(hits.iter().all(|h| h.symbol.ends_with(".BO") && h.exchange == "BSE"));
        assert!(hits.iter().any(|h| h.symbol == "SBIN.BO"));
    }

    #[test]
    fn test_result_cap() {
        // Every company name contains "L" or a ticker does; the cap still holds.
        assert!(search_catalog("L", Exchange::Nse).len() <= MAX_RESULTS);
    }

    #[test]
    fn test_normalize_query() {
        assert_eq!(normalize_query("  infy "), Some("INFY".to_string()));
        assert_eq!(normalize_query("a"), None);
        assert_eq!(normalize_query("   "), None);
    }

    #[test]
    fn test_exchange_param() {
        assert_eq!(Exchange::from_param("nse"), Exchange::Nse);
        assert_eq!(Exchange::from_param("BSE"), Exchange::Bse);
        assert_eq!(Exchange::from_param("LSE"), Exchange::Bse);
    }
}
