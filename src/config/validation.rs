//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (limits > 0, windows > 0, intervals > 0)
//! - Validate addresses and upstream URLs
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;
use thiserror::Error;

use crate::config::schema::{GatewayConfig, RouteLimit};

/// A single semantic problem found in a configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must be greater than zero")]
    Zero { field: String },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: String, value: String },

    #[error("{field} is not a valid URL: {value}")]
    InvalidUrl { field: String, value: String },

    #[error("refresh.symbols contains an empty symbol")]
    EmptySymbol,

    #[error("refresh.symbols lists {0} more than once")]
    DuplicateSymbol(String),
}

fn zero(field: &str) -> ValidationError {
    ValidationError::Zero {
        field: field.to_string(),
    }
}

fn check_route(name: &str, route: &RouteLimit, errors: &mut Vec<ValidationError>) {
    if route.limit == 0 {
        errors.push(zero(&format!("rate_limit.{}.limit", name)));
    }
    if route.window_secs == 0 {
        errors.push(zero(&format!("rate_limit.{}.window_secs", name)));
    }
}

/// Validate a deserialized configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.listener.bind_address.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field: "listener.bind_address".to_string(),
            value: config.listener.bind_address.clone(),
        });
    }

    let refresh = &config.refresh;
    if refresh.interval_secs == 0 {
        errors.push(zero("refresh.interval_secs"));
    }
    if refresh.fetch_timeout_secs == 0 {
        errors.push(zero("refresh.fetch_timeout_secs"));
    }
    let mut seen = std::collections::HashSet::new();
    for symbol in &refresh.symbols {
        if symbol.trim().is_empty() {
            errors.push(ValidationError::EmptySymbol);
        } else if !seen.insert(symbol.as_str()) {
            errors.push(ValidationError::DuplicateSymbol(symbol.clone()));
        }
    }

    let limits = &config.rate_limit;
    if limits.enabled {
        if limits.sweep_interval_secs == 0 {
            errors.push(zero("rate_limit.sweep_interval_secs"));
        }
        check_route("stocks", &limits.stocks, &mut errors);
        check_route("stock", &limits.stock, &mut errors);
        check_route("search", &limits.search, &mut errors);
        check_route("predict", &limits.predict, &mut errors);
        check_route("news", &limits.news, &mut errors);
    }

    if url::Url::parse(&config.upstream.base_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "upstream.base_url".to_string(),
            value: config.upstream.base_url.clone(),
        });
    }
    if config.upstream.timeout_secs == 0 {
        errors.push(zero("upstream.timeout_secs"));
    }

    if config.predictor.enabled && url::Url::parse(&config.predictor.base_url).is_err() {
        errors.push(ValidationError::InvalidUrl {
            field: "predictor.base_url".to_string(),
            value: config.predictor.base_url.clone(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(zero("timeouts.request_secs"));
    }

    if config.observability.metrics_enabled
        && config
            .observability
            .metrics_address
            .parse::<SocketAddr>()
            .is_err()
    {
        errors.push(ValidationError::InvalidAddress {
            field: "observability.metrics_address".to_string(),
            value: config.observability.metrics_address.clone(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_every_error() {
        let mut config = GatewayConfig::default();
        config.rate_limit.predict.limit = 0;
        config.rate_limit.news.window_secs = 0;
        config.refresh.interval_secs = 0;
        config.refresh.symbols.push("TCS.NS".to_string());
        config.listener.bind_address = "not-an-address".to_string();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::DuplicateSymbol("TCS.NS".to_string())));
        assert!(errors.contains(&zero("rate_limit.predict.limit")));
        assert!(errors.contains(&zero("rate_limit.news.window_secs")));
    }

    #[test]
    fn test_disabled_rate_limit_skips_route_checks() {
        let mut config = GatewayConfig::default();
        config.rate_limit.enabled = false;
        config.rate_limit.stocks.limit = 0;
        assert!(validate_config(&config).is_ok());
    }
}
