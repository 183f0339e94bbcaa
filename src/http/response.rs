//! JSON error responses.
//!
//! # Design Decisions
//! - Every error body is `{"error": ...}`; prediction failures add
//!   `"success": false` so the front end can branch on one field
//! - Upstream detail is logged, not echoed, except for prediction failures

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

use crate::market::FetchError;
use crate::predict::PredictError;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Upstream(String),

    #[error("{0}")]
    Unavailable(String),

    #[error("{0}")]
    Prediction(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Unavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Prediction(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<PredictError> for ApiError {
    fn from(err: PredictError) -> Self {
        match err {
            PredictError::Market(e) => {
                tracing::warn!(error = %e, "Prediction aborted, no market data");
                ApiError::NotFound("Could not fetch stock data".to_string())
            }
            other => {
                tracing::error!(error = %other, "Prediction failed");
                ApiError::Prediction(other.to_string())
            }
        }
    }
}

impl From<FetchError> for ApiError {
    fn from(err: FetchError) -> Self {
        match err {
            FetchError::NotFound(_) => ApiError::NotFound("Stock not found".to_string()),
            FetchError::Invalid(msg) => ApiError::BadRequest(msg),
            other => {
                tracing::warn!(error = %other, "Upstream request failed");
                ApiError::Upstream("Market data provider unavailable".to_string())
            }
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match &self {
            ApiError::Prediction(msg) => json!({ "error": msg, "success": false }),
            other => json!({ "error": other.to_string() }),
        };
        (status, Json(body)).into_response()
    }
}
