//! `POST /api/predict`

use axum::{extract::rejection::JsonRejection, extract::State, Json};
use serde::Deserialize;

use crate::http::response::ApiError;
use crate::http::server::AppState;
use crate::predict::Prediction;

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(default)]
    symbol: String,
}

pub async fn predict(
    State(state): State<AppState>,
    body: Result<Json<PredictRequest>, JsonRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let symbol = body
        .ok()
        .map(|Json(req)| req.symbol.trim().to_string())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| ApiError::BadRequest("Symbol required".to_string()))?;

    let Some(predictor) = state.predictor.as_ref() else {
        return Err(ApiError::Unavailable(
            "Predictions are not configured".to_string(),
        ));
    };

    tracing::info!(symbol = %symbol, model = predictor.model_name(), "Prediction requested");
    let prediction = predictor.predict(&symbol).await?;
    Ok(Json(prediction))
}
