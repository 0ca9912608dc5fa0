use axum::{extract::State, Json};
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use transit_core::{FactorBreakdown, ModelVersion, Prediction};
use transit_predict::TrainingSummary;

use crate::error::AppError;
use crate::state::AppState;

// ============================================================================
// Response Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PredictionResponse {
    pub order_id: Uuid,
    pub predicted_delivery: DateTime<Utc>,
    pub predicted_hours: f64,
    pub confidence_score: f64,
    pub factors: FactorBreakdown,
    pub model_version: ModelVersion,
    pub use_real_time: bool,
}

impl PredictionResponse {
    fn from_prediction(prediction: Prediction, use_real_time: bool) -> Self {
        Self {
            order_id: prediction.order_id,
            predicted_delivery: prediction.predicted_delivery,
            predicted_hours: prediction.predicted_hours,
            confidence_score: prediction.confidence,
            factors: prediction.factors,
            model_version: prediction.model_version,
            use_real_time,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct BatchPredictionResponse {
    pub predictions: Vec<PredictionResponse>,
}

// ============================================================================
// Handler
// ============================================================================

/// POST /v1/predict
/// One stateless endpoint dispatching on the request's `action` field:
/// `predict_single`, `predict_batch`, or `train_model`.
///
/// The request is taken as a raw JSON value so malformed fields come back
/// as 400 validation errors rather than body-rejection responses.
pub async fn predict(
    State(state): State<AppState>,
    Json(req): Json<Value>,
) -> Result<Json<Value>, AppError> {
    let action = req["action"]
        .as_str()
        .ok_or_else(|| AppError::ValidationError("action is required".to_string()))?;
    let use_real_time = req["useRealTime"].as_bool().unwrap_or(true);

    match action {
        "predict_single" => {
            let order_id = parse_order_id(&req["orderId"], "orderId")?;
            let prediction = state
                .orchestrator
                .predict_single(order_id, use_real_time)
                .await?;

            let response = PredictionResponse::from_prediction(prediction, use_real_time);
            Ok(Json(serde_json::to_value(response).map_err(anyhow::Error::from)?))
        }
        "predict_batch" => {
            let ids = req["batchOrderIds"].as_array().ok_or_else(|| {
                AppError::ValidationError(
                    "batchOrderIds is required for predict_batch".to_string(),
                )
            })?;
            let mut order_ids = Vec::with_capacity(ids.len());
            for id in ids {
                order_ids.push(parse_order_id(id, "batchOrderIds")?);
            }

            let predictions = state
                .orchestrator
                .predict_batch(&order_ids, use_real_time)
                .await?;

            let response = BatchPredictionResponse {
                predictions: predictions
                    .into_iter()
                    .map(|p| PredictionResponse::from_prediction(p, use_real_time))
                    .collect(),
            };
            Ok(Json(serde_json::to_value(response).map_err(anyhow::Error::from)?))
        }
        "train_model" => {
            let summary: TrainingSummary = state.trainer.run(use_real_time).await?;
            Ok(Json(serde_json::to_value(summary).map_err(anyhow::Error::from)?))
        }
        other => Err(AppError::ValidationError(format!(
            "unknown action: {other}"
        ))),
    }
}

fn parse_order_id(value: &Value, field: &str) -> Result<Uuid, AppError> {
    let raw = value
        .as_str()
        .ok_or_else(|| AppError::ValidationError(format!("{field} is required")))?;
    Uuid::parse_str(raw)
        .map_err(|_| AppError::ValidationError(format!("{field} contains an invalid order id: {raw}")))
}
