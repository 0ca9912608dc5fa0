use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Distinguishes runs that fused live signals from static-only runs.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ModelVersion {
    #[serde(rename = "fused-v1")]
    FusedV1,
    #[serde(rename = "static-v1")]
    StaticV1,
}

impl ModelVersion {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelVersion::FusedV1 => "fused-v1",
            ModelVersion::StaticV1 => "static-v1",
        }
    }
}

/// Immutable snapshot of every multiplier and raw observation used for one
/// prediction. Sufficient to reproduce `predicted_hours` deterministically
/// except for the jitter term, which is recorded as well.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct FactorBreakdown {
    pub base_hours: f64,
    pub distance_km: f64,
    pub distance_category: String,
    pub carrier_factor: f64,
    pub seasonal_factor: f64,
    pub weight_factor: f64,
    pub volume_factor: f64,
    pub priority_factor: f64,
    pub weather_factor: f64,
    pub weather_condition: String,
    pub temperature_c: Option<f64>,
    pub wind_speed: Option<f64>,
    pub traffic_factor: f64,
    pub traffic_level: String,
    pub jitter: f64,
}

/// One prediction row. Created once per invocation and never updated;
/// corrections are new rows so history is preserved.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub id: Uuid,
    pub order_id: Uuid,
    pub predicted_delivery: DateTime<Utc>,
    pub predicted_hours: f64,
    pub confidence: f64,
    pub factors: FactorBreakdown,
    pub model_version: ModelVersion,
    pub created_at: DateTime<Utc>,
}

impl Prediction {
    pub fn new(
        order_id: Uuid,
        reference_time: DateTime<Utc>,
        predicted_hours: f64,
        confidence: f64,
        factors: FactorBreakdown,
        model_version: ModelVersion,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            predicted_delivery: delivery_at(reference_time, predicted_hours),
            predicted_hours,
            confidence,
            factors,
            model_version,
            created_at: Utc::now(),
        }
    }
}

/// `reference_time + predicted_hours`, at millisecond precision.
pub fn delivery_at(reference_time: DateTime<Utc>, predicted_hours: f64) -> DateTime<Utc> {
    reference_time + Duration::milliseconds((predicted_hours * 3_600_000.0).round() as i64)
}

/// Historical comparison between a recomputed prediction and the observed
/// delivery duration. Append-only; aggregated into the accuracy metric at
/// read time, never in place.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingRecord {
    pub id: Uuid,
    pub order_id: Uuid,
    pub factors: FactorBreakdown,
    pub actual_delivery: DateTime<Utc>,
    pub predicted_hours: f64,
    pub actual_hours: f64,
    pub error_hours: f64,
    pub created_at: DateTime<Utc>,
}

impl TrainingRecord {
    pub fn new(
        order_id: Uuid,
        factors: FactorBreakdown,
        actual_delivery: DateTime<Utc>,
        predicted_hours: f64,
        actual_hours: f64,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            order_id,
            factors,
            actual_delivery,
            predicted_hours,
            actual_hours,
            error_hours: (actual_hours - predicted_hours).abs(),
            created_at: Utc::now(),
        }
    }
}
