use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use transit_core::{FactorBreakdown, ModelVersion, Order};

use crate::noise::NoiseSource;
use crate::static_model::{StaticFactorModel, StaticFactors};
use crate::tables::FactorTables;

/// Jitter bounds. Fused runs carry more signal, so their jitter band is
/// tighter.
const STATIC_JITTER: (f64, f64) = (0.9, 1.1);
const FUSED_JITTER: (f64, f64) = (0.95, 1.05);

/// Confidence baselines. The fused baseline is lower because live inputs
/// add failure surface; trustworthy signals then earn it back.
const STATIC_CONFIDENCE_BASE: f64 = 0.85;
const FUSED_CONFIDENCE_BASE: f64 = 0.80;
const SIGNAL_BONUS: f64 = 0.02;
const CONFIDENCE_NOISE: f64 = 0.01;
const CONFIDENCE_CEILING: f64 = 0.99;

/// Live multipliers and raw observations, as delivered by the real-time
/// feature provider. Always well-formed: an unavailable signal arrives
/// here already substituted with its neutral default.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RealTimeFactors {
    pub weather_factor: f64,
    pub weather_condition: String,
    pub temperature_c: Option<f64>,
    pub wind_speed: Option<f64>,
    pub traffic_factor: f64,
    pub traffic_level: String,
}

impl RealTimeFactors {
    pub fn combined(&self) -> f64 {
        self.weather_factor * self.traffic_factor
    }

    /// Neutral placeholder used for static-only runs.
    pub fn neutral() -> Self {
        Self {
            weather_factor: 1.0,
            weather_condition: "unknown".to_string(),
            temperature_c: None,
            wind_speed: None,
            traffic_factor: 1.0,
            traffic_level: "unknown".to_string(),
        }
    }
}

/// Result of one fusion run.
#[derive(Debug, Clone)]
pub struct PredictionOutcome {
    pub predicted_hours: f64,
    pub confidence: f64,
    pub factors: FactorBreakdown,
    pub model_version: ModelVersion,
}

/// Fuses the static factor model with live signals and bounded jitter.
///
/// The multiplication order is fixed so a recorded breakdown reproduces
/// the estimate: base x carrier x seasonal x weight x volume x priority
/// x [weather x traffic] x jitter.
pub struct FusionPredictor {
    model: StaticFactorModel,
    noise: Arc<dyn NoiseSource>,
}

impl FusionPredictor {
    pub fn new(tables: FactorTables, noise: Arc<dyn NoiseSource>) -> Self {
        Self {
            model: StaticFactorModel::new(tables),
            noise,
        }
    }

    /// Predict remaining transit duration for one order.
    ///
    /// `realtime` is `Some` for fused runs and `None` for static-only runs;
    /// the seasonal factor is evaluated at `reference_time`, which is "now"
    /// for live predictions and the order's creation time during audits.
    pub fn predict(
        &self,
        order: &Order,
        realtime: Option<&RealTimeFactors>,
        reference_time: DateTime<Utc>,
    ) -> PredictionOutcome {
        let statics = self.model.evaluate(order, reference_time.month());

        let (jitter_low, jitter_high) = if realtime.is_some() {
            FUSED_JITTER
        } else {
            STATIC_JITTER
        };
        let jitter = self.noise.sample(jitter_low, jitter_high);

        let realtime_product = realtime.map(RealTimeFactors::combined).unwrap_or(1.0);
        let predicted_hours = statics.static_hours() * realtime_product * jitter;

        let confidence = self.confidence(&statics, realtime);

        let model_version = if realtime.is_some() {
            ModelVersion::FusedV1
        } else {
            ModelVersion::StaticV1
        };

        let rt = realtime.cloned().unwrap_or_else(RealTimeFactors::neutral);
        let factors = FactorBreakdown {
            base_hours: statics.base_hours,
            distance_km: statics.distance_km,
            distance_category: statics.distance_category.as_str().to_string(),
            carrier_factor: statics.carrier_factor,
            seasonal_factor: statics.seasonal_factor,
            weight_factor: statics.weight_factor,
            volume_factor: statics.volume_factor,
            priority_factor: statics.priority_factor,
            weather_factor: rt.weather_factor,
            weather_condition: rt.weather_condition,
            temperature_c: rt.temperature_c,
            wind_speed: rt.wind_speed,
            traffic_factor: rt.traffic_factor,
            traffic_level: rt.traffic_level,
            jitter,
        };

        PredictionOutcome {
            predicted_hours,
            confidence,
            factors,
            model_version,
        }
    }

    /// Baseline plus a small bonus per trustworthy signal, lightly
    /// perturbed, clamped to `[baseline, 0.99]`.
    fn confidence(&self, statics: &StaticFactors, realtime: Option<&RealTimeFactors>) -> f64 {
        let baseline = if realtime.is_some() {
            FUSED_CONFIDENCE_BASE
        } else {
            STATIC_CONFIDENCE_BASE
        };

        let mut score = baseline;
        if statics.weight_factor > 1.0 {
            score += SIGNAL_BONUS;
        }
        if statics.volume_factor > 1.0 {
            score += SIGNAL_BONUS;
        }
        if statics.carrier_known {
            score += SIGNAL_BONUS;
        }
        if statics.distance_resolved {
            score += SIGNAL_BONUS;
        }
        if let Some(rt) = realtime {
            if rt.weather_condition != "unknown" {
                score += SIGNAL_BONUS;
            }
            if rt.traffic_level != "unknown" {
                score += SIGNAL_BONUS;
            }
        }

        score += self.noise.sample(-CONFIDENCE_NOISE, CONFIDENCE_NOISE);
        score.clamp(baseline, CONFIDENCE_CEILING)
    }
}
