use chrono::Utc;
use std::sync::Arc;
use uuid::Uuid;

use transit_core::repository::{OrderRepository, PredictionRepository};
use transit_core::{Order, PredictError, PredictResult, Prediction};
use transit_model::FusionPredictor;
use transit_signals::RealTimeFeatureProvider;

/// Drives single and batch predictions: load order(s), fetch signals,
/// fuse, then persist best-effort. The caller always receives the
/// computed result regardless of storage health.
pub struct PredictionOrchestrator {
    orders: Arc<dyn OrderRepository>,
    predictions: Arc<dyn PredictionRepository>,
    predictor: Arc<FusionPredictor>,
    signals: Arc<RealTimeFeatureProvider>,
    max_batch_size: usize,
}

impl PredictionOrchestrator {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        predictions: Arc<dyn PredictionRepository>,
        predictor: Arc<FusionPredictor>,
        signals: Arc<RealTimeFeatureProvider>,
        max_batch_size: usize,
    ) -> Self {
        Self {
            orders,
            predictions,
            predictor,
            signals,
            max_batch_size,
        }
    }

    pub async fn predict_single(
        &self,
        order_id: Uuid,
        use_real_time: bool,
    ) -> PredictResult<Prediction> {
        let order = self
            .orders
            .get_order(order_id)
            .await
            .map_err(|e| PredictError::Internal(format!("order store read failed: {e}")))?
            .ok_or_else(|| PredictError::NotFound(order_id.to_string()))?;

        let prediction = self.run_prediction(&order, use_real_time).await;

        if let Err(err) = self.predictions.save_prediction(&prediction).await {
            tracing::warn!(
                order_id = %order.id,
                error = %err,
                "prediction persist failed, returning unpersisted result"
            );
        }

        Ok(prediction)
    }

    pub async fn predict_batch(
        &self,
        order_ids: &[Uuid],
        use_real_time: bool,
    ) -> PredictResult<Vec<Prediction>> {
        if order_ids.is_empty() {
            return Err(PredictError::Validation(
                "batchOrderIds must not be empty".to_string(),
            ));
        }
        if order_ids.len() > self.max_batch_size {
            return Err(PredictError::Validation(format!(
                "batch size {} exceeds the limit of {}",
                order_ids.len(),
                self.max_batch_size
            )));
        }

        let orders = self
            .orders
            .get_orders(order_ids)
            .await
            .map_err(|e| PredictError::Internal(format!("order store read failed: {e}")))?;

        if orders.len() < order_ids.len() {
            tracing::warn!(
                requested = order_ids.len(),
                found = orders.len(),
                "some batch order ids were unknown and skipped"
            );
        }

        let mut predictions = Vec::with_capacity(orders.len());
        for order in &orders {
            predictions.push(self.run_prediction(order, use_real_time).await);
        }

        // One batched write for the whole set; a failure is logged and the
        // computed predictions are still returned.
        if let Err(err) = self.predictions.save_predictions(&predictions).await {
            tracing::warn!(
                count = predictions.len(),
                error = %err,
                "batch prediction persist failed, returning unpersisted results"
            );
        }

        Ok(predictions)
    }

    /// Fetch signals (when requested) and fuse, with `reference_time = now`.
    /// The two signal fetches inside the provider run concurrently; signal
    /// failures never reach this layer.
    async fn run_prediction(&self, order: &Order, use_real_time: bool) -> Prediction {
        let now = Utc::now();

        let realtime = if use_real_time {
            Some(self.signals.fetch(&order.destination, now).await)
        } else {
            None
        };

        let outcome = self.predictor.predict(order, realtime.as_ref(), now);
        tracing::info!(
            order_id = %order.id,
            predicted_hours = outcome.predicted_hours,
            confidence = outcome.confidence,
            model_version = outcome.model_version.as_str(),
            "prediction computed"
        );

        Prediction::new(
            order.id,
            now,
            outcome.predicted_hours,
            outcome.confidence,
            outcome.factors,
            outcome.model_version,
        )
    }
}
