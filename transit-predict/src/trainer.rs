use serde::Serialize;
use std::sync::Arc;

use transit_core::repository::{OrderRepository, TrainingRepository};
use transit_core::{PredictError, PredictResult, TrainingRecord};
use transit_model::FusionPredictor;
use transit_signals::RealTimeFeatureProvider;

/// Errors beyond one full day floor the accuracy metric at zero.
const ACCURACY_HORIZON_HOURS: f64 = 24.0;

/// Aggregate result of one audit pass.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TrainingSummary {
    pub training_samples: usize,
    pub average_error_hours: f64,
    pub model_accuracy: f64,
    pub use_real_time_features: bool,
}

/// Audit pass over delivered orders: recompute each prediction with the
/// order's creation time as the reference, compare against the observed
/// delivery duration, and aggregate mean absolute error into a model
/// accuracy metric.
///
/// The historical set is read page by page, at most `chunk_size` orders
/// in memory at once, and each page feeds the incremental aggregation and
/// its own record write. A large backlog can neither blow up memory nor
/// stall a single giant write.
pub struct TrainingRunner {
    orders: Arc<dyn OrderRepository>,
    training: Arc<dyn TrainingRepository>,
    predictor: Arc<FusionPredictor>,
    signals: Arc<RealTimeFeatureProvider>,
    chunk_size: usize,
}

impl TrainingRunner {
    pub fn new(
        orders: Arc<dyn OrderRepository>,
        training: Arc<dyn TrainingRepository>,
        predictor: Arc<FusionPredictor>,
        signals: Arc<RealTimeFeatureProvider>,
        chunk_size: usize,
    ) -> Self {
        Self {
            orders,
            training,
            predictor,
            signals,
            chunk_size: chunk_size.max(1),
        }
    }

    pub async fn run(&self, use_real_time: bool) -> PredictResult<TrainingSummary> {
        let mut samples = 0usize;
        let mut total_error_hours = 0.0;
        let mut offset = 0usize;

        loop {
            let page = self
                .orders
                .list_delivered(offset, self.chunk_size)
                .await
                .map_err(|e| PredictError::Internal(format!("order store read failed: {e}")))?;
            if page.is_empty() {
                break;
            }
            offset += page.len();

            let mut records = Vec::with_capacity(page.len());

            for order in &page {
                // list_delivered guarantees this, but a racing store edit
                // must not panic the audit.
                let Some(actual_delivery) = order.actual_delivery else {
                    continue;
                };

                let reference = order.created_at;
                let realtime = if use_real_time {
                    Some(self.signals.fetch(&order.destination, reference).await)
                } else {
                    None
                };

                let outcome = self.predictor.predict(order, realtime.as_ref(), reference);
                let actual_hours =
                    (actual_delivery - order.created_at).num_milliseconds() as f64 / 3_600_000.0;

                let record = TrainingRecord::new(
                    order.id,
                    outcome.factors,
                    actual_delivery,
                    outcome.predicted_hours,
                    actual_hours,
                );
                total_error_hours += record.error_hours;
                samples += 1;
                records.push(record);
            }

            if let Err(err) = self.training.append_records(&records).await {
                tracing::warn!(
                    count = records.len(),
                    error = %err,
                    "training record persist failed, continuing audit"
                );
            }

            if page.len() < self.chunk_size {
                break;
            }
        }

        let average_error_hours = if samples > 0 {
            total_error_hours / samples as f64
        } else {
            0.0
        };
        let model_accuracy = if samples > 0 {
            (1.0 - average_error_hours / ACCURACY_HORIZON_HOURS).max(0.0)
        } else {
            0.0
        };

        tracing::info!(
            samples,
            average_error_hours,
            model_accuracy,
            "audit pass complete"
        );

        Ok(TrainingSummary {
            training_samples: samples,
            average_error_hours,
            model_accuracy,
            use_real_time_features: use_real_time,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests_support {
    use async_trait::async_trait;
    use chrono::{TimeZone, Utc};
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;
    use uuid::Uuid;

    use transit_core::repository::{OrderRepository, PredictionRepository, TrainingRepository};
    use transit_core::{Order, Prediction, TrainingRecord};

    pub fn order_fixture(carrier: &str, priority: Option<&str>) -> Order {
        Order {
            id: Uuid::new_v4(),
            origin: "Speicherstrasse 12, Hamburg, Germany".to_string(),
            destination: "Kantstrasse 7, Berlin, Germany".to_string(),
            weight_kg: 500.0,
            volume_m3: 2.0,
            carrier: carrier.to_string(),
            priority: priority.map(str::to_string),
            created_at: Utc.with_ymd_and_hms(2024, 6, 10, 12, 0, 0).unwrap(),
            actual_delivery: None,
            estimated_delivery: None,
        }
    }

    #[derive(Default)]
    pub struct InMemoryOrders {
        orders: Mutex<HashMap<Uuid, Order>>,
        page_limits: Mutex<Vec<usize>>,
    }

    impl InMemoryOrders {
        pub fn with_orders(orders: Vec<Order>) -> Self {
            Self {
                orders: Mutex::new(orders.into_iter().map(|o| (o.id, o)).collect()),
                page_limits: Mutex::new(Vec::new()),
            }
        }

        /// The limit of every delivered-history page read, in call order.
        pub fn delivered_page_limits(&self) -> Vec<usize> {
            self.page_limits.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl OrderRepository for InMemoryOrders {
        async fn get_order(
            &self,
            id: Uuid,
        ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
            Ok(self.orders.lock().unwrap().get(&id).cloned())
        }

        async fn get_orders(
            &self,
            ids: &[Uuid],
        ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
            let map = self.orders.lock().unwrap();
            Ok(ids.iter().filter_map(|id| map.get(id).cloned()).collect())
        }

        async fn list_delivered(
            &self,
            offset: usize,
            limit: usize,
        ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
            self.page_limits.lock().unwrap().push(limit);
            let map = self.orders.lock().unwrap();
            let mut delivered: Vec<Order> =
                map.values().filter(|o| o.is_delivered()).cloned().collect();
            delivered.sort_by_key(|o| o.created_at);
            Ok(delivered.into_iter().skip(offset).take(limit).collect())
        }
    }

    pub struct RecordingPredictions {
        saved: Mutex<Vec<Prediction>>,
        batch_writes: AtomicUsize,
        fail: bool,
    }

    impl Default for RecordingPredictions {
        fn default() -> Self {
            Self {
                saved: Mutex::new(Vec::new()),
                batch_writes: AtomicUsize::new(0),
                fail: false,
            }
        }
    }

    impl RecordingPredictions {
        pub fn failing() -> Self {
            Self {
                fail: true,
                ..Self::default()
            }
        }

        pub fn saved(&self) -> Vec<Prediction> {
            self.saved.lock().unwrap().clone()
        }

        pub fn batch_writes(&self) -> usize {
            self.batch_writes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl PredictionRepository for RecordingPredictions {
        async fn save_prediction(
            &self,
            prediction: &Prediction,
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if self.fail {
                return Err("storage offline".into());
            }
            self.saved.lock().unwrap().push(prediction.clone());
            Ok(())
        }

        async fn save_predictions(
            &self,
            predictions: &[Prediction],
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if self.fail {
                return Err("storage offline".into());
            }
            self.batch_writes.fetch_add(1, Ordering::SeqCst);
            self.saved.lock().unwrap().extend_from_slice(predictions);
            Ok(())
        }
    }

    pub struct RecordingTraining {
        records: Mutex<Vec<TrainingRecord>>,
        fail: bool,
    }

    impl Default for RecordingTraining {
        fn default() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail: false,
            }
        }
    }

    impl RecordingTraining {
        pub fn failing() -> Self {
            Self {
                records: Mutex::new(Vec::new()),
                fail: true,
            }
        }

        pub fn records(&self) -> Vec<TrainingRecord> {
            self.records.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl TrainingRepository for RecordingTraining {
        async fn append_records(
            &self,
            records: &[TrainingRecord],
        ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
            if self.fail {
                return Err("storage offline".into());
            }
            self.records.lock().unwrap().extend_from_slice(records);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::tests_support::*;
    use super::*;
    use chrono::Duration;
    use std::sync::Arc;
    use transit_model::{FactorTables, FixedNoise};

    fn runner(
        orders: Arc<InMemoryOrders>,
        training: Arc<RecordingTraining>,
        chunk_size: usize,
    ) -> TrainingRunner {
        TrainingRunner::new(
            orders,
            training,
            Arc::new(FusionPredictor::new(
                FactorTables::default(),
                Arc::new(FixedNoise(0.5)),
            )),
            Arc::new(RealTimeFeatureProvider::uncredentialed()),
            chunk_size,
        )
    }

    fn delivered_after(hours: i64, carrier: &str) -> transit_core::Order {
        let mut order = order_fixture(carrier, None);
        order.actual_delivery = Some(order.created_at + Duration::hours(hours));
        order
    }

    #[tokio::test]
    async fn audit_error_is_the_exact_mean_of_absolute_errors() {
        let orders = vec![
            delivered_after(20, "DHL"),
            delivered_after(30, "DHL"),
            delivered_after(45, "CarrierX"),
        ];
        let store = Arc::new(InMemoryOrders::with_orders(orders.clone()));
        let training = Arc::new(RecordingTraining::default());
        let summary = runner(store, training.clone(), 200).run(false).await.unwrap();

        // Recompute expectations with the same pinned-noise predictor.
        let predictor =
            FusionPredictor::new(FactorTables::default(), Arc::new(FixedNoise(0.5)));
        let expected_mae = orders
            .iter()
            .map(|o| {
                let predicted = predictor.predict(o, None, o.created_at).predicted_hours;
                let actual =
                    (o.actual_delivery.unwrap() - o.created_at).num_milliseconds() as f64
                        / 3_600_000.0;
                (actual - predicted).abs()
            })
            .sum::<f64>()
            / orders.len() as f64;

        assert_eq!(summary.training_samples, 3);
        assert!((summary.average_error_hours - expected_mae).abs() < 1e-9);
        assert!(summary.model_accuracy >= 0.0 && summary.model_accuracy <= 1.0);
        assert!(!summary.use_real_time_features);
        assert_eq!(training.records().len(), 3);
    }

    #[tokio::test]
    async fn chunked_run_aggregates_across_chunks() {
        let orders: Vec<_> = (0..5).map(|i| delivered_after(24 + i, "DHL")).collect();
        let store = Arc::new(InMemoryOrders::with_orders(orders));
        let training = Arc::new(RecordingTraining::default());

        let summary = runner(store.clone(), training.clone(), 2).run(false).await.unwrap();
        assert_eq!(summary.training_samples, 5);
        assert_eq!(training.records().len(), 5);

        // The history is read in pages, never whole: three reads of at
        // most two orders each cover the five delivered orders.
        assert_eq!(store.delivered_page_limits(), vec![2, 2, 2]);
    }

    #[tokio::test]
    async fn backlog_ending_on_a_page_boundary_stops_reading() {
        let orders: Vec<_> = (0..4).map(|i| delivered_after(24 + i, "DHL")).collect();
        let store = Arc::new(InMemoryOrders::with_orders(orders));
        let training = Arc::new(RecordingTraining::default());

        let summary = runner(store.clone(), training.clone(), 2).run(false).await.unwrap();
        assert_eq!(summary.training_samples, 4);
        // Two full pages, then one empty read terminates the walk.
        assert_eq!(store.delivered_page_limits(), vec![2, 2, 2]);
        assert_eq!(training.records().len(), 4);
    }

    #[tokio::test]
    async fn no_delivered_orders_yields_an_empty_summary() {
        let store = Arc::new(InMemoryOrders::with_orders(vec![order_fixture("DHL", None)]));
        let training = Arc::new(RecordingTraining::default());

        let summary = runner(store, training, 200).run(true).await.unwrap();
        assert_eq!(summary.training_samples, 0);
        assert_eq!(summary.average_error_hours, 0.0);
        assert_eq!(summary.model_accuracy, 0.0);
    }

    #[tokio::test]
    async fn wild_errors_floor_accuracy_at_zero() {
        // Actual delivery weeks out: error far beyond the 24 h horizon.
        let store = Arc::new(InMemoryOrders::with_orders(vec![delivered_after(500, "DHL")]));
        let training = Arc::new(RecordingTraining::default());

        let summary = runner(store, training, 200).run(false).await.unwrap();
        assert_eq!(summary.model_accuracy, 0.0);
    }

    #[tokio::test]
    async fn record_persist_failure_does_not_abort_the_audit() {
        let store = Arc::new(InMemoryOrders::with_orders(vec![delivered_after(26, "DHL")]));
        let training = Arc::new(RecordingTraining::failing());

        let summary = runner(store, training, 200).run(false).await.unwrap();
        assert_eq!(summary.training_samples, 1);
    }
}
