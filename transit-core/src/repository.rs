use async_trait::async_trait;
use uuid::Uuid;

use crate::order::Order;
use crate::prediction::{Prediction, TrainingRecord};

/// Repository trait for read access to the external order store.
#[async_trait]
pub trait OrderRepository: Send + Sync {
    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>>;

    async fn get_orders(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;

    /// One page of orders with a recorded actual delivery time, oldest
    /// first. Callers walk the history page by page so it is never
    /// materialized whole.
    async fn list_delivered(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the append-only predictions collection.
#[async_trait]
pub trait PredictionRepository: Send + Sync {
    async fn save_prediction(
        &self,
        prediction: &Prediction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;

    /// Persist a whole batch in one write.
    async fn save_predictions(
        &self,
        predictions: &[Prediction],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Repository trait for the append-only training records collection.
#[async_trait]
pub trait TrainingRepository: Send + Sync {
    async fn append_records(
        &self,
        records: &[TrainingRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
