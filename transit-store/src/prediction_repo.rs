use async_trait::async_trait;
use sqlx::PgPool;

use transit_core::repository::{PredictionRepository, TrainingRepository};
use transit_core::{Prediction, TrainingRecord};

/// Append-only writes to the predictions collection. Rows are never
/// updated; corrections are new rows.
pub struct PgPredictionRepository {
    pool: PgPool,
}

impl PgPredictionRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const INSERT_PREDICTION: &str = "INSERT INTO predictions \
    (id, order_id, predicted_delivery, predicted_hours, confidence, factors, model_version, created_at) \
    VALUES ($1, $2, $3, $4, $5, $6, $7, $8)";

#[async_trait]
impl PredictionRepository for PgPredictionRepository {
    async fn save_prediction(
        &self,
        prediction: &Prediction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        sqlx::query(INSERT_PREDICTION)
            .bind(prediction.id)
            .bind(prediction.order_id)
            .bind(prediction.predicted_delivery)
            .bind(prediction.predicted_hours)
            .bind(prediction.confidence)
            .bind(serde_json::to_value(&prediction.factors)?)
            .bind(prediction.model_version.as_str())
            .bind(prediction.created_at)
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    async fn save_predictions(
        &self,
        predictions: &[Prediction],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        for prediction in predictions {
            sqlx::query(INSERT_PREDICTION)
                .bind(prediction.id)
                .bind(prediction.order_id)
                .bind(prediction.predicted_delivery)
                .bind(prediction.predicted_hours)
                .bind(prediction.confidence)
                .bind(serde_json::to_value(&prediction.factors)?)
                .bind(prediction.model_version.as_str())
                .bind(prediction.created_at)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}

/// Append-only writes to the training records collection.
pub struct PgTrainingRepository {
    pool: PgPool,
}

impl PgTrainingRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl TrainingRepository for PgTrainingRepository {
    async fn append_records(
        &self,
        records: &[TrainingRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let mut tx = self.pool.begin().await?;

        for record in records {
            sqlx::query(
                "INSERT INTO training_records \
                 (id, order_id, factors, actual_delivery, predicted_hours, actual_hours, error_hours, created_at) \
                 VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
            )
            .bind(record.id)
            .bind(record.order_id)
            .bind(serde_json::to_value(&record.factors)?)
            .bind(record.actual_delivery)
            .bind(record.predicted_hours)
            .bind(record.actual_hours)
            .bind(record.error_hours)
            .bind(record.created_at)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;
        Ok(())
    }
}
