use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Mutex;
use uuid::Uuid;

use transit_core::repository::{OrderRepository, PredictionRepository, TrainingRepository};
use transit_core::{Order, Prediction, TrainingRecord};

/// In-memory order store for tests and local development.
#[derive(Default)]
pub struct InMemoryOrderRepository {
    orders: Mutex<HashMap<Uuid, Order>>,
}

impl InMemoryOrderRepository {
    pub fn seeded(orders: Vec<Order>) -> Self {
        Self {
            orders: Mutex::new(orders.into_iter().map(|o| (o.id, o)).collect()),
        }
    }

    pub fn insert(&self, order: Order) {
        self.orders.lock().unwrap().insert(order.id, order);
    }
}

#[async_trait]
impl OrderRepository for InMemoryOrderRepository {
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
        let map = self.orders.lock().unwrap();
        let mut delivered: Vec<Order> = map.values().filter(|o| o.is_delivered()).cloned().collect();
        delivered.sort_by_key(|o| o.created_at);
        Ok(delivered.into_iter().skip(offset).take(limit).collect())
    }
}

/// In-memory predictions collection, append-only like its Postgres
/// counterpart.
#[derive(Default)]
pub struct InMemoryPredictionRepository {
    predictions: Mutex<Vec<Prediction>>,
}

impl InMemoryPredictionRepository {
    pub fn all(&self) -> Vec<Prediction> {
        self.predictions.lock().unwrap().clone()
    }
}

#[async_trait]
impl PredictionRepository for InMemoryPredictionRepository {
    async fn save_prediction(
        &self,
        prediction: &Prediction,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.predictions.lock().unwrap().push(prediction.clone());
        Ok(())
    }

    async fn save_predictions(
        &self,
        predictions: &[Prediction],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.predictions
            .lock()
            .unwrap()
            .extend_from_slice(predictions);
        Ok(())
    }
}

/// In-memory training records collection.
#[derive(Default)]
pub struct InMemoryTrainingRepository {
    records: Mutex<Vec<TrainingRecord>>,
}

impl InMemoryTrainingRepository {
    pub fn all(&self) -> Vec<TrainingRecord> {
        self.records.lock().unwrap().clone()
    }
}

#[async_trait]
impl TrainingRepository for InMemoryTrainingRepository {
    async fn append_records(
        &self,
        records: &[TrainingRecord],
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        self.records.lock().unwrap().extend_from_slice(records);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};

    fn order(delivered: bool) -> Order {
        let created_at = Utc::now() - Duration::hours(48);
        Order {
            id: Uuid::new_v4(),
            origin: "Berlin, Germany".to_string(),
            destination: "Hamburg, Germany".to_string(),
            weight_kg: 120.0,
            volume_m3: 1.0,
            carrier: "DHL".to_string(),
            priority: None,
            created_at,
            actual_delivery: delivered.then(|| created_at + Duration::hours(30)),
            estimated_delivery: None,
        }
    }

    #[tokio::test]
    async fn list_delivered_filters_and_pages() {
        let repo = InMemoryOrderRepository::default();
        repo.insert(order(true));
        repo.insert(order(true));
        repo.insert(order(false));

        let all = repo.list_delivered(0, 10).await.unwrap();
        assert_eq!(all.len(), 2);

        let first_page = repo.list_delivered(0, 1).await.unwrap();
        assert_eq!(first_page.len(), 1);

        let second_page = repo.list_delivered(1, 10).await.unwrap();
        assert_eq!(second_page.len(), 1);
        assert_ne!(first_page[0].id, second_page[0].id);

        let past_the_end = repo.list_delivered(2, 10).await.unwrap();
        assert!(past_the_end.is_empty());
    }

    #[tokio::test]
    async fn get_orders_skips_unknown_ids() {
        let repo = InMemoryOrderRepository::default();
        let known = order(false);
        repo.insert(known.clone());

        let found = repo.get_orders(&[known.id, Uuid::new_v4()]).await.unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].id, known.id);
    }
}
