use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// A shipment as read from the order store. Owned by the store; this
/// engine only ever reads it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Order {
    pub id: Uuid,
    pub origin: String,
    pub destination: String,
    pub weight_kg: f64,
    pub volume_m3: f64,
    pub carrier: String,
    pub priority: Option<String>,
    pub created_at: DateTime<Utc>,
    pub actual_delivery: Option<DateTime<Utc>>,
    pub estimated_delivery: Option<DateTime<Utc>>,
}

impl Order {
    /// True once the shipment has a recorded delivery time, which makes
    /// it usable as ground truth for the audit pass.
    pub fn is_delivered(&self) -> bool {
        self.actual_delivery.is_some()
    }
}
