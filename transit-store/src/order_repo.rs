use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use uuid::Uuid;

use transit_core::repository::OrderRepository;
use transit_core::Order;

/// Read-only access to the external orders collection.
pub struct PgOrderRepository {
    pool: PgPool,
}

impl PgOrderRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const ORDER_COLUMNS: &str = "id, origin, destination, weight_kg, volume_m3, carrier, priority, \
                             created_at, actual_delivery, estimated_delivery";

fn order_from_row(row: &PgRow) -> Result<Order, sqlx::Error> {
    Ok(Order {
        id: row.try_get("id")?,
        origin: row.try_get("origin")?,
        destination: row.try_get("destination")?,
        weight_kg: row.try_get("weight_kg")?,
        volume_m3: row.try_get("volume_m3")?,
        carrier: row.try_get("carrier")?,
        priority: row.try_get("priority")?,
        created_at: row.try_get("created_at")?,
        actual_delivery: row.try_get("actual_delivery")?,
        estimated_delivery: row.try_get("estimated_delivery")?,
    })
}

#[async_trait]
impl OrderRepository for PgOrderRepository {
    async fn get_order(
        &self,
        id: Uuid,
    ) -> Result<Option<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let row = sqlx::query(&format!("SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"))
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.as_ref().map(order_from_row).transpose()?)
    }

    async fn get_orders(
        &self,
        ids: &[Uuid],
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = ANY($1)"
        ))
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(order_from_row(row)?);
        }
        Ok(orders)
    }

    async fn list_delivered(
        &self,
        offset: usize,
        limit: usize,
    ) -> Result<Vec<Order>, Box<dyn std::error::Error + Send + Sync>> {
        let rows = sqlx::query(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders \
             WHERE actual_delivery IS NOT NULL ORDER BY created_at ASC \
             LIMIT $1 OFFSET $2"
        ))
        .bind(limit as i64)
        .bind(offset as i64)
        .fetch_all(&self.pool)
        .await?;
        let mut orders = Vec::with_capacity(rows.len());
        for row in &rows {
            orders.push(order_from_row(row)?);
        }
        Ok(orders)
    }
}
