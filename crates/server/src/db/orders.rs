//! Order repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use bazaar_core::{LineItem, OrderId, OrderStatus, UserId};

use super::RepositoryError;
use crate::models::{Order, ShippingAddress};

/// Persistence seam for orders.
#[async_trait]
pub trait OrderStore: Send + Sync {
    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError>;
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Order>, RepositoryError>;
    async fn list_by_owner(
        &self,
        owner_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Order>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
    async fn count_by_owner(&self, owner_id: UserId) -> Result<u64, RepositoryError>;
    async fn insert(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Versioned update: compare-and-swaps on the stored version. A lost
    /// race reports [`RepositoryError::Conflict`].
    async fn update(&self, order: &Order) -> Result<(), RepositoryError>;

    /// Returns whether an order was actually removed.
    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError>;
}

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    owner_id: Uuid,
    items: Json<Vec<LineItem>>,
    total: Decimal,
    status: String,
    shipping_address: Json<ShippingAddress>,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        let status: OrderStatus = row.status.parse().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid status in database: {e}"))
        })?;
        Ok(Self {
            id: OrderId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            items: row.items.0,
            total: row.total,
            status,
            shipping_address: row.shipping_address.0,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// `PostgreSQL`-backed order store.
pub struct PgOrderStore {
    pool: PgPool,
}

impl PgOrderStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str =
    "id, owner_id, items, total, status, shipping_address, version, created_at, updated_at";

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        let row = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        row.map(TryInto::try_into).transpose()
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders ORDER BY created_at DESC OFFSET $1 LIMIT $2"
        ))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let rows = sqlx::query_as::<_, OrderRow>(&format!(
            "SELECT {COLUMNS} FROM orders WHERE owner_id = $1
             ORDER BY created_at DESC OFFSET $2 LIMIT $3"
        ))
        .bind(owner_id.as_uuid())
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    async fn count_by_owner(&self, owner_id: UserId) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders WHERE owner_id = $1")
            .bind(owner_id.as_uuid())
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO orders
                 (id, owner_id, items, total, status, shipping_address, version,
                  created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5, $6, 1, $7, $8)",
        )
        .bind(order.id.as_uuid())
        .bind(order.owner_id.as_uuid())
        .bind(Json(&order.items))
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(Json(&order.shipping_address))
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE orders
             SET items = $2, total = $3, status = $4, shipping_address = $5,
                 version = version + 1, updated_at = $6
             WHERE id = $1 AND version = $7",
        )
        .bind(order.id.as_uuid())
        .bind(Json(&order.items))
        .bind(order.total)
        .bind(order.status.as_str())
        .bind(Json(&order.shipping_address))
        .bind(order.updated_at)
        .bind(order.version)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            // Distinguish absence from a lost race for accurate reporting.
            let exists: Option<i64> = sqlx::query_scalar("SELECT 1 FROM orders WHERE id = $1")
                .bind(order.id.as_uuid())
                .fetch_optional(&self.pool)
                .await?;
            return Err(if exists.is_some() {
                RepositoryError::Conflict("Order was modified concurrently".to_owned())
            } else {
                RepositoryError::NotFound
            });
        }
        Ok(())
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
