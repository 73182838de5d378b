//! Cart repository.
//!
//! Carts are keyed by owner: one live cart per user, enforced by a
//! unique constraint. Line items persist as a JSONB document since they
//! are only ever read and written as a whole.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use sqlx::types::Json;
use uuid::Uuid;

use bazaar_core::{CartId, LineItem, UserId};
use rust_decimal::Decimal;

use super::RepositoryError;
use crate::models::Cart;

/// Persistence seam for carts.
#[async_trait]
pub trait CartStore: Send + Sync {
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Option<Cart>, RepositoryError>;

    /// Versioned save: inserts at version 0, otherwise compare-and-swaps
    /// on the stored version. The persisted version is `cart.version + 1`;
    /// a lost race reports [`RepositoryError::Conflict`].
    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError>;

    /// Returns whether a cart was actually removed.
    async fn delete_by_owner(&self, owner_id: UserId) -> Result<bool, RepositoryError>;
}

/// Internal row type for `PostgreSQL` cart queries.
#[derive(Debug, sqlx::FromRow)]
struct CartRow {
    id: Uuid,
    owner_id: Uuid,
    items: Json<Vec<LineItem>>,
    total: Decimal,
    version: i64,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CartRow> for Cart {
    fn from(row: CartRow) -> Self {
        Self {
            id: CartId::new(row.id),
            owner_id: UserId::new(row.owner_id),
            items: row.items.0,
            total: row.total,
            version: row.version,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL`-backed cart store.
pub struct PgCartStore {
    pool: PgPool,
}

impl PgCartStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartStore for PgCartStore {
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        let row = sqlx::query_as::<_, CartRow>(
            "SELECT id, owner_id, items, total, version, created_at, updated_at
             FROM carts WHERE owner_id = $1",
        )
        .bind(owner_id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let rows_affected = if cart.version == 0 {
            sqlx::query(
                "INSERT INTO carts (id, owner_id, items, total, version, created_at, updated_at)
                 VALUES ($1, $2, $3, $4, 1, $5, $6)
                 ON CONFLICT (owner_id) DO NOTHING",
            )
            .bind(cart.id.as_uuid())
            .bind(cart.owner_id.as_uuid())
            .bind(Json(&cart.items))
            .bind(cart.total)
            .bind(cart.created_at)
            .bind(cart.updated_at)
            .execute(&self.pool)
            .await?
            .rows_affected()
        } else {
            sqlx::query(
                "UPDATE carts
                 SET items = $2, total = $3, version = version + 1, updated_at = $4
                 WHERE id = $1 AND version = $5",
            )
            .bind(cart.id.as_uuid())
            .bind(Json(&cart.items))
            .bind(cart.total)
            .bind(cart.updated_at)
            .bind(cart.version)
            .execute(&self.pool)
            .await?
            .rows_affected()
        };

        if rows_affected == 0 {
            return Err(RepositoryError::Conflict(
                "Cart was modified concurrently".to_owned(),
            ));
        }
        Ok(())
    }

    async fn delete_by_owner(&self, owner_id: UserId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM carts WHERE owner_id = $1")
            .bind(owner_id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
