//! Catalog category repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use bazaar_core::CategoryId;

use super::{RepositoryError, map_constraint};
use crate::models::Category;

/// Persistence seam for catalog categories.
#[async_trait]
pub trait CategoryStore: Send + Sync {
    async fn find(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError>;
    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Category>, RepositoryError>;
    async fn count(&self) -> Result<u64, RepositoryError>;
    /// Insert a new category. Fails with `Conflict` when the name is taken.
    async fn insert(&self, category: &Category) -> Result<(), RepositoryError>;
    async fn update(&self, category: &Category) -> Result<(), RepositoryError>;
    /// Returns whether a category was actually removed.
    async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError>;
}

/// Internal row type for `PostgreSQL` category queries.
#[derive(Debug, sqlx::FromRow)]
struct CategoryRow {
    id: Uuid,
    name: String,
    description: Option<String>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        Self {
            id: CategoryId::new(row.id),
            name: row.name,
            description: row.description,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// `PostgreSQL`-backed category store.
pub struct PgCategoryStore {
    pool: PgPool,
}

impl PgCategoryStore {
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

const COLUMNS: &str = "id, name, description, created_at, updated_at";

#[async_trait]
impl CategoryStore for PgCategoryStore {
    async fn find(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        let row = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {COLUMNS} FROM categories WHERE id = $1"
        ))
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;
        Ok(row.map(Into::into))
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Category>, RepositoryError> {
        let rows = sqlx::query_as::<_, CategoryRow>(&format!(
            "SELECT {COLUMNS} FROM categories ORDER BY name ASC OFFSET $1 LIMIT $2"
        ))
        .bind(i64::try_from(offset).unwrap_or(i64::MAX))
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;
        Ok(rows.into_iter().map(Into::into).collect())
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM categories")
            .fetch_one(&self.pool)
            .await?;
        Ok(count.unsigned_abs())
    }

    async fn insert(&self, category: &Category) -> Result<(), RepositoryError> {
        sqlx::query(
            "INSERT INTO categories (id, name, description, created_at, updated_at)
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.created_at)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "Category with this name already exists"))?;
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), RepositoryError> {
        let result = sqlx::query(
            "UPDATE categories SET name = $2, description = $3, updated_at = $4 WHERE id = $1",
        )
        .bind(category.id.as_uuid())
        .bind(&category.name)
        .bind(&category.description)
        .bind(category.updated_at)
        .execute(&self.pool)
        .await
        .map_err(|e| map_constraint(e, "Category with this name already exists"))?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM categories WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }
}
