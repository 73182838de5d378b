//! Persistence layer.
//!
//! Each entity has a store trait consumed by the service layer, with two
//! implementations: a `PostgreSQL`-backed store for production and an
//! in-memory store used by the test suites. The service layer never sees
//! SQL - it talks to the traits, which expose `find`/`save`
//! (insert-or-replace)/`delete`/`count`/page lookups per entity.
//!
//! # Versioned saves
//!
//! Cart and order saves are compare-and-swap on a `version` column: a
//! mismatch reports [`RepositoryError::Conflict`]. The service layer
//! additionally serializes mutations per owner/order key, so the version
//! check is the backstop, not the primary mechanism.
//!
//! # Migrations
//!
//! Migrations live in `crates/server/migrations/` and run via:
//! ```bash
//! cargo run -p bazaar-cli -- migrate run
//! ```

pub mod carts;
pub mod categories;
pub mod memory;
pub mod orders;
pub mod products;
pub mod users;

use std::time::Duration;

use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

/// Errors surfaced by the store implementations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database operation failed.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Stored data failed to decode into a domain type.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Versioned save lost a concurrent race, or a unique constraint fired.
    #[error("conflict: {0}")]
    Conflict(String),

    /// Entity not present.
    #[error("not found")]
    NotFound,
}

/// Map a unique-constraint violation to [`RepositoryError::Conflict`],
/// passing other database errors through.
pub(crate) fn map_constraint(err: sqlx::Error, conflict_message: &str) -> RepositoryError {
    if let sqlx::Error::Database(db) = &err
        && db.is_unique_violation()
    {
        return RepositoryError::Conflict(conflict_message.to_owned());
    }
    RepositoryError::Database(err)
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
