//! Business logic services.
//!
//! Services own the rules; the stores own the SQL; the routes own the
//! wire. Every service operation returns `Result<_, ApiError>` and every
//! store call is bounded by the configured persistence deadline, so a
//! wedged database surfaces as a retryable `Unavailable` rather than a
//! hung request.
//!
//! # Services
//!
//! - `auth` - Registration, login, password hashing, token issuance
//! - `cart` - Per-owner cart ledger (serialized mutations)
//! - `orders` - Order lifecycle and status transitions
//! - `users` - Account administration
//! - `products` - Catalog products and image attachment
//! - `categories` - Catalog categories
//! - `images` - Image storage collaborator seam

pub mod auth;
pub mod cart;
pub mod categories;
pub mod images;
pub mod orders;
pub mod products;
pub mod users;

pub use auth::{AuthError, AuthOutcome, AuthService};
pub use cart::CartService;
pub use categories::CategoryService;
pub use images::{DisabledImageStore, HttpImageStore, ImageStorage, ImageStorageError, ImageUpload};
pub use orders::OrderService;
pub use products::ProductService;
pub use users::UserService;

use std::future::Future;
use std::time::Duration;

use crate::db::RepositoryError;
use crate::error::ApiError;

/// Run a store call under the persistence deadline.
///
/// A deadline miss is reported as [`ApiError::Unavailable`]: retryable,
/// and distinct from any data error.
pub(crate) async fn bounded<T, F>(deadline: Duration, fut: F) -> Result<T, ApiError>
where
    F: Future<Output = Result<T, RepositoryError>> + Send,
{
    match tokio::time::timeout(deadline, fut).await {
        Ok(result) => result.map_err(ApiError::from),
        Err(_elapsed) => Err(ApiError::Unavailable(
            "Storage deadline exceeded, please retry".to_owned(),
        )),
    }
}

/// Normalize list-endpoint query parameters.
///
/// Page defaults to 1, limit to 10; zero values fall back to defaults so
/// `?limit=0` cannot produce an unbounded scan.
#[must_use]
pub(crate) fn page_params(page: Option<u64>, limit: Option<u64>) -> (u64, u64) {
    let page = match page {
        Some(p) if p >= 1 => p,
        _ => 1,
    };
    let limit = match limit {
        Some(l) if l >= 1 => l,
        _ => 10,
    };
    (page, limit)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_params_default_and_clamp() {
        assert_eq!(page_params(None, None), (1, 10));
        assert_eq!(page_params(Some(0), Some(0)), (1, 10));
        assert_eq!(page_params(Some(3), Some(25)), (3, 25));
    }

    #[tokio::test]
    async fn bounded_reports_deadline_miss_as_unavailable() {
        let result: Result<(), ApiError> = bounded(Duration::from_millis(5), async {
            tokio::time::sleep(Duration::from_secs(5)).await;
            Ok(())
        })
        .await;
        assert!(matches!(result, Err(ApiError::Unavailable(_))));
    }
}
