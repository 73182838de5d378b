//! HTTP route handlers.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness check
//! GET  /health/ready                   - Readiness check (DB ping)
//!
//! # Auth
//! POST /api/auth/register              - Register and sign in
//! POST /api/auth/login                 - Sign in
//!
//! # Users
//! GET    /api/users                    - List accounts (admin, paged)
//! GET    /api/users/{id}               - Fetch one account (admin)
//! POST   /api/users                    - Create an account (admin)
//! PUT    /api/users/{id}               - Update an account (admin or self)
//! DELETE /api/users/{id}               - Delete an account (admin)
//!
//! # Products
//! GET    /api/products                 - Browse catalog (public, paged)
//! GET    /api/products/{id}            - Fetch one product
//! POST   /api/products                 - Create (admin, multipart)
//! PUT    /api/products/{id}            - Update (admin, multipart)
//! DELETE /api/products/{id}            - Delete (admin)
//! POST   /api/products/upload-images   - Attach images (admin, multipart)
//!
//! # Categories
//! GET    /api/categories               - List (paged)
//! GET    /api/categories/{id}          - Fetch one
//! POST   /api/categories               - Create (admin)
//! PUT    /api/categories/{id}          - Update (admin)
//! DELETE /api/categories/{id}          - Delete (admin)
//!
//! # Cart (keyed by userId query parameter)
//! GET    /api/cart                     - Fetch cart
//! POST   /api/cart/add                 - Add an item
//! PUT    /api/cart/update-item         - Set an item's quantity
//! DELETE /api/cart/remove-item         - Remove an item
//! DELETE /api/cart/clear               - Drop the cart
//!
//! # Orders
//! GET    /api/orders                   - List all orders (admin, paged)
//! GET    /api/orders/owner/{userId}    - One owner's orders (paged)
//! GET    /api/orders/{id}              - Fetch one order
//! POST   /api/orders                   - Place an order
//! PUT    /api/orders/{id}              - Update an order
//! PATCH  /api/orders/{id}/status       - Transition status (admin)
//! DELETE /api/orders/{id}              - Delete an order (admin)
//! ```

pub mod auth;
pub mod cart;
pub mod categories;
pub mod orders;
pub mod products;
pub mod users;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{delete, get, patch, post, put};
use axum::Router;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

use crate::auth::{Claims, GateError};
use crate::error::ApiError;
use crate::state::AppState;

/// List-endpoint query parameters.
#[derive(Debug, Deserialize)]
pub struct PageQuery {
    pub page: Option<u64>,
    pub limit: Option<u64>,
}

/// Claims for a gated operation.
///
/// The gate returns `Some` for every allowed protected operation; this
/// converts the impossible `None` into a denial rather than a panic.
pub(crate) fn require_claims(claims: Option<Claims>) -> Result<Claims, ApiError> {
    claims.ok_or(ApiError::Gate(GateError::MissingCredential))
}

/// The `/api` route tree.
pub fn api_router() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/users", get(users::list).post(users::create))
        .route(
            "/users/{id}",
            get(users::get).put(users::update).delete(users::remove),
        )
        .route("/products", get(products::list).post(products::create))
        .route("/products/upload-images", post(products::upload_images))
        .route(
            "/products/{id}",
            get(products::get)
                .put(products::update)
                .delete(products::remove),
        )
        .route("/categories", get(categories::list).post(categories::create))
        .route(
            "/categories/{id}",
            get(categories::get)
                .put(categories::update)
                .delete(categories::remove),
        )
        .route("/cart", get(cart::get))
        .route("/cart/add", post(cart::add_item))
        .route("/cart/update-item", put(cart::update_item))
        .route("/cart/remove-item", delete(cart::remove_item))
        .route("/cart/clear", delete(cart::clear))
        .route("/orders", get(orders::list).post(orders::create))
        .route("/orders/owner/{userId}", get(orders::list_by_owner))
        .route(
            "/orders/{id}",
            get(orders::get).put(orders::update).delete(orders::remove),
        )
        .route("/orders/{id}/status", patch(orders::update_status))
}

/// The complete application router.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/health/ready", get(readiness))
        .nest("/api", api_router())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Liveness health check. Does not touch dependencies.
async fn health() -> &'static str {
    "ok"
}

/// Readiness check: verifies database connectivity when one is
/// configured. In-memory deployments are always ready.
async fn readiness(State(state): State<AppState>) -> StatusCode {
    match state.pool() {
        None => StatusCode::OK,
        Some(pool) => match sqlx::query("SELECT 1").fetch_one(pool).await {
            Ok(_) => StatusCode::OK,
            Err(_) => StatusCode::SERVICE_UNAVAILABLE,
        },
    }
}
