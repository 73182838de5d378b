//! Shared application state.

use std::sync::Arc;

use sqlx::PgPool;

use crate::auth::{AuthorizationGate, TokenIssuer};
use crate::config::AppConfig;
use crate::db::carts::PgCartStore;
use crate::db::categories::PgCategoryStore;
use crate::db::memory::{
    MemoryCartStore, MemoryCategoryStore, MemoryOrderStore, MemoryProductStore, MemoryUserStore,
};
use crate::db::orders::PgOrderStore;
use crate::db::products::PgProductStore;
use crate::db::users::PgUserStore;
use crate::db::{carts::CartStore, categories::CategoryStore, orders::OrderStore,
    products::ProductStore, users::UserStore};
use crate::services::{
    AuthService, CartService, CategoryService, DisabledImageStore, HttpImageStore, ImageStorage,
    OrderService, ProductService, UserService,
};
use crate::sync::KeyedLocks;

struct Inner {
    gate: AuthorizationGate,
    auth: AuthService,
    users: UserService,
    products: ProductService,
    categories: CategoryService,
    cart: CartService,
    orders: OrderService,
    pool: Option<PgPool>,
}

/// Handle to every service the routes need. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<Inner>,
}

struct Stores {
    users: Arc<dyn UserStore>,
    products: Arc<dyn ProductStore>,
    categories: Arc<dyn CategoryStore>,
    carts: Arc<dyn CartStore>,
    orders: Arc<dyn OrderStore>,
}

impl AppState {
    /// Production state backed by `PostgreSQL`.
    #[must_use]
    pub fn postgres(config: &AppConfig, pool: PgPool) -> Self {
        let stores = Stores {
            users: Arc::new(PgUserStore::new(pool.clone())),
            products: Arc::new(PgProductStore::new(pool.clone())),
            categories: Arc::new(PgCategoryStore::new(pool.clone())),
            carts: Arc::new(PgCartStore::new(pool.clone())),
            orders: Arc::new(PgOrderStore::new(pool.clone())),
        };
        Self::build(config, stores, Some(pool))
    }

    /// Test state backed by the in-memory stores.
    #[must_use]
    pub fn in_memory(config: &AppConfig) -> Self {
        let stores = Stores {
            users: Arc::new(MemoryUserStore::default()),
            products: Arc::new(MemoryProductStore::default()),
            categories: Arc::new(MemoryCategoryStore::default()),
            carts: Arc::new(MemoryCartStore::default()),
            orders: Arc::new(MemoryOrderStore::default()),
        };
        Self::build(config, stores, None)
    }

    fn build(config: &AppConfig, stores: Stores, pool: Option<PgPool>) -> Self {
        let gate = AuthorizationGate::new(&config.jwt_secret);
        let issuer = Arc::new(TokenIssuer::new(&config.jwt_secret, config.token_ttl));
        let locks = Arc::new(KeyedLocks::new());
        let deadline = config.repository_timeout;

        let images: Arc<dyn ImageStorage> = match &config.image_store_url {
            Some(url) => Arc::new(HttpImageStore::new(url.clone())),
            None => Arc::new(DisabledImageStore),
        };

        let inner = Inner {
            gate,
            auth: AuthService::new(Arc::clone(&stores.users), issuer, deadline),
            users: UserService::new(Arc::clone(&stores.users), deadline),
            products: ProductService::new(Arc::clone(&stores.products), images, deadline),
            categories: CategoryService::new(Arc::clone(&stores.categories), deadline),
            cart: CartService::new(Arc::clone(&stores.carts), Arc::clone(&locks), deadline),
            orders: OrderService::new(Arc::clone(&stores.orders), locks, deadline),
            pool,
        };
        Self {
            inner: Arc::new(inner),
        }
    }

    #[must_use]
    pub fn gate(&self) -> &AuthorizationGate {
        &self.inner.gate
    }

    #[must_use]
    pub fn auth(&self) -> &AuthService {
        &self.inner.auth
    }

    #[must_use]
    pub fn users(&self) -> &UserService {
        &self.inner.users
    }

    #[must_use]
    pub fn products(&self) -> &ProductService {
        &self.inner.products
    }

    #[must_use]
    pub fn categories(&self) -> &CategoryService {
        &self.inner.categories
    }

    #[must_use]
    pub fn cart(&self) -> &CartService {
        &self.inner.cart
    }

    #[must_use]
    pub fn orders(&self) -> &OrderService {
        &self.inner.orders
    }

    /// The database pool, absent for in-memory state.
    #[must_use]
    pub fn pool(&self) -> Option<&PgPool> {
        self.inner.pool.as_ref()
    }
}
