//! In-memory store implementations.
//!
//! Used by the test suites (and nothing else) so services and routes can
//! be exercised without a database. They uphold the same contracts as
//! the `PostgreSQL` stores: unique constraints report `Conflict`,
//! versioned saves compare-and-swap, deletes report whether anything
//! was removed.

use std::collections::HashMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use bazaar_core::{CategoryId, OrderId, ProductId, UserId};

use super::carts::CartStore;
use super::categories::CategoryStore;
use super::orders::OrderStore;
use super::products::ProductStore;
use super::users::UserStore;
use super::RepositoryError;
use crate::models::{Cart, Category, Order, Product, User};

fn page<T: Clone>(mut entries: Vec<T>, offset: u64, limit: u64) -> Vec<T> {
    let offset = usize::try_from(offset).unwrap_or(usize::MAX);
    let limit = usize::try_from(limit).unwrap_or(usize::MAX);
    if offset >= entries.len() {
        return Vec::new();
    }
    entries.drain(..offset);
    entries.truncate(limit);
    entries
}

/// In-memory [`UserStore`].
#[derive(Default)]
pub struct MemoryUserStore {
    users: RwLock<HashMap<UserId, User>>,
}

#[async_trait]
impl UserStore for MemoryUserStore {
    async fn find(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.users.read().await.get(&id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .users
            .read()
            .await
            .values()
            .find(|u| u.email == email)
            .cloned())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<User>, RepositoryError> {
        let mut users: Vec<User> = self.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(users, offset, limit))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.users.read().await.len() as u64)
    }

    async fn insert(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(
                "User with this email already exists".to_owned(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(())
    }

    async fn update(&self, user: &User) -> Result<(), RepositoryError> {
        let mut users = self.users.write().await;
        if users
            .values()
            .any(|u| u.id != user.id && u.email == user.email)
        {
            return Err(RepositoryError::Conflict(
                "User with this email already exists".to_owned(),
            ));
        }
        match users.get_mut(&user.id) {
            Some(stored) => {
                *stored = user.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: UserId) -> Result<bool, RepositoryError> {
        Ok(self.users.write().await.remove(&id).is_some())
    }
}

/// In-memory [`ProductStore`].
#[derive(Default)]
pub struct MemoryProductStore {
    products: RwLock<HashMap<ProductId, Product>>,
}

#[async_trait]
impl ProductStore for MemoryProductStore {
    async fn find(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.products.read().await.get(&id).cloned())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self.products.read().await.values().cloned().collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(products, offset, limit))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.products.read().await.len() as u64)
    }

    async fn insert(&self, product: &Product) -> Result<(), RepositoryError> {
        self.products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(())
    }

    async fn update(&self, product: &Product) -> Result<(), RepositoryError> {
        let mut products = self.products.write().await;
        match products.get_mut(&product.id) {
            Some(stored) => {
                *stored = product.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: ProductId) -> Result<bool, RepositoryError> {
        Ok(self.products.write().await.remove(&id).is_some())
    }
}

/// In-memory [`CategoryStore`].
#[derive(Default)]
pub struct MemoryCategoryStore {
    categories: RwLock<HashMap<CategoryId, Category>>,
}

#[async_trait]
impl CategoryStore for MemoryCategoryStore {
    async fn find(&self, id: CategoryId) -> Result<Option<Category>, RepositoryError> {
        Ok(self.categories.read().await.get(&id).cloned())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Category>, RepositoryError> {
        let mut categories: Vec<Category> =
            self.categories.read().await.values().cloned().collect();
        categories.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(page(categories, offset, limit))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.categories.read().await.len() as u64)
    }

    async fn insert(&self, category: &Category) -> Result<(), RepositoryError> {
        let mut categories = self.categories.write().await;
        if categories.values().any(|c| c.name == category.name) {
            return Err(RepositoryError::Conflict(
                "Category with this name already exists".to_owned(),
            ));
        }
        categories.insert(category.id, category.clone());
        Ok(())
    }

    async fn update(&self, category: &Category) -> Result<(), RepositoryError> {
        let mut categories = self.categories.write().await;
        if categories
            .values()
            .any(|c| c.id != category.id && c.name == category.name)
        {
            return Err(RepositoryError::Conflict(
                "Category with this name already exists".to_owned(),
            ));
        }
        match categories.get_mut(&category.id) {
            Some(stored) => {
                *stored = category.clone();
                Ok(())
            }
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: CategoryId) -> Result<bool, RepositoryError> {
        Ok(self.categories.write().await.remove(&id).is_some())
    }
}

/// In-memory [`CartStore`] with the same versioned-save contract as the
/// `PostgreSQL` implementation.
#[derive(Default)]
pub struct MemoryCartStore {
    carts: RwLock<HashMap<UserId, Cart>>,
}

#[async_trait]
impl CartStore for MemoryCartStore {
    async fn find_by_owner(&self, owner_id: UserId) -> Result<Option<Cart>, RepositoryError> {
        Ok(self.carts.read().await.get(&owner_id).cloned())
    }

    async fn save(&self, cart: &Cart) -> Result<(), RepositoryError> {
        let mut carts = self.carts.write().await;
        let stored_version = carts.get(&cart.owner_id).map(|c| c.version);
        let matches = match stored_version {
            None => cart.version == 0,
            Some(version) => version == cart.version,
        };
        if !matches {
            return Err(RepositoryError::Conflict(
                "Cart was modified concurrently".to_owned(),
            ));
        }
        let mut persisted = cart.clone();
        persisted.version += 1;
        carts.insert(cart.owner_id, persisted);
        Ok(())
    }

    async fn delete_by_owner(&self, owner_id: UserId) -> Result<bool, RepositoryError> {
        Ok(self.carts.write().await.remove(&owner_id).is_some())
    }
}

/// In-memory [`OrderStore`] with the same versioned-update contract as
/// the `PostgreSQL` implementation.
#[derive(Default)]
pub struct MemoryOrderStore {
    orders: RwLock<HashMap<OrderId, Order>>,
}

#[async_trait]
impl OrderStore for MemoryOrderStore {
    async fn find(&self, id: OrderId) -> Result<Option<Order>, RepositoryError> {
        Ok(self.orders.read().await.get(&id).cloned())
    }

    async fn list(&self, offset: u64, limit: u64) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self.orders.read().await.values().cloned().collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(orders, offset, limit))
    }

    async fn list_by_owner(
        &self,
        owner_id: UserId,
        offset: u64,
        limit: u64,
    ) -> Result<Vec<Order>, RepositoryError> {
        let mut orders: Vec<Order> = self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.owner_id == owner_id)
            .cloned()
            .collect();
        orders.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(page(orders, offset, limit))
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        Ok(self.orders.read().await.len() as u64)
    }

    async fn count_by_owner(&self, owner_id: UserId) -> Result<u64, RepositoryError> {
        Ok(self
            .orders
            .read()
            .await
            .values()
            .filter(|o| o.owner_id == owner_id)
            .count() as u64)
    }

    async fn insert(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut persisted = order.clone();
        persisted.version = 1;
        self.orders.write().await.insert(order.id, persisted);
        Ok(())
    }

    async fn update(&self, order: &Order) -> Result<(), RepositoryError> {
        let mut orders = self.orders.write().await;
        match orders.get_mut(&order.id) {
            Some(stored) if stored.version == order.version => {
                let mut persisted = order.clone();
                persisted.version += 1;
                *stored = persisted;
                Ok(())
            }
            Some(_) => Err(RepositoryError::Conflict(
                "Order was modified concurrently".to_owned(),
            )),
            None => Err(RepositoryError::NotFound),
        }
    }

    async fn delete(&self, id: OrderId) -> Result<bool, RepositoryError> {
        Ok(self.orders.write().await.remove(&id).is_some())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::Role;

    #[tokio::test]
    async fn duplicate_email_conflicts() {
        let store = MemoryUserStore::default();
        let first = User::new(
            "a@b.test".to_owned(),
            "Ada".to_owned(),
            "hash".to_owned(),
            Role::User,
        );
        let second = User::new(
            "a@b.test".to_owned(),
            "Grace".to_owned(),
            "hash".to_owned(),
            Role::User,
        );
        store.insert(&first).await.expect("first insert");
        assert!(matches!(
            store.insert(&second).await,
            Err(RepositoryError::Conflict(_))
        ));
    }

    #[tokio::test]
    async fn cart_save_detects_stale_version() {
        let store = MemoryCartStore::default();
        let owner = UserId::generate();
        let cart = Cart::new(owner);
        store.save(&cart).await.expect("initial save");

        // A second save from the same stale snapshot must lose.
        assert!(matches!(
            store.save(&cart).await,
            Err(RepositoryError::Conflict(_))
        ));

        let fresh = store
            .find_by_owner(owner)
            .await
            .expect("find")
            .expect("cart exists");
        assert_eq!(fresh.version, 1);
        store.save(&fresh).await.expect("save from fresh snapshot");
    }

    #[tokio::test]
    async fn paging_clamps_out_of_range_offsets() {
        let store = MemoryProductStore::default();
        assert!(store.list(100, 10).await.expect("list").is_empty());
    }
}
