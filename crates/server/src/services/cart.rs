//! The per-owner cart ledger.
//!
//! Mutations on one owner's cart are serialized through [`KeyedLocks`],
//! so concurrent adds for the same product aggregate instead of
//! clobbering each other. The versioned save in the store is the
//! backstop for out-of-process writers.

use std::sync::Arc;
use std::time::Duration;

use bazaar_core::{LineItemDraft, ProductId, UserId, ledger};

use crate::db::carts::CartStore;
use crate::error::ApiError;
use crate::models::Cart;
use crate::sync::KeyedLocks;

use super::bounded;

/// Cart service.
pub struct CartService {
    carts: Arc<dyn CartStore>,
    locks: Arc<KeyedLocks>,
    deadline: Duration,
}

impl CartService {
    #[must_use]
    pub fn new(carts: Arc<dyn CartStore>, locks: Arc<KeyedLocks>, deadline: Duration) -> Self {
        Self {
            carts,
            locks,
            deadline,
        }
    }

    /// Fetch an owner's cart.
    pub async fn get_by_owner(&self, owner_id: UserId) -> Result<Cart, ApiError> {
        bounded(self.deadline, self.carts.find_by_owner(owner_id))
            .await?
            .ok_or_else(|| ApiError::NotFound("Cart not found".to_owned()))
    }

    /// Add an item, creating the cart on first use.
    ///
    /// An item for a product already in the cart merges additively; the
    /// stored unit price and name win over the submitted ones.
    pub async fn add_item(&self, owner_id: UserId, draft: LineItemDraft) -> Result<Cart, ApiError> {
        validate_quantity(draft.quantity)?;

        let _guard = self.locks.acquire(owner_id.as_uuid()).await;

        let mut cart = bounded(self.deadline, self.carts.find_by_owner(owner_id))
            .await?
            .unwrap_or_else(|| Cart::new(owner_id));

        ledger::merge_item(&mut cart.items, draft);
        cart.recompute_total();

        self.persist(cart).await
    }

    /// Set the quantity of an existing line item.
    pub async fn update_quantity(
        &self,
        owner_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<Cart, ApiError> {
        validate_quantity(quantity)?;

        let _guard = self.locks.acquire(owner_id.as_uuid()).await;

        let mut cart = bounded(self.deadline, self.carts.find_by_owner(owner_id))
            .await?
            .ok_or_else(|| ApiError::NotFound("Cart not found".to_owned()))?;

        let item = cart
            .items
            .iter_mut()
            .find(|item| item.product_id == product_id)
            .ok_or_else(|| ApiError::NotFound("Item not found in cart".to_owned()))?;
        ledger::set_quantity(item, quantity);
        cart.recompute_total();

        self.persist(cart).await
    }

    /// Remove a line item. Removing the last item deletes the cart and
    /// returns `None`.
    pub async fn remove_item(
        &self,
        owner_id: UserId,
        product_id: ProductId,
    ) -> Result<Option<Cart>, ApiError> {
        let _guard = self.locks.acquire(owner_id.as_uuid()).await;

        let mut cart = bounded(self.deadline, self.carts.find_by_owner(owner_id))
            .await?
            .ok_or_else(|| ApiError::NotFound("Cart not found".to_owned()))?;

        let before = cart.items.len();
        cart.items.retain(|item| item.product_id != product_id);
        if cart.items.len() == before {
            return Err(ApiError::NotFound("Item not found in cart".to_owned()));
        }

        if cart.is_empty() {
            bounded(self.deadline, self.carts.delete_by_owner(owner_id)).await?;
            return Ok(None);
        }

        cart.recompute_total();
        self.persist(cart).await.map(Some)
    }

    /// Drop an owner's cart entirely. Returns whether one existed.
    pub async fn clear(&self, owner_id: UserId) -> Result<bool, ApiError> {
        let _guard = self.locks.acquire(owner_id.as_uuid()).await;
        bounded(self.deadline, self.carts.delete_by_owner(owner_id)).await
    }

    async fn persist(&self, mut cart: Cart) -> Result<Cart, ApiError> {
        bounded(self.deadline, self.carts.save(&cart)).await?;
        // Mirror the store's version bump so the returned snapshot is
        // usable for a follow-up save.
        cart.version += 1;
        Ok(cart)
    }
}

fn validate_quantity(quantity: u32) -> Result<(), ApiError> {
    if quantity == 0 {
        return Err(ApiError::InvalidArgument(
            "Quantity must be at least 1".to_owned(),
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::db::memory::MemoryCartStore;

    fn service() -> CartService {
        CartService::new(
            Arc::new(MemoryCartStore::default()),
            Arc::new(KeyedLocks::new()),
            Duration::from_secs(1),
        )
    }

    fn draft(product_id: ProductId, price: &str, quantity: u32) -> LineItemDraft {
        LineItemDraft {
            product_id,
            name: "Widget".to_owned(),
            unit_price: price.parse().expect("decimal literal"),
            quantity,
        }
    }

    #[tokio::test]
    async fn add_creates_then_merges() {
        let service = service();
        let owner = UserId::generate();
        let p1 = ProductId::generate();

        let cart = service
            .add_item(owner, draft(p1, "10", 2))
            .await
            .expect("first add");
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, Decimal::from(20));

        let cart = service
            .add_item(owner, draft(p1, "10", 3))
            .await
            .expect("second add");
        assert_eq!(cart.items.len(), 1, "same product merges");
        assert_eq!(cart.items[0].quantity, 5);
        assert_eq!(cart.total, Decimal::from(50));
    }

    #[tokio::test]
    async fn zero_quantity_is_rejected() {
        let err = service()
            .add_item(UserId::generate(), draft(ProductId::generate(), "10", 0))
            .await
            .expect_err("must reject");
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn update_quantity_requires_existing_item() {
        let service = service();
        let owner = UserId::generate();
        service
            .add_item(owner, draft(ProductId::generate(), "10", 1))
            .await
            .expect("add");

        let err = service
            .update_quantity(owner, ProductId::generate(), 2)
            .await
            .expect_err("unknown product");
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn removing_last_item_deletes_the_cart() {
        let service = service();
        let owner = UserId::generate();
        let p1 = ProductId::generate();
        service.add_item(owner, draft(p1, "10", 2)).await.expect("add");

        let outcome = service.remove_item(owner, p1).await.expect("remove");
        assert!(outcome.is_none(), "empty cart is deleted");

        let err = service.get_by_owner(owner).await.expect_err("cart gone");
        assert!(matches!(err, ApiError::NotFound(_)));
    }

    #[tokio::test]
    async fn removing_one_of_two_items_keeps_the_cart() {
        let service = service();
        let owner = UserId::generate();
        let p1 = ProductId::generate();
        let p2 = ProductId::generate();
        service.add_item(owner, draft(p1, "10", 1)).await.expect("add p1");
        service.add_item(owner, draft(p2, "5", 2)).await.expect("add p2");

        let cart = service
            .remove_item(owner, p1)
            .await
            .expect("remove")
            .expect("cart survives");
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.total, Decimal::from(10));
    }

    #[tokio::test]
    async fn clear_reports_whether_a_cart_existed() {
        let service = service();
        let owner = UserId::generate();
        assert!(!service.clear(owner).await.expect("clear missing"));

        service
            .add_item(owner, draft(ProductId::generate(), "10", 1))
            .await
            .expect("add");
        assert!(service.clear(owner).await.expect("clear present"));
    }

    #[tokio::test]
    async fn concurrent_adds_for_same_product_aggregate() {
        let service = Arc::new(service());
        let owner = UserId::generate();
        let p1 = ProductId::generate();

        let mut handles = Vec::new();
        for _ in 0..10 {
            let service = Arc::clone(&service);
            handles.push(tokio::spawn(async move {
                service.add_item(owner, draft(p1, "10", 1)).await
            }));
        }
        for handle in handles {
            handle.await.expect("task").expect("add");
        }

        let cart = service.get_by_owner(owner).await.expect("cart");
        assert_eq!(cart.items.len(), 1);
        assert_eq!(cart.items[0].quantity, 10);
        assert_eq!(cart.total, Decimal::from(100));
    }
}
