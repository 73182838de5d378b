//! Order lifecycle.
//!
//! Orders snapshot their items at creation and never merge duplicates.
//! Status transitions are permissive, but leaving a terminal state is
//! logged for the operators.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;

use bazaar_core::{OrderId, OrderStatus, PageMeta, Role, UserId};

use crate::auth::Claims;
use crate::db::orders::OrderStore;
use crate::error::ApiError;
use crate::models::{NewOrder, Order, OrderUpdate};
use crate::sync::KeyedLocks;

use super::{bounded, page_params};

/// Order service.
pub struct OrderService {
    orders: Arc<dyn OrderStore>,
    locks: Arc<KeyedLocks>,
    deadline: Duration,
}

impl OrderService {
    #[must_use]
    pub fn new(orders: Arc<dyn OrderStore>, locks: Arc<KeyedLocks>, deadline: Duration) -> Self {
        Self {
            orders,
            locks,
            deadline,
        }
    }

    /// Place a new order.
    ///
    /// The order always starts `pending` and its total is recomputed from
    /// the items; anything the client claimed is discarded.
    pub async fn create(&self, owner_id: UserId, payload: NewOrder) -> Result<Order, ApiError> {
        if payload.items.is_empty() {
            return Err(ApiError::InvalidArgument(
                "Order must contain at least one item".to_owned(),
            ));
        }
        if payload.items.iter().any(|item| item.quantity == 0) {
            return Err(ApiError::InvalidArgument(
                "Quantity must be at least 1".to_owned(),
            ));
        }

        let mut order = Order::place(owner_id, payload);
        bounded(self.deadline, self.orders.insert(&order)).await?;
        order.version = 1;
        Ok(order)
    }

    /// Fetch one order, visible to admins and its owner.
    pub async fn get(&self, id: OrderId, claims: &Claims) -> Result<Order, ApiError> {
        let order = self.find(id).await?;
        check_access(&order, claims)?;
        Ok(order)
    }

    /// Admin listing across all owners.
    pub async fn list(
        &self,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<(Vec<Order>, PageMeta), ApiError> {
        let (page, limit) = page_params(page, limit);
        let total = bounded(self.deadline, self.orders.count()).await?;
        let orders = bounded(
            self.deadline,
            self.orders.list(PageMeta::skip(page, limit), limit),
        )
        .await?;
        Ok((orders, PageMeta::compute(page, limit, total)))
    }

    /// One owner's order history.
    pub async fn list_by_owner(
        &self,
        owner_id: UserId,
        page: Option<u64>,
        limit: Option<u64>,
    ) -> Result<(Vec<Order>, PageMeta), ApiError> {
        let (page, limit) = page_params(page, limit);
        let total = bounded(self.deadline, self.orders.count_by_owner(owner_id)).await?;
        let orders = bounded(
            self.deadline,
            self.orders
                .list_by_owner(owner_id, PageMeta::skip(page, limit), limit),
        )
        .await?;
        Ok((orders, PageMeta::compute(page, limit, total)))
    }

    /// Partial update, visible to admins and the order's owner.
    ///
    /// Supplying items replaces the list wholesale and recomputes the
    /// total unless an explicit total accompanies them.
    pub async fn update(
        &self,
        id: OrderId,
        claims: &Claims,
        update: OrderUpdate,
    ) -> Result<Order, ApiError> {
        if let Some(items) = &update.items
            && items.iter().any(|item| item.quantity == 0)
        {
            return Err(ApiError::InvalidArgument(
                "Quantity must be at least 1".to_owned(),
            ));
        }

        let _guard = self.locks.acquire(id.as_uuid()).await;

        let mut order = self.find(id).await?;
        check_access(&order, claims)?;

        order.apply_update(update);
        self.persist(order).await
    }

    /// Admin-only status transition.
    pub async fn update_status(&self, id: OrderId, status: &str) -> Result<Order, ApiError> {
        let status: OrderStatus = status
            .parse()
            .map_err(|e: bazaar_core::StatusParseError| ApiError::InvalidArgument(e.to_string()))?;

        let _guard = self.locks.acquire(id.as_uuid()).await;

        let mut order = self.find(id).await?;
        if order.status.is_terminal() && status != order.status {
            tracing::warn!(
                order_id = %order.id,
                from = %order.status,
                to = %status,
                "order leaving a terminal status"
            );
        }
        order.status = status;
        order.updated_at = Utc::now();
        self.persist(order).await
    }

    /// Admin-only removal.
    pub async fn delete(&self, id: OrderId) -> Result<(), ApiError> {
        let removed = bounded(self.deadline, self.orders.delete(id)).await?;
        if removed {
            Ok(())
        } else {
            Err(ApiError::NotFound("Order not found".to_owned()))
        }
    }

    async fn find(&self, id: OrderId) -> Result<Order, ApiError> {
        bounded(self.deadline, self.orders.find(id))
            .await?
            .ok_or_else(|| ApiError::NotFound("Order not found".to_owned()))
    }

    async fn persist(&self, mut order: Order) -> Result<Order, ApiError> {
        bounded(self.deadline, self.orders.update(&order)).await?;
        order.version += 1;
        Ok(order)
    }
}

/// Admins see every order; users only their own.
fn check_access(order: &Order, claims: &Claims) -> Result<(), ApiError> {
    if claims.role == Role::Admin || order.owner_id == claims.sub {
        Ok(())
    } else {
        Err(ApiError::Gate(crate::auth::GateError::InsufficientRole))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use bazaar_core::{LineItemDraft, ProductId};

    use crate::db::memory::MemoryOrderStore;
    use crate::models::ShippingAddress;

    fn service() -> OrderService {
        OrderService::new(
            Arc::new(MemoryOrderStore::default()),
            Arc::new(KeyedLocks::new()),
            Duration::from_secs(1),
        )
    }

    fn claims(sub: UserId, role: Role) -> Claims {
        Claims {
            sub,
            email: "a@b.test".to_owned(),
            role,
            exp: 4_102_444_800,
        }
    }

    fn payload(quantity: u32) -> NewOrder {
        NewOrder {
            items: vec![LineItemDraft {
                product_id: ProductId::generate(),
                name: "Widget".to_owned(),
                unit_price: Decimal::from(10),
                quantity,
            }],
            shipping_address: ShippingAddress {
                full_name: "Ada Lovelace".to_owned(),
                street: "1 Analytical Way".to_owned(),
                city: "London".to_owned(),
                postal_code: "SW1".to_owned(),
                country: "UK".to_owned(),
            },
        }
    }

    #[tokio::test]
    async fn create_starts_pending() {
        let order = service()
            .create(UserId::generate(), payload(2))
            .await
            .expect("create");
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, Decimal::from(20));
    }

    #[tokio::test]
    async fn empty_order_is_rejected() {
        let mut empty = payload(1);
        empty.items.clear();
        let err = service()
            .create(UserId::generate(), empty)
            .await
            .expect_err("must reject");
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn owner_sees_own_order_but_not_others() {
        let service = service();
        let owner = UserId::generate();
        let order = service.create(owner, payload(1)).await.expect("create");

        service
            .get(order.id, &claims(owner, Role::User))
            .await
            .expect("owner access");

        let err = service
            .get(order.id, &claims(UserId::generate(), Role::User))
            .await
            .expect_err("stranger denied");
        assert!(matches!(
            err,
            ApiError::Gate(crate::auth::GateError::InsufficientRole)
        ));

        service
            .get(order.id, &claims(UserId::generate(), Role::Admin))
            .await
            .expect("admin access");
    }

    #[tokio::test]
    async fn unknown_status_is_rejected() {
        let service = service();
        let order = service
            .create(UserId::generate(), payload(1))
            .await
            .expect("create");
        let err = service
            .update_status(order.id, "teleported")
            .await
            .expect_err("must reject");
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn status_transition_persists() {
        let service = service();
        let order = service
            .create(UserId::generate(), payload(1))
            .await
            .expect("create");
        let updated = service
            .update_status(order.id, "Shipped")
            .await
            .expect("transition");
        assert_eq!(updated.status, OrderStatus::Shipped);
    }

    #[tokio::test]
    async fn update_with_items_recomputes_total() {
        let service = service();
        let owner = UserId::generate();
        let order = service.create(owner, payload(1)).await.expect("create");

        let updated = service
            .update(
                order.id,
                &claims(owner, Role::User),
                OrderUpdate {
                    items: Some(vec![LineItemDraft {
                        product_id: ProductId::generate(),
                        name: "Gadget".to_owned(),
                        unit_price: Decimal::from(7),
                        quantity: 3,
                    }]),
                    ..OrderUpdate::default()
                },
            )
            .await
            .expect("update");
        assert_eq!(updated.total, Decimal::from(21));
    }

    #[tokio::test]
    async fn delete_missing_order_is_not_found() {
        let err = service()
            .delete(OrderId::generate())
            .await
            .expect_err("missing");
        assert!(matches!(err, ApiError::NotFound(_)));
    }
}
