//! Order entity and its payloads.
//!
//! An order snapshots its line items at creation time: later catalog or
//! cart changes never reach back into a placed order. Duplicate products
//! in the item list are preserved as-is, never merged.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{LineItem, LineItemDraft, OrderId, OrderStatus, UserId, ledger};

/// Delivery destination attached to an order.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ShippingAddress {
    pub full_name: String,
    pub street: String,
    pub city: String,
    pub postal_code: String,
    pub country: String,
}

/// A placed order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    pub id: OrderId,
    pub owner_id: UserId,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    pub status: OrderStatus,
    pub shipping_address: ShippingAddress,
    /// Optimistic-concurrency counter, bumped by the store on save.
    #[serde(skip_serializing)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Order creation payload.
///
/// Any client-submitted total or status is discarded: new orders are
/// always `pending` and the total is recomputed from the items.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewOrder {
    pub items: Vec<LineItemDraft>,
    pub shipping_address: ShippingAddress,
}

/// Partial order update.
///
/// Supplying `items` replaces the list wholesale. A supplied `total` is
/// honored as-is; when only `items` is supplied the total is recomputed.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderUpdate {
    pub items: Option<Vec<LineItemDraft>>,
    pub total: Option<Decimal>,
    pub shipping_address: Option<ShippingAddress>,
}

impl Order {
    /// Materialize a new `pending` order from its creation payload.
    #[must_use]
    pub fn place(owner_id: UserId, payload: NewOrder) -> Self {
        let items = ledger::snapshot_items(payload.items);
        let total = ledger::items_total(&items);
        let now = Utc::now();
        Self {
            id: OrderId::generate(),
            owner_id,
            items,
            total,
            status: OrderStatus::default(),
            shipping_address: payload.shipping_address,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place.
    pub fn apply_update(&mut self, update: OrderUpdate) {
        let items_changed = update.items.is_some();
        if let Some(drafts) = update.items {
            self.items = ledger::snapshot_items(drafts);
        }
        match update.total {
            Some(total) => self.total = total,
            None if items_changed => self.total = ledger::items_total(&self.items),
            None => {}
        }
        if let Some(address) = update.shipping_address {
            self.shipping_address = address;
        }
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::ProductId;

    fn address() -> ShippingAddress {
        ShippingAddress {
            full_name: "Ada Lovelace".to_owned(),
            street: "1 Analytical Way".to_owned(),
            city: "London".to_owned(),
            postal_code: "SW1".to_owned(),
            country: "UK".to_owned(),
        }
    }

    fn draft(price: &str, quantity: u32) -> LineItemDraft {
        LineItemDraft {
            product_id: ProductId::generate(),
            name: "Widget".to_owned(),
            unit_price: price.parse().expect("decimal literal"),
            quantity,
        }
    }

    #[test]
    fn placed_order_is_pending_with_recomputed_total() {
        let order = Order::place(
            UserId::generate(),
            NewOrder {
                items: vec![draft("10", 2), draft("5", 1)],
                shipping_address: address(),
            },
        );
        assert_eq!(order.status, OrderStatus::Pending);
        assert_eq!(order.total, "25".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn update_with_items_only_recomputes_total() {
        let mut order = Order::place(
            UserId::generate(),
            NewOrder {
                items: vec![draft("10", 1)],
                shipping_address: address(),
            },
        );
        order.apply_update(OrderUpdate {
            items: Some(vec![draft("7", 3)]),
            ..OrderUpdate::default()
        });
        assert_eq!(order.total, "21".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn update_honors_supplied_total() {
        let mut order = Order::place(
            UserId::generate(),
            NewOrder {
                items: vec![draft("10", 1)],
                shipping_address: address(),
            },
        );
        order.apply_update(OrderUpdate {
            total: Some("8.50".parse().expect("decimal")),
            ..OrderUpdate::default()
        });
        assert_eq!(order.total, "8.50".parse::<Decimal>().expect("decimal"));
        assert_eq!(order.items.len(), 1, "items untouched");
    }
}
