//! Shopping cart entity.
//!
//! One live cart per owner. The stored `total` is always the sum of the
//! line subtotals; every mutation recomputes it before the save.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use bazaar_core::{CartId, LineItem, UserId, ledger};

/// A cart and its aggregated line items.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Cart {
    pub id: CartId,
    pub owner_id: UserId,
    pub items: Vec<LineItem>,
    pub total: Decimal,
    /// Optimistic-concurrency counter, bumped by the store on save.
    #[serde(skip_serializing)]
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// An empty cart for `owner_id`.
    #[must_use]
    pub fn new(owner_id: UserId) -> Self {
        let now = Utc::now();
        Self {
            id: CartId::generate(),
            owner_id,
            items: Vec::new(),
            total: Decimal::ZERO,
            version: 0,
            created_at: now,
            updated_at: now,
        }
    }

    /// Recompute the aggregate total from the line subtotals.
    pub fn recompute_total(&mut self) {
        self.total = ledger::items_total(&self.items);
        self.updated_at = Utc::now();
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bazaar_core::{LineItemDraft, ProductId};

    #[test]
    fn total_tracks_line_subtotals() {
        let mut cart = Cart::new(UserId::generate());
        ledger::merge_item(
            &mut cart.items,
            LineItemDraft {
                product_id: ProductId::generate(),
                name: "Mug".to_owned(),
                unit_price: Decimal::new(500, 2),
                quantity: 3,
            },
        );
        cart.recompute_total();
        assert_eq!(cart.total, Decimal::new(1500, 2));
    }
}
