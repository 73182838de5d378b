//! Line-item arithmetic shared by the cart and order subsystems.
//!
//! All monetary recomputation is authoritative from source fields
//! (`unit_price * quantity`); a client-submitted subtotal or total is
//! never trusted. Cart merging is keyed by `product_id` equality only -
//! the item name is not part of the identity key - and quantity merge is
//! additive, never max/replace.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::ProductId;

/// A priced line entry attached to a cart or an order.
///
/// Invariant: `subtotal == unit_price * quantity` at all times after any
/// mutation completes. Construct via [`LineItemDraft::into_item`] or
/// mutate through [`set_quantity`] / [`merge_item`] to preserve it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItem {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
    pub subtotal: Decimal,
}

/// A client-submitted line item, before the subtotal is computed.
///
/// Any `subtotal` field a client sends is ignored during deserialization;
/// the engine recomputes it from `unit_price * quantity`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemDraft {
    pub product_id: ProductId,
    pub name: String,
    pub unit_price: Decimal,
    pub quantity: u32,
}

impl LineItemDraft {
    /// Materialize the draft, computing its subtotal.
    #[must_use]
    pub fn into_item(self) -> LineItem {
        let subtotal = self.unit_price * Decimal::from(self.quantity);
        LineItem {
            product_id: self.product_id,
            name: self.name,
            unit_price: self.unit_price,
            quantity: self.quantity,
            subtotal,
        }
    }
}

/// Set an item's quantity and restore its subtotal invariant.
pub fn set_quantity(item: &mut LineItem, quantity: u32) {
    item.quantity = quantity;
    item.subtotal = item.unit_price * Decimal::from(quantity);
}

/// Merge a candidate into an item list, keyed by `product_id`.
///
/// On a match the quantities are added and the subtotal recomputed from
/// the *stored* unit price; the candidate's price and name are discarded
/// (first price wins). Without a match the candidate is appended with a
/// computed subtotal.
pub fn merge_item(items: &mut Vec<LineItem>, candidate: LineItemDraft) {
    match items
        .iter_mut()
        .find(|item| item.product_id == candidate.product_id)
    {
        Some(existing) => {
            let quantity = existing.quantity.saturating_add(candidate.quantity);
            set_quantity(existing, quantity);
        }
        None => items.push(candidate.into_item()),
    }
}

/// Sum of all item subtotals.
#[must_use]
pub fn items_total(items: &[LineItem]) -> Decimal {
    items.iter().map(|item| item.subtotal).sum()
}

/// Materialize a snapshot item list, recomputing every subtotal.
///
/// Used by order creation and wholesale item replacement: duplicates by
/// `product_id` are permitted and no merge happens.
#[must_use]
pub fn snapshot_items(drafts: Vec<LineItemDraft>) -> Vec<LineItem> {
    drafts.into_iter().map(LineItemDraft::into_item).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft(product_id: ProductId, price: &str, quantity: u32) -> LineItemDraft {
        LineItemDraft {
            product_id,
            name: "Widget".to_owned(),
            unit_price: price.parse().expect("decimal literal"),
            quantity,
        }
    }

    #[test]
    fn draft_computes_subtotal() {
        let item = draft(ProductId::generate(), "10", 2).into_item();
        assert_eq!(item.subtotal, "20".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn merge_adds_quantities_for_same_product() {
        let p1 = ProductId::generate();
        let mut items = Vec::new();
        merge_item(&mut items, draft(p1, "10", 2));
        merge_item(&mut items, draft(p1, "10", 3));

        assert_eq!(items.len(), 1, "same product must merge, not duplicate");
        assert_eq!(items[0].quantity, 5);
        assert_eq!(items[0].subtotal, "50".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn merge_keeps_stored_price_and_name() {
        let p1 = ProductId::generate();
        let mut items = Vec::new();
        merge_item(&mut items, draft(p1, "10", 1));

        let mut drifted = draft(p1, "12.50", 1);
        drifted.name = "Widget (renamed)".to_owned();
        merge_item(&mut items, drifted);

        assert_eq!(items[0].name, "Widget");
        assert_eq!(
            items[0].unit_price,
            "10".parse::<Decimal>().expect("decimal")
        );
        assert_eq!(items[0].subtotal, "20".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn merge_identity_is_product_id_not_name() {
        let mut items = Vec::new();
        merge_item(&mut items, draft(ProductId::generate(), "10", 1));

        let mut same_name = draft(ProductId::generate(), "10", 1);
        same_name.name = "Widget".to_owned();
        merge_item(&mut items, same_name);

        assert_eq!(items.len(), 2);
    }

    #[test]
    fn total_sums_subtotals() {
        let mut items = Vec::new();
        merge_item(&mut items, draft(ProductId::generate(), "10", 2));
        merge_item(&mut items, draft(ProductId::generate(), "2.50", 4));
        assert_eq!(items_total(&items), "30".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn total_of_empty_list_is_zero() {
        assert_eq!(items_total(&[]), Decimal::ZERO);
    }

    #[test]
    fn set_quantity_restores_invariant() {
        let mut item = draft(ProductId::generate(), "3.33", 1).into_item();
        set_quantity(&mut item, 3);
        assert_eq!(item.subtotal, "9.99".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn snapshot_permits_duplicate_products() {
        let p1 = ProductId::generate();
        let items = snapshot_items(vec![draft(p1, "10", 1), draft(p1, "10", 2)]);
        assert_eq!(items.len(), 2, "orders never merge duplicates");
        assert_eq!(items_total(&items), "30".parse::<Decimal>().expect("decimal"));
    }

    #[test]
    fn client_submitted_subtotal_is_ignored() {
        let json = r#"{"productId":"7f7c2b2e-8a50-4f8e-9f3d-0b8f4d7a1c2e","name":"Widget","unitPrice":"10","quantity":2,"subtotal":"999"}"#;
        let parsed: LineItemDraft = serde_json::from_str(json).expect("deserialize draft");
        assert_eq!(parsed.into_item().subtotal, "20".parse::<Decimal>().expect("decimal"));
    }
}
