//! Catalog product entity.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use bazaar_core::{CategoryId, ProductId};

/// A catalog product.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    /// Sale price, shown alongside `price` when present.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub discount_price: Option<Decimal>,
    /// Units in stock. Informational only; carts do not reserve stock.
    pub stock: u32,
    /// URLs of stored product images.
    pub images: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category_id: Option<CategoryId>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Create/update payload. On update, absent fields keep stored values;
/// uploaded images append to the existing list.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub discount_price: Option<Decimal>,
    pub stock: Option<u32>,
    pub category_id: Option<CategoryId>,
}

impl Product {
    /// Build a product from a creation payload and its stored image URLs.
    ///
    /// Missing optional fields default to an empty description, zero
    /// price, and zero stock; the handlers validate presence of `name`
    /// before reaching here.
    #[must_use]
    pub fn from_input(name: String, input: ProductInput, images: Vec<String>) -> Self {
        let now = Utc::now();
        Self {
            id: ProductId::generate(),
            name,
            description: input.description.unwrap_or_default(),
            price: input.price.unwrap_or_default(),
            discount_price: input.discount_price,
            stock: input.stock.unwrap_or_default(),
            images,
            category_id: input.category_id,
            created_at: now,
            updated_at: now,
        }
    }

    /// Apply a partial update in place, appending any new image URLs.
    pub fn apply_update(&mut self, input: ProductInput, new_images: Vec<String>) {
        if let Some(name) = input.name {
            self.name = name;
        }
        if let Some(description) = input.description {
            self.description = description;
        }
        if let Some(price) = input.price {
            self.price = price;
        }
        if input.discount_price.is_some() {
            self.discount_price = input.discount_price;
        }
        if let Some(stock) = input.stock {
            self.stock = stock;
        }
        if input.category_id.is_some() {
            self.category_id = input.category_id;
        }
        self.images.extend(new_images);
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn update_keeps_absent_fields_and_appends_images() {
        let mut product = Product::from_input(
            "Lamp".to_owned(),
            ProductInput {
                price: Some(Decimal::new(1999, 2)),
                stock: Some(3),
                ..ProductInput::default()
            },
            vec!["a.jpg".to_owned()],
        );

        product.apply_update(
            ProductInput {
                stock: Some(10),
                ..ProductInput::default()
            },
            vec!["b.jpg".to_owned()],
        );

        assert_eq!(product.name, "Lamp");
        assert_eq!(product.price, Decimal::new(1999, 2));
        assert_eq!(product.stock, 10);
        assert_eq!(product.images, vec!["a.jpg", "b.jpg"]);
    }
}
