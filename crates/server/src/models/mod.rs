//! Domain entities and request payloads.
//!
//! Entities serialize camelCase on the wire. Monetary values are
//! [`rust_decimal::Decimal`] end to end; floats never touch money.

pub mod cart;
pub mod category;
pub mod order;
pub mod product;
pub mod user;

pub use cart::Cart;
pub use category::{Category, CategoryInput};
pub use order::{NewOrder, Order, OrderUpdate, ShippingAddress};
pub use product::{Product, ProductInput};
pub use user::{Credentials, NewUser, User, UserUpdate};
