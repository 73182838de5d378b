//! Shared type definitions.
//!
//! # Modules
//!
//! - [`id`] - Type-safe entity ID newtypes
//! - [`role`] - Caller roles used by the authorization gate
//! - [`status`] - Order status labels
//! - [`page`] - Pagination arithmetic

pub mod id;
pub mod page;
pub mod role;
pub mod status;

pub use id::*;
pub use page::*;
pub use role::*;
pub use status::*;
