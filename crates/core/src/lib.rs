//! Bazaar Core - Shared types library.
//!
//! This crate provides common types used across all Bazaar components:
//! - `server` - HTTP API binary
//! - `cli` - Command-line tools for migrations and management
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no
//! database access, no HTTP clients. In particular it owns the line-item
//! arithmetic shared by carts and orders, so the monetary invariants can
//! be tested without a running service.
//!
//! # Modules
//!
//! - [`types`] - Newtype IDs, roles, order statuses, pagination arithmetic
//! - [`ledger`] - Line-item merge and total recomputation

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod ledger;
pub mod types;

pub use ledger::*;
pub use types::*;
