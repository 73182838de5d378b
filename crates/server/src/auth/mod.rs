//! Authorization gate and credential plumbing.
//!
//! Every inbound operation passes through
//! [`AuthorizationGate::authorize`] before its business logic runs. The
//! decision is driven by the per-operation role requirement declared in
//! the [`policy`] table and the caller-supplied bearer credential.
//!
//! # Modules
//!
//! - [`claims`] - Verified credential payload and token issuance
//! - [`gate`] - The fail-closed allow/deny decision point
//! - [`policy`] - Declarative operation -> required-roles table
//! - [`bearer`] - Axum extractor for the `Authorization` header

pub mod bearer;
pub mod claims;
pub mod gate;
pub mod policy;

pub use bearer::Bearer;
pub use claims::{Claims, TokenIssuer};
pub use gate::{AuthorizationGate, GateError};
pub use policy::Operation;
