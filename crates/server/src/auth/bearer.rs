//! Axum extractor for the `Authorization` header.
//!
//! The extractor never rejects: whether an absent credential matters is
//! the gate's decision, made against the operation's declared policy.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

/// Raw `Authorization` header value, if the caller sent one.
///
/// # Example
///
/// ```rust,ignore
/// async fn handler(State(state): State<AppState>, Bearer(auth): Bearer) -> ... {
///     state.gate().authorize(Operation::OrdersList.required_roles(), auth.as_deref())?;
///     // ...
/// }
/// ```
pub struct Bearer(pub Option<String>);

impl<S> FromRequestParts<S> for Bearer
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let value = parts
            .headers
            .get(header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned);
        Ok(Self(value))
    }
}
