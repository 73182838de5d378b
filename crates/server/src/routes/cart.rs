//! Cart handlers.
//!
//! All cart operations are keyed by the `userId` query parameter; a
//! regular user may only touch their own cart, an admin may touch any.

use axum::Json;
use axum::extract::{Query, State};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{LineItemDraft, ProductId, Role, UserId};

use crate::auth::{Bearer, Claims, GateError, Operation};
use crate::error::ApiError;
use crate::models::Cart;
use crate::response::ApiResponse;
use crate::state::AppState;

use super::require_claims;

/// The cart owner targeted by an operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OwnerQuery {
    pub user_id: UserId,
}

/// Target of a remove-item operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItemQuery {
    pub user_id: UserId,
    pub product_id: ProductId,
}

/// Body of an update-item operation.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuantityUpdate {
    pub product_id: ProductId,
    pub quantity: u32,
}

/// Users may only operate on their own cart; admins on any.
fn check_owner(claims: &Claims, owner_id: UserId) -> Result<(), ApiError> {
    if claims.role == Role::Admin || claims.sub == owner_id {
        Ok(())
    } else {
        Err(ApiError::Gate(GateError::InsufficientRole))
    }
}

#[instrument(skip_all, fields(owner_id = %query.user_id))]
pub async fn get(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<Cart>>, ApiError> {
    let claims = require_claims(
        state
            .gate()
            .authorize(Operation::CartGet.required_roles(), auth.as_deref())?,
    )?;
    check_owner(&claims, query.user_id)?;
    let cart = state.cart().get_by_owner(query.user_id).await?;
    Ok(Json(ApiResponse::ok(cart)))
}

#[instrument(skip_all, fields(owner_id = %query.user_id))]
pub async fn add_item(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<OwnerQuery>,
    Json(draft): Json<LineItemDraft>,
) -> Result<Json<ApiResponse<Cart>>, ApiError> {
    let claims = require_claims(
        state
            .gate()
            .authorize(Operation::CartAddItem.required_roles(), auth.as_deref())?,
    )?;
    check_owner(&claims, query.user_id)?;
    let cart = state.cart().add_item(query.user_id, draft).await?;
    Ok(Json(ApiResponse::ok(cart)))
}

#[instrument(skip_all, fields(owner_id = %query.user_id))]
pub async fn update_item(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<OwnerQuery>,
    Json(update): Json<QuantityUpdate>,
) -> Result<Json<ApiResponse<Cart>>, ApiError> {
    let claims = require_claims(
        state
            .gate()
            .authorize(Operation::CartUpdateItem.required_roles(), auth.as_deref())?,
    )?;
    check_owner(&claims, query.user_id)?;
    let cart = state
        .cart()
        .update_quantity(query.user_id, update.product_id, update.quantity)
        .await?;
    Ok(Json(ApiResponse::ok(cart)))
}

#[instrument(skip_all, fields(owner_id = %query.user_id))]
pub async fn remove_item(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<ItemQuery>,
) -> Result<Json<ApiResponse<Cart>>, ApiError> {
    let claims = require_claims(
        state
            .gate()
            .authorize(Operation::CartRemoveItem.required_roles(), auth.as_deref())?,
    )?;
    check_owner(&claims, query.user_id)?;
    match state
        .cart()
        .remove_item(query.user_id, query.product_id)
        .await?
    {
        Some(cart) => Ok(Json(ApiResponse::ok(cart))),
        None => Ok(Json(ApiResponse::ok_with_message(
            None,
            "Cart is now empty and was removed",
        ))),
    }
}

#[instrument(skip_all, fields(owner_id = %query.user_id))]
pub async fn clear(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<OwnerQuery>,
) -> Result<Json<ApiResponse<Cart>>, ApiError> {
    let claims = require_claims(
        state
            .gate()
            .authorize(Operation::CartClear.required_roles(), auth.as_deref())?,
    )?;
    check_owner(&claims, query.user_id)?;
    if state.cart().clear(query.user_id).await? {
        Ok(Json(ApiResponse::ok_with_message(None, "Cart cleared")))
    } else {
        // A missing cart is a reported outcome here, not a failure of
        // the operation.
        Ok(Json(ApiResponse::not_found_outcome("Cart not found")))
    }
}
