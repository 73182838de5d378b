//! Order handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use serde::Deserialize;
use tracing::instrument;

use bazaar_core::{OrderId, Role, UserId};

use crate::auth::{Bearer, GateError, Operation};
use crate::error::ApiError;
use crate::models::{NewOrder, Order, OrderUpdate};
use crate::response::ApiResponse;
use crate::state::AppState;

use super::{PageQuery, require_claims};

#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    state
        .gate()
        .authorize(Operation::OrdersList.required_roles(), auth.as_deref())?;
    let (orders, meta) = state.orders().list(query.page, query.limit).await?;
    Ok(Json(ApiResponse::paged(orders, meta)))
}

#[instrument(skip_all, fields(owner_id = %owner_id))]
pub async fn list_by_owner(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(owner_id): Path<UserId>,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Order>>>, ApiError> {
    let claims = require_claims(state.gate().authorize(
        Operation::OrdersListByOwner.required_roles(),
        auth.as_deref(),
    )?)?;
    if claims.role != Role::Admin && claims.sub != owner_id {
        return Err(ApiError::Gate(GateError::InsufficientRole));
    }
    let (orders, meta) = state
        .orders()
        .list_by_owner(owner_id, query.page, query.limit)
        .await?;
    Ok(Json(ApiResponse::paged(orders, meta)))
}

#[instrument(skip_all, fields(order_id = %id))]
pub async fn get(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<OrderId>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let claims = require_claims(
        state
            .gate()
            .authorize(Operation::OrdersGet.required_roles(), auth.as_deref())?,
    )?;
    let order = state.orders().get(id, &claims).await?;
    Ok(Json(ApiResponse::ok(order)))
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Json(payload): Json<NewOrder>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let claims = require_claims(
        state
            .gate()
            .authorize(Operation::OrdersCreate.required_roles(), auth.as_deref())?,
    )?;
    let order = state.orders().create(claims.sub, payload).await?;
    tracing::info!(order_id = %order.id, total = %order.total, "order placed");
    Ok(Json(ApiResponse::ok(order)))
}

#[instrument(skip_all, fields(order_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<OrderId>,
    Json(payload): Json<OrderUpdate>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    let claims = require_claims(
        state
            .gate()
            .authorize(Operation::OrdersUpdate.required_roles(), auth.as_deref())?,
    )?;
    let order = state.orders().update(id, &claims, payload).await?;
    Ok(Json(ApiResponse::ok(order)))
}

/// Body of a status transition.
#[derive(Debug, Deserialize)]
pub struct StatusUpdate {
    pub status: String,
}

#[instrument(skip_all, fields(order_id = %id))]
pub async fn update_status(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<OrderId>,
    Json(payload): Json<StatusUpdate>,
) -> Result<Json<ApiResponse<Order>>, ApiError> {
    state.gate().authorize(
        Operation::OrdersUpdateStatus.required_roles(),
        auth.as_deref(),
    )?;
    let order = state.orders().update_status(id, &payload.status).await?;
    Ok(Json(ApiResponse::ok(order)))
}

#[instrument(skip_all, fields(order_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<OrderId>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .gate()
        .authorize(Operation::OrdersDelete.required_roles(), auth.as_deref())?;
    state.orders().delete(id).await?;
    Ok(Json(ApiResponse::ok_with_message(None, "Order deleted")))
}
