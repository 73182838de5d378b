//! Account administration handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use bazaar_core::UserId;

use crate::auth::{Bearer, Operation};
use crate::error::ApiError;
use crate::models::{NewUser, User, UserUpdate};
use crate::response::ApiResponse;
use crate::state::AppState;

use super::{PageQuery, require_claims};

#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    state
        .gate()
        .authorize(Operation::UsersList.required_roles(), auth.as_deref())?;
    let (users, meta) = state.users().list(query.page, query.limit).await?;
    Ok(Json(ApiResponse::paged(users, meta)))
}

#[instrument(skip_all, fields(user_id = %id))]
pub async fn get(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<UserId>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    state
        .gate()
        .authorize(Operation::UsersGet.required_roles(), auth.as_deref())?;
    let user = state.users().get(id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Json(payload): Json<NewUser>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    state
        .gate()
        .authorize(Operation::UsersCreate.required_roles(), auth.as_deref())?;
    let user = state.users().create(payload).await?;
    tracing::info!(user_id = %user.id, role = %user.role, "account created");
    Ok(Json(ApiResponse::ok(user)))
}

#[instrument(skip_all, fields(user_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<UserId>,
    Json(payload): Json<UserUpdate>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let claims = require_claims(
        state
            .gate()
            .authorize(Operation::UsersUpdate.required_roles(), auth.as_deref())?,
    )?;
    let user = state.users().update(id, &claims, payload).await?;
    Ok(Json(ApiResponse::ok(user)))
}

#[instrument(skip_all, fields(user_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<UserId>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .gate()
        .authorize(Operation::UsersDelete.required_roles(), auth.as_deref())?;
    state.users().delete(id).await?;
    Ok(Json(ApiResponse::ok_with_message(None, "User deleted")))
}
