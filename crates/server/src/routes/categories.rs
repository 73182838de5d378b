//! Catalog category handlers.

use axum::Json;
use axum::extract::{Path, Query, State};
use tracing::instrument;

use bazaar_core::CategoryId;

use crate::auth::{Bearer, Operation};
use crate::error::ApiError;
use crate::models::{Category, CategoryInput};
use crate::response::ApiResponse;
use crate::state::AppState;

use super::PageQuery;

#[instrument(skip_all)]
pub async fn list(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Query(query): Query<PageQuery>,
) -> Result<Json<ApiResponse<Vec<Category>>>, ApiError> {
    state
        .gate()
        .authorize(Operation::CategoriesList.required_roles(), auth.as_deref())?;
    let (categories, meta) = state.categories().list(query.page, query.limit).await?;
    Ok(Json(ApiResponse::paged(categories, meta)))
}

#[instrument(skip_all, fields(category_id = %id))]
pub async fn get(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<CategoryId>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    state
        .gate()
        .authorize(Operation::CategoriesGet.required_roles(), auth.as_deref())?;
    let category = state.categories().get(id).await?;
    Ok(Json(ApiResponse::ok(category)))
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Json(payload): Json<CategoryInput>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    state.gate().authorize(
        Operation::CategoriesCreate.required_roles(),
        auth.as_deref(),
    )?;
    let category = state.categories().create(payload).await?;
    tracing::info!(category_id = %category.id, "category created");
    Ok(Json(ApiResponse::ok(category)))
}

#[instrument(skip_all, fields(category_id = %id))]
pub async fn update(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<CategoryId>,
    Json(payload): Json<CategoryInput>,
) -> Result<Json<ApiResponse<Category>>, ApiError> {
    state.gate().authorize(
        Operation::CategoriesUpdate.required_roles(),
        auth.as_deref(),
    )?;
    let category = state.categories().update(id, payload).await?;
    Ok(Json(ApiResponse::ok(category)))
}

#[instrument(skip_all, fields(category_id = %id))]
pub async fn remove(
    State(state): State<AppState>,
    Bearer(auth): Bearer,
    Path(id): Path<CategoryId>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.gate().authorize(
        Operation::CategoriesDelete.required_roles(),
        auth.as_deref(),
    )?;
    state.categories().delete(id).await?;
    Ok(Json(ApiResponse::ok_with_message(None, "Category deleted")))
}
