//! Registration and login handlers.

use axum::Json;
use axum::extract::State;
use tracing::instrument;

use crate::error::ApiError;
use crate::models::{Credentials, NewUser};
use crate::response::ApiResponse;
use crate::services::AuthOutcome;
use crate::state::AppState;

#[instrument(skip_all)]
pub async fn register(
    State(state): State<AppState>,
    Json(payload): Json<NewUser>,
) -> Result<Json<ApiResponse<AuthOutcome>>, ApiError> {
    let outcome = state.auth().register(payload).await?;
    tracing::info!(user_id = %outcome.user.id, "account registered");
    Ok(Json(ApiResponse::ok(outcome)))
}

#[instrument(skip_all)]
pub async fn login(
    State(state): State<AppState>,
    Json(credentials): Json<Credentials>,
) -> Result<Json<ApiResponse<AuthOutcome>>, ApiError> {
    let outcome = state.auth().login(credentials).await?;
    Ok(Json(ApiResponse::ok(outcome)))
}
