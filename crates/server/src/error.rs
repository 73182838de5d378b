//! Unified error handling.
//!
//! Every service operation returns `Result<T, ApiError>` - one
//! discipline, no mixed thrown/flagged behavior. The boundary
//! (`IntoResponse`) converts every error into the non-throwing
//! `{success: false, error}` envelope with the matching status code, so
//! callers inspect the flag rather than rely on a transport fault.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use crate::auth::GateError;
use crate::db::RepositoryError;
use crate::response::ApiResponse;
use crate::services::auth::AuthError;
use crate::services::images::ImageStorageError;

/// Application-level error type for the API.
#[derive(Debug, Error)]
pub enum ApiError {
    /// Authorization denial from the gate.
    #[error("{0}")]
    Gate(#[from] GateError),

    /// Authentication (login/registration) failure.
    #[error("{0}")]
    Auth(#[from] AuthError),

    /// Entity absence.
    #[error("{0}")]
    NotFound(String),

    /// Client-supplied value out of range (quantity < 1, unknown status).
    #[error("{0}")]
    InvalidArgument(String),

    /// Concurrent-update detection (versioned save lost the race).
    #[error("{0}")]
    Conflict(String),

    /// Persistence deadline exceeded or collaborator unreachable.
    /// Retryable, never a data error.
    #[error("{0}")]
    Unavailable(String),

    /// Database operation failed.
    #[error("database error: {0}")]
    Repository(RepositoryError),

    /// Image storage collaborator failed.
    #[error("image storage error: {0}")]
    Images(#[from] ImageStorageError),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound("Not found".to_owned()),
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
            other => Self::Repository(other),
        }
    }
}

impl ApiError {
    /// Status code this error maps to on the wire.
    #[must_use]
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::Gate(GateError::InsufficientRole) => StatusCode::FORBIDDEN,
            Self::Gate(_) => StatusCode::UNAUTHORIZED,
            Self::Auth(err) => err.status(),
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::Conflict(_) => StatusCode::CONFLICT,
            Self::Unavailable(_) | Self::Images(_) => StatusCode::SERVICE_UNAVAILABLE,
            Self::Repository(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Repository(_)) {
            tracing::error!(error = %self, "request error");
        }

        let status = self.status();

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Repository(_) => "Internal server error".to_owned(),
            other => other.to_string(),
        };

        (
            status,
            Json(ApiResponse::<serde_json::Value>::failure(message)),
        )
            .into_response()
    }
}

/// Result type alias for `ApiError`.
pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gate_denials_map_to_unauthorized_class() {
        assert_eq!(
            ApiError::Gate(GateError::MissingCredential).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Gate(GateError::InvalidCredential).status(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(
            ApiError::Gate(GateError::InsufficientRole).status(),
            StatusCode::FORBIDDEN
        );
    }

    #[test]
    fn data_errors_map_to_client_statuses() {
        assert_eq!(
            ApiError::NotFound("x".to_owned()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ApiError::InvalidArgument("x".to_owned()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            ApiError::Conflict("x".to_owned()).status(),
            StatusCode::CONFLICT
        );
        assert_eq!(
            ApiError::Unavailable("x".to_owned()).status(),
            StatusCode::SERVICE_UNAVAILABLE
        );
    }

    #[test]
    fn repository_details_are_not_exposed() {
        let err = ApiError::Repository(RepositoryError::DataCorruption(
            "price column overflowed".to_owned(),
        ));
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
