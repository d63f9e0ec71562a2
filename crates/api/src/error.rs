//! Unified error handling for the API.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use thiserror::Error;

use crate::db::RepositoryError;

/// Application-level error type, mapped to an HTTP response by
/// [`IntoResponse`].
#[derive(Debug, Error)]
pub enum ApiError {
    /// No bearer token on a protected route.
    #[error("Access denied. No token provided.")]
    MissingToken,

    /// Token present but failed verification.
    #[error("Invalid token.")]
    InvalidToken,

    /// Authenticated but not allowed.
    #[error("Access denied.")]
    Forbidden,

    /// Resource not found (or owned by someone else).
    #[error("Not found")]
    NotFound,

    /// Login failed. Deliberately undifferentiated: the same message covers
    /// unknown email, wrong password, and deactivated account.
    #[error("Invalid email or password")]
    InvalidCredentials,

    /// Unique-constraint violation surfaced to the client.
    #[error("{0}")]
    Conflict(String),

    /// The caller already has a configuration.
    #[error("You can only create one configuration.")]
    ConfigurationLimit,

    /// Request body failed validation.
    #[error("{0}")]
    Validation(String),

    /// Internal server error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl From<RepositoryError> for ApiError {
    fn from(err: RepositoryError) -> Self {
        match err {
            RepositoryError::NotFound => Self::NotFound,
            RepositoryError::Conflict(msg) => Self::Conflict(msg),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if matches!(self, Self::Internal(_)) {
            tracing::error!(error = %self, "request failed");
        }

        let status = match &self {
            Self::MissingToken => StatusCode::UNAUTHORIZED,
            Self::InvalidToken | Self::Forbidden => StatusCode::FORBIDDEN,
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::InvalidCredentials | Self::Conflict(_) | Self::Validation(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::ConfigurationLimit => StatusCode::TOO_MANY_REQUESTS,
            Self::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        // Don't expose internal error details to clients
        let message = match &self {
            Self::Internal(_) => "Internal server error".to_owned(),
            _ => self.to_string(),
        };

        (status, Json(json!({ "error": message }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn get_status(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn test_api_error_status_codes() {
        assert_eq!(get_status(ApiError::MissingToken), StatusCode::UNAUTHORIZED);
        assert_eq!(get_status(ApiError::InvalidToken), StatusCode::FORBIDDEN);
        assert_eq!(get_status(ApiError::Forbidden), StatusCode::FORBIDDEN);
        assert_eq!(get_status(ApiError::NotFound), StatusCode::NOT_FOUND);
        assert_eq!(
            get_status(ApiError::InvalidCredentials),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::ConfigurationLimit),
            StatusCode::TOO_MANY_REQUESTS
        );
        assert_eq!(
            get_status(ApiError::Validation("bad".to_owned())),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            get_status(ApiError::Internal("boom".to_owned())),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn test_repository_error_mapping() {
        assert!(matches!(
            ApiError::from(RepositoryError::NotFound),
            ApiError::NotFound
        ));
        assert!(matches!(
            ApiError::from(RepositoryError::Conflict("dup".to_owned())),
            ApiError::Conflict(_)
        ));
    }

    #[test]
    fn test_internal_details_are_not_exposed() {
        let response = ApiError::Internal("connection string leaked".to_owned()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
