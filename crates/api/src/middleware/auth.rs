//! Authentication extractors.
//!
//! Authorization is composed at the route level: handlers declare the access
//! level they need by taking one of these extractors, and the services behind
//! them never re-check roles.

use axum::{
    extract::FromRequestParts,
    http::{header, request::Parts},
};

use layerworks_core::{UserId, UserRole};

use crate::db::UserRepository;
use crate::error::ApiError;
use crate::models::User;
use crate::state::AppState;

/// Extractor that requires a valid bearer token.
///
/// Verification is purely cryptographic; no user lookup is made. A token
/// stays usable until expiry even if the account changes underneath it.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireUser(user_id): RequireUser,
/// ) -> impl IntoResponse {
///     format!("Hello, {user_id}!")
/// }
/// ```
pub struct RequireUser(pub UserId);

impl FromRequestParts<AppState> for RequireUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state
            .tokens()
            .verify(token)
            .map_err(|_| ApiError::InvalidToken)?;
        Ok(Self(claims.sub))
    }
}

/// Extractor that requires a valid token belonging to a superadmin.
///
/// Unlike [`RequireUser`], this looks the caller up: the role check runs
/// against the current record, so a demoted or deleted superadmin loses
/// access immediately.
pub struct RequireSuperAdmin(pub User);

impl FromRequestParts<AppState> for RequireSuperAdmin {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let token = bearer_token(parts)?;
        let claims = state
            .tokens()
            .verify(token)
            .map_err(|_| ApiError::InvalidToken)?;

        let user = UserRepository::new(state.db())
            .get_by_id(claims.sub)
            .await?
            .ok_or(ApiError::InvalidToken)?;

        if user.role != UserRole::SuperAdmin {
            return Err(ApiError::Forbidden);
        }

        Ok(Self(user))
    }
}

fn bearer_token(parts: &Parts) -> Result<&str, ApiError> {
    parts
        .headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.strip_prefix("Bearer "))
        .ok_or(ApiError::MissingToken)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::http::Request;

    use super::*;

    fn parts_with_auth(value: Option<&str>) -> Parts {
        let mut builder = Request::builder().uri("/api/users");
        if let Some(value) = value {
            builder = builder.header(header::AUTHORIZATION, value);
        }
        builder.body(()).unwrap().into_parts().0
    }

    #[test]
    fn test_missing_header_is_missing_token() {
        let parts = parts_with_auth(None);
        assert!(matches!(
            bearer_token(&parts).unwrap_err(),
            ApiError::MissingToken
        ));
    }

    #[test]
    fn test_non_bearer_scheme_is_missing_token() {
        let parts = parts_with_auth(Some("Basic dXNlcjpwYXNz"));
        assert!(matches!(
            bearer_token(&parts).unwrap_err(),
            ApiError::MissingToken
        ));
    }

    #[test]
    fn test_bearer_token_is_extracted() {
        let parts = parts_with_auth(Some("Bearer abc.def.ghi"));
        assert_eq!(bearer_token(&parts).unwrap(), "abc.def.ghi");
    }
}
