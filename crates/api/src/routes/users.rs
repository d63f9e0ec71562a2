//! User management handlers (superadmin only).

use axum::{
    Json, Router,
    extract::{Path, State},
    routing::{get, patch, put},
};
use serde::Deserialize;
use tracing::instrument;

use layerworks_core::UserId;

use crate::error::ApiError;
use crate::middleware::RequireSuperAdmin;
use crate::models::PublicUser;
use crate::services::AuthService;
use crate::services::auth::UserChanges;
use crate::state::AppState;

/// Create the user management routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/users", get(list_users))
        .route("/api/users/{id}", put(update_user).delete(delete_user))
        .route("/api/users/{id}/active", patch(set_active))
}

#[derive(Debug, Deserialize)]
struct UpdateUserRequest {
    name: Option<String>,
    email: Option<String>,
    phone: Option<String>,
    password: Option<String>,
}

#[derive(Debug, Deserialize)]
struct SetActiveRequest {
    active: bool,
}

#[instrument(skip(state))]
async fn list_users(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<PublicUser>>, ApiError> {
    let service = AuthService::new(state.db(), state.tokens(), state.notifications());
    Ok(Json(service.list_users().await?))
}

#[instrument(skip(state, body))]
async fn update_user(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<UpdateUserRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let service = AuthService::new(state.db(), state.tokens(), state.notifications());
    let user = service
        .update_user(
            id,
            UserChanges {
                name: body.name,
                email: body.email,
                phone: body.phone,
                password: body.password,
            },
        )
        .await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
async fn set_active(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
    Json(body): Json<SetActiveRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let service = AuthService::new(state.db(), state.tokens(), state.notifications());
    let user = service.set_active(id, body.active).await?;
    Ok(Json(user))
}

#[instrument(skip(state))]
async fn delete_user(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<UserId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let service = AuthService::new(state.db(), state.tokens(), state.notifications());
    service.delete_user(id).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}
