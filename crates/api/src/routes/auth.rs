//! Login and registration handlers.

use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::post,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use layerworks_core::UserRole;

use crate::error::ApiError;
use crate::middleware::RequireSuperAdmin;
use crate::models::PublicUser;
use crate::services::AuthService;
use crate::services::auth::NewUser;
use crate::state::AppState;

/// Create the auth routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/login", post(login))
        .route("/api/register", post(register))
}

#[derive(Debug, Deserialize)]
struct LoginRequest {
    email: String,
    password: String,
}

#[derive(Debug, Serialize)]
struct LoginResponse {
    token: String,
    user: PublicUser,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegisterRequest {
    name: String,
    email: String,
    password: String,
    #[serde(default)]
    phone: String,
    role: Option<UserRole>,
}

#[derive(Debug, Serialize)]
struct RegisterResponse {
    user: PublicUser,
}

#[instrument(skip(state, body), fields(email = %body.email))]
async fn login(
    State(state): State<AppState>,
    Json(body): Json<LoginRequest>,
) -> Result<Json<LoginResponse>, ApiError> {
    let service = AuthService::new(state.db(), state.tokens(), state.notifications());
    let (token, user) = service.login(&body.email, &body.password).await?;
    Ok(Json(LoginResponse { token, user }))
}

#[instrument(skip(admin, state, body), fields(email = %body.email))]
async fn register(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(body): Json<RegisterRequest>,
) -> Result<(StatusCode, Json<RegisterResponse>), ApiError> {
    let service = AuthService::new(state.db(), state.tokens(), state.notifications());
    let user = service
        .register(NewUser {
            name: body.name,
            email: body.email,
            password: body.password,
            phone: body.phone,
            role: body.role,
        })
        .await?;
    tracing::info!(created_by = %admin.id, user_id = %user.id, "account registered");
    Ok((StatusCode::CREATED, Json(RegisterResponse { user })))
}
