//! Store configuration handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use layerworks_core::{ConfigurationId, SubscriptionStatus, UserId};

use crate::db::configurations::ConfigurationUpdate;
use crate::error::ApiError;
use crate::middleware::RequireUser;
use crate::models::Configuration;
use crate::services::ConfigurationService;
use crate::services::configurations::NewConfiguration;
use crate::state::AppState;

/// Create the configuration routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/api/configurations",
            post(create_configuration).get(list_configurations),
        )
        .route(
            "/api/configurations/{id}",
            get(get_configuration)
                .put(update_configuration)
                .delete(delete_configuration),
        )
        .route("/api/user/{user_id}/configurations", get(list_by_user))
        .route("/api/configuration/by-store/{store_id}", get(check_by_store))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CreateConfigurationRequest {
    store_id: String,
    store_url: String,
    store_access_token: String,
    store_endpoint: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpdateConfigurationRequest {
    store_id: Option<String>,
    store_url: Option<String>,
    store_access_token: Option<String>,
    store_endpoint: Option<String>,
    subscription: Option<SubscriptionStatus>,
}

#[derive(Debug, Serialize)]
struct SubscriptionCheckResponse {
    subscribe: bool,
}

#[instrument(skip(state, body), fields(owner = %owner))]
async fn create_configuration(
    RequireUser(owner): RequireUser,
    State(state): State<AppState>,
    Json(body): Json<CreateConfigurationRequest>,
) -> Result<(StatusCode, Json<Configuration>), ApiError> {
    let config = ConfigurationService::new(state.db())
        .create(
            owner,
            NewConfiguration {
                store_id: body.store_id,
                store_url: body.store_url,
                store_access_token: body.store_access_token,
                store_endpoint: body.store_endpoint,
            },
        )
        .await?;
    Ok((StatusCode::CREATED, Json(config)))
}

#[instrument(skip(state), fields(owner = %owner))]
async fn list_configurations(
    RequireUser(owner): RequireUser,
    State(state): State<AppState>,
) -> Result<Json<Vec<Configuration>>, ApiError> {
    let configs = ConfigurationService::new(state.db()).list(owner).await?;
    Ok(Json(configs))
}

#[instrument(skip(state), fields(owner = %owner))]
async fn get_configuration(
    RequireUser(owner): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ConfigurationId>,
) -> Result<Json<Configuration>, ApiError> {
    let config = ConfigurationService::new(state.db()).get(id, owner).await?;
    Ok(Json(config))
}

#[instrument(skip(state, body), fields(owner = %owner))]
async fn update_configuration(
    RequireUser(owner): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ConfigurationId>,
    Json(body): Json<UpdateConfigurationRequest>,
) -> Result<Json<Configuration>, ApiError> {
    let config = ConfigurationService::new(state.db())
        .update(
            id,
            owner,
            ConfigurationUpdate {
                store_id: body.store_id,
                store_url: body.store_url,
                store_access_token: body.store_access_token,
                store_endpoint: body.store_endpoint,
                subscription: body.subscription,
            },
        )
        .await?;
    Ok(Json(config))
}

#[instrument(skip(state), fields(owner = %owner))]
async fn delete_configuration(
    RequireUser(owner): RequireUser,
    State(state): State<AppState>,
    Path(id): Path<ConfigurationId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    ConfigurationService::new(state.db()).delete(id, owner).await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

/// Public listing of a user's configurations, keyed by path rather than by
/// token.
#[instrument(skip(state))]
async fn list_by_user(
    State(state): State<AppState>,
    Path(user_id): Path<UserId>,
) -> Result<Json<Vec<Configuration>>, ApiError> {
    let configs = ConfigurationService::new(state.db()).list(user_id).await?;
    Ok(Json(configs))
}

/// Public subscription check used by storefront widgets. Always answers with
/// a boolean; an unknown store reads as not subscribed.
#[instrument(skip(state))]
async fn check_by_store(
    State(state): State<AppState>,
    Path(store_id): Path<String>,
) -> Json<SubscriptionCheckResponse> {
    let subscribe = ConfigurationService::new(state.db())
        .is_store_subscribed(&store_id)
        .await;
    Json(SubscriptionCheckResponse { subscribe })
}
