//! Layer design handlers (superadmin only, scoped to the caller's designs).

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use layerworks_core::{LayerDesignId, UserId};

use crate::db::{LayerDesignRepository, layer_designs::LayerDesignUpdate};
use crate::error::ApiError;
use crate::middleware::RequireSuperAdmin;
use crate::models::{CustomizableEntry, LayerDesign};
use crate::state::AppState;

/// Create the layer design routes router.
///
/// Literal segments are registered before the `{id}` captures so `sqs`,
/// `by-sq` and `bulk-update-sq` never parse as design IDs.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/layerdesigns", post(create_design).get(list_designs))
        .route("/api/layerdesigns/sqs", get(list_group_keys))
        .route(
            "/api/layerdesigns/by-sq/{sq}",
            get(list_by_group).delete(delete_group),
        )
        .route("/api/layerdesigns/bulk-update-sq", put(rename_group))
        .route(
            "/api/layerdesigns/{id}",
            get(get_design).put(update_design).delete(delete_design),
        )
        .route("/api/layerdesigns/{id}/customize", post(append_customizable))
}

#[derive(Debug, Deserialize)]
struct CreateDesignRequest {
    name: String,
    sq: String,
    #[serde(default)]
    layers: Vec<serde_json::Value>,
    #[serde(default)]
    customizables: Vec<CustomizableEntry>,
}

#[derive(Debug, Deserialize)]
struct UpdateDesignRequest {
    name: Option<String>,
    sq: Option<String>,
    layers: Option<Vec<serde_json::Value>>,
    customizables: Option<Vec<CustomizableEntry>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RenameGroupRequest {
    old_sq: String,
    new_sq: String,
}

#[derive(Debug, Serialize)]
struct ModifiedResponse {
    modified: u64,
}

#[derive(Debug, Serialize)]
struct DeletedResponse {
    deleted: u64,
}

fn owner_of(admin: &crate::models::User) -> UserId {
    admin.id
}

#[instrument(skip(admin, state, body))]
async fn create_design(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(body): Json<CreateDesignRequest>,
) -> Result<(StatusCode, Json<LayerDesign>), ApiError> {
    let now = Utc::now();
    let design = LayerDesignRepository::new(state.db())
        .create(LayerDesign {
            id: LayerDesignId::generate(),
            owner: owner_of(&admin),
            name: body.name,
            sq: body.sq,
            layers: body.layers,
            customizables: body.customizables,
            created_at: now,
            updated_at: now,
        })
        .await?;
    Ok((StatusCode::CREATED, Json(design)))
}

#[instrument(skip(admin, state))]
async fn list_designs(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<LayerDesign>>, ApiError> {
    let designs = LayerDesignRepository::new(state.db())
        .list_by_owner(owner_of(&admin))
        .await?;
    Ok(Json(designs))
}

#[instrument(skip(admin, state))]
async fn list_group_keys(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
) -> Result<Json<Vec<String>>, ApiError> {
    let keys = LayerDesignRepository::new(state.db())
        .list_group_keys(owner_of(&admin))
        .await?;
    Ok(Json(keys))
}

#[instrument(skip(admin, state))]
async fn list_by_group(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(sq): Path<String>,
) -> Result<Json<Vec<LayerDesign>>, ApiError> {
    let designs = LayerDesignRepository::new(state.db())
        .list_by_group(owner_of(&admin), &sq)
        .await?;
    Ok(Json(designs))
}

#[instrument(skip(admin, state))]
async fn delete_group(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(sq): Path<String>,
) -> Result<Json<DeletedResponse>, ApiError> {
    let deleted = LayerDesignRepository::new(state.db())
        .delete_group(owner_of(&admin), &sq)
        .await?;
    Ok(Json(DeletedResponse { deleted }))
}

#[instrument(skip(admin, state, body))]
async fn rename_group(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Json(body): Json<RenameGroupRequest>,
) -> Result<Json<ModifiedResponse>, ApiError> {
    let modified = LayerDesignRepository::new(state.db())
        .rename_group(owner_of(&admin), &body.old_sq, &body.new_sq)
        .await?;
    Ok(Json(ModifiedResponse { modified }))
}

#[instrument(skip(admin, state))]
async fn get_design(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<LayerDesignId>,
) -> Result<Json<LayerDesign>, ApiError> {
    let design = LayerDesignRepository::new(state.db())
        .get(id, owner_of(&admin))
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(design))
}

#[instrument(skip(admin, state, body))]
async fn update_design(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<LayerDesignId>,
    Json(body): Json<UpdateDesignRequest>,
) -> Result<Json<LayerDesign>, ApiError> {
    let design = LayerDesignRepository::new(state.db())
        .update(
            id,
            owner_of(&admin),
            LayerDesignUpdate {
                name: body.name,
                sq: body.sq,
                layers: body.layers,
                customizables: body.customizables,
            },
        )
        .await?;
    Ok(Json(design))
}

#[instrument(skip(admin, state))]
async fn delete_design(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<LayerDesignId>,
) -> Result<Json<serde_json::Value>, ApiError> {
    LayerDesignRepository::new(state.db())
        .delete(id, owner_of(&admin))
        .await?;
    Ok(Json(serde_json::json!({ "deleted": true })))
}

#[instrument(skip(admin, state, entry))]
async fn append_customizable(
    RequireSuperAdmin(admin): RequireSuperAdmin,
    State(state): State<AppState>,
    Path(id): Path<LayerDesignId>,
    Json(entry): Json<CustomizableEntry>,
) -> Result<Json<LayerDesign>, ApiError> {
    let design = LayerDesignRepository::new(state.db())
        .append_customizable(id, owner_of(&admin), entry)
        .await?;
    Ok(Json(design))
}
