//! Upload relay handler (superadmin only).

use axum::{
    Json, Router,
    extract::{Multipart, State},
    routing::post,
};
use serde::Serialize;
use tracing::instrument;

use crate::error::ApiError;
use crate::middleware::RequireSuperAdmin;
use crate::state::AppState;

/// Create the upload routes router.
pub fn routes() -> Router<AppState> {
    Router::new().route("/api/upload", post(upload_file))
}

#[derive(Debug, Serialize)]
struct UploadResponse {
    url: String,
}

#[instrument(skip(_admin, state, multipart))]
async fn upload_file(
    RequireSuperAdmin(_admin): RequireSuperAdmin,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let relay = state
        .uploader()
        .ok_or_else(|| ApiError::Internal("upload endpoint not configured".to_owned()))?;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Validation(format!("Malformed multipart body: {e}")))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let file_name = field.file_name().unwrap_or("upload.bin").to_owned();
        let content_type = field
            .content_type()
            .unwrap_or("application/octet-stream")
            .to_owned();
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ApiError::Validation(format!("Failed to read file: {e}")))?;

        let url = relay
            .relay(file_name, &content_type, bytes.to_vec())
            .await
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        return Ok(Json(UploadResponse { url }));
    }

    Err(ApiError::Validation("No file provided".to_owned()))
}
