//! Saved product handlers.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post},
};
use tracing::instrument;

use layerworks_core::ProductId;

use crate::db::ProductRepository;
use crate::error::ApiError;
use crate::models::Product;
use crate::state::AppState;

/// Create the product routes router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/api/save-product", post(save_product))
        .route("/api/products", get(list_products))
        .route("/api/products/{id}", get(get_product))
}

#[instrument(skip(state, body))]
async fn save_product(
    State(state): State<AppState>,
    Json(body): Json<serde_json::Value>,
) -> Result<(StatusCode, Json<Product>), ApiError> {
    let product = ProductRepository::new(state.db()).create(body).await?;
    Ok((StatusCode::CREATED, Json(product)))
}

#[instrument(skip(state))]
async fn list_products(
    State(state): State<AppState>,
) -> Result<Json<Vec<Product>>, ApiError> {
    let products = ProductRepository::new(state.db()).list_all().await?;
    Ok(Json(products))
}

#[instrument(skip(state))]
async fn get_product(
    State(state): State<AppState>,
    Path(id): Path<ProductId>,
) -> Result<Json<Product>, ApiError> {
    let product = ProductRepository::new(state.db())
        .get(id)
        .await?
        .ok_or(ApiError::NotFound)?;
    Ok(Json(product))
}
