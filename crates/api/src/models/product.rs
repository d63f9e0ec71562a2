//! Saved product customization documents.

use chrono::{DateTime, Utc};
use serde::Serialize;

use layerworks_core::ProductId;

/// A saved product customization.
///
/// The body is stored verbatim; there is no ownership model and no schema
/// beyond being valid JSON.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    /// Unique product ID.
    pub id: ProductId,
    /// The customization document as submitted.
    pub data: serde_json::Value,
    /// When the document was saved.
    pub created_at: DateTime<Utc>,
}
