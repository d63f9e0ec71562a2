//! Layer design domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use layerworks_core::{LayerDesignId, UserId};

/// A named design asset owned by a user.
///
/// Designs are clustered under a free-form group key (`sq`); grouping is by
/// value equality, not referential integrity. The `layers` sequence is
/// opaque layer-definition data kept in submission order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LayerDesign {
    /// Unique design ID.
    pub id: LayerDesignId,
    /// Owning user; every query filters on this.
    pub owner: UserId,
    /// Display name.
    pub name: String,
    /// Free-form group key.
    pub sq: String,
    /// Ordered layer-definition data.
    pub layers: Vec<serde_json::Value>,
    /// Customizable entries, append-only via the customize operation.
    pub customizables: Vec<CustomizableEntry>,
    /// When the design was created.
    pub created_at: DateTime<Utc>,
    /// When the design was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A customizable entry attached to a layer design.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomizableEntry {
    /// Entry title.
    pub title: String,
    /// Short description shown in pickers.
    pub short_description: String,
    /// References to uploaded files.
    #[serde(default)]
    pub files: Vec<String>,
}
