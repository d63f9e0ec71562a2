//! Store configuration domain type.

use chrono::{DateTime, Utc};
use serde::Serialize;

use layerworks_core::{ConfigurationId, SubscriptionStatus, UserId};

/// A tenant's store-integration record.
///
/// At most one configuration exists per owning user; the store enforces the
/// constraint at insertion time. The subscription starts `active` with a
/// seven-day trial window and is flipped to `inactive` by the daily sweep
/// once the window passes.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Configuration {
    /// Unique configuration ID.
    pub id: ConfigurationId,
    /// External store identifier, used by the public subscription check.
    pub store_id: String,
    /// Storefront URL.
    pub store_url: String,
    /// Access token for the store's API.
    pub store_access_token: String,
    /// Store API endpoint.
    pub store_endpoint: String,
    /// Current subscription state.
    pub subscription: SubscriptionStatus,
    /// End of the trial window.
    pub trial_ends_at: DateTime<Utc>,
    /// Owning user.
    pub owner: UserId,
    /// When the configuration was created.
    pub created_at: DateTime<Utc>,
    /// When the configuration was last updated.
    pub updated_at: DateTime<Utc>,
}
