//! Store configuration lifecycle.

use chrono::{Duration, Utc};

use layerworks_core::{ConfigurationId, SubscriptionStatus, UserId};

use crate::db::{
    ConfigurationRepository, Database, RepositoryError, configurations::ConfigurationUpdate,
};
use crate::error::ApiError;
use crate::models::Configuration;

/// Trial length granted on creation.
pub const TRIAL_PERIOD_DAYS: i64 = 7;

/// Input for connecting a store.
#[derive(Debug)]
pub struct NewConfiguration {
    pub store_id: String,
    pub store_url: String,
    pub store_access_token: String,
    pub store_endpoint: String,
}

/// Service for store configuration operations.
pub struct ConfigurationService<'a> {
    configurations: ConfigurationRepository<'a>,
}

impl<'a> ConfigurationService<'a> {
    /// Create a new configuration service.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self {
            configurations: ConfigurationRepository::new(db),
        }
    }

    /// Connect a store for an owner.
    ///
    /// The server dictates the lifecycle fields: every new configuration
    /// starts active with a trial ending [`TRIAL_PERIOD_DAYS`] from now,
    /// whatever the request said.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::ConfigurationLimit` if the owner already has one.
    pub async fn create(
        &self,
        owner: UserId,
        new: NewConfiguration,
    ) -> Result<Configuration, ApiError> {
        let now = Utc::now();
        let config = Configuration {
            id: ConfigurationId::generate(),
            store_id: new.store_id,
            store_url: new.store_url,
            store_access_token: new.store_access_token,
            store_endpoint: new.store_endpoint,
            subscription: SubscriptionStatus::Active,
            trial_ends_at: now + Duration::days(TRIAL_PERIOD_DAYS),
            owner,
            created_at: now,
            updated_at: now,
        };

        self.configurations
            .create(config)
            .await
            .map_err(|err| match err {
                RepositoryError::Conflict(_) => ApiError::ConfigurationLimit,
                other => ApiError::from(other),
            })
    }

    /// Fetch one of the owner's configurations.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when absent or owned by someone else.
    pub async fn get(
        &self,
        id: ConfigurationId,
        owner: UserId,
    ) -> Result<Configuration, ApiError> {
        self.configurations
            .get(id, owner)
            .await?
            .ok_or(ApiError::NotFound)
    }

    /// List an owner's configurations.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub async fn list(&self, owner: UserId) -> Result<Vec<Configuration>, ApiError> {
        Ok(self.configurations.list_by_owner(owner).await?)
    }

    /// Apply a partial update, including manual subscription changes.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when absent or owned by someone else.
    pub async fn update(
        &self,
        id: ConfigurationId,
        owner: UserId,
        update: ConfigurationUpdate,
    ) -> Result<Configuration, ApiError> {
        Ok(self.configurations.update(id, owner, update).await?)
    }

    /// Delete one of the owner's configurations.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` when absent or owned by someone else.
    pub async fn delete(&self, id: ConfigurationId, owner: UserId) -> Result<(), ApiError> {
        Ok(self.configurations.delete(id, owner).await?)
    }

    /// Public subscription check by store identifier.
    ///
    /// Never errors: an unknown store or a failed lookup reads as "not
    /// subscribed", so storefront widgets degrade instead of breaking.
    pub async fn is_store_subscribed(&self, store_id: &str) -> bool {
        match self.configurations.find_by_store(store_id).await {
            Ok(Some(config)) => config.subscription.is_active(),
            Ok(None) => false,
            Err(err) => {
                tracing::warn!(error = %err, store_id, "store subscription lookup failed");
                false
            }
        }
    }
}
