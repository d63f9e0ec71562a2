//! Configuration repository.
//!
//! Every owner-scoped query filters on `(id, owner)`. A record owned by a
//! different user is indistinguishable from an absent one.

use chrono::{DateTime, Utc};

use layerworks_core::{ConfigurationId, SubscriptionStatus, UserId};

use super::{Database, RepositoryError};
use crate::models::Configuration;

/// Field changes applied by [`ConfigurationRepository::update`].
///
/// `None` fields are left untouched. `subscription` is deliberately
/// caller-writable: manual reactivation after payment goes through here.
#[derive(Debug, Default)]
pub struct ConfigurationUpdate {
    pub store_id: Option<String>,
    pub store_url: Option<String>,
    pub store_access_token: Option<String>,
    pub store_endpoint: Option<String>,
    pub subscription: Option<SubscriptionStatus>,
}

/// Repository for store configurations.
pub struct ConfigurationRepository<'a> {
    db: &'a Database,
}

impl<'a> ConfigurationRepository<'a> {
    /// Create a new configuration repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new configuration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the owner already has a
    /// configuration. The check runs under the collection write lock, so
    /// concurrent duplicate creation cannot race past it.
    pub async fn create(
        &self,
        config: Configuration,
    ) -> Result<Configuration, RepositoryError> {
        let mut configs = self.db.inner.configurations.write().await;
        if configs.values().any(|c| c.owner == config.owner) {
            return Err(RepositoryError::Conflict(
                "owner already has a configuration".to_owned(),
            ));
        }
        configs.insert(config.id, config.clone());
        Ok(config)
    }

    /// Fetch a configuration by `(id, owner)`.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn get(
        &self,
        id: ConfigurationId,
        owner: UserId,
    ) -> Result<Option<Configuration>, RepositoryError> {
        Ok(self
            .db
            .inner
            .configurations
            .read()
            .await
            .get(&id)
            .filter(|c| c.owner == owner)
            .cloned())
    }

    /// List all configurations for an owner.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn list_by_owner(
        &self,
        owner: UserId,
    ) -> Result<Vec<Configuration>, RepositoryError> {
        Ok(self
            .db
            .inner
            .configurations
            .read()
            .await
            .values()
            .filter(|c| c.owner == owner)
            .cloned()
            .collect())
    }

    /// Apply a partial update to an owner's configuration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id is absent or owned by
    /// someone else.
    pub async fn update(
        &self,
        id: ConfigurationId,
        owner: UserId,
        update: ConfigurationUpdate,
    ) -> Result<Configuration, RepositoryError> {
        let mut configs = self.db.inner.configurations.write().await;
        let config = configs
            .get_mut(&id)
            .filter(|c| c.owner == owner)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(store_id) = update.store_id {
            config.store_id = store_id;
        }
        if let Some(store_url) = update.store_url {
            config.store_url = store_url;
        }
        if let Some(token) = update.store_access_token {
            config.store_access_token = token;
        }
        if let Some(endpoint) = update.store_endpoint {
            config.store_endpoint = endpoint;
        }
        if let Some(subscription) = update.subscription {
            config.subscription = subscription;
        }
        config.updated_at = Utc::now();
        Ok(config.clone())
    }

    /// Delete an owner's configuration.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id is absent or owned by
    /// someone else.
    pub async fn delete(
        &self,
        id: ConfigurationId,
        owner: UserId,
    ) -> Result<(), RepositoryError> {
        let mut configs = self.db.inner.configurations.write().await;
        if configs.get(&id).is_some_and(|c| c.owner == owner) {
            configs.remove(&id);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    /// Look up a configuration by store identifier (unscoped; used by the
    /// public subscription check).
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn find_by_store(
        &self,
        store_id: &str,
    ) -> Result<Option<Configuration>, RepositoryError> {
        Ok(self
            .db
            .inner
            .configurations
            .read()
            .await
            .values()
            .find(|c| c.store_id == store_id)
            .cloned())
    }

    /// Bulk conditional update: deactivate every configuration whose trial
    /// has passed and whose subscription is still active. Returns the number
    /// of records modified.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn deactivate_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut configs = self.db.inner.configurations.write().await;
        let mut modified = 0;
        for config in configs.values_mut() {
            if config.subscription == SubscriptionStatus::Active && config.trial_ends_at <= now {
                config.subscription = SubscriptionStatus::Inactive;
                config.updated_at = now;
                modified += 1;
            }
        }
        Ok(modified)
    }
}
