//! Daily subscription sweeps.
//!
//! Two background jobs deactivate expired trials: one over user accounts,
//! one over store configurations. Both are bulk conditional updates keyed on
//! absolute time, so a missed or repeated run converges to the same state.

use std::time::Duration;

use chrono::{DateTime, Utc};

use crate::db::{ConfigurationRepository, Database, UserRepository};

const SWEEP_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);
// Staggered so the two sweeps never contend for the same wakeup.
const CONFIGURATION_SWEEP_OFFSET: Duration = Duration::from_secs(60 * 60);

/// Deactivate user subscriptions whose trial has passed. Returns the number
/// of accounts modified.
pub async fn sweep_users(db: &Database, now: DateTime<Utc>) -> u64 {
    match UserRepository::new(db).deactivate_expired(now).await {
        Ok(modified) => {
            if modified > 0 {
                tracing::info!(modified, "deactivated expired user subscriptions");
            }
            modified
        }
        Err(err) => {
            tracing::error!(error = %err, "user subscription sweep failed");
            0
        }
    }
}

/// Deactivate store configurations whose trial has passed. Returns the number
/// of configurations modified.
pub async fn sweep_configurations(db: &Database, now: DateTime<Utc>) -> u64 {
    match ConfigurationRepository::new(db)
        .deactivate_expired(now)
        .await
    {
        Ok(modified) => {
            if modified > 0 {
                tracing::info!(modified, "deactivated expired store configurations");
            }
            modified
        }
        Err(err) => {
            tracing::error!(error = %err, "configuration sweep failed");
            0
        }
    }
}

/// Spawn both daily sweep jobs.
pub fn spawn_sweepers(db: Database) {
    let users_db = db.clone();
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        // The immediate first tick; sweeping right at startup is harmless.
        ticker.tick().await;
        loop {
            sweep_users(&users_db, Utc::now()).await;
            ticker.tick().await;
        }
    });

    tokio::spawn(async move {
        tokio::time::sleep(CONFIGURATION_SWEEP_OFFSET).await;
        let mut ticker = tokio::time::interval(SWEEP_INTERVAL);
        ticker.tick().await;
        loop {
            sweep_configurations(&db, Utc::now()).await;
            ticker.tick().await;
        }
    });
}
