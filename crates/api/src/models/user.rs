//! User domain types.

use chrono::{DateTime, Utc};
use serde::Serialize;

use layerworks_core::{Email, SubscriptionStatus, UserId, UserRole};

/// A user account (domain type).
///
/// This is the stored record. It carries the password hash and is therefore
/// deliberately not serializable; everything that leaves the service goes
/// through [`PublicUser`].
#[derive(Debug, Clone)]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// Email address, unique across all accounts.
    pub email: Email,
    /// Argon2 PHC-format password hash.
    pub password_hash: String,
    /// Display name.
    pub name: String,
    /// Contact phone number.
    pub phone: String,
    /// Permission level.
    pub role: UserRole,
    /// Whether the account may log in.
    pub active: bool,
    /// Optional account-level subscription state (swept daily).
    pub subscription: Option<SubscriptionStatus>,
    /// Optional account-level trial deadline.
    pub trial_ends_at: Option<DateTime<Utc>>,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
    /// When the account was last updated.
    pub updated_at: DateTime<Utc>,
}

/// Public projection of a [`User`] safe to return to callers.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PublicUser {
    /// Unique user ID.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address.
    pub email: Email,
    /// Contact phone number.
    pub phone: String,
    /// Permission level.
    pub role: UserRole,
    /// Whether the account may log in.
    pub active: bool,
    /// When the account was created.
    pub created_at: DateTime<Utc>,
}

impl From<&User> for PublicUser {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            phone: user.phone.clone(),
            role: user.role,
            active: user.active,
            created_at: user.created_at,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_public_projection_never_carries_the_hash() {
        let user = User {
            id: UserId::generate(),
            email: Email::parse("a@b.c").unwrap(),
            password_hash: "$argon2id$v=19$secret".to_owned(),
            name: "A".to_owned(),
            phone: "123".to_owned(),
            role: UserRole::User,
            active: true,
            subscription: None,
            trial_ends_at: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };

        let json = serde_json::to_string(&PublicUser::from(&user)).unwrap();
        assert!(!json.contains("argon2"));
        assert!(!json.contains("password"));
        assert!(json.contains("a@b.c"));
    }
}
