//! Role and subscription status enums.

use serde::{Deserialize, Serialize};

/// Account role with different permission levels.
///
/// Wire values match the stored strings (`"user"` / `"superadmin"`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum UserRole {
    /// Regular tenant account; owns its own configurations and designs.
    #[default]
    User,
    /// Full access including user management and uploads.
    SuperAdmin,
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::User => write!(f, "user"),
            Self::SuperAdmin => write!(f, "superadmin"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "user" => Ok(Self::User),
            "superadmin" => Ok(Self::SuperAdmin),
            _ => Err(format!("invalid user role: {s}")),
        }
    }
}

/// Subscription state of a tenant account or store configuration.
///
/// `Active → Inactive` happens automatically once the trial window passes
/// (applied by the daily sweep). `Inactive → Active` only via an explicit
/// caller update.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionStatus {
    /// Within the trial window or manually reactivated.
    #[default]
    Active,
    /// Trial expired and not reactivated.
    Inactive,
}

impl SubscriptionStatus {
    /// Whether this status counts as a live subscription.
    #[must_use]
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }
}

impl std::fmt::Display for SubscriptionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Active => write!(f, "active"),
            Self::Inactive => write!(f, "inactive"),
        }
    }
}
