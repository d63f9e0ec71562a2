//! User repository.

use chrono::{DateTime, Utc};

use layerworks_core::{Email, SubscriptionStatus, UserId};

use super::{Database, RepositoryError};
use crate::models::User;

/// Field changes applied by [`UserRepository::update`].
///
/// `None` fields are left untouched.
#[derive(Debug, Default)]
pub struct UserUpdate {
    pub name: Option<String>,
    pub email: Option<Email>,
    pub phone: Option<String>,
    pub password_hash: Option<String>,
}

/// Repository for user records.
pub struct UserRepository<'a> {
    db: &'a Database,
}

impl<'a> UserRepository<'a> {
    /// Create a new user repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new user record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already taken.
    pub async fn create(&self, user: User) -> Result<User, RepositoryError> {
        let mut users = self.db.inner.users.write().await;
        if users.values().any(|u| u.email == user.email) {
            return Err(RepositoryError::Conflict(
                "email already registered".to_owned(),
            ));
        }
        users.insert(user.id, user.clone());
        Ok(user)
    }

    /// Look up a user by ID.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn get_by_id(&self, id: UserId) -> Result<Option<User>, RepositoryError> {
        Ok(self.db.inner.users.read().await.get(&id).cloned())
    }

    /// Look up a user by email address.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<User>, RepositoryError> {
        Ok(self
            .db
            .inner
            .users
            .read()
            .await
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }

    /// List all users, newest first.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn list_all(&self) -> Result<Vec<User>, RepositoryError> {
        let mut users: Vec<User> = self.db.inner.users.read().await.values().cloned().collect();
        users.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(users)
    }

    /// Apply a partial update to a user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    /// Returns `RepositoryError::Conflict` if a new email is already taken
    /// by another user.
    pub async fn update(&self, id: UserId, update: UserUpdate) -> Result<User, RepositoryError> {
        let mut users = self.db.inner.users.write().await;

        if let Some(ref email) = update.email
            && users.values().any(|u| u.id != id && &u.email == email)
        {
            return Err(RepositoryError::Conflict(
                "email already registered".to_owned(),
            ));
        }

        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        if let Some(name) = update.name {
            user.name = name;
        }
        if let Some(email) = update.email {
            user.email = email;
        }
        if let Some(phone) = update.phone {
            user.phone = phone;
        }
        if let Some(hash) = update.password_hash {
            user.password_hash = hash;
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    /// Flip the activation flag.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn set_active(&self, id: UserId, active: bool) -> Result<User, RepositoryError> {
        let mut users = self.db.inner.users.write().await;
        let user = users.get_mut(&id).ok_or(RepositoryError::NotFound)?;
        user.active = active;
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    /// Delete a user, returning the removed record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user doesn't exist.
    pub async fn delete(&self, id: UserId) -> Result<User, RepositoryError> {
        self.db
            .inner
            .users
            .write()
            .await
            .remove(&id)
            .ok_or(RepositoryError::NotFound)
    }

    /// Bulk conditional update: deactivate every account whose trial has
    /// passed and whose subscription is still active. Returns the number of
    /// records modified. Time-absolute, so re-running is a no-op.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn deactivate_expired(
        &self,
        now: DateTime<Utc>,
    ) -> Result<u64, RepositoryError> {
        let mut users = self.db.inner.users.write().await;
        let mut modified = 0;
        for user in users.values_mut() {
            if user.subscription == Some(SubscriptionStatus::Active)
                && user.trial_ends_at.is_some_and(|t| t <= now)
            {
                user.subscription = Some(SubscriptionStatus::Inactive);
                user.updated_at = now;
                modified += 1;
            }
        }
        Ok(modified)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use chrono::Duration;
    use layerworks_core::UserRole;

    use super::*;

    fn sample_user(email: &str) -> User {
        let now = Utc::now();
        User {
            id: UserId::generate(),
            email: Email::parse(email).unwrap(),
            password_hash: "hash".to_owned(),
            name: "Sample".to_owned(),
            phone: "555-0100".to_owned(),
            role: UserRole::User,
            active: true,
            subscription: None,
            trial_ends_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_email_uniqueness() {
        let db = Database::new();
        let repo = UserRepository::new(&db);

        repo.create(sample_user("a@b.c")).await.unwrap();
        let err = repo.create(sample_user("a@b.c")).await.unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_rejects_taken_email() {
        let db = Database::new();
        let repo = UserRepository::new(&db);

        repo.create(sample_user("a@b.c")).await.unwrap();
        let second = repo.create(sample_user("x@y.z")).await.unwrap();

        let err = repo
            .update(
                second.id,
                UserUpdate {
                    email: Some(Email::parse("a@b.c").unwrap()),
                    ..UserUpdate::default()
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_update_missing_user_is_not_found() {
        let db = Database::new();
        let repo = UserRepository::new(&db);

        let err = repo
            .update(UserId::generate(), UserUpdate::default())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_deactivate_expired_is_idempotent() {
        let db = Database::new();
        let repo = UserRepository::new(&db);
        let now = Utc::now();

        let mut expired = sample_user("expired@b.c");
        expired.subscription = Some(SubscriptionStatus::Active);
        expired.trial_ends_at = Some(now - Duration::days(1));
        repo.create(expired).await.unwrap();

        let mut live = sample_user("live@b.c");
        live.subscription = Some(SubscriptionStatus::Active);
        live.trial_ends_at = Some(now + Duration::days(3));
        let live = repo.create(live).await.unwrap();

        assert_eq!(repo.deactivate_expired(now).await.unwrap(), 1);
        assert_eq!(repo.deactivate_expired(now).await.unwrap(), 0);

        let live = repo.get_by_id(live.id).await.unwrap().unwrap();
        assert_eq!(live.subscription, Some(SubscriptionStatus::Active));
    }
}
