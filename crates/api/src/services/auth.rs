//! Account management: registration, login, and superadmin user admin.

use argon2::{
    Argon2,
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString, rand_core::OsRng},
};
use chrono::Utc;

use layerworks_core::{Email, UserId, UserRole};

use crate::db::{Database, RepositoryError, UserRepository, users::UserUpdate};
use crate::error::ApiError;
use crate::jwt::TokenIssuer;
use crate::models::{PublicUser, User};
use crate::notify::{Notification, NotificationQueue};

const MIN_PASSWORD_LENGTH: usize = 8;

/// Input for registering a new account.
#[derive(Debug)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
    pub phone: String,
    pub role: Option<UserRole>,
}

/// Changes to apply to an existing account. `None` fields are left as-is.
#[derive(Debug, Default)]
pub struct UserChanges {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub password: Option<String>,
}

/// Service for account lifecycle operations.
pub struct AuthService<'a> {
    users: UserRepository<'a>,
    tokens: &'a TokenIssuer,
    notifications: &'a NotificationQueue,
}

impl<'a> AuthService<'a> {
    /// Create a new auth service.
    #[must_use]
    pub const fn new(
        db: &'a Database,
        tokens: &'a TokenIssuer,
        notifications: &'a NotificationQueue,
    ) -> Self {
        Self {
            users: UserRepository::new(db),
            tokens,
            notifications,
        }
    }

    /// Register a new account and send the welcome email.
    ///
    /// The welcome email carries the initial password in plain text; this is
    /// the only operation that ever echoes a password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::Validation` for a bad email or short password, and
    /// `ApiError::Conflict` for a duplicate email.
    pub async fn register(&self, new_user: NewUser) -> Result<PublicUser, ApiError> {
        let email = Email::parse(&new_user.email)
            .map_err(|e| ApiError::Validation(format!("Invalid email: {e}")))?;
        validate_password(&new_user.password)?;

        let now = Utc::now();
        let user = User {
            id: UserId::generate(),
            email,
            password_hash: hash_password(&new_user.password)?,
            name: new_user.name,
            phone: new_user.phone,
            role: new_user.role.unwrap_or_default(),
            active: true,
            subscription: None,
            trial_ends_at: None,
            created_at: now,
            updated_at: now,
        };

        let user = self.users.create(user).await.map_err(|err| match err {
            RepositoryError::Conflict(_) => {
                ApiError::Conflict("Email already registered".to_owned())
            }
            other => ApiError::from(other),
        })?;

        self.notifications.enqueue(Notification::Welcome {
            to: user.email.to_string(),
            name: user.name.clone(),
            password: new_user.password,
        });

        Ok(PublicUser::from(&user))
    }

    /// Authenticate and issue a bearer token.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::InvalidCredentials` for an unknown email, a wrong
    /// password, or a deactivated account. The cases are deliberately
    /// indistinguishable to the caller.
    pub async fn login(&self, email: &str, password: &str) -> Result<(String, PublicUser), ApiError> {
        let email = Email::parse(email).map_err(|_| ApiError::InvalidCredentials)?;
        let user = self
            .users
            .get_by_email(&email)
            .await?
            .ok_or(ApiError::InvalidCredentials)?;

        if !user.active || !verify_password(password, &user.password_hash) {
            return Err(ApiError::InvalidCredentials);
        }

        let token = self
            .tokens
            .issue(user.id)
            .map_err(|e| ApiError::Internal(e.to_string()))?;
        Ok((token, PublicUser::from(&user)))
    }

    /// List all accounts, newest first.
    ///
    /// # Errors
    ///
    /// Propagates repository errors.
    pub async fn list_users(&self) -> Result<Vec<PublicUser>, ApiError> {
        let users = self.users.list_all().await?;
        Ok(users.iter().map(PublicUser::from).collect())
    }

    /// Apply changes to an account and notify the owner if their email or
    /// password changed. Update notifications never include the password.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for a missing user, `ApiError::Validation`
    /// for bad input, and `ApiError::Conflict` for a taken email.
    pub async fn update_user(
        &self,
        id: UserId,
        changes: UserChanges,
    ) -> Result<PublicUser, ApiError> {
        let email = changes
            .email
            .map(|e| Email::parse(&e).map_err(|err| ApiError::Validation(format!("Invalid email: {err}"))))
            .transpose()?;

        let password_changed = changes.password.is_some();
        let password_hash = changes
            .password
            .map(|p| {
                validate_password(&p)?;
                hash_password(&p)
            })
            .transpose()?;
        let email_changed = email.is_some();

        let update = UserUpdate {
            name: changes.name,
            email,
            phone: changes.phone,
            password_hash,
        };

        let user = self.users.update(id, update).await.map_err(|err| match err {
            RepositoryError::Conflict(_) => {
                ApiError::Conflict("Email already registered".to_owned())
            }
            other => ApiError::from(other),
        })?;

        if password_changed || email_changed {
            self.notifications.enqueue(Notification::AccountUpdated {
                to: user.email.to_string(),
                name: user.name.clone(),
                password_changed,
            });
        }

        Ok(PublicUser::from(&user))
    }

    /// Flip the activation flag on an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for a missing user.
    pub async fn set_active(&self, id: UserId, active: bool) -> Result<PublicUser, ApiError> {
        let user = self.users.set_active(id, active).await?;
        Ok(PublicUser::from(&user))
    }

    /// Delete an account.
    ///
    /// # Errors
    ///
    /// Returns `ApiError::NotFound` for a missing user.
    pub async fn delete_user(&self, id: UserId) -> Result<(), ApiError> {
        self.users.delete(id).await?;
        Ok(())
    }
}

fn validate_password(password: &str) -> Result<(), ApiError> {
    if password.len() < MIN_PASSWORD_LENGTH {
        return Err(ApiError::Validation(format!(
            "Password must be at least {MIN_PASSWORD_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Hash a password using Argon2id.
///
/// # Errors
///
/// Returns `ApiError::Internal` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, ApiError> {
    let salt = SaltString::generate(&mut OsRng);
    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| ApiError::Internal(format!("password hashing failed: {e}")))
}

/// Verify a password against a stored hash.
#[must_use]
pub fn verify_password(password: &str, hash: &str) -> bool {
    PasswordHash::new(hash).is_ok_and(|parsed| {
        Argon2::default()
            .verify_password(password.as_bytes(), &parsed)
            .is_ok()
    })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;
    use secrecy::SecretString;

    use crate::notify::{MailError, Mailer};

    use super::*;

    struct RecordingMailer {
        sent: Mutex<Vec<Notification>>,
    }

    #[async_trait]
    impl Mailer for RecordingMailer {
        async fn send(&self, notification: &Notification) -> Result<(), MailError> {
            self.sent.lock().unwrap().push(notification.clone());
            Ok(())
        }
    }

    struct Fixture {
        db: Database,
        tokens: TokenIssuer,
        notifications: NotificationQueue,
        mailer: Arc<RecordingMailer>,
    }

    fn fixture() -> Fixture {
        let mailer = Arc::new(RecordingMailer {
            sent: Mutex::new(Vec::new()),
        });
        Fixture {
            db: Database::new(),
            tokens: TokenIssuer::new(&SecretString::from("0123456789abcdef0123456789abcdef")),
            notifications: NotificationQueue::spawn(mailer.clone()),
            mailer,
        }
    }

    fn new_user(email: &str) -> NewUser {
        NewUser {
            name: "Sample".to_owned(),
            email: email.to_owned(),
            password: "correct horse".to_owned(),
            phone: "555-0100".to_owned(),
            role: None,
        }
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let fx = fixture();
        let service = AuthService::new(&fx.db, &fx.tokens, &fx.notifications);

        let registered = service.register(new_user("a@b.c")).await.unwrap();
        assert_eq!(registered.role, UserRole::User);
        assert!(registered.active);

        let (token, user) = service.login("a@b.c", "correct horse").await.unwrap();
        assert_eq!(user.id, registered.id);
        assert_eq!(fx.tokens.verify(&token).unwrap().sub, registered.id);
    }

    #[tokio::test]
    async fn test_login_failures_are_indistinguishable() {
        let fx = fixture();
        let service = AuthService::new(&fx.db, &fx.tokens, &fx.notifications);
        let registered = service.register(new_user("a@b.c")).await.unwrap();

        // Wrong password.
        assert!(matches!(
            service.login("a@b.c", "wrong password").await.unwrap_err(),
            ApiError::InvalidCredentials
        ));
        // Unknown email.
        assert!(matches!(
            service.login("x@y.z", "correct horse").await.unwrap_err(),
            ApiError::InvalidCredentials
        ));
        // Deactivated account, even with the right password.
        service.set_active(registered.id, false).await.unwrap();
        assert!(matches!(
            service.login("a@b.c", "correct horse").await.unwrap_err(),
            ApiError::InvalidCredentials
        ));
    }

    #[tokio::test]
    async fn test_register_rejects_short_password_and_duplicates() {
        let fx = fixture();
        let service = AuthService::new(&fx.db, &fx.tokens, &fx.notifications);

        let mut short = new_user("a@b.c");
        short.password = "short".to_owned();
        assert!(matches!(
            service.register(short).await.unwrap_err(),
            ApiError::Validation(_)
        ));

        service.register(new_user("a@b.c")).await.unwrap();
        assert!(matches!(
            service.register(new_user("a@b.c")).await.unwrap_err(),
            ApiError::Conflict(_)
        ));
    }

    #[tokio::test]
    async fn test_welcome_email_carries_password_but_updates_do_not() {
        let fx = fixture();
        let service = AuthService::new(&fx.db, &fx.tokens, &fx.notifications);
        let registered = service.register(new_user("a@b.c")).await.unwrap();

        service
            .update_user(
                registered.id,
                UserChanges {
                    password: Some("a new password".to_owned()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        let sent = fx.mailer.sent.lock().unwrap();
        assert_eq!(sent.len(), 2);
        match &sent[0] {
            Notification::Welcome { password, .. } => assert_eq!(password, "correct horse"),
            other => panic!("expected welcome, got {other:?}"),
        }
        match &sent[1] {
            Notification::AccountUpdated {
                password_changed, ..
            } => assert!(password_changed),
            other => panic!("expected update, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_update_without_credential_change_sends_nothing() {
        let fx = fixture();
        let service = AuthService::new(&fx.db, &fx.tokens, &fx.notifications);
        let registered = service.register(new_user("a@b.c")).await.unwrap();

        service
            .update_user(
                registered.id,
                UserChanges {
                    name: Some("Renamed".to_owned()),
                    ..UserChanges::default()
                },
            )
            .await
            .unwrap();

        tokio::time::sleep(std::time::Duration::from_millis(50)).await;

        // Only the welcome email from registration.
        assert_eq!(fx.mailer.sent.lock().unwrap().len(), 1);
    }

    #[test]
    fn test_password_hash_roundtrip() {
        let hash = hash_password("correct horse").unwrap();
        assert!(verify_password("correct horse", &hash));
        assert!(!verify_password("wrong", &hash));
        assert!(!verify_password("correct horse", "not-a-hash"));
    }
}
