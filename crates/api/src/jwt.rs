//! Bearer token issuing and verification.
//!
//! Tokens are stateless: verification only checks the signature and expiry,
//! never the user store. Role and activation checks against current state
//! happen in the extractors that need them.

use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use layerworks_core::UserId;

/// Token lifetime.
pub const TOKEN_TTL_HOURS: i64 = 24;

/// Errors from token issuing or verification.
#[derive(Debug, Error)]
pub enum TokenError {
    #[error("failed to encode token: {0}")]
    Encode(jsonwebtoken::errors::Error),
    #[error("token rejected: {0}")]
    Verify(jsonwebtoken::errors::Error),
}

/// Claims carried in every token.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the authenticated user's ID.
    pub sub: UserId,
    /// Expiry as a unix timestamp.
    pub exp: i64,
}

/// Signs and verifies bearer tokens with a shared HMAC secret.
pub struct TokenIssuer {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl TokenIssuer {
    /// Build an issuer from the configured signing secret.
    #[must_use]
    pub fn new(secret: &SecretString) -> Self {
        let bytes = secret.expose_secret().as_bytes();
        Self {
            encoding: EncodingKey::from_secret(bytes),
            decoding: DecodingKey::from_secret(bytes),
        }
    }

    /// Issue a token for a user, valid for [`TOKEN_TTL_HOURS`].
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Encode` if signing fails.
    pub fn issue(&self, user_id: UserId) -> Result<String, TokenError> {
        let claims = Claims {
            sub: user_id,
            exp: (Utc::now() + Duration::hours(TOKEN_TTL_HOURS)).timestamp(),
        };
        jsonwebtoken::encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(TokenError::Encode)
    }

    /// Verify a token and return its claims.
    ///
    /// # Errors
    ///
    /// Returns `TokenError::Verify` for a bad signature, expired token, or
    /// malformed input.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        let validation = Validation::new(Algorithm::HS256);
        jsonwebtoken::decode::<Claims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(TokenError::Verify)
    }
}

impl std::fmt::Debug for TokenIssuer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenIssuer").finish_non_exhaustive()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn issuer(secret: &str) -> TokenIssuer {
        TokenIssuer::new(&SecretString::from(secret.to_owned()))
    }

    #[test]
    fn test_issue_and_verify_roundtrip() {
        let issuer = issuer("0123456789abcdef0123456789abcdef");
        let user_id = UserId::generate();

        let token = issuer.issue(user_id).unwrap();
        let claims = issuer.verify(&token).unwrap();
        assert_eq!(claims.sub, user_id);
        assert!(claims.exp > Utc::now().timestamp());
    }

    #[test]
    fn test_wrong_secret_is_rejected() {
        let token = issuer("0123456789abcdef0123456789abcdef")
            .issue(UserId::generate())
            .unwrap();
        let err = issuer("fedcba9876543210fedcba9876543210")
            .verify(&token)
            .unwrap_err();
        assert!(matches!(err, TokenError::Verify(_)));
    }

    #[test]
    fn test_garbage_is_rejected() {
        let issuer = issuer("0123456789abcdef0123456789abcdef");
        assert!(issuer.verify("not-a-token").is_err());
        assert!(issuer.verify("").is_err());
    }
}
