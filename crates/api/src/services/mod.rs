//! Business logic services.
//!
//! Services own the rules; repositories own the data. Handlers stay thin:
//! they authenticate via extractors, deserialize, call a service, serialize.

pub mod auth;
pub mod configurations;

pub use auth::AuthService;
pub use configurations::ConfigurationService;
