//! Document store and per-entity repositories.
//!
//! The store holds one map per collection behind its own `RwLock`, which
//! gives every repository operation per-collection atomicity: single-document
//! writes and bulk conditional updates each run under one write-lock
//! acquisition. There are no cross-collection transactions; that matches the
//! consistency boundary of the document database this port stands in for.
//!
//! Uniqueness constraints live here, not in the services: user email and
//! configuration owner are checked under the collection write lock, so
//! concurrent duplicate creation cannot slip through a read-then-write gap.

pub mod configurations;
pub mod layer_designs;
pub mod products;
pub mod users;

use std::collections::HashMap;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::RwLock;

use layerworks_core::{ConfigurationId, LayerDesignId, ProductId, UserId};

use crate::models::{Configuration, LayerDesign, Product, User};

pub use configurations::ConfigurationRepository;
pub use layer_designs::LayerDesignRepository;
pub use products::ProductRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Requested entity was not found (or is owned by someone else).
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g. unique email, one configuration per user).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Handle to the in-memory document store.
///
/// Cheap to clone; all clones share the same collections.
#[derive(Clone, Default)]
pub struct Database {
    inner: Arc<Collections>,
}

#[derive(Default)]
struct Collections {
    users: RwLock<HashMap<UserId, User>>,
    configurations: RwLock<HashMap<ConfigurationId, Configuration>>,
    layer_designs: RwLock<HashMap<LayerDesignId, LayerDesign>>,
    products: RwLock<HashMap<ProductId, Product>>,
}

impl Database {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}
