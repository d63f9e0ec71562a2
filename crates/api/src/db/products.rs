//! Product repository.

use chrono::Utc;

use layerworks_core::ProductId;

use super::{Database, RepositoryError};
use crate::models::Product;

/// Repository for saved product customizations.
pub struct ProductRepository<'a> {
    db: &'a Database,
}

impl<'a> ProductRepository<'a> {
    /// Create a new product repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Persist a customization document verbatim.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn create(&self, data: serde_json::Value) -> Result<Product, RepositoryError> {
        let product = Product {
            id: ProductId::generate(),
            data,
            created_at: Utc::now(),
        };
        self.db
            .inner
            .products
            .write()
            .await
            .insert(product.id, product.clone());
        Ok(product)
    }

    /// List all saved products, newest first.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn list_all(&self) -> Result<Vec<Product>, RepositoryError> {
        let mut products: Vec<Product> = self
            .db
            .inner
            .products
            .read()
            .await
            .values()
            .cloned()
            .collect();
        products.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(products)
    }

    /// Fetch a saved product by ID.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn get(&self, id: ProductId) -> Result<Option<Product>, RepositoryError> {
        Ok(self.db.inner.products.read().await.get(&id).cloned())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_document_stored_verbatim() {
        let db = Database::new();
        let repo = ProductRepository::new(&db);

        let body = serde_json::json!({"color": "red", "layers": [1, 2, 3]});
        let saved = repo.create(body.clone()).await.unwrap();

        let fetched = repo.get(saved.id).await.unwrap().unwrap();
        assert_eq!(fetched.data, body);
    }

    #[tokio::test]
    async fn test_get_missing_is_none() {
        let db = Database::new();
        let repo = ProductRepository::new(&db);
        assert!(repo.get(ProductId::generate()).await.unwrap().is_none());
    }
}
