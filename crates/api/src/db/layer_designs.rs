//! Layer design repository.
//!
//! All queries are owner-scoped. Group membership is value equality on the
//! `sq` key; renaming a group rewrites the key on every member.

use chrono::Utc;

use layerworks_core::{LayerDesignId, UserId};

use super::{Database, RepositoryError};
use crate::models::{CustomizableEntry, LayerDesign};

/// Field changes applied by [`LayerDesignRepository::update`].
///
/// `None` fields are left untouched. `customizables` replaces the whole list;
/// appending goes through [`LayerDesignRepository::append_customizable`].
#[derive(Debug, Default)]
pub struct LayerDesignUpdate {
    pub name: Option<String>,
    pub sq: Option<String>,
    pub layers: Option<Vec<serde_json::Value>>,
    pub customizables: Option<Vec<CustomizableEntry>>,
}

/// Repository for layer designs.
pub struct LayerDesignRepository<'a> {
    db: &'a Database,
}

impl<'a> LayerDesignRepository<'a> {
    /// Create a new layer design repository.
    #[must_use]
    pub const fn new(db: &'a Database) -> Self {
        Self { db }
    }

    /// Insert a new layer design.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn create(&self, design: LayerDesign) -> Result<LayerDesign, RepositoryError> {
        self.db
            .inner
            .layer_designs
            .write()
            .await
            .insert(design.id, design.clone());
        Ok(design)
    }

    /// Fetch a design by `(id, owner)`.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn get(
        &self,
        id: LayerDesignId,
        owner: UserId,
    ) -> Result<Option<LayerDesign>, RepositoryError> {
        Ok(self
            .db
            .inner
            .layer_designs
            .read()
            .await
            .get(&id)
            .filter(|d| d.owner == owner)
            .cloned())
    }

    /// List all designs for an owner, newest first.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn list_by_owner(&self, owner: UserId) -> Result<Vec<LayerDesign>, RepositoryError> {
        let mut designs: Vec<LayerDesign> = self
            .db
            .inner
            .layer_designs
            .read()
            .await
            .values()
            .filter(|d| d.owner == owner)
            .cloned()
            .collect();
        designs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(designs)
    }

    /// List an owner's designs in one group.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn list_by_group(
        &self,
        owner: UserId,
        sq: &str,
    ) -> Result<Vec<LayerDesign>, RepositoryError> {
        let mut designs: Vec<LayerDesign> = self
            .db
            .inner
            .layer_designs
            .read()
            .await
            .values()
            .filter(|d| d.owner == owner && d.sq == sq)
            .cloned()
            .collect();
        designs.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(designs)
    }

    /// Distinct group keys used by an owner, sorted.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn list_group_keys(&self, owner: UserId) -> Result<Vec<String>, RepositoryError> {
        let mut keys: Vec<String> = self
            .db
            .inner
            .layer_designs
            .read()
            .await
            .values()
            .filter(|d| d.owner == owner)
            .map(|d| d.sq.clone())
            .collect();
        keys.sort();
        keys.dedup();
        Ok(keys)
    }

    /// Apply a partial update to an owner's design.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id is absent or owned by
    /// someone else.
    pub async fn update(
        &self,
        id: LayerDesignId,
        owner: UserId,
        update: LayerDesignUpdate,
    ) -> Result<LayerDesign, RepositoryError> {
        let mut designs = self.db.inner.layer_designs.write().await;
        let design = designs
            .get_mut(&id)
            .filter(|d| d.owner == owner)
            .ok_or(RepositoryError::NotFound)?;

        if let Some(name) = update.name {
            design.name = name;
        }
        if let Some(sq) = update.sq {
            design.sq = sq;
        }
        if let Some(layers) = update.layers {
            design.layers = layers;
        }
        if let Some(customizables) = update.customizables {
            design.customizables = customizables;
        }
        design.updated_at = Utc::now();
        Ok(design.clone())
    }

    /// Delete an owner's design.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id is absent or owned by
    /// someone else.
    pub async fn delete(&self, id: LayerDesignId, owner: UserId) -> Result<(), RepositoryError> {
        let mut designs = self.db.inner.layer_designs.write().await;
        if designs.get(&id).is_some_and(|d| d.owner == owner) {
            designs.remove(&id);
            Ok(())
        } else {
            Err(RepositoryError::NotFound)
        }
    }

    /// Rename a group: rewrite the `sq` key on every member the owner has.
    /// Returns the number of designs modified; an empty group yields zero,
    /// not an error.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn rename_group(
        &self,
        owner: UserId,
        old_sq: &str,
        new_sq: &str,
    ) -> Result<u64, RepositoryError> {
        let mut designs = self.db.inner.layer_designs.write().await;
        let now = Utc::now();
        let mut modified = 0;
        for design in designs.values_mut() {
            if design.owner == owner && design.sq == old_sq {
                design.sq = new_sq.to_owned();
                design.updated_at = now;
                modified += 1;
            }
        }
        Ok(modified)
    }

    /// Delete every design in an owner's group. Returns the number removed;
    /// an empty group yields zero, not an error.
    ///
    /// # Errors
    ///
    /// This backend cannot fail; the `Result` mirrors the store interface.
    pub async fn delete_group(&self, owner: UserId, sq: &str) -> Result<u64, RepositoryError> {
        let mut designs = self.db.inner.layer_designs.write().await;
        let before = designs.len();
        designs.retain(|_, d| !(d.owner == owner && d.sq == sq));
        Ok((before - designs.len()) as u64)
    }

    /// Append one customizable entry to an owner's design. Append-only:
    /// existing entries keep their positions.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` when the id is absent or owned by
    /// someone else.
    pub async fn append_customizable(
        &self,
        id: LayerDesignId,
        owner: UserId,
        entry: CustomizableEntry,
    ) -> Result<LayerDesign, RepositoryError> {
        let mut designs = self.db.inner.layer_designs.write().await;
        let design = designs
            .get_mut(&id)
            .filter(|d| d.owner == owner)
            .ok_or(RepositoryError::NotFound)?;
        design.customizables.push(entry);
        design.updated_at = Utc::now();
        Ok(design.clone())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn sample_design(owner: UserId, name: &str, sq: &str) -> LayerDesign {
        let now = Utc::now();
        LayerDesign {
            id: LayerDesignId::generate(),
            owner,
            name: name.to_owned(),
            sq: sq.to_owned(),
            layers: vec![serde_json::json!({"kind": "base"})],
            customizables: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    fn entry(title: &str) -> CustomizableEntry {
        CustomizableEntry {
            title: title.to_owned(),
            short_description: format!("{title} description"),
            files: Vec::new(),
        }
    }

    #[tokio::test]
    async fn test_group_keys_are_distinct_and_owner_scoped() {
        let db = Database::new();
        let repo = LayerDesignRepository::new(&db);
        let owner = UserId::generate();

        repo.create(sample_design(owner, "a", "hoodies")).await.unwrap();
        repo.create(sample_design(owner, "b", "hoodies")).await.unwrap();
        repo.create(sample_design(owner, "c", "caps")).await.unwrap();
        repo.create(sample_design(UserId::generate(), "d", "mugs"))
            .await
            .unwrap();

        assert_eq!(
            repo.list_group_keys(owner).await.unwrap(),
            vec!["caps".to_owned(), "hoodies".to_owned()]
        );
    }

    #[tokio::test]
    async fn test_rename_group_counts_and_scopes() {
        let db = Database::new();
        let repo = LayerDesignRepository::new(&db);
        let owner = UserId::generate();
        let other = UserId::generate();

        repo.create(sample_design(owner, "a", "old")).await.unwrap();
        repo.create(sample_design(owner, "b", "old")).await.unwrap();
        repo.create(sample_design(other, "c", "old")).await.unwrap();

        assert_eq!(repo.rename_group(owner, "old", "new").await.unwrap(), 2);
        assert_eq!(repo.list_by_group(owner, "old").await.unwrap().len(), 0);
        assert_eq!(repo.list_by_group(owner, "new").await.unwrap().len(), 2);
        // The other owner's group is untouched.
        assert_eq!(repo.list_by_group(other, "old").await.unwrap().len(), 1);

        // Renaming a missing group is a zero-count no-op.
        assert_eq!(repo.rename_group(owner, "gone", "x").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_group_only_removes_owners_members() {
        let db = Database::new();
        let repo = LayerDesignRepository::new(&db);
        let owner = UserId::generate();
        let other = UserId::generate();

        repo.create(sample_design(owner, "a", "sale")).await.unwrap();
        repo.create(sample_design(owner, "b", "sale")).await.unwrap();
        repo.create(sample_design(owner, "c", "keep")).await.unwrap();
        repo.create(sample_design(other, "d", "sale")).await.unwrap();

        assert_eq!(repo.delete_group(owner, "sale").await.unwrap(), 2);
        assert_eq!(repo.list_by_owner(owner).await.unwrap().len(), 1);
        assert_eq!(repo.list_by_owner(other).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_append_customizable_preserves_order() {
        let db = Database::new();
        let repo = LayerDesignRepository::new(&db);
        let owner = UserId::generate();
        let design = repo
            .create(sample_design(owner, "a", "hoodies"))
            .await
            .unwrap();

        for title in ["first", "second", "third"] {
            repo.append_customizable(design.id, owner, entry(title))
                .await
                .unwrap();
        }

        let design = repo.get(design.id, owner).await.unwrap().unwrap();
        let titles: Vec<&str> = design
            .customizables
            .iter()
            .map(|c| c.title.as_str())
            .collect();
        assert_eq!(titles, vec!["first", "second", "third"]);
    }

    #[tokio::test]
    async fn test_owner_mismatch_reads_as_absent() {
        let db = Database::new();
        let repo = LayerDesignRepository::new(&db);
        let owner = UserId::generate();
        let design = repo
            .create(sample_design(owner, "a", "hoodies"))
            .await
            .unwrap();

        let other = UserId::generate();
        assert!(repo.get(design.id, other).await.unwrap().is_none());
        assert!(matches!(
            repo.append_customizable(design.id, other, entry("x"))
                .await
                .unwrap_err(),
            RepositoryError::NotFound
        ));
        assert!(matches!(
            repo.delete(design.id, other).await.unwrap_err(),
            RepositoryError::NotFound
        ));
    }
}
