//! Week repository
//!
//! Typed CRUD over the `weeks` collection. Updates are full replacements.

use std::sync::Arc;

use super::model::{Week, WeekInput};
use crate::store::{encode, RecordStore};
use crate::{Error, Result};

const COLLECTION: &str = "weeks";

#[derive(Clone)]
pub struct WeekRepository {
    store: Arc<dyn RecordStore>,
}

impl WeekRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    /// All weeks, in store order
    pub async fn list(&self) -> Result<Vec<Week>> {
        self.store
            .find_all(COLLECTION)
            .await?
            .into_iter()
            .map(|r| r.decode())
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Week> {
        self.store
            .find_by_id(COLLECTION, id)
            .await?
            .ok_or_else(|| Error::not_found("Week", id))?
            .decode()
    }

    pub async fn create(&self, input: WeekInput) -> Result<Week> {
        self.store.insert(COLLECTION, encode(&input)?).await?.decode()
    }

    /// Overwrite every field of an existing week
    pub async fn update(&self, id: &str, input: WeekInput) -> Result<Week> {
        self.store
            .replace(COLLECTION, id, encode(&input)?)
            .await?
            .ok_or_else(|| Error::not_found("Week", id))?
            .decode()
    }

    /// Remove a week, returning its state before deletion
    pub async fn delete(&self, id: &str) -> Result<Week> {
        self.store
            .remove(COLLECTION, id)
            .await?
            .ok_or_else(|| Error::not_found("Week", id))?
            .decode()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryStore;

    fn repo() -> WeekRepository {
        WeekRepository::new(Arc::new(MemoryStore::new()))
    }

    fn sample(numweek: i32) -> WeekInput {
        WeekInput {
            year: 2024,
            numweek,
            color: "#fff".to_string(),
            description: "Sprint".to_string(),
            priority: 1,
            link: "https://example.com".to_string(),
        }
    }

    fn fields_of(week: &Week) -> WeekInput {
        WeekInput {
            year: week.year,
            numweek: week.numweek,
            color: week.color.clone(),
            description: week.description.clone(),
            priority: week.priority,
            link: week.link.clone(),
        }
    }

    #[tokio::test]
    async fn test_create_then_list() {
        let repo = repo();
        let created = repo.create(sample(10)).await.unwrap();

        let weeks = repo.list().await.unwrap();
        assert_eq!(weeks, vec![created.clone()]);
        assert_eq!(fields_of(&created), sample(10));
    }

    #[tokio::test]
    async fn test_duplicate_year_week_is_allowed() {
        let repo = repo();
        let a = repo.create(sample(10)).await.unwrap();
        let b = repo.create(sample(10)).await.unwrap();

        assert_ne!(a.id, b.id);
        assert_eq!(repo.list().await.unwrap().len(), 2);
    }

    #[tokio::test]
    async fn test_update_replaces_all_fields() {
        let repo = repo();
        let created = repo.create(sample(10)).await.unwrap();

        let replacement = WeekInput {
            year: 2025,
            numweek: 1,
            color: "#000".to_string(),
            description: String::new(),
            priority: 9,
            link: String::new(),
        };
        let updated = repo.update(&created.id, replacement.clone()).await.unwrap();

        assert_eq!(updated.id, created.id);
        assert_eq!(fields_of(&updated), replacement);
        assert_eq!(fields_of(&repo.get(&created.id).await.unwrap()), replacement);
    }

    #[tokio::test]
    async fn test_delete_returns_prior_state() {
        let repo = repo();
        let created = repo.create(sample(10)).await.unwrap();

        let deleted = repo.delete(&created.id).await.unwrap();
        assert_eq!(deleted, created);

        match repo.get(&created.id).await {
            Err(Error::NotFound { entity, .. }) => assert_eq!(entity, "Week"),
            other => panic!("Expected NotFound error, got: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unknown_id() {
        let repo = repo();
        assert!(matches!(
            repo.update("missing", sample(1)).await,
            Err(Error::NotFound { .. })
        ));
        assert!(matches!(
            repo.delete("missing").await,
            Err(Error::NotFound { .. })
        ));
    }
}
