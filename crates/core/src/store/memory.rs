//! Ephemeral in-memory record store

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::RwLock;

use super::collection::Collection;
use super::{Document, RecordStore, StoredRecord};
use crate::{Error, Result};

/// Record store that lives only as long as the process
#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, Collection>>,
    closed: AtomicBool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn ensure_open(&self) -> Result<()> {
        if self.closed.load(Ordering::Acquire) {
            return Err(Error::Store("Store is closed".to_string()));
        }
        Ok(())
    }
}

#[async_trait]
impl RecordStore for MemoryStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<StoredRecord> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;
        Ok(collections
            .entry(collection.to_string())
            .or_default()
            .insert(doc))
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<StoredRecord>> {
        self.ensure_open()?;
        let collections = self.collections.read().await;
        Ok(collections
            .get(collection)
            .map(|c| c.records().to_vec())
            .unwrap_or_default())
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<StoredRecord>> {
        self.ensure_open()?;
        let collections = self.collections.read().await;
        Ok(collections.get(collection).and_then(|c| c.get(id)).cloned())
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
    ) -> Result<Option<StoredRecord>> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|c| c.replace(id, doc)))
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<Option<StoredRecord>> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;
        Ok(collections
            .get_mut(collection)
            .and_then(|c| c.merge(id, fields)))
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<Option<StoredRecord>> {
        self.ensure_open()?;
        let mut collections = self.collections.write().await;
        Ok(collections.get_mut(collection).and_then(|c| c.remove(id)))
    }

    async fn close(&self) -> Result<()> {
        self.closed.store(true, Ordering::Release);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn doc(value: serde_json::Value) -> Document {
        value.as_object().cloned().unwrap()
    }

    #[tokio::test]
    async fn test_collections_are_isolated() {
        let store = MemoryStore::new();
        let week = store.insert("weeks", doc(json!({"year": 2024}))).await.unwrap();

        assert_eq!(store.find_all("weeks").await.unwrap().len(), 1);
        assert!(store.find_all("tasks").await.unwrap().is_empty());
        assert!(store.find_by_id("tasks", &week.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_remove_returns_prior_state() {
        let store = MemoryStore::new();
        let task = store.insert("tasks", doc(json!({"name": "A"}))).await.unwrap();

        let removed = store.remove("tasks", &task.id).await.unwrap().unwrap();
        assert_eq!(removed, task);
        assert!(store.remove("tasks", &task.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_closed_store_rejects_calls() {
        let store = MemoryStore::new();
        store.close().await.unwrap();

        let result = store.find_all("weeks").await;
        assert!(matches!(result, Err(Error::Store(_))));
    }
}
