//! File-based record store
//!
//! Stores each collection as a JSON array in `<dir>/<collection>.json`.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use tokio::sync::RwLock;

use super::collection::Collection;
use super::{Document, RecordStore, StoredRecord};
use crate::{Error, Result};

/// File-backed record store using one JSON file per collection
pub struct FileStore {
    /// Directory holding the collection files
    dir: PathBuf,
    /// Loaded collections; `None` once the store is closed
    collections: RwLock<Option<HashMap<String, Collection>>>,
}

impl FileStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir)
            .await
            .map_err(|e| Error::Store(format!("Failed to create store directory: {}", e)))?;

        Ok(Self {
            dir,
            collections: RwLock::new(Some(HashMap::new())),
        })
    }

    fn collection_path(&self, collection: &str) -> PathBuf {
        self.dir.join(format!("{}.json", collection))
    }

    async fn load(path: &Path) -> Result<Collection> {
        if !path.exists() {
            return Ok(Collection::default());
        }
        let content = tokio::fs::read_to_string(path)
            .await
            .map_err(|e| Error::Store(format!("Failed to read {}: {}", path.display(), e)))?;
        let records: Vec<StoredRecord> = serde_json::from_str(&content)
            .map_err(|e| Error::Store(format!("Failed to parse {}: {}", path.display(), e)))?;
        Ok(Collection::from_records(records))
    }

    /// Write a collection through a temp file so readers never see a partial file
    async fn persist(&self, collection: &str, data: &Collection) -> Result<()> {
        let path = self.collection_path(collection);
        let tmp = path.with_extension("json.tmp");
        let content = serde_json::to_string_pretty(data.records())?;

        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| Error::Store(format!("Failed to write {}: {}", tmp.display(), e)))?;
        tokio::fs::rename(&tmp, &path)
            .await
            .map_err(|e| Error::Store(format!("Failed to replace {}: {}", path.display(), e)))?;
        Ok(())
    }

    /// Run a read against a collection, loading it from disk on first use
    async fn read<T>(&self, collection: &str, f: impl FnOnce(&Collection) -> T) -> Result<T> {
        {
            let guard = self.collections.read().await;
            let loaded = guard
                .as_ref()
                .ok_or_else(|| Error::Store("Store is closed".to_string()))?;
            if let Some(data) = loaded.get(collection) {
                return Ok(f(data));
            }
        }

        let mut guard = self.collections.write().await;
        let loaded = guard
            .as_mut()
            .ok_or_else(|| Error::Store("Store is closed".to_string()))?;
        if !loaded.contains_key(collection) {
            let data = Self::load(&self.collection_path(collection)).await?;
            loaded.insert(collection.to_string(), data);
        }
        Ok(f(&loaded[collection]))
    }

    /// Apply a mutation to a copy of the collection, persist it, then publish it.
    /// A failed write leaves the visible state untouched.
    async fn write<T>(
        &self,
        collection: &str,
        f: impl FnOnce(&mut Collection) -> T,
    ) -> Result<T> {
        let mut guard = self.collections.write().await;
        let loaded = guard
            .as_mut()
            .ok_or_else(|| Error::Store("Store is closed".to_string()))?;

        let mut data = match loaded.get(collection) {
            Some(existing) => existing.clone(),
            None => Self::load(&self.collection_path(collection)).await?,
        };
        let out = f(&mut data);
        self.persist(collection, &data).await?;
        loaded.insert(collection.to_string(), data);
        Ok(out)
    }
}

#[async_trait]
impl RecordStore for FileStore {
    async fn insert(&self, collection: &str, doc: Document) -> Result<StoredRecord> {
        self.write(collection, |c| c.insert(doc)).await
    }

    async fn find_all(&self, collection: &str) -> Result<Vec<StoredRecord>> {
        self.read(collection, |c| c.records().to_vec()).await
    }

    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<StoredRecord>> {
        self.read(collection, |c| c.get(id).cloned()).await
    }

    async fn replace(
        &self,
        collection: &str,
        id: &str,
        doc: Document,
    ) -> Result<Option<StoredRecord>> {
        if self.find_by_id(collection, id).await?.is_none() {
            return Ok(None);
        }
        self.write(collection, |c| c.replace(id, doc)).await
    }

    async fn merge(
        &self,
        collection: &str,
        id: &str,
        fields: Document,
    ) -> Result<Option<StoredRecord>> {
        if self.find_by_id(collection, id).await?.is_none() {
            return Ok(None);
        }
        self.write(collection, |c| c.merge(id, fields)).await
    }

    async fn remove(&self, collection: &str, id: &str) -> Result<Option<StoredRecord>> {
        if self.find_by_id(collection, id).await?.is_none() {
            return Ok(None);
        }
        self.write(collection, |c| c.remove(id)).await
    }

    async fn close(&self) -> Result<()> {
        let mut guard = self.collections.write().await;
        if guard.take().is_some() {
            tracing::info!("Closed file record store at {}", self.dir.display());
        }
        Ok(())
    }
}
