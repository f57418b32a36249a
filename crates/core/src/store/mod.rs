//! Record store module
//!
//! A generic document store holding schema-less JSON documents in named
//! collections. The store assigns identifiers and owns durability; typed
//! repositories sit on top of it.

mod collection;
mod file;
mod memory;

use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::sync::Arc;

use crate::{Error, Result};

pub use file::FileStore;
pub use memory::MemoryStore;

/// A stored document body, without its identifier
pub type Document = Map<String, Value>;

/// A document together with its store-assigned identifier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub id: String,
    #[serde(flatten)]
    pub doc: Document,
}

impl StoredRecord {
    /// Decode into a typed entity, exposing the identifier as `id`
    pub fn decode<T: DeserializeOwned>(self) -> Result<T> {
        let mut doc = self.doc;
        doc.insert("id".to_string(), Value::String(self.id));
        serde_json::from_value(Value::Object(doc))
            .map_err(|e| Error::Store(format!("Malformed stored document: {}", e)))
    }
}

/// Encode a typed value into a document body
pub fn encode<T: Serialize>(value: &T) -> Result<Document> {
    match serde_json::to_value(value)? {
        Value::Object(mut doc) => {
            doc.remove("id");
            Ok(doc)
        }
        other => Err(Error::Store(format!(
            "Expected an object document, got {}",
            other
        ))),
    }
}

/// Persistence interface shared by every backend
#[async_trait]
pub trait RecordStore: Send + Sync {
    /// Insert a document and assign it a fresh identifier
    async fn insert(&self, collection: &str, doc: Document) -> Result<StoredRecord>;

    /// All documents of a collection, in insertion order
    async fn find_all(&self, collection: &str) -> Result<Vec<StoredRecord>>;

    /// Look up one document
    async fn find_by_id(&self, collection: &str, id: &str) -> Result<Option<StoredRecord>>;

    /// Overwrite a document entirely; `None` if the id is unknown
    async fn replace(&self, collection: &str, id: &str, doc: Document)
        -> Result<Option<StoredRecord>>;

    /// Set only the given fields; `None` if the id is unknown
    async fn merge(&self, collection: &str, id: &str, fields: Document)
        -> Result<Option<StoredRecord>>;

    /// Remove a document, returning its prior state
    async fn remove(&self, collection: &str, id: &str) -> Result<Option<StoredRecord>>;

    /// Flush and release the store. Later calls fail.
    async fn close(&self) -> Result<()>;
}

/// Open a store from a connection string
///
/// Supported forms are `memory://` and `file://<dir>`.
pub async fn open_store(uri: &str) -> Result<Arc<dyn RecordStore>> {
    let uri = uri.trim();
    if uri == "memory://" || uri == "memory:" {
        tracing::info!("Opening in-memory record store");
        return Ok(Arc::new(MemoryStore::new()));
    }

    if let Some(path) = uri.strip_prefix("file://") {
        if path.is_empty() {
            return Err(Error::Store("file:// store URI needs a directory".to_string()));
        }
        tracing::info!("Opening file record store at {}", path);
        let store = FileStore::open(PathBuf::from(path)).await?;
        return Ok(Arc::new(store));
    }

    Err(Error::Store(format!("Unsupported store URI: {}", uri)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_open_memory_store() {
        let store = open_store("memory://").await.unwrap();
        let record = store
            .insert("weeks", encode(&json!({"year": 2024})).unwrap())
            .await
            .unwrap();
        assert!(!record.id.is_empty());
    }

    #[tokio::test]
    async fn test_open_file_store() {
        let temp_dir = TempDir::new().unwrap();
        let uri = format!("file://{}", temp_dir.path().display());
        let store = open_store(&uri).await.unwrap();
        assert!(store.find_all("tasks").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_open_unknown_scheme() {
        let result = open_store("mongodb://localhost/planner").await;
        match result {
            Err(Error::Store(msg)) => assert!(msg.contains("Unsupported")),
            Err(e) => panic!("Expected Store error, got: {:?}", e),
            Ok(_) => panic!("Expected an error"),
        }
    }

    #[test]
    fn test_encode_strips_id() {
        let doc = encode(&json!({"id": "x", "name": "A"})).unwrap();
        assert!(!doc.contains_key("id"));
        assert_eq!(doc["name"], "A");
    }

    #[test]
    fn test_encode_rejects_non_objects() {
        assert!(matches!(encode(&json!([1, 2])), Err(Error::Store(_))));
    }
}
