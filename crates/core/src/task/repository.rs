//! Task repository
//!
//! Typed CRUD over the `tasks` collection. Updates merge only the supplied
//! fields into the stored record.

use std::sync::Arc;

use super::model::{NewTask, Task, TaskPatch};
use crate::store::{encode, RecordStore};
use crate::{Error, Result};

const COLLECTION: &str = "tasks";

#[derive(Clone)]
pub struct TaskRepository {
    store: Arc<dyn RecordStore>,
}

impl TaskRepository {
    pub fn new(store: Arc<dyn RecordStore>) -> Self {
        Self { store }
    }

    pub async fn list(&self) -> Result<Vec<Task>> {
        self.store
            .find_all(COLLECTION)
            .await?
            .into_iter()
            .map(|r| r.decode())
            .collect()
    }

    pub async fn get(&self, id: &str) -> Result<Task> {
        self.store
            .find_by_id(COLLECTION, id)
            .await?
            .ok_or_else(|| Error::not_found("Task", id))?
            .decode()
    }

    pub async fn create(&self, task: NewTask) -> Result<Task> {
        self.store.insert(COLLECTION, encode(&task)?).await?.decode()
    }

    /// Merge the supplied fields; omitted fields keep their stored values
    pub async fn update(&self, id: &str, patch: TaskPatch) -> Result<Task> {
        self.store
            .merge(COLLECTION, id, patch.to_document())
            .await?
            .ok_or_else(|| Error::not_found("Task", id))?
            .decode()
    }

    /// Remove a task, returning its state before deletion
    pub async fn delete(&self, id: &str) -> Result<Task> {
        self.store
            .remove(COLLECTION, id)
            .await?
            .ok_or_else(|| Error::not_found("Task", id))?
            .decode()
    }
}
