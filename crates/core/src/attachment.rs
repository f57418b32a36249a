//! File attachments
//!
//! Uploading a file and attaching it to a task are two separate steps.
//! [`AttachmentStore`] writes bytes under the original filename;
//! [`AttachmentBinder`] acknowledges uploads and, on an explicit bind call,
//! records the stored name on a task.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

use crate::planner::Planner;
use crate::task::{Task, TaskPatch};
use crate::{Error, Result};

/// A file written to the attachment directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StoredFile {
    pub name: String,
    pub size: u64,
}

/// Acknowledgement of a received upload
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadReceipt {
    pub file: StoredFile,
    pub task_id: Option<String>,
    pub received_at: DateTime<Utc>,
}

/// Attachment directory keyed by original filename
#[derive(Debug, Clone)]
pub struct AttachmentStore {
    dir: PathBuf,
}

impl AttachmentStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Reduce a client-supplied name to a bare filename
    pub fn sanitize(name: &str) -> Result<String> {
        let base = name.rsplit(['/', '\\']).next().unwrap_or_default().trim();
        if base.is_empty() || base == "." || base == ".." {
            return Err(Error::Validation(format!("Invalid file name: {:?}", name)));
        }
        Ok(base.to_string())
    }

    /// Write `bytes` under `name`, replacing any existing file of that name
    pub async fn save(&self, name: &str, bytes: &[u8]) -> Result<StoredFile> {
        let name = Self::sanitize(name)?;
        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(self.dir.join(&name), bytes).await?;
        Ok(StoredFile {
            name,
            size: bytes.len() as u64,
        })
    }

    pub async fn exists(&self, name: &str) -> Result<bool> {
        let name = Self::sanitize(name)?;
        Ok(tokio::fs::try_exists(self.dir.join(name)).await?)
    }
}

/// Links stored files to tasks
#[derive(Clone)]
pub struct AttachmentBinder {
    files: AttachmentStore,
    planner: Planner,
}

impl AttachmentBinder {
    pub fn new(files: AttachmentStore, planner: Planner) -> Self {
        Self { files, planner }
    }

    pub fn files(&self) -> &AttachmentStore {
        &self.files
    }

    /// Acknowledge a completed upload. Tasks are never modified here.
    pub fn acknowledge(&self, task_id: Option<String>, file: StoredFile) -> UploadReceipt {
        match &task_id {
            Some(task_id) => info!(
                "Received upload {} ({} bytes) for task {}",
                file.name, file.size, task_id
            ),
            None => info!("Received upload {} ({} bytes)", file.name, file.size),
        }
        UploadReceipt {
            file,
            task_id,
            received_at: Utc::now(),
        }
    }

    /// Record a previously uploaded file on a task
    pub async fn bind(&self, task_id: &str, file: &str) -> Result<Task> {
        let name = AttachmentStore::sanitize(file)?;
        if !self.files.exists(&name).await? {
            return Err(Error::Validation(format!(
                "No uploaded file named {}",
                name
            )));
        }
        let task = self
            .planner
            .update_task(task_id, TaskPatch::file(Some(name)))
            .await?;
        info!("Bound file {:?} to task {}", task.file, task.id);
        Ok(task)
    }
}
