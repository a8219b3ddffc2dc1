//! Task and note persistence.
//!
//! `TaskStore` is the seam shared by the HTTP handlers and the reminder
//! scheduler. Backends are chosen once at startup by [`connect`]:
//! a single JSON document on disk, a MongoDB database, or the unavailable
//! store when neither is configured or reachable.

pub mod file;
pub mod mongo;
pub mod unavailable;

use async_trait::async_trait;
use planner_types::{DashboardData, Task, TaskId};
use std::sync::Arc;
use thiserror::Error;

use crate::config::StorageConfig;

pub use file::JsonFileStore;
pub use mongo::MongoStore;
pub use unavailable::UnavailableStore;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage unavailable: {0}")]
    Unavailable(String),
    #[error("storage I/O failed: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode storage document: {0}")]
    Json(#[from] serde_json::Error),
    #[error("database operation failed: {0}")]
    Database(#[from] mongodb::error::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

#[async_trait]
pub trait TaskStore: Send + Sync {
    /// Short backend label for logs and the health API
    fn backend_name(&self) -> &'static str;

    /// Current tasks and notes. Unreadable storage yields the empty state.
    async fn get_all(&self) -> DashboardData;

    /// Append a task. Ids are not checked for uniqueness.
    async fn insert_task(&self, task: Task) -> StoreResult<()>;

    /// Remove every task with this id. Unknown ids are a no-op.
    async fn delete_task(&self, id: &TaskId) -> StoreResult<()>;

    /// Set the due date of every task with this id. Unknown ids are a no-op.
    async fn update_task_date(&self, id: &TaskId, date: &str) -> StoreResult<()>;

    /// Create or replace a note with a non-blank body
    async fn set_note(&self, key: &str, body: &str) -> StoreResult<()>;

    /// Remove a note. Unknown keys are a no-op.
    async fn delete_note(&self, key: &str) -> StoreResult<()>;

    /// Tasks whose date equals `date` (`YYYY-MM-DD`), in stored order
    async fn tasks_due_on(&self, date: &str) -> StoreResult<Vec<Task>>;

    /// Write a note; a blank body deletes it instead
    async fn upsert_note(&self, key: &str, body: &str) -> StoreResult<()> {
        if is_blank(body) {
            self.delete_note(key).await
        } else {
            self.set_note(key, body).await
        }
    }
}

/// Empty or whitespace-only note bodies mean "no note"
pub fn is_blank(body: &str) -> bool {
    body.trim().is_empty()
}

/// Build the configured backend. Never fails: a missing or unreachable
/// backend becomes an [`UnavailableStore`] for the life of the process.
pub async fn connect(config: &StorageConfig) -> Arc<dyn TaskStore> {
    match config {
        StorageConfig::File { path } => {
            log::info!("[STORE] Using JSON file store at {:?}", path);
            Arc::new(JsonFileStore::new(path.clone()))
        }
        StorageConfig::Mongo { uri: Some(uri), database } => {
            match MongoStore::connect(uri, database).await {
                Ok(store) => {
                    log::info!("[STORE] Connected to MongoDB database '{}'", database);
                    Arc::new(store)
                }
                Err(e) => {
                    log::error!("[STORE] MongoDB connection failed: {}", e);
                    Arc::new(UnavailableStore::new(format!("database unreachable: {}", e)))
                }
            }
        }
        StorageConfig::Mongo { uri: None, .. } => {
            log::error!("[STORE] STORAGE_BACKEND=mongo but MONGO_URI is not set");
            Arc::new(UnavailableStore::new("MONGO_URI is not set"))
        }
        StorageConfig::Disabled { reason } => {
            log::warn!("[STORE] No storage backend: {}", reason);
            Arc::new(UnavailableStore::new(reason.clone()))
        }
    }
}
