//! Single-document JSON file store.
//!
//! The file is the only source of truth. Every call reads it, and every
//! mutation rewrites it whole, under one lock held across the entire
//! read-modify-write cycle so concurrent requests cannot lose updates.

use async_trait::async_trait;
use planner_types::{DashboardData, Task, TaskId};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;

use super::{StoreResult, TaskStore};

pub struct JsonFileStore {
    path: PathBuf,
    lock: Mutex<()>,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    /// Read and decode the document for a mutation. A missing or corrupt
    /// file reads as empty; any other read failure is an error so the
    /// mutation cannot overwrite data it never saw. Caller must hold the lock.
    async fn load_document(&self) -> StoreResult<DashboardData> {
        let bytes = match fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("[STORE] {:?} does not exist yet, starting empty", self.path);
                return Ok(DashboardData::default());
            }
            Err(e) => return Err(e.into()),
        };

        match serde_json::from_slice(&bytes) {
            Ok(data) => Ok(data),
            Err(e) => {
                log::warn!("[STORE] {:?} is not a valid document, treating as empty: {}", self.path, e);
                Ok(DashboardData::default())
            }
        }
    }

    /// Lenient read for queries: unreadable storage yields the empty state.
    /// Caller must hold the lock.
    async fn read_document(&self) -> DashboardData {
        self.load_document().await.unwrap_or_else(|e| {
            log::warn!("[STORE] Failed to read {:?}: {}", self.path, e);
            DashboardData::default()
        })
    }

    /// Encode and atomically replace the document (temp file + rename).
    /// Caller must hold the lock.
    async fn write_document(&self, data: &DashboardData) -> StoreResult<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent).await?;
            }
        }

        let encoded = serde_json::to_vec_pretty(data)?;
        let tmp = temp_path(&self.path);
        fs::write(&tmp, &encoded).await?;
        if let Err(e) = fs::rename(&tmp, &self.path).await {
            let _ = fs::remove_file(&tmp).await;
            return Err(e.into());
        }
        Ok(())
    }

    /// Run one locked read-modify-write cycle
    async fn modify<F>(&self, apply: F) -> StoreResult<()>
    where
        F: FnOnce(&mut DashboardData) + Send,
    {
        let _guard = self.lock.lock().await;
        let mut data = self.load_document().await?;
        apply(&mut data);
        self.write_document(&data).await
    }
}

fn temp_path(path: &Path) -> PathBuf {
    let mut tmp = path.as_os_str().to_owned();
    tmp.push(".tmp");
    PathBuf::from(tmp)
}

#[async_trait]
impl TaskStore for JsonFileStore {
    fn backend_name(&self) -> &'static str {
        "file"
    }

    async fn get_all(&self) -> DashboardData {
        let _guard = self.lock.lock().await;
        self.read_document().await
    }

    async fn insert_task(&self, task: Task) -> StoreResult<()> {
        self.modify(|data| data.tasks.push(task)).await
    }

    async fn delete_task(&self, id: &TaskId) -> StoreResult<()> {
        self.modify(|data| data.tasks.retain(|t| &t.id != id)).await
    }

    async fn update_task_date(&self, id: &TaskId, date: &str) -> StoreResult<()> {
        self.modify(|data| {
            for task in data.tasks.iter_mut().filter(|t| &t.id == id) {
                task.date = date.to_string();
            }
        })
        .await
    }

    async fn set_note(&self, key: &str, body: &str) -> StoreResult<()> {
        self.modify(|data| {
            data.notes.insert(key.to_string(), body.to_string());
        })
        .await
    }

    async fn delete_note(&self, key: &str) -> StoreResult<()> {
        self.modify(|data| {
            data.notes.remove(key);
        })
        .await
    }

    async fn tasks_due_on(&self, date: &str) -> StoreResult<Vec<Task>> {
        let data = self.get_all().await;
        Ok(data.tasks.into_iter().filter(|t| t.date == date).collect())
    }
}
