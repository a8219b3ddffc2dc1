use async_trait::async_trait;
use planner_types::{DashboardData, Task, TaskId};

use super::{StoreError, StoreResult, TaskStore};

/// Stand-in used when no backend is configured or the database was
/// unreachable at startup. Reads are empty; writes fail.
pub struct UnavailableStore {
    reason: String,
}

impl UnavailableStore {
    pub fn new(reason: impl Into<String>) -> Self {
        Self { reason: reason.into() }
    }

    fn unavailable<T>(&self) -> StoreResult<T> {
        Err(StoreError::Unavailable(self.reason.clone()))
    }
}

#[async_trait]
impl TaskStore for UnavailableStore {
    fn backend_name(&self) -> &'static str {
        "unavailable"
    }

    async fn get_all(&self) -> DashboardData {
        DashboardData::default()
    }

    async fn insert_task(&self, _task: Task) -> StoreResult<()> {
        self.unavailable()
    }

    async fn delete_task(&self, _id: &TaskId) -> StoreResult<()> {
        self.unavailable()
    }

    async fn update_task_date(&self, _id: &TaskId, _date: &str) -> StoreResult<()> {
        self.unavailable()
    }

    async fn set_note(&self, _key: &str, _body: &str) -> StoreResult<()> {
        self.unavailable()
    }

    async fn delete_note(&self, _key: &str) -> StoreResult<()> {
        self.unavailable()
    }

    async fn tasks_due_on(&self, _date: &str) -> StoreResult<Vec<Task>> {
        self.unavailable()
    }
}
