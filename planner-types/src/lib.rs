//! Shared types for the planner backend and its dashboard client.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

// =====================================================
// Domain Types
// =====================================================

/// Caller-assigned task identifier.
///
/// The dashboard sends millisecond timestamps, but string ids are accepted
/// too. A number and a string never compare equal (`1` != `"1"`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum TaskId {
    Number(i64),
    Text(String),
}

impl fmt::Display for TaskId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TaskId::Number(n) => write!(f, "{}", n),
            TaskId::Text(s) => write!(f, "{}", s),
        }
    }
}

impl From<i64> for TaskId {
    fn from(n: i64) -> Self {
        TaskId::Number(n)
    }
}

impl From<&str> for TaskId {
    fn from(s: &str) -> Self {
        TaskId::Text(s.to_string())
    }
}

/// A dated deliverable
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Task {
    pub id: TaskId,
    /// Due date as `YYYY-MM-DD`. Not validated; compared as a string.
    pub date: String,
    #[serde(rename = "type", default)]
    pub task_type: String,
    #[serde(default)]
    pub subject: String,
    #[serde(default)]
    pub title: String,
}

/// Notes keyed by an opaque identifier
pub type Notes = BTreeMap<String, String>;

/// Full dashboard state: every task plus every note.
///
/// This is also the on-disk layout of the file store.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardData {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub notes: Notes,
}

impl DashboardData {
    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty() && self.notes.is_empty()
    }
}

// =====================================================
// Request Types
// =====================================================

/// Remove every task with this id
#[derive(Debug, Serialize, Deserialize)]
pub struct DeleteTaskRequest {
    pub id: TaskId,
}

/// Move a task's due date (extend the deadline)
#[derive(Debug, Serialize, Deserialize)]
pub struct UpdateTaskRequest {
    pub id: TaskId,
    pub date: String,
}

/// Create, replace, or (with a blank body) delete a note
#[derive(Debug, Serialize, Deserialize)]
pub struct SaveNoteRequest {
    pub key: String,
    pub note: String,
}

// =====================================================
// Response Types
// =====================================================

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

impl StatusResponse {
    pub fn success() -> Self {
        Self {
            status: "success".to_string(),
        }
    }
}

/// Runtime configuration summary served by the health API
#[derive(Debug, Serialize, Deserialize)]
pub struct ConfigStatus {
    pub storage_backend: String,
    pub mail_configured: bool,
    pub reminder_times: Vec<String>,
}
