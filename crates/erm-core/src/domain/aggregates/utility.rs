//! Working records around the register: observations on processes, the
//! process change history, user tasks and notifications

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use super::process::Process;
use crate::domain::value_objects::EntityId;

/// Reviewer remark left on a process
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Observation {
    pub id: EntityId,
    pub process_id: EntityId,
    pub author_id: EntityId,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeAction {
    Created,
    Updated,
    Duplicated,
    Deleted,
}

/// Append-only history row for a process. Outlives the process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessChange {
    pub id: EntityId,
    pub process_id: EntityId,
    /// Name at the time of the change
    pub process_name: String,
    pub action: ChangeAction,
    /// Fields an update touched; empty for other actions
    pub fields: Vec<String>,
    pub changed_at: DateTime<Utc>,
}

impl ProcessChange {
    pub fn record(process: &Process, action: ChangeAction, fields: Vec<String>) -> Self {
        Self {
            id: EntityId::new(),
            process_id: process.id.clone(),
            process_name: process.name.clone(),
            action,
            fields,
            changed_at: Utc::now(),
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TaskStatus {
    #[default]
    Pending,
    InProgress,
    Done,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Task {
    pub id: EntityId,
    pub user_id: EntityId,
    pub title: String,
    pub description: Option<String>,
    pub due_date: Option<NaiveDate>,
    pub status: TaskStatus,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: EntityId,
    pub user_id: EntityId,
    pub message: String,
    pub read: bool,
    pub created_at: DateTime<Utc>,
}

impl Notification {
    pub fn new(user_id: EntityId, message: String) -> Self {
        Self { id: EntityId::new(), user_id, message, read: false, created_at: Utc::now() }
    }
}
