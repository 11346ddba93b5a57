//! Task runtime for asynchronous group operations.
//!
//! Every group-level operation dispatches its fleet calls in the background
//! and hands the caller a [`TaskObject`]. A task transitions exactly once
//! from running to a terminal state and is never revived. Tasks live in
//! memory only; nothing survives the process.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use uuid::Uuid;

use crate::error::{FlotillaError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TaskStatus {
    Pending,
    Running,
    Succeeded,
    Failed,
}

impl TaskStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TaskStatus::Succeeded | TaskStatus::Failed)
    }
}

impl std::fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TaskStatus::Pending => write!(f, "pending"),
            TaskStatus::Running => write!(f, "running"),
            TaskStatus::Succeeded => write!(f, "succeeded"),
            TaskStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Handle to one asynchronous group operation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TaskObject {
    pub id: Uuid,
    pub status: TaskStatus,
    pub error: Option<String>,
    pub created_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
}

impl TaskObject {
    pub fn has_failed(&self) -> bool {
        self.status == TaskStatus::Failed
    }
}

/// In-memory task registry shared between the orchestrator and waiters.
#[derive(Debug, Clone, Default)]
pub struct TaskService {
    tasks: Arc<RwLock<HashMap<Uuid, TaskObject>>>,
}

impl TaskService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new pending task and return its handle.
    pub async fn create(&self) -> TaskObject {
        let task = TaskObject {
            id: Uuid::new_v4(),
            status: TaskStatus::Pending,
            error: None,
            created_at: Utc::now(),
            finished_at: None,
        };
        self.tasks.write().await.insert(task.id, task.clone());
        task
    }

    pub async fn get(&self, id: Uuid) -> Option<TaskObject> {
        self.tasks.read().await.get(&id).cloned()
    }

    pub async fn mark_running(&self, id: Uuid) {
        let mut tasks = self.tasks.write().await;
        if let Some(task) = tasks.get_mut(&id) {
            if task.status == TaskStatus::Pending {
                task.status = TaskStatus::Running;
            }
        }
    }

    pub async fn mark_succeeded(&self, id: Uuid) {
        self.finish(id, TaskStatus::Succeeded, None).await;
    }

    pub async fn mark_failed(&self, id: Uuid, error: String) {
        self.finish(id, TaskStatus::Failed, Some(error)).await;
    }

    async fn finish(&self, id: Uuid, status: TaskStatus, error: Option<String>) {
        let mut tasks = self.tasks.write().await;
        if let Some(task) = tasks.get_mut(&id) {
            if task.status.is_terminal() {
                tracing::warn!(task_id = %id, "Ignoring transition on terminal task");
                return;
            }
            task.status = status;
            task.error = error;
            task.finished_at = Some(Utc::now());
        }
    }

    /// Block until the task is terminal or the closer fires.
    ///
    /// The closer cancels the wait only; the underlying fleet calls keep
    /// running. A cancelled wait returns `Ok(None)`.
    pub async fn wait_for(
        &self,
        id: Uuid,
        wait_sleep: Duration,
        closer: CancellationToken,
    ) -> Result<Option<TaskObject>> {
        loop {
            let task = self
                .get(id)
                .await
                .ok_or(FlotillaError::TaskNotFound(id))?;
            if task.status.is_terminal() {
                return Ok(Some(task));
            }

            tokio::select! {
                _ = closer.cancelled() => {
                    tracing::debug!(task_id = %id, "Wait cancelled by closer");
                    return Ok(None);
                }
                _ = tokio::time::sleep(wait_sleep) => {}
            }
        }
    }
}
