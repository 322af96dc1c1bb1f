//! Task types and lifecycle

use std::sync::atomic::{AtomicI64, Ordering};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Artifact;

/// A single `tasks/send` unit of work
///
/// Tasks are created at request entry in the `submitted` state and move to
/// `completed` or `failed` exactly once. They are never persisted.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Task {
    /// Unique identifier for the task
    pub id: String,

    /// Current status of the task
    pub status: TaskStatus,

    /// Outputs, exactly one once completed
    #[serde(default)]
    pub artifacts: Vec<Artifact>,
}

impl Task {
    /// Create a new submitted task
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            status: TaskStatus::new(TaskState::Submitted),
            artifacts: Vec::new(),
        }
    }

    /// Create a submitted task with a generated id
    pub fn with_generated_id() -> Self {
        Self::new(generate_task_id())
    }

    /// Transition to `completed` with a single text artifact
    pub fn complete(mut self, text: impl Into<String>) -> Self {
        self.status = TaskStatus::new(TaskState::Completed);
        self.artifacts = vec![Artifact::text(text)];
        self
    }

    /// Transition to `failed`
    pub fn fail(mut self) -> Self {
        self.status = TaskStatus::new(TaskState::Failed);
        self.artifacts.clear();
        self
    }

    /// Check if the task is in a terminal state
    pub fn is_terminal(&self) -> bool {
        self.status.state.is_terminal()
    }

    /// Text of the first artifact part, if any
    pub fn output_text(&self) -> Option<&str> {
        self.artifacts
            .first()
            .and_then(|artifact| artifact.parts.first())
            .and_then(|part| part.text.as_deref())
    }
}

/// Task status with the time of the last transition
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct TaskStatus {
    pub state: TaskState,
    pub timestamp: DateTime<Utc>,
}

impl TaskStatus {
    pub fn new(state: TaskState) -> Self {
        Self {
            state,
            timestamp: Utc::now(),
        }
    }
}

/// Task lifecycle state
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(rename_all = "lowercase")]
pub enum TaskState {
    /// Task accepted, provider call pending
    Submitted,

    /// Provider returned a completion
    Completed,

    /// Provider call failed
    Failed,
}

impl TaskState {
    pub fn is_terminal(self) -> bool {
        matches!(self, TaskState::Completed | TaskState::Failed)
    }
}

static LAST_TASK_MILLIS: AtomicI64 = AtomicI64::new(0);

/// Generate a `task-<millis>` identifier
///
/// The numeric suffix is the current Unix time in milliseconds, bumped by one
/// whenever two calls land in the same millisecond, so ids are strictly
/// increasing within a process.
pub fn generate_task_id() -> String {
    let now = Utc::now().timestamp_millis();
    let previous = LAST_TASK_MILLIS
        .fetch_update(Ordering::AcqRel, Ordering::Acquire, |last| {
            Some(if now > last { now } else { last + 1 })
        })
        .unwrap_or_else(|last| last);
    let issued = if now > previous { now } else { previous + 1 };
    format!("task-{issued}")
}
