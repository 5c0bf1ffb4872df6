//! Task record: the canonical kanban card.
//!
//! # Invariants
//! - New tasks start in `TaskStatus::Todo`.
//! - `status` is one of exactly three columns.

use super::{Entity, EntityId};
use crate::kanban::{BoardEntity, BoardStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Kanban column for a task.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum TaskStatus {
    /// Not started.
    #[default]
    Todo,
    /// Being worked on.
    InProgress,
    /// Finished.
    Done,
}

impl BoardStatus for TaskStatus {
    const COLUMNS: [Self; 3] = [Self::Todo, Self::InProgress, Self::Done];

    fn as_str(self) -> &'static str {
        match self {
            Self::Todo => "todo",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Task {
    pub id: EntityId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    pub description: String,
    pub status: TaskStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub due_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Creation input for a task.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskDraft {
    pub description: String,
    pub title: Option<String>,
    pub due_date: Option<String>,
    pub notes: Option<String>,
}

impl TaskDraft {
    pub fn new(description: impl Into<String>) -> Self {
        Self {
            description: description.into(),
            ..Self::default()
        }
    }
}

/// Partial update for a task. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TaskPatch {
    pub title: Option<Option<String>>,
    pub description: Option<String>,
    pub status: Option<TaskStatus>,
    pub due_date: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl Entity for Task {
    type Draft = TaskDraft;
    type Patch = TaskPatch;

    const KIND: &'static str = "task";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: EntityId, draft: TaskDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            description: draft.description,
            status: TaskStatus::Todo,
            due_date: draft.due_date,
            notes: draft.notes,
        }
    }

    fn apply_patch(&mut self, patch: TaskPatch, _now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(due_date) = patch.due_date {
            self.due_date = due_date;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }

    fn reassign_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl BoardEntity for Task {
    type Status = TaskStatus;

    fn status(&self) -> TaskStatus {
        self.status
    }

    fn status_patch(status: TaskStatus) -> TaskPatch {
        TaskPatch {
            status: Some(status),
            ..TaskPatch::default()
        }
    }
}
