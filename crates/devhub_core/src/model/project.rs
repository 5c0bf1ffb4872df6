//! Project record, shown on a three-column board without drag UI.

use super::{Entity, EntityId};
use crate::kanban::{BoardEntity, BoardStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProjectStatus {
    #[default]
    Planning,
    InProgress,
    Done,
}

impl BoardStatus for ProjectStatus {
    const COLUMNS: [Self; 3] = [Self::Planning, Self::InProgress, Self::Done];

    fn as_str(self) -> &'static str {
        match self {
            Self::Planning => "planning",
            Self::InProgress => "in-progress",
            Self::Done => "done",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Project {
    pub id: EntityId,
    pub name: String,
    pub description: String,
    pub status: ProjectStatus,
    pub tags: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub deadline: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
}

/// Creation input for a project. `status` falls back to `planning`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectDraft {
    pub name: String,
    pub description: String,
    pub status: Option<ProjectStatus>,
    pub tags: Vec<String>,
    pub deadline: Option<String>,
    pub notes: Option<String>,
}

impl ProjectDraft {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }
}

/// Splits the comma-separated tag field of the project form. Each tag is
/// trimmed and blank entries (`"a,,b"`, a trailing comma) are dropped.
pub fn parse_tag_input(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
        .map(str::to_string)
        .collect()
}

/// Partial update for a project. `Some(None)` clears an optional field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProjectPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub status: Option<ProjectStatus>,
    pub tags: Option<Vec<String>>,
    pub deadline: Option<Option<String>>,
    pub notes: Option<Option<String>>,
}

impl Entity for Project {
    type Draft = ProjectDraft;
    type Patch = ProjectPatch;

    const KIND: &'static str = "project";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: EntityId, draft: ProjectDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            description: draft.description,
            status: draft.status.unwrap_or_default(),
            tags: draft.tags,
            deadline: draft.deadline,
            notes: draft.notes,
        }
    }

    fn apply_patch(&mut self, patch: ProjectPatch, _now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(deadline) = patch.deadline {
            self.deadline = deadline;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
    }

    fn reassign_id(&mut self, id: EntityId) {
        self.id = id;
    }
}

impl BoardEntity for Project {
    type Status = ProjectStatus;

    fn status(&self) -> ProjectStatus {
        self.status
    }

    fn status_patch(status: ProjectStatus) -> ProjectPatch {
        ProjectPatch {
            status: Some(status),
            ..ProjectPatch::default()
        }
    }
}
