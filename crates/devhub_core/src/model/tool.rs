//! Bookmarked tool record.

use super::{Entity, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Tool {
    pub id: EntityId,
    pub title: String,
    pub url: String,
    /// Palette token, e.g. `from-blue-500 to-blue-600`.
    pub color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Registry category name, or the `Other` fallback.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolDraft {
    pub title: String,
    pub url: String,
    pub color: String,
    pub description: Option<String>,
    pub category: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ToolPatch {
    pub title: Option<String>,
    pub url: Option<String>,
    pub color: Option<String>,
    pub description: Option<Option<String>>,
    pub category: Option<Option<String>>,
}

impl Entity for Tool {
    type Draft = ToolDraft;
    type Patch = ToolPatch;

    const KIND: &'static str = "tool";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: EntityId, draft: ToolDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            url: draft.url,
            color: draft.color,
            description: draft.description,
            category: draft.category,
        }
    }

    fn apply_patch(&mut self, patch: ToolPatch, _now: DateTime<Utc>) {
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(url) = patch.url {
            self.url = url;
        }
        if let Some(color) = patch.color {
            self.color = color;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(category) = patch.category {
            self.category = category;
        }
    }

    fn reassign_id(&mut self, id: EntityId) {
        self.id = id;
    }
}
