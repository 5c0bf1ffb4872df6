//! Markdown note record.
//!
//! # Invariants
//! - `created_at` never changes after creation.
//! - Any non-empty patch refreshes `updated_at`.
//! - `tags` keeps insertion order and may contain duplicates.

use super::{Entity, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Title given to notes created without one.
pub const UNTITLED_NOTE_TITLE: &str = "Untitled Note";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Note {
    pub id: EntityId,
    pub title: String,
    /// Markdown source.
    pub content: String,
    /// Serialized as an RFC 3339 string.
    pub created_at: DateTime<Utc>,
    /// Serialized as an RFC 3339 string.
    pub updated_at: DateTime<Utc>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteDraft {
    pub title: String,
    pub content: String,
    pub tags: Vec<String>,
}

impl Default for NoteDraft {
    fn default() -> Self {
        Self {
            title: UNTITLED_NOTE_TITLE.to_string(),
            content: String::new(),
            tags: Vec::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NotePatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub tags: Option<Vec<String>>,
    pub is_favorite: Option<bool>,
}

impl NotePatch {
    fn is_empty(&self) -> bool {
        self.title.is_none()
            && self.content.is_none()
            && self.tags.is_none()
            && self.is_favorite.is_none()
    }
}

impl Entity for Note {
    type Draft = NoteDraft;
    type Patch = NotePatch;

    const KIND: &'static str = "note";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: EntityId, draft: NoteDraft, now: DateTime<Utc>) -> Self {
        Self {
            id,
            title: draft.title,
            content: draft.content,
            created_at: now,
            updated_at: now,
            tags: draft.tags,
            is_favorite: false,
        }
    }

    fn apply_patch(&mut self, patch: NotePatch, now: DateTime<Utc>) {
        if patch.is_empty() {
            return;
        }
        if let Some(title) = patch.title {
            self.title = title;
        }
        if let Some(content) = patch.content {
            self.content = content;
        }
        if let Some(tags) = patch.tags {
            self.tags = tags;
        }
        if let Some(is_favorite) = patch.is_favorite {
            self.is_favorite = is_favorite;
        }
        self.updated_at = now;
    }

    fn reassign_id(&mut self, id: EntityId) {
        self.id = id;
    }
}
