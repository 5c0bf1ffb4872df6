//! Learning subject with its exclusively owned entries.
//!
//! # Invariants
//! - Entries live inside their subject; removing the subject removes them.
//! - Entry ids are unique within their subject.

use super::ids::next_unique_id;
use super::{Entity, EntityId};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Notes template given to new subjects.
pub const DEFAULT_SUBJECT_NOTES: &str = "Objectives\n- \nMaterials\n- \nActivities\n- ";

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearningEntry {
    pub id: EntityId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct LearningSubject {
    pub id: EntityId,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    pub entries: Vec<LearningEntry>,
}

impl LearningSubject {
    /// Appends a new entry with an id unique within this subject.
    pub fn push_entry(&mut self, name: impl Into<String>) -> &LearningEntry {
        let id = next_unique_id(|candidate| self.entries.iter().any(|e| e.id == candidate));
        self.entries.push(LearningEntry {
            id,
            name: name.into(),
            date: None,
            status: None,
        });
        let last = self.entries.len() - 1;
        &self.entries[last]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LearningSubjectDraft {
    pub name: String,
    pub notes: Option<String>,
}

impl LearningSubjectDraft {
    /// Draft seeded with the default notes template.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            notes: Some(DEFAULT_SUBJECT_NOTES.to_string()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LearningSubjectPatch {
    pub name: Option<String>,
    pub notes: Option<Option<String>>,
    pub entries: Option<Vec<LearningEntry>>,
}

impl Entity for LearningSubject {
    type Draft = LearningSubjectDraft;
    type Patch = LearningSubjectPatch;

    const KIND: &'static str = "learning_subject";

    fn id(&self) -> &str {
        &self.id
    }

    fn from_draft(id: EntityId, draft: LearningSubjectDraft, _now: DateTime<Utc>) -> Self {
        Self {
            id,
            name: draft.name,
            notes: draft.notes,
            entries: Vec::new(),
        }
    }

    fn apply_patch(&mut self, patch: LearningSubjectPatch, _now: DateTime<Utc>) {
        if let Some(name) = patch.name {
            self.name = name;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(entries) = patch.entries {
            self.entries = entries;
        }
    }

    fn reassign_id(&mut self, id: EntityId) {
        self.id = id;
    }

    fn repair_nested_ids(&mut self) -> bool {
        let mut seen: HashSet<String> = HashSet::new();
        let mut repaired = false;
        for index in 0..self.entries.len() {
            let id = self.entries[index].id.clone();
            if !id.is_empty() && seen.insert(id) {
                continue;
            }
            let fresh = next_unique_id(|candidate| {
                seen.contains(candidate) || self.entries.iter().any(|e| e.id == candidate)
            });
            seen.insert(fresh.clone());
            self.entries[index].id = fresh;
            repaired = true;
        }
        repaired
    }
}
