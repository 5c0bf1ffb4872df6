//! Learning subject use-case service.
//!
//! # Responsibility
//! - Create, rename, annotate, and delete learning subjects.
//! - Add and delete entries inside a subject.
//! - Track the subject shown in the side panel.
//!
//! # Invariants
//! - Entries are only reachable through their subject; deleting the subject
//!   deletes them.
//! - Deleting the subject open in the side panel closes the panel.

use super::non_blank;
use crate::model::learning::{
    LearningEntry, LearningSubject, LearningSubjectDraft, LearningSubjectPatch,
};
use crate::model::EntityId;
use crate::repo::collection::EntityCollection;
use crate::repo::{CollectionError, CollectionResult};
use log::info;
use std::error::Error;
use std::fmt::{Display, Formatter};

#[derive(Debug)]
pub enum LearningServiceError {
    InvalidSubjectName,
    InvalidEntryName,
    Collection(CollectionError),
}

impl Display for LearningServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidSubjectName => write!(f, "subject name cannot be blank"),
            Self::InvalidEntryName => write!(f, "entry name cannot be blank"),
            Self::Collection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LearningServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Collection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CollectionError> for LearningServiceError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

pub struct LearningService {
    subjects: EntityCollection<LearningSubject>,
    side_panel: Option<EntityId>,
}

impl LearningService {
    pub fn new(subjects: EntityCollection<LearningSubject>) -> Self {
        Self {
            subjects,
            side_panel: None,
        }
    }

    pub fn collection(&self) -> &EntityCollection<LearningSubject> {
        &self.subjects
    }

    /// Creates a subject seeded with the default notes template.
    pub fn create_subject(&self, name: &str) -> Result<LearningSubject, LearningServiceError> {
        let name = non_blank(name).ok_or(LearningServiceError::InvalidSubjectName)?;
        let subject = self.subjects.create(LearningSubjectDraft::new(name))?;
        info!(
            "event=learning_subject_create module=service status=ok id={}",
            subject.id
        );
        Ok(subject)
    }

    pub fn rename_subject(
        &self,
        id: &str,
        name: &str,
    ) -> Result<Option<LearningSubject>, LearningServiceError> {
        let name = non_blank(name).ok_or(LearningServiceError::InvalidSubjectName)?;
        Ok(self.subjects.update(
            id,
            LearningSubjectPatch {
                name: Some(name),
                ..LearningSubjectPatch::default()
            },
        )?)
    }

    pub fn update_notes(&self, id: &str, notes: &str) -> CollectionResult<Option<LearningSubject>> {
        self.subjects.update(
            id,
            LearningSubjectPatch {
                notes: Some(Some(notes.to_string())),
                ..LearningSubjectPatch::default()
            },
        )
    }

    /// Deletes a subject together with its entries.
    pub fn delete_subject(&mut self, id: &str) -> CollectionResult<Option<LearningSubject>> {
        let removed = self.subjects.remove(id)?;
        if self.side_panel.as_deref() == Some(id) {
            self.side_panel = None;
        }
        if let Some(subject) = &removed {
            info!(
                "event=learning_subject_delete module=service status=ok id={} entries={}",
                subject.id,
                subject.entries.len()
            );
        }
        Ok(removed)
    }

    pub fn open_side_panel(&mut self, id: &str) -> Option<LearningSubject> {
        let subject = self.subjects.get(id)?;
        self.side_panel = Some(subject.id.clone());
        Some(subject)
    }

    pub fn side_panel(&self) -> Option<LearningSubject> {
        self.side_panel
            .as_deref()
            .and_then(|id| self.subjects.get(id))
    }

    pub fn close_side_panel(&mut self) {
        self.side_panel = None;
    }

    /// Appends an entry to a subject. Unknown subjects yield `Ok(None)`.
    pub fn add_entry(
        &self,
        subject_id: &str,
        name: &str,
    ) -> Result<Option<LearningEntry>, LearningServiceError> {
        let name = non_blank(name).ok_or(LearningServiceError::InvalidEntryName)?;
        let Some(mut subject) = self.subjects.get(subject_id) else {
            return Ok(None);
        };
        let entry = subject.push_entry(name).clone();
        self.subjects.update(
            subject_id,
            LearningSubjectPatch {
                entries: Some(subject.entries),
                ..LearningSubjectPatch::default()
            },
        )?;
        Ok(Some(entry))
    }

    /// Removes an entry from a subject. Returns whether it existed.
    pub fn delete_entry(&self, subject_id: &str, entry_id: &str) -> CollectionResult<bool> {
        let Some(subject) = self.subjects.get(subject_id) else {
            return Ok(false);
        };
        if !subject.entries.iter().any(|entry| entry.id == entry_id) {
            return Ok(false);
        }
        let entries = subject
            .entries
            .into_iter()
            .filter(|entry| entry.id != entry_id)
            .collect();
        self.subjects.update(
            subject_id,
            LearningSubjectPatch {
                entries: Some(entries),
                ..LearningSubjectPatch::default()
            },
        )?;
        Ok(true)
    }
}
