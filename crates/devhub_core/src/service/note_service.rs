//! Note editor use-case service.
//!
//! # Responsibility
//! - Maintain the active note and the note list of the editor screen.
//! - Apply title/content/tag/favorite edits through the notes collection.
//! - Run toolbar formatting over the active note's content.
//! - Project notes into sidebar rows with a plain-text excerpt.
//!
//! # Invariants
//! - A context whose notes key has never been written starts with one
//!   default note.
//! - Deleting the active note activates the first remaining note.
//! - Tags are trimmed on add; duplicates are kept.

use crate::markup::{apply_format, FormatEdit, MarkupError, MarkupFormat};
use crate::model::note::{Note, NoteDraft, NotePatch};
use crate::model::EntityId;
use crate::repo::collection::EntityCollection;
use crate::repo::{CollectionError, CollectionResult, LoadOutcome};
use chrono::{DateTime, Utc};
use log::{debug, info};
use once_cell::sync::Lazy;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// `[label](target)` with an optional leading `!` for images.
static MARKDOWN_REF_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(!?)\[([^\]]*)\]\(([^)]*)\)").expect("valid reference regex"));
static MARKUP_NOISE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[*_`#>~()\[\]!\-\s]+").expect("valid markup noise regex"));

const EXCERPT_MAX_CHARS: usize = 100;

/// Service error for note use-cases.
#[derive(Debug)]
pub enum NoteServiceError {
    /// Tag input is blank after trimming.
    InvalidTag(String),
    /// Toolbar directive or selection was rejected.
    Markup(MarkupError),
    Collection(CollectionError),
}

impl Display for NoteServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTag(value) => write!(f, "invalid tag: `{value}`"),
            Self::Markup(err) => write!(f, "{err}"),
            Self::Collection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for NoteServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::InvalidTag(_) => None,
            Self::Markup(err) => Some(err),
            Self::Collection(err) => Some(err),
        }
    }
}

impl From<CollectionError> for NoteServiceError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

impl From<MarkupError> for NoteServiceError {
    fn from(value: MarkupError) -> Self {
        Self::Markup(value)
    }
}

/// Row of the note list sidebar.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteListItem {
    pub id: EntityId,
    pub title: String,
    /// Plain-text start of the content, `None` when nothing readable remains.
    pub excerpt: Option<String>,
    /// Target of the first embedded image.
    pub cover_image: Option<String>,
    pub tags: Vec<String>,
    pub is_favorite: bool,
    pub updated_at: DateTime<Utc>,
}

impl From<&Note> for NoteListItem {
    fn from(note: &Note) -> Self {
        Self {
            id: note.id.clone(),
            title: note.title.clone(),
            excerpt: excerpt(&note.content),
            cover_image: cover_image(&note.content),
            tags: note.tags.clone(),
            is_favorite: note.is_favorite,
            updated_at: note.updated_at,
        }
    }
}

/// Footer counters of the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NoteStats {
    pub chars: usize,
    pub words: usize,
}

pub struct NoteService {
    notes: EntityCollection<Note>,
    active: Option<EntityId>,
}

impl NoteService {
    /// Binds the editor to `notes`, seeding a default note on first use.
    pub fn open(notes: EntityCollection<Note>) -> CollectionResult<Self> {
        let mut service = Self {
            notes,
            active: None,
        };
        if service.notes.last_load() == LoadOutcome::Absent && service.notes.is_empty() {
            service.create_note()?;
        } else {
            service.active = service.notes.all().first().map(|note| note.id.clone());
        }
        Ok(service)
    }

    pub fn collection(&self) -> &EntityCollection<Note> {
        &self.notes
    }

    /// Creates an "Untitled Note" and makes it active.
    pub fn create_note(&mut self) -> CollectionResult<Note> {
        let note = self.notes.create(NoteDraft::default())?;
        self.active = Some(note.id.clone());
        info!("event=note_create module=service status=ok id={}", note.id);
        Ok(note)
    }

    /// Active note, or `None` when nothing is active or it no longer exists.
    pub fn active_note(&self) -> Option<Note> {
        self.active.as_deref().and_then(|id| self.notes.get(id))
    }

    pub fn active_id(&self) -> Option<&str> {
        self.active.as_deref()
    }

    /// Activates `id`. Unknown ids leave the selection unchanged.
    pub fn set_active(&mut self, id: &str) -> Option<Note> {
        let note = self.notes.get(id)?;
        self.active = Some(note.id.clone());
        Some(note)
    }

    pub fn update_title(&self, title: &str) -> CollectionResult<Option<Note>> {
        self.patch_active(NotePatch {
            title: Some(title.to_string()),
            ..NotePatch::default()
        })
    }

    pub fn update_content(&self, content: &str) -> CollectionResult<Option<Note>> {
        self.patch_active(NotePatch {
            content: Some(content.to_string()),
            ..NotePatch::default()
        })
    }

    /// Flips the favorite flag of any note.
    pub fn toggle_favorite(&self, id: &str) -> CollectionResult<Option<Note>> {
        let Some(note) = self.notes.get(id) else {
            return Ok(None);
        };
        self.notes.update(
            id,
            NotePatch {
                is_favorite: Some(!note.is_favorite),
                ..NotePatch::default()
            },
        )
    }

    /// Appends a trimmed tag to the active note.
    pub fn add_tag(&self, tag: &str) -> Result<Option<Note>, NoteServiceError> {
        let trimmed = tag.trim();
        if trimmed.is_empty() {
            return Err(NoteServiceError::InvalidTag(tag.to_string()));
        }
        let Some(note) = self.active_note() else {
            return Ok(None);
        };
        let mut tags = note.tags;
        tags.push(trimmed.to_string());
        Ok(self.patch_active(NotePatch {
            tags: Some(tags),
            ..NotePatch::default()
        })?)
    }

    /// Removes every occurrence of `tag` from the active note.
    pub fn remove_tag(&self, tag: &str) -> CollectionResult<Option<Note>> {
        let Some(note) = self.active_note() else {
            return Ok(None);
        };
        if !note.tags.iter().any(|existing| existing == tag) {
            return Ok(Some(note));
        }
        let tags = note
            .tags
            .into_iter()
            .filter(|existing| existing != tag)
            .collect();
        self.patch_active(NotePatch {
            tags: Some(tags),
            ..NotePatch::default()
        })
    }

    /// Notes whose title, content, or any tag contains `term`, ignoring case.
    pub fn search(&self, term: &str) -> Vec<Note> {
        let needle = term.to_lowercase();
        self.notes
            .all()
            .into_iter()
            .filter(|note| {
                note.title.to_lowercase().contains(&needle)
                    || note.content.to_lowercase().contains(&needle)
                    || note
                        .tags
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            })
            .collect()
    }

    /// Sidebar rows in storage order.
    pub fn list_items(&self) -> Vec<NoteListItem> {
        self.notes.all().iter().map(NoteListItem::from).collect()
    }

    /// Deletes a note; when it was active, the first remaining note becomes
    /// active.
    pub fn delete_note(&mut self, id: &str) -> CollectionResult<Option<Note>> {
        let removed = self.notes.remove(id)?;
        if self.active.as_deref() == Some(id) {
            self.active = self.notes.all().first().map(|note| note.id.clone());
            debug!(
                "event=note_activate module=service status=ok reason=active_deleted has_active={}",
                self.active.is_some()
            );
        }
        Ok(removed)
    }

    /// Applies a toolbar format to the active note and persists the result.
    ///
    /// Returns `Ok(None)` when no note is active.
    pub fn apply_format(
        &self,
        start: usize,
        end: usize,
        format: MarkupFormat,
    ) -> Result<Option<FormatEdit>, NoteServiceError> {
        let Some(note) = self.active_note() else {
            return Ok(None);
        };
        let edit = apply_format(&note.content, start, end, format)?;
        self.patch_active(NotePatch {
            content: Some(edit.new_text.clone()),
            ..NotePatch::default()
        })?;
        debug!(
            "event=note_format module=service status=ok id={} format={}",
            note.id, format
        );
        Ok(Some(edit))
    }

    pub fn active_stats(&self) -> Option<NoteStats> {
        self.active_note().map(|note| note_stats(&note.content))
    }

    fn patch_active(&self, patch: NotePatch) -> CollectionResult<Option<Note>> {
        match self.active.as_deref() {
            Some(id) => self.notes.update(id, patch),
            None => Ok(None),
        }
    }
}

/// Counts chars and whitespace-separated words.
pub fn note_stats(content: &str) -> NoteStats {
    NoteStats {
        chars: content.chars().count(),
        words: content.split_whitespace().count(),
    }
}

/// First non-blank image target in `content`.
pub fn cover_image(content: &str) -> Option<String> {
    MARKDOWN_REF_RE
        .captures_iter(content)
        .filter(|caps| !caps[1].is_empty())
        .map(|caps| caps[3].trim().to_string())
        .find(|target| !target.is_empty())
}

/// Readable text of `content`: images dropped, links reduced to their label,
/// markup symbols and whitespace runs collapsed to single spaces, cut to
/// `EXCERPT_MAX_CHARS` chars.
pub fn excerpt(content: &str) -> Option<String> {
    let labels = MARKDOWN_REF_RE.replace_all(content, |caps: &regex::Captures<'_>| {
        if caps[1].is_empty() {
            caps[2].to_string()
        } else {
            " ".to_string()
        }
    });
    let plain = MARKUP_NOISE_RE.replace_all(&labels, " ");
    let plain = plain.trim();
    if plain.is_empty() {
        return None;
    }
    Some(plain.chars().take(EXCERPT_MAX_CHARS).collect())
}
