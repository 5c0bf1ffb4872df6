//! Screen-level use-case services.
//!
//! # Responsibility
//! - Compose collections, the kanban engine, and the markup engine into the
//!   CRUD/search operations each workspace screen calls.
//! - Validate user input before it reaches a collection.
//! - Track the "currently open" record of each screen.
//!
//! # Invariants
//! - Services never splice collection state directly; every mutation goes
//!   through `EntityCollection`.
//! - Deleting a record also clears any open selection pointing at it.

use crate::kanban::BoardStatus;

pub mod learning_service;
pub mod note_service;
pub mod project_service;
pub mod task_service;
pub mod tool_service;

/// Status filter of a board-shaped list screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum StatusFilter<S> {
    #[default]
    All,
    Only(S),
}

impl<S: BoardStatus> StatusFilter<S> {
    /// Parses `all` or a status wire name. Unknown names yield `None`.
    pub fn parse(value: &str) -> Option<Self> {
        if value == "all" {
            return Some(Self::All);
        }
        S::parse(value).map(Self::Only)
    }

    pub fn matches(self, status: S) -> bool {
        match self {
            Self::All => true,
            Self::Only(expected) => expected == status,
        }
    }
}

/// Case-insensitive substring match over optional fields.
///
/// An empty needle matches everything.
pub(crate) fn matches_search<'a>(
    needle: &str,
    fields: impl IntoIterator<Item = Option<&'a str>>,
) -> bool {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return true;
    }
    fields
        .into_iter()
        .flatten()
        .any(|field| field.to_lowercase().contains(&needle))
}

/// Trims `value`, returning `None` when nothing is left.
pub(crate) fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::{matches_search, non_blank, StatusFilter};
    use crate::model::task::TaskStatus;

    #[test]
    fn status_filter_parses_all_and_wire_names() {
        assert_eq!(StatusFilter::<TaskStatus>::parse("all"), Some(StatusFilter::All));
        assert_eq!(
            StatusFilter::parse("done"),
            Some(StatusFilter::Only(TaskStatus::Done))
        );
        assert_eq!(StatusFilter::<TaskStatus>::parse("archived"), None);
    }

    #[test]
    fn search_is_case_insensitive_and_skips_missing_fields() {
        assert!(matches_search("RUST", [Some("learn rust"), None]));
        assert!(!matches_search("go", [None, Some("rust")]));
        assert!(matches_search("  ", [None]));
    }

    #[test]
    fn non_blank_trims() {
        assert_eq!(non_blank("  a b "), Some("a b".to_string()));
        assert_eq!(non_blank(" \t"), None);
    }
}
