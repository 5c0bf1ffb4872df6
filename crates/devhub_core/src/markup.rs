//! Selection-aware markdown formatting.
//!
//! # Responsibility
//! - Wrap or prefix a text selection with markdown tokens.
//! - Compute the caret position after the edit: the end of the inserted
//!   span, or just inside the url parentheses for links.
//!
//! # Invariants
//! - Pure: identical inputs always produce identical outputs.
//! - Offsets count Unicode scalar values, never bytes.
//! - The caret is collapsed after every edit (`cursor_start == cursor_end`).

use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Toolbar directive understood by `apply_format`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MarkupFormat {
    Bold,
    Italic,
    Underline,
    Code,
    Quote,
    Heading,
    List,
    Link,
}

impl MarkupFormat {
    pub const ALL: [Self; 8] = [
        Self::Bold,
        Self::Italic,
        Self::Underline,
        Self::Code,
        Self::Quote,
        Self::Heading,
        Self::List,
        Self::Link,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::Code => "code",
            Self::Quote => "quote",
            Self::Heading => "heading",
            Self::List => "list",
            Self::Link => "link",
        }
    }

    /// Static tokens for every format except `Link`, whose prefix embeds the
    /// selection.
    fn tokens(self) -> (&'static str, &'static str) {
        match self {
            Self::Bold => ("**", "**"),
            Self::Italic => ("*", "*"),
            Self::Underline => ("__", "__"),
            Self::Code => ("`", "`"),
            Self::Quote => ("> ", ""),
            Self::Heading => ("### ", ""),
            Self::List => ("- ", ""),
            Self::Link => ("", ")"),
        }
    }
}

impl Display for MarkupFormat {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MarkupFormat {
    type Err = MarkupError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|format| format.as_str() == value)
            .ok_or_else(|| MarkupError::UnknownFormat(value.to_string()))
    }
}

/// Contract violation raised by the markup engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// Directive name outside the closed format set.
    UnknownFormat(String),
    /// Selection is reversed or runs past the end of the text.
    InvalidSelection { start: usize, end: usize, len: usize },
}

impl Display for MarkupError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFormat(value) => write!(f, "unknown markup format `{value}`"),
            Self::InvalidSelection { start, end, len } => write!(
                f,
                "invalid selection {start}..{end} for text of {len} chars"
            ),
        }
    }
}

impl Error for MarkupError {}

/// Text and collapsed caret after a formatting edit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormatEdit {
    pub new_text: String,
    pub cursor_start: usize,
    pub cursor_end: usize,
}

/// Applies `format` to the char range `start..end` of `text`.
///
/// # Errors
/// - `MarkupError::InvalidSelection` when `start > end` or `end` exceeds the
///   char length of `text`.
pub fn apply_format(
    text: &str,
    start: usize,
    end: usize,
    format: MarkupFormat,
) -> Result<FormatEdit, MarkupError> {
    let len = text.chars().count();
    if start > end || end > len {
        return Err(MarkupError::InvalidSelection { start, end, len });
    }

    let start_byte = byte_offset(text, start);
    let end_byte = byte_offset(text, end);
    let before = &text[..start_byte];
    let selected = &text[start_byte..end_byte];
    let after = &text[end_byte..];
    let selected_len = end - start;

    let (prefix, suffix) = match format {
        MarkupFormat::Link => (format!("[{selected}]("), ")"),
        other => {
            let (prefix, suffix) = other.tokens();
            (prefix.to_string(), suffix)
        }
    };
    let prefix_len = prefix.chars().count();

    let cursor = match format {
        MarkupFormat::Link => start + prefix_len,
        _ => start + prefix_len + selected_len + suffix.chars().count(),
    };

    let mut new_text =
        String::with_capacity(text.len() + prefix.len() + selected.len() + suffix.len());
    new_text.push_str(before);
    new_text.push_str(&prefix);
    new_text.push_str(selected);
    new_text.push_str(suffix);
    new_text.push_str(after);

    Ok(FormatEdit {
        new_text,
        cursor_start: cursor,
        cursor_end: cursor,
    })
}

fn byte_offset(text: &str, chars: usize) -> usize {
    text.char_indices()
        .nth(chars)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

#[cfg(test)]
mod tests {
    use super::{apply_format, MarkupError, MarkupFormat};

    #[test]
    fn bold_wraps_selection_and_places_caret_after_suffix() {
        let edit = apply_format("hello world", 6, 11, MarkupFormat::Bold).expect("valid selection");
        assert_eq!(edit.new_text, "hello **world**");
        assert_eq!(edit.cursor_start, 15);
        assert_eq!(edit.cursor_end, 15);
    }

    #[test]
    fn link_on_empty_selection_places_caret_after_open_paren() {
        let edit = apply_format("see ", 4, 4, MarkupFormat::Link).expect("valid selection");
        assert_eq!(edit.new_text, "see []()");
        assert_eq!(edit.cursor_start, 7);
        assert_eq!(&edit.new_text[..edit.cursor_start], "see [](");
    }

    #[test]
    fn link_repeats_selection_as_url_text() {
        let edit = apply_format("go docs now", 3, 7, MarkupFormat::Link).expect("valid selection");
        assert_eq!(edit.new_text, "go [docs](docs) now");
        assert_eq!(edit.cursor_start, 10);
    }

    #[test]
    fn prefix_formats_insert_no_suffix() {
        let edit = apply_format("item", 0, 4, MarkupFormat::List).expect("valid selection");
        assert_eq!(edit.new_text, "- item");
        assert_eq!(edit.cursor_start, 6);

        let edit = apply_format("", 0, 0, MarkupFormat::Heading).expect("valid selection");
        assert_eq!(edit.new_text, "### ");
        assert_eq!(edit.cursor_start, 4);
    }

    #[test]
    fn offsets_count_chars_not_bytes() {
        let edit = apply_format("héllo wörld", 6, 11, MarkupFormat::Italic).expect("valid selection");
        assert_eq!(edit.new_text, "héllo *wörld*");
        assert_eq!(edit.cursor_start, 13);
    }

    #[test]
    fn out_of_bounds_selection_is_rejected() {
        let err = apply_format("abc", 2, 5, MarkupFormat::Code).expect_err("end past text");
        assert_eq!(
            err,
            MarkupError::InvalidSelection {
                start: 2,
                end: 5,
                len: 3
            }
        );
        assert!(apply_format("abc", 2, 1, MarkupFormat::Code).is_err());
    }

    #[test]
    fn parse_rejects_unknown_directive() {
        assert_eq!("quote".parse::<MarkupFormat>(), Ok(MarkupFormat::Quote));
        assert_eq!(
            "strike".parse::<MarkupFormat>(),
            Err(MarkupError::UnknownFormat("strike".to_string()))
        );
    }
}
