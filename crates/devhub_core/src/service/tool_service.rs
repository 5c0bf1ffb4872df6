//! Tool bookmark and category use-case service.
//!
//! # Responsibility
//! - Add and delete bookmarked tools with normalized urls and palette colors.
//! - Manage the category registry, reassigning tools when a category is
//!   deleted.
//! - Filter tools by free-text search and category.
//!
//! # Invariants
//! - A tool's category is a registry entry or `FALLBACK_CATEGORY`.
//! - Deleting a category moves its tools to `FALLBACK_CATEGORY` before the
//!   category leaves the registry.

use super::{matches_search, non_blank};
use crate::model::tool::{Tool, ToolDraft, ToolPatch};
use crate::repo::category_registry::{CategoryRegistry, FALLBACK_CATEGORY};
use crate::repo::collection::EntityCollection;
use crate::repo::{CollectionError, CollectionResult};
use log::info;
use once_cell::sync::Lazy;
use rand::seq::IndexedRandom;
use regex::Regex;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Gradient palette tokens assigned to new tools.
pub const TOOL_COLORS: [&str; 12] = [
    "from-blue-500 to-blue-600",
    "from-purple-500 to-purple-600",
    "from-green-500 to-green-600",
    "from-red-500 to-red-600",
    "from-yellow-500 to-yellow-600",
    "from-indigo-500 to-indigo-600",
    "from-pink-500 to-pink-600",
    "from-teal-500 to-teal-600",
    "from-orange-500 to-orange-600",
    "from-cyan-500 to-cyan-600",
    "from-emerald-500 to-emerald-600",
    "from-violet-500 to-violet-600",
];

/// Description stored when the user leaves it blank.
pub const DEFAULT_TOOL_DESCRIPTION: &str = "No description provided";

/// Category filter value that matches every tool.
pub const ALL_CATEGORIES: &str = "All";

static URL_HOST_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^[a-zA-Z][a-zA-Z0-9+.\-]*://(?:[^@/?#]*@)?([^:/?#]+)").expect("valid host regex")
});

#[derive(Debug)]
pub enum ToolServiceError {
    InvalidTitle,
    InvalidUrl,
    /// Category is neither registered nor the fallback.
    UnknownCategory(String),
    Collection(CollectionError),
}

impl Display for ToolServiceError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidTitle => write!(f, "tool title cannot be blank"),
            Self::InvalidUrl => write!(f, "tool url cannot be blank"),
            Self::UnknownCategory(name) => write!(f, "unknown tool category: `{name}`"),
            Self::Collection(err) => write!(f, "{err}"),
        }
    }
}

impl Error for ToolServiceError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Collection(err) => Some(err),
            _ => None,
        }
    }
}

impl From<CollectionError> for ToolServiceError {
    fn from(value: CollectionError) -> Self {
        Self::Collection(value)
    }
}

/// Raw form input of the "add tool" dialog.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTool {
    pub title: String,
    pub url: String,
    pub description: String,
    /// `None` selects the registry's first category.
    pub category: Option<String>,
}

/// Search box plus category tabs of the tools screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolFilter {
    pub search: String,
    /// `ALL_CATEGORIES` or one category name.
    pub category: String,
}

impl Default for ToolFilter {
    fn default() -> Self {
        Self {
            search: String::new(),
            category: ALL_CATEGORIES.to_string(),
        }
    }
}

impl ToolFilter {
    /// Switches back to the `All` tab when `name` is the selected category.
    /// Returns whether the selection changed.
    pub fn forget_category(&mut self, name: &str) -> bool {
        if self.category != name || name == ALL_CATEGORIES {
            return false;
        }
        self.category = ALL_CATEGORIES.to_string();
        true
    }
}

pub struct ToolService {
    tools: EntityCollection<Tool>,
    categories: CategoryRegistry,
}

impl ToolService {
    pub fn new(tools: EntityCollection<Tool>, categories: CategoryRegistry) -> Self {
        Self { tools, categories }
    }

    pub fn collection(&self) -> &EntityCollection<Tool> {
        &self.tools
    }

    pub fn categories(&self) -> &CategoryRegistry {
        &self.categories
    }

    /// Validates the dialog input and stores a new tool.
    pub fn add_tool(&self, input: NewTool) -> Result<Tool, ToolServiceError> {
        let title = non_blank(&input.title).ok_or(ToolServiceError::InvalidTitle)?;
        let url = non_blank(&input.url).ok_or(ToolServiceError::InvalidUrl)?;
        let category = match input.category {
            Some(name) => {
                if !self.categories.is_assignable(&name) {
                    return Err(ToolServiceError::UnknownCategory(name));
                }
                name
            }
            None => self
                .categories
                .first()
                .unwrap_or_else(|| FALLBACK_CATEGORY.to_string()),
        };
        let description =
            non_blank(&input.description).unwrap_or_else(|| DEFAULT_TOOL_DESCRIPTION.to_string());

        let tool = self.tools.create(ToolDraft {
            title,
            url: normalize_url(&url),
            color: random_color().to_string(),
            description: Some(description),
            category: Some(category),
        })?;
        info!("event=tool_add module=service status=ok id={}", tool.id);
        Ok(tool)
    }

    pub fn delete_tool(&self, id: &str) -> CollectionResult<Option<Tool>> {
        self.tools.remove(id)
    }

    /// Registers a category. Blank or duplicate names are ignored.
    pub fn add_category(&self, name: &str) -> CollectionResult<bool> {
        self.categories.add(name)
    }

    /// Deletes a category and moves its tools to `FALLBACK_CATEGORY`.
    ///
    /// Returns the number of reassigned tools. The screen's filter is not
    /// owned here: a caller showing the deleted tab must follow up with
    /// `ToolFilter::forget_category` so the view falls back to `All`.
    pub fn delete_category(&self, name: &str) -> CollectionResult<usize> {
        let reassigned = self.tools.update_matching(
            |tool| tool.category.as_deref() == Some(name),
            |_| ToolPatch {
                category: Some(Some(FALLBACK_CATEGORY.to_string())),
                ..ToolPatch::default()
            },
        )?;
        self.categories.remove(name)?;
        info!(
            "event=tool_category_delete module=service status=ok reassigned={}",
            reassigned
        );
        Ok(reassigned)
    }

    /// Tab labels: `All` followed by the registry in order.
    pub fn category_tabs(&self) -> Vec<String> {
        std::iter::once(ALL_CATEGORIES.to_string())
            .chain(self.categories.names())
            .collect()
    }

    /// Tools matching `filter`, in insertion order.
    pub fn filter(&self, filter: &ToolFilter) -> Vec<Tool> {
        self.tools
            .all()
            .into_iter()
            .filter(|tool| {
                filter.category == ALL_CATEGORIES
                    || tool.category.as_deref() == Some(filter.category.as_str())
            })
            .filter(|tool| {
                matches_search(
                    &filter.search,
                    [
                        Some(tool.title.as_str()),
                        Some(tool.url.as_str()),
                        tool.description.as_deref(),
                    ],
                )
            })
            .collect()
    }
}

/// Prefixes `https://` unless the url already starts with `http`.
pub fn normalize_url(url: &str) -> String {
    let trimmed = url.trim();
    if trimmed.starts_with("http") {
        trimmed.to_string()
    } else {
        format!("https://{trimmed}")
    }
}

/// Host of `url` without a `www.` prefix, or the url itself when it has no
/// recognizable host.
pub fn domain(url: &str) -> String {
    URL_HOST_RE
        .captures(url)
        .and_then(|caps| caps.get(1))
        .map(|host| host.as_str().to_lowercase().replacen("www.", "", 1))
        .unwrap_or_else(|| url.to_string())
}

fn random_color() -> &'static str {
    TOOL_COLORS
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(TOOL_COLORS[0])
}
