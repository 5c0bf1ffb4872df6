//! Workspace configuration.
//!
//! # Responsibility
//! - Name the store key of every collection and scalar slot.
//! - Carry the default tool categories and optional logging settings.
//!
//! # Invariants
//! - Keys are non-blank and pairwise distinct after `validate`.
//! - `WorkspaceConfig::default()` reproduces the stock key layout.

use crate::logging::{default_log_level, init_logging, LoggingError};
use crate::repo::category_registry::DEFAULT_CATEGORIES;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

/// Store key of each persisted concern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageKeys {
    pub projects: String,
    pub tasks: String,
    pub notes: String,
    pub tools: String,
    pub tool_categories: String,
    pub learning_subjects: String,
    pub user_name: String,
}

impl Default for StorageKeys {
    fn default() -> Self {
        Self {
            projects: "projects".to_string(),
            tasks: "tasks".to_string(),
            notes: "devhub_notes".to_string(),
            tools: "devhub_tools".to_string(),
            tool_categories: "devhub_categories".to_string(),
            learning_subjects: "learningSubjects".to_string(),
            user_name: "devhub_user_name".to_string(),
        }
    }
}

impl StorageKeys {
    /// `(field name, key)` pairs in a fixed order.
    pub fn entries(&self) -> [(&'static str, &str); 7] {
        [
            ("projects", self.projects.as_str()),
            ("tasks", self.tasks.as_str()),
            ("notes", self.notes.as_str()),
            ("tools", self.tools.as_str()),
            ("tool_categories", self.tool_categories.as_str()),
            ("learning_subjects", self.learning_subjects.as_str()),
            ("user_name", self.user_name.as_str()),
        ]
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    /// A key is empty after trimming.
    BlankKey(&'static str),
    /// Two concerns share one key.
    DuplicateKey(String),
    Logging(LoggingError),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::BlankKey(field) => write!(f, "storage key `{field}` cannot be blank"),
            Self::DuplicateKey(key) => write!(f, "storage key `{key}` is used twice"),
            Self::Logging(err) => write!(f, "logging init failed: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Logging(err) => Some(err),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WorkspaceConfig {
    pub keys: StorageKeys,
    /// Category list used while the categories key is absent or malformed.
    pub default_categories: Vec<String>,
    /// Falls back to `default_log_level()`.
    pub log_level: Option<String>,
    /// Logging stays off when unset.
    pub log_dir: Option<PathBuf>,
}

impl Default for WorkspaceConfig {
    fn default() -> Self {
        Self {
            keys: StorageKeys::default(),
            default_categories: DEFAULT_CATEGORIES.iter().map(|name| name.to_string()).collect(),
            log_level: None,
            log_dir: None,
        }
    }
}

impl WorkspaceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen: Vec<&str> = Vec::new();
        for (field, key) in self.keys.entries() {
            if key.trim().is_empty() {
                return Err(ConfigError::BlankKey(field));
            }
            if seen.contains(&key) {
                return Err(ConfigError::DuplicateKey(key.to_string()));
            }
            seen.push(key);
        }
        Ok(())
    }

    /// Starts file logging when `log_dir` is set. Returns whether logging is
    /// active.
    pub fn init_logging(&self) -> Result<bool, ConfigError> {
        let Some(dir) = &self.log_dir else {
            return Ok(false);
        };
        let level = self.log_level.as_deref().unwrap_or(default_log_level());
        let dir = dir.to_str().ok_or_else(|| {
            ConfigError::Logging(LoggingError::InvalidDir("path is not valid UTF-8".to_string()))
        })?;
        init_logging(level, dir).map_err(ConfigError::Logging)?;
        Ok(true)
    }
}
