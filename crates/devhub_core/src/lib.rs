//! Core data layer for the DevHub workspace.
//! This crate is the single source of truth for record invariants,
//! persistence, and cross-context synchronization.

pub mod config;
pub mod db;
pub mod kanban;
pub mod logging;
pub mod markup;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;
pub mod sync;
pub mod workspace;

pub use config::{ConfigError, StorageKeys, WorkspaceConfig};
pub use kanban::{BoardEntity, BoardStatus, Column, DragSession, DropOutcome, KanbanBoard};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use markup::{apply_format, FormatEdit, MarkupError, MarkupFormat};
pub use model::learning::{LearningEntry, LearningSubject};
pub use model::note::Note;
pub use model::project::{Project, ProjectStatus};
pub use model::task::{Task, TaskStatus};
pub use model::tool::Tool;
pub use model::{Entity, EntityId};
pub use repo::category_registry::{CategoryRegistry, FALLBACK_CATEGORY};
pub use repo::collection::EntityCollection;
pub use repo::user_profile::UserProfile;
pub use repo::{CollectionError, CollectionResult, LoadOutcome};
pub use store::{
    MemoryStorage, MemoryStore, PersistentStore, SqliteStore, StorageEvent, StoreError,
    StoreResult,
};
pub use sync::{CrossTabSynchronizer, SyncStats, SyncTarget};
pub use workspace::{Workspace, WorkspaceError, WorkspaceSummary};

/// Minimal health-check API for early integration.
pub fn ping() -> &'static str {
    "pong"
}

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
