//! Key-value persistence capability shared by every workspace collection.
//!
//! # Responsibility
//! - Define the `PersistentStore` contract: synchronous get/set/remove plus
//!   key-scoped change subscriptions.
//! - Provide an in-memory backend (one shared storage, many contexts) and a
//!   SQLite backend for durable, cross-process storage.
//!
//! # Invariants
//! - Change notifications never reach subscribers of the context that made
//!   the write.
//! - Values are opaque strings; encoding belongs to the caller.

use crate::db::DbError;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;
use uuid::Uuid;

pub mod listeners;
mod memory;
mod sqlite;

pub use memory::{MemoryStorage, MemoryStore};
pub use sqlite::SqliteStore;

/// Identity of one independent view of the storage (a tab, a process).
pub type ContextId = Uuid;

/// Handle returned by `PersistentStore::subscribe`.
pub type SubscriptionId = u64;

/// Callback invoked for change notifications on a subscribed key.
pub type StorageCallback = Arc<dyn Fn(&StorageEvent) + Send + Sync>;

/// Change notification emitted when another context writes a key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageEvent {
    /// Key that changed.
    pub key: String,
    /// Value after the change. `None` when the key was removed.
    pub new_value: Option<String>,
    /// Context that performed the write.
    pub source: ContextId,
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Transport-level store failure.
#[derive(Debug)]
pub enum StoreError {
    Db(DbError),
    /// A backend lock was poisoned by a panicking writer.
    Poisoned(&'static str),
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Poisoned(what) => write!(f, "store lock poisoned: {what}"),
        }
    }
}

impl Error for StoreError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Poisoned(_) => None,
        }
    }
}

impl From<DbError> for StoreError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

impl From<rusqlite::Error> for StoreError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

/// Synchronous key-value storage with cross-context change notification.
pub trait PersistentStore: Send + Sync {
    /// Identity of the context this handle writes as.
    fn context_id(&self) -> ContextId;
    /// Reads the raw value for `key`.
    fn get(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replaces the raw value for `key`.
    fn set(&self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes `key`. Removing an absent key is a no-op.
    fn remove(&self, key: &str) -> StoreResult<()>;
    /// Registers `callback` for changes to `key` made by other contexts.
    fn subscribe(&self, key: &str, callback: StorageCallback) -> SubscriptionId;
    /// Drops one subscription. Unknown ids are ignored.
    fn unsubscribe(&self, id: SubscriptionId);
}
