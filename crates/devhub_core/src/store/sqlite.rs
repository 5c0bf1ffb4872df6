//! SQLite-backed durable key-value store.
//!
//! # Responsibility
//! - Persist raw values in `kv_entries` with a global write revision.
//! - Surface writes made by other processes sharing the database file
//!   through `poll_external_changes`.
//!
//! # Invariants
//! - Every write stamps the row with a revision greater than any existing one
//!   and with this store's context id as writer.
//! - Removal keeps a tombstone row (`value = NULL`) so pollers observe it.
//! - Rows written by this context are never delivered to its own subscribers.

use super::listeners::ListenerRegistry;
use super::{
    ContextId, PersistentStore, StorageCallback, StorageEvent, StoreError, StoreResult,
    SubscriptionId,
};
use crate::db::{open_db, open_db_in_memory};
use log::{debug, warn};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use uuid::Uuid;

/// Durable store over one SQLite connection.
pub struct SqliteStore {
    conn: Mutex<Connection>,
    context: ContextId,
    listeners: ListenerRegistry,
    seen_revision: Mutex<i64>,
}

impl SqliteStore {
    /// Opens (and migrates) a database file.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        Self::from_connection(open_db(path)?)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        Self::from_connection(open_db_in_memory()?)
    }

    /// Wraps an already migrated connection.
    ///
    /// History written before this call is treated as already seen.
    pub fn from_connection(conn: Connection) -> StoreResult<Self> {
        let latest = latest_revision(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            context: Uuid::new_v4(),
            listeners: ListenerRegistry::new(),
            seen_revision: Mutex::new(latest),
        })
    }

    /// Delivers rows written by other contexts since the previous poll.
    ///
    /// Returns the number of external changes observed.
    pub fn poll_external_changes(&self) -> StoreResult<usize> {
        let mut seen = self
            .seen_revision
            .lock()
            .map_err(|_| StoreError::Poisoned("sqlite seen revision"))?;

        let rows = {
            let conn = self.conn()?;
            let mut stmt = conn.prepare(
                "SELECT key, value, revision, writer
                 FROM kv_entries
                 WHERE revision > ?1
                 ORDER BY revision ASC;",
            )?;
            let mut rows = stmt.query([*seen])?;
            let mut changes = Vec::new();
            while let Some(row) = rows.next()? {
                changes.push((
                    row.get::<_, String>("key")?,
                    row.get::<_, Option<String>>("value")?,
                    row.get::<_, i64>("revision")?,
                    row.get::<_, String>("writer")?,
                ));
            }
            changes
        };

        let own_writer = self.context.to_string();
        let mut external = 0;
        for (key, value, revision, writer) in rows {
            *seen = (*seen).max(revision);
            if writer == own_writer {
                continue;
            }
            external += 1;
            let source = Uuid::parse_str(&writer).unwrap_or_else(|_| {
                warn!(
                    "event=storage_poll module=store status=warn backend=sqlite key={} reason=invalid_writer",
                    key
                );
                Uuid::nil()
            });
            self.listeners.dispatch(&StorageEvent {
                key,
                new_value: value,
                source,
            });
        }

        debug!(
            "event=storage_poll module=store status=ok backend=sqlite external={} revision={}",
            external, *seen
        );
        Ok(external)
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Poisoned("sqlite connection"))
    }
}

impl PersistentStore for SqliteStore {
    fn context_id(&self) -> ContextId {
        self.context
    }

    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let value = self
            .conn()?
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, Option<String>>(0),
            )
            .optional()?;
        Ok(value.flatten())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.conn()?.execute(
            "INSERT INTO kv_entries (key, value, revision, writer, updated_at)
             VALUES (
                ?1,
                ?2,
                (SELECT COALESCE(MAX(revision), 0) + 1 FROM kv_entries),
                ?3,
                (strftime('%s', 'now') * 1000)
             )
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                revision = excluded.revision,
                writer = excluded.writer,
                updated_at = excluded.updated_at;",
            params![key, value, self.context.to_string()],
        )?;
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.conn()?.execute(
            "UPDATE kv_entries
             SET
                value = NULL,
                revision = (SELECT COALESCE(MAX(revision), 0) + 1 FROM kv_entries),
                writer = ?2,
                updated_at = (strftime('%s', 'now') * 1000)
             WHERE key = ?1
               AND value IS NOT NULL;",
            params![key, self.context.to_string()],
        )?;
        Ok(())
    }

    fn subscribe(&self, key: &str, callback: StorageCallback) -> SubscriptionId {
        self.listeners.add(self.context, key, callback)
    }

    fn unsubscribe(&self, id: SubscriptionId) {
        self.listeners.remove(id);
    }
}

fn latest_revision(conn: &Connection) -> StoreResult<i64> {
    let revision = conn.query_row(
        "SELECT COALESCE(MAX(revision), 0) FROM kv_entries;",
        [],
        |row| row.get::<_, i64>(0),
    )?;
    Ok(revision)
}
