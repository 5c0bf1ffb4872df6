//! Ordered registry of tool category names.
//!
//! # Invariants
//! - Names are trimmed, non-blank, and unique.
//! - `FALLBACK_CATEGORY` is always assignable, even after being removed from
//!   the list.
//! - An absent or malformed slot yields the default list.

use super::snapshot::{read_json_slot, write_json_slot, CollectionResult, LoadOutcome, SlotRead};
use crate::store::PersistentStore;
use log::{debug, info};
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Sentinel category that tools fall back to.
pub const FALLBACK_CATEGORY: &str = "Other";

/// Category list used when nothing is stored.
pub const DEFAULT_CATEGORIES: [&str; 6] = [
    "Development",
    "Design",
    "Productivity",
    "Analytics",
    "Communication",
    FALLBACK_CATEGORY,
];

struct RegistryState {
    names: Vec<String>,
    snapshot: Option<String>,
}

struct RegistryInner {
    key: String,
    store: Arc<dyn PersistentStore>,
    defaults: Vec<String>,
    state: RwLock<RegistryState>,
    write_gate: Mutex<()>,
}

/// Shared handle to the category list.
#[derive(Clone)]
pub struct CategoryRegistry {
    inner: Arc<RegistryInner>,
}

impl CategoryRegistry {
    /// Opens the registry for `key`, falling back to `defaults`.
    pub fn open(
        store: Arc<dyn PersistentStore>,
        key: impl Into<String>,
        defaults: Vec<String>,
    ) -> Self {
        let registry = Self {
            inner: Arc::new(RegistryInner {
                key: key.into(),
                store,
                state: RwLock::new(RegistryState {
                    names: defaults.clone(),
                    snapshot: None,
                }),
                defaults,
                write_gate: Mutex::new(()),
            }),
        };
        registry.load();
        registry
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    pub fn load(&self) -> LoadOutcome {
        let outcome = match read_json_slot::<Vec<String>>(
            self.inner.store.as_ref(),
            &self.inner.key,
            "tool_category",
        ) {
            SlotRead::Absent => {
                self.replace(self.inner.defaults.clone(), None);
                LoadOutcome::Absent
            }
            SlotRead::Malformed { raw } => {
                self.replace(self.inner.defaults.clone(), Some(raw));
                LoadOutcome::Recovered
            }
            SlotRead::Unavailable => LoadOutcome::Unavailable,
            SlotRead::Parsed { value, raw } => {
                let count = value.len();
                self.replace(normalize_names(value), Some(raw));
                LoadOutcome::Loaded { records: count }
            }
        };
        debug!(
            "event=registry_load module=repo status=ok key={} outcome={:?}",
            self.inner.key, outcome
        );
        outcome
    }

    /// Category names in display order.
    pub fn names(&self) -> Vec<String> {
        self.read_state().names.clone()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.read_state().names.iter().any(|entry| entry == name)
    }

    /// Whether a tool may reference `name`.
    pub fn is_assignable(&self, name: &str) -> bool {
        name == FALLBACK_CATEGORY || self.contains(name)
    }

    /// First listed category, used as the preselected choice for new tools.
    pub fn first(&self) -> Option<String> {
        self.read_state().names.first().cloned()
    }

    /// Adds a trimmed category name. Blank or duplicate names are ignored.
    ///
    /// Returns whether the list changed.
    pub fn add(&self, name: &str) -> CollectionResult<bool> {
        let name = name.trim();
        if name.is_empty() {
            return Ok(false);
        }
        let _gate = self.gate();
        let mut next = self.read_state().names.clone();
        if next.iter().any(|entry| entry == name) {
            return Ok(false);
        }
        next.push(name.to_string());
        self.commit(next)?;
        info!(
            "event=registry_add module=repo status=ok key={} count={}",
            self.inner.key,
            self.read_state().names.len()
        );
        Ok(true)
    }

    /// Removes `name` from the list. Returns whether it was present.
    pub fn remove(&self, name: &str) -> CollectionResult<bool> {
        let _gate = self.gate();
        let mut next = self.read_state().names.clone();
        let before = next.len();
        next.retain(|entry| entry != name);
        if next.len() == before {
            return Ok(false);
        }
        self.commit(next)?;
        info!(
            "event=registry_remove module=repo status=ok key={} count={}",
            self.inner.key,
            self.read_state().names.len()
        );
        Ok(true)
    }

    pub fn snapshot(&self) -> Option<String> {
        self.read_state().snapshot.clone()
    }

    pub fn holds_snapshot(&self, raw: Option<&str>) -> bool {
        let state = self.read_state();
        match raw {
            Some(raw) => state.snapshot.as_deref() == Some(raw),
            None => state.snapshot.is_none() && state.names == self.inner.defaults,
        }
    }

    fn commit(&self, next: Vec<String>) -> CollectionResult<()> {
        let raw = write_json_slot(self.inner.store.as_ref(), &self.inner.key, &next)?;
        let mut state = self.write_state();
        state.names = next;
        state.snapshot = Some(raw);
        Ok(())
    }

    fn replace(&self, names: Vec<String>, snapshot: Option<String>) {
        let mut state = self.write_state();
        state.names = names;
        state.snapshot = snapshot;
    }

    fn gate(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .write_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, RegistryState> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, RegistryState> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Trims names and drops blanks and later duplicates.
fn normalize_names(names: Vec<String>) -> Vec<String> {
    let mut normalized: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let trimmed = name.trim();
        if trimmed.is_empty() || normalized.iter().any(|entry| entry == trimmed) {
            continue;
        }
        normalized.push(trimmed.to_string());
    }
    normalized
}

#[cfg(test)]
mod tests {
    use super::normalize_names;

    #[test]
    fn normalize_names_trims_and_deduplicates_in_order() {
        let names = vec![
            " Design ".to_string(),
            "Design".to_string(),
            "".to_string(),
            "Other".to_string(),
        ];
        assert_eq!(
            normalize_names(names),
            vec!["Design".to_string(), "Other".to_string()]
        );
    }
}
