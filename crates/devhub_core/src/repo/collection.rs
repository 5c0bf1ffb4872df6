//! Generic entity collection over one store key.
//!
//! # Responsibility
//! - Keep the authoritative ordered records for one record type.
//! - Assign unique ids, merge patches, and persist whole snapshots.
//! - Reload from the store on demand, recovering from malformed values.
//!
//! # Invariants
//! - Insertion order is the canonical order; `create` appends.
//! - Ids are unique within the collection; load repairs empty or duplicated
//!   ids and persists the repaired snapshot.
//! - Update/remove on a missing id is a logged no-op, never an error.
//! - `all()` returns a copy; callers cannot mutate collection state.

use super::snapshot::{read_json_slot, write_json_slot, CollectionResult, LoadOutcome, SlotRead};
use crate::model::ids::next_unique_id;
use crate::model::{now, Entity};
use crate::store::PersistentStore;
use log::{debug, error, info};
use std::collections::HashSet;
use std::sync::{Arc, Mutex, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

struct CollectionState<T> {
    records: Vec<T>,
    /// Raw value the records were loaded from or last written as.
    snapshot: Option<String>,
    last_load: LoadOutcome,
}

struct CollectionInner<T> {
    key: String,
    store: Arc<dyn PersistentStore>,
    state: RwLock<CollectionState<T>>,
    /// Serializes mutations of this handle family.
    write_gate: Mutex<()>,
}

/// Shared handle to one typed collection.
///
/// Clones share the same in-memory state, so every view of one context sees
/// the same records.
pub struct EntityCollection<T: Entity> {
    inner: Arc<CollectionInner<T>>,
}

impl<T: Entity> Clone for EntityCollection<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> EntityCollection<T> {
    /// Creates a handle for `key` and loads it immediately.
    pub fn open(store: Arc<dyn PersistentStore>, key: impl Into<String>) -> Self {
        let collection = Self {
            inner: Arc::new(CollectionInner {
                key: key.into(),
                store,
                state: RwLock::new(CollectionState {
                    records: Vec::new(),
                    snapshot: None,
                    last_load: LoadOutcome::Absent,
                }),
                write_gate: Mutex::new(()),
            }),
        };
        collection.load();
        collection
    }

    pub fn key(&self) -> &str {
        &self.inner.key
    }

    /// Re-reads the slot and replaces in-memory records.
    ///
    /// Absent or malformed values yield an empty collection. A store read
    /// failure keeps the current records.
    pub fn load(&self) -> LoadOutcome {
        let key = self.inner.key.as_str();
        let outcome = match read_json_slot::<Vec<T>>(self.inner.store.as_ref(), key, T::KIND) {
            SlotRead::Absent => {
                self.replace_state(Vec::new(), None, LoadOutcome::Absent);
                LoadOutcome::Absent
            }
            SlotRead::Malformed { raw } => {
                self.replace_state(Vec::new(), Some(raw), LoadOutcome::Recovered);
                LoadOutcome::Recovered
            }
            SlotRead::Unavailable => {
                self.write_state().last_load = LoadOutcome::Unavailable;
                LoadOutcome::Unavailable
            }
            SlotRead::Parsed { value, raw } => {
                let mut records = value;
                let count = records.len();
                let outcome = LoadOutcome::Loaded { records: count };
                if repair_ids(&mut records) {
                    self.persist_repaired(records, raw, outcome);
                } else {
                    self.replace_state(records, Some(raw), outcome);
                }
                outcome
            }
        };

        debug!(
            "event=collection_load module=repo status=ok kind={} key={} outcome={:?}",
            T::KIND,
            key,
            outcome
        );
        outcome
    }

    /// Outcome of the most recent `load`.
    pub fn last_load(&self) -> LoadOutcome {
        self.read_state().last_load
    }

    /// Appends a new record built from `draft` and persists the collection.
    pub fn create(&self, draft: T::Draft) -> CollectionResult<T> {
        let _gate = self.gate();
        let mut next = self.read_state().records.clone();
        let id = next_unique_id(|candidate| next.iter().any(|record| record.id() == candidate));
        let record = T::from_draft(id, draft, now());
        next.push(record.clone());

        self.commit(next)?;
        info!(
            "event=collection_create module=repo status=ok kind={} key={} id={}",
            T::KIND,
            self.inner.key,
            record.id()
        );
        Ok(record)
    }

    /// Merges `patch` into the record with `id`.
    ///
    /// Returns the updated record, or `None` when `id` is unknown.
    pub fn update(&self, id: &str, patch: T::Patch) -> CollectionResult<Option<T>> {
        let _gate = self.gate();
        let mut next = self.read_state().records.clone();
        let Some(record) = next.iter_mut().find(|record| record.id() == id) else {
            self.log_missing("update", id);
            return Ok(None);
        };
        record.apply_patch(patch, now());
        let updated = record.clone();

        self.commit(next)?;
        debug!(
            "event=collection_update module=repo status=ok kind={} key={} id={}",
            T::KIND,
            self.inner.key,
            id
        );
        Ok(Some(updated))
    }

    /// Applies a patch to every record matching `filter`, persisting once.
    ///
    /// Returns the number of records changed.
    pub fn update_matching(
        &self,
        filter: impl Fn(&T) -> bool,
        patch: impl Fn(&T) -> T::Patch,
    ) -> CollectionResult<usize> {
        let _gate = self.gate();
        let mut next = self.read_state().records.clone();
        let timestamp = now();
        let mut changed = 0;
        for record in next.iter_mut().filter(|record| filter(record)) {
            let change = patch(record);
            record.apply_patch(change, timestamp);
            changed += 1;
        }
        if changed == 0 {
            return Ok(0);
        }

        self.commit(next)?;
        debug!(
            "event=collection_update_matching module=repo status=ok kind={} key={} changed={}",
            T::KIND,
            self.inner.key,
            changed
        );
        Ok(changed)
    }

    /// Removes the record with `id`. Returns it, or `None` when unknown.
    pub fn remove(&self, id: &str) -> CollectionResult<Option<T>> {
        let _gate = self.gate();
        let mut next = self.read_state().records.clone();
        let Some(index) = next.iter().position(|record| record.id() == id) else {
            self.log_missing("remove", id);
            return Ok(None);
        };
        let removed = next.remove(index);

        self.commit(next)?;
        info!(
            "event=collection_remove module=repo status=ok kind={} key={} id={}",
            T::KIND,
            self.inner.key,
            id
        );
        Ok(Some(removed))
    }

    /// Copy of the ordered records.
    pub fn all(&self) -> Vec<T> {
        self.read_state().records.clone()
    }

    pub fn get(&self, id: &str) -> Option<T> {
        self.read_state()
            .records
            .iter()
            .find(|record| record.id() == id)
            .cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.read_state()
            .records
            .iter()
            .any(|record| record.id() == id)
    }

    pub fn len(&self) -> usize {
        self.read_state().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.read_state().records.is_empty()
    }

    /// Raw snapshot the in-memory records reflect.
    pub fn snapshot(&self) -> Option<String> {
        self.read_state().snapshot.clone()
    }

    /// Whether memory already reflects the raw value `raw`.
    pub fn holds_snapshot(&self, raw: Option<&str>) -> bool {
        let state = self.read_state();
        match raw {
            Some(raw) => state.snapshot.as_deref() == Some(raw),
            None => state.snapshot.is_none() && state.records.is_empty(),
        }
    }

    fn commit(&self, next: Vec<T>) -> CollectionResult<()> {
        // The store write happens without the state lock: store notifications
        // may call back into handles of this process.
        let raw = match write_json_slot(self.inner.store.as_ref(), &self.inner.key, &next) {
            Ok(raw) => raw,
            Err(err) => {
                error!(
                    "event=collection_save module=repo status=error kind={} key={} error={}",
                    T::KIND,
                    self.inner.key,
                    err
                );
                return Err(err);
            }
        };

        let mut state = self.write_state();
        state.records = next;
        state.snapshot = Some(raw);
        Ok(())
    }

    fn persist_repaired(&self, records: Vec<T>, raw: String, outcome: LoadOutcome) {
        info!(
            "event=collection_repair_ids module=repo status=start kind={} key={}",
            T::KIND,
            self.inner.key
        );
        match write_json_slot(self.inner.store.as_ref(), &self.inner.key, &records) {
            Ok(repaired) => self.replace_state(records, Some(repaired), outcome),
            Err(err) => {
                // Memory still gets the repaired ids; the next mutation persists them.
                error!(
                    "event=collection_repair_ids module=repo status=error kind={} key={} error={}",
                    T::KIND,
                    self.inner.key,
                    err
                );
                self.replace_state(records, Some(raw), outcome);
            }
        }
    }

    fn replace_state(&self, records: Vec<T>, snapshot: Option<String>, outcome: LoadOutcome) {
        let mut state = self.write_state();
        state.records = records;
        state.snapshot = snapshot;
        state.last_load = outcome;
    }

    fn log_missing(&self, operation: &str, id: &str) {
        debug!(
            "event=collection_{} module=repo status=skip kind={} key={} id={} reason=not_found",
            operation,
            T::KIND,
            self.inner.key,
            id
        );
    }

    fn gate(&self) -> std::sync::MutexGuard<'_, ()> {
        self.inner
            .write_gate
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn read_state(&self) -> RwLockReadGuard<'_, CollectionState<T>> {
        self.inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, CollectionState<T>> {
        self.inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

/// Gives fresh ids to records with an empty or repeated id.
fn repair_ids<T: Entity>(records: &mut [T]) -> bool {
    let mut seen: HashSet<String> = HashSet::new();
    let mut repaired = false;
    for index in 0..records.len() {
        if records[index].repair_nested_ids() {
            repaired = true;
        }
        let id = records[index].id().to_string();
        if !id.is_empty() && seen.insert(id) {
            continue;
        }
        let fresh = next_unique_id(|candidate| {
            seen.contains(candidate) || records.iter().any(|record| record.id() == candidate)
        });
        seen.insert(fresh.clone());
        records[index].reassign_id(fresh);
        repaired = true;
    }
    repaired
}
