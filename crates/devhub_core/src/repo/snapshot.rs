//! Raw slot decoding shared by collections and registries.

use crate::store::{PersistentStore, StoreError};
use log::{error, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CollectionResult<T> = Result<T, CollectionError>;

/// Failure while persisting a collection snapshot.
#[derive(Debug)]
pub enum CollectionError {
    Store(StoreError),
    Encode(serde_json::Error),
}

impl Display for CollectionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Store(err) => write!(f, "{err}"),
            Self::Encode(err) => write!(f, "failed to encode snapshot: {err}"),
        }
    }
}

impl Error for CollectionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Store(err) => Some(err),
            Self::Encode(err) => Some(err),
        }
    }
}

impl From<StoreError> for CollectionError {
    fn from(value: StoreError) -> Self {
        Self::Store(value)
    }
}

impl From<serde_json::Error> for CollectionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encode(value)
    }
}

/// Result of reading one slot into memory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Key was absent; memory holds the initial state.
    Absent,
    /// Value parsed; `records` items are in memory.
    Loaded { records: usize },
    /// Value was malformed and has been discarded.
    Recovered,
    /// Store could not be read; previous memory kept.
    Unavailable,
}

pub(crate) enum SlotRead<V> {
    Absent,
    Parsed { value: V, raw: String },
    Malformed { raw: String },
    Unavailable,
}

/// Reads and decodes one JSON slot, classifying every failure.
pub(crate) fn read_json_slot<V: DeserializeOwned>(
    store: &dyn PersistentStore,
    key: &str,
    kind: &str,
) -> SlotRead<V> {
    let raw = match store.get(key) {
        Ok(Some(raw)) => raw,
        Ok(None) => return SlotRead::Absent,
        Err(err) => {
            error!(
                "event=slot_load module=repo status=error kind={} key={} error_code=store_read_failed error={}",
                kind, key, err
            );
            return SlotRead::Unavailable;
        }
    };

    match serde_json::from_str::<V>(&raw) {
        Ok(value) => SlotRead::Parsed { value, raw },
        Err(err) => {
            // Why: the error text can quote stored content; log position only.
            warn!(
                "event=slot_load module=repo status=recovered kind={} key={} bytes={} line={} column={}",
                kind,
                key,
                raw.len(),
                err.line(),
                err.column()
            );
            SlotRead::Malformed { raw }
        }
    }
}

/// Encodes `value` and writes it to `key`, returning the written snapshot.
pub(crate) fn write_json_slot<V: Serialize + ?Sized>(
    store: &dyn PersistentStore,
    key: &str,
    value: &V,
) -> CollectionResult<String> {
    let raw = serde_json::to_string(value)?;
    store.set(key, &raw)?;
    Ok(raw)
}
