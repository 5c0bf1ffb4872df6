//! Workspace record types and the contract every collection relies on.
//!
//! # Responsibility
//! - Define one structural type per collection (projects, tasks, notes,
//!   tools, learning subjects).
//! - Describe how each type is created from a draft and merged with a patch.
//!
//! # Invariants
//! - `id` is assigned at creation and never changed by a patch.
//! - Deserialization backfills every missing non-optional field with a
//!   type-appropriate default.

use chrono::{DateTime, SubsecRound, Utc};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fmt::Debug;

pub mod ids;
pub mod learning;
pub mod note;
pub mod project;
pub mod task;
pub mod tool;

/// Collection-scoped record identifier (timestamp-based token).
pub type EntityId = String;

/// Contract between a record type and `EntityCollection`.
pub trait Entity:
    Clone + Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Mandatory creation input.
    type Draft;
    /// Partial update; absent fields leave the record unchanged.
    type Patch;

    /// Short name used in log lines.
    const KIND: &'static str;

    fn id(&self) -> &str;

    /// Builds a complete record from its draft.
    fn from_draft(id: EntityId, draft: Self::Draft, now: DateTime<Utc>) -> Self;

    /// Merges `patch` and refreshes any last-modified field.
    fn apply_patch(&mut self, patch: Self::Patch, now: DateTime<Utc>);

    /// Replaces an empty or duplicated id found while loading.
    fn reassign_id(&mut self, id: EntityId);

    /// Repairs ids of records owned by this one. Returns whether anything changed.
    fn repair_nested_ids(&mut self) -> bool {
        false
    }
}

/// Current time at the millisecond precision used on the wire.
pub fn now() -> DateTime<Utc> {
    Utc::now().trunc_subsecs(3)
}
