//! Store-backed collections and scalar slots.
//!
//! # Responsibility
//! - Own the in-memory copy of every persisted slot.
//! - Encode whole-slot snapshots on each mutation (no diffs).
//! - Recover silently from malformed persisted values.
//!
//! # Invariants
//! - In-memory state only changes after the store accepted the write, or on load.
//! - Each handle remembers the raw snapshot its memory reflects, so identical
//!   external values can be recognized.

pub mod category_registry;
pub mod collection;
mod snapshot;
pub mod user_profile;

pub use snapshot::{CollectionError, CollectionResult, LoadOutcome};
