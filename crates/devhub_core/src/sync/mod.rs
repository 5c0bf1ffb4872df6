//! Cross-context synchronization.
//!
//! # Responsibility
//! - Reload in-memory slots when another context writes their key.
//!
//! # Invariants
//! - Last writer wins: a notification triggers a full reload, never a merge.
//! - A notification whose value the slot already reflects is skipped.

pub mod synchronizer;

pub use synchronizer::{CrossTabSynchronizer, SyncStats, SyncTarget};
