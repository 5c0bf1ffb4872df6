//! Timestamp-based id tokens.
//!
//! # Invariants
//! - Tokens issued by one process are strictly increasing, even when the
//!   clock does not advance between calls.
//! - `next_unique_id` never returns a token the caller reports as taken.

use super::EntityId;
use chrono::Utc;
use std::sync::atomic::{AtomicI64, Ordering};

static LAST_ISSUED_MS: AtomicI64 = AtomicI64::new(0);

/// Returns a token `>= now_ms` and greater than every token issued before.
pub fn next_token(now_ms: i64) -> i64 {
    let mut issued = now_ms;
    // fetch_update only fails when the closure returns None, which it never does.
    let _ = LAST_ISSUED_MS.fetch_update(Ordering::SeqCst, Ordering::SeqCst, |last| {
        issued = now_ms.max(last + 1);
        Some(issued)
    });
    issued
}

/// Issues a fresh id from the wall clock.
pub fn next_id() -> EntityId {
    next_token(Utc::now().timestamp_millis()).to_string()
}

/// Issues a fresh id that `is_taken` does not claim.
pub fn next_unique_id(is_taken: impl Fn(&str) -> bool) -> EntityId {
    loop {
        let candidate = next_id();
        if !is_taken(candidate.as_str()) {
            return candidate;
        }
    }
}
