//! Clear decision for indexed lists.
//!
//! The list binder merges new entries into the existing collection instead
//! of replacing it, so a list that shrinks would keep stale tail entries.
//! When every previously known anchor key of a list is deleted in one batch,
//! the whole list was removed upstream and must be emptied before rebinding.
//! Any other change shape is left to the binder's merge.

use std::fmt;

use crate::change::{ChangeType, ConfigChangeEvent};
use crate::reconcile::pattern::{matches, ListPattern};

/// Decides whether a list must be emptied before the batch is rebound.
pub trait ClearPolicy: Send + Sync + fmt::Debug {
    fn needs_clear(&self, batch: &ConfigChangeEvent, pattern: &ListPattern, existing_size: usize) -> bool;
}

/// Clear when the number of deleted anchor keys equals the list's size.
#[derive(Debug, Default, Clone, Copy)]
pub struct DeletionCountPolicy;

impl ClearPolicy for DeletionCountPolicy {
    fn needs_clear(&self, batch: &ConfigChangeEvent, pattern: &ListPattern, existing_size: usize) -> bool {
        needs_clear(batch, pattern, existing_size)
    }
}

/// Returns true iff the batch deletes exactly `existing_size` keys matching
/// `pattern`.
///
/// An empty list with no matching deletions reports `true` (`0 == 0`).
/// Clearing an empty list is a no-op, so this is kept as is.
pub fn needs_clear(batch: &ConfigChangeEvent, pattern: &ListPattern, existing_size: usize) -> bool {
    let deleted = batch
        .changes()
        .filter(|change| change.change_type == ChangeType::Deleted)
        .filter(|change| matches(&change.key, pattern))
        .count();
    deleted == existing_size
}
