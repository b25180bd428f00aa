//! Snapshot diffing.
//!
//! # Responsibilities
//! - Compare two snapshots key by key
//! - Keep only keys under the interested prefix
//! - Classify each difference as ADDED, MODIFIED or DELETED

use crate::change::ConfigChange;
use crate::source::snapshot::PropertySnapshot;

/// Changes turning `old` into `new`, restricted to keys starting with `prefix`.
pub fn calculate_changes(old: &PropertySnapshot, new: &PropertySnapshot, prefix: &str) -> Vec<ConfigChange> {
    let mut changes = Vec::new();

    for (key, new_value) in new.range(prefix.to_string()..) {
        if !key.starts_with(prefix) {
            break;
        }
        match old.get(key) {
            None => changes.push(ConfigChange::added(key.as_str(), new_value.as_str())),
            Some(old_value) if old_value != new_value => changes.push(ConfigChange::modified(
                key.as_str(),
                old_value.as_str(),
                new_value.as_str(),
            )),
            Some(_) => {}
        }
    }

    for (key, old_value) in old.range(prefix.to_string()..) {
        if !key.starts_with(prefix) {
            break;
        }
        if !new.contains_key(key) {
            changes.push(ConfigChange::deleted(key.as_str(), old_value.as_str()));
        }
    }

    changes
}
