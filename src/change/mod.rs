//! Configuration change batches.
//!
//! # Data Flow
//! ```text
//! config source snapshot (old, new)
//!     → source::diff (calculate per-key changes)
//!     → ConfigChangeEvent (one batch per notification)
//!     → reconcile::Reconciler (validate, then clear/rebind/refresh)
//! ```
//!
//! # Design Decisions
//! - A batch is immutable once built; it only lives for one reconcile cycle
//! - Changed keys are derived from the change map, so a key can never be
//!   listed without its record
//! - Value-presence invariants are checked by `validate`, not by the
//!   constructors, so a malformed batch can still reach the reconciler and
//!   be rejected there

use std::collections::BTreeMap;
use std::fmt;

use crate::reconcile::ReconcileError;

/// Kind of change applied to a single key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChangeType {
    Added,
    Modified,
    Deleted,
}

impl fmt::Display for ChangeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            ChangeType::Added => "ADDED",
            ChangeType::Modified => "MODIFIED",
            ChangeType::Deleted => "DELETED",
        };
        f.write_str(label)
    }
}

/// A single key's change within a batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigChange {
    pub key: String,
    pub old_value: Option<String>,
    pub new_value: Option<String>,
    pub change_type: ChangeType,
}

impl ConfigChange {
    pub fn added(key: impl Into<String>, new_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            old_value: None,
            new_value: Some(new_value.into()),
            change_type: ChangeType::Added,
        }
    }

    pub fn modified(
        key: impl Into<String>,
        old_value: impl Into<String>,
        new_value: impl Into<String>,
    ) -> Self {
        Self {
            key: key.into(),
            old_value: Some(old_value.into()),
            new_value: Some(new_value.into()),
            change_type: ChangeType::Modified,
        }
    }

    pub fn deleted(key: impl Into<String>, old_value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            old_value: Some(old_value.into()),
            new_value: None,
            change_type: ChangeType::Deleted,
        }
    }

    /// Check the value-presence invariant for this change's kind.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        let reason = match self.change_type {
            ChangeType::Deleted if self.new_value.is_some() => "carries a new value",
            ChangeType::Added if self.old_value.is_some() => "carries an old value",
            _ => return Ok(()),
        };
        Err(ReconcileError::MalformedChangeEvent {
            key: self.key.clone(),
            change_type: self.change_type,
            reason,
        })
    }
}

/// One notification cycle's worth of key changes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigChangeEvent {
    /// Source namespace the batch came from (file path, remote namespace).
    namespace: String,
    changes: BTreeMap<String, ConfigChange>,
}

impl ConfigChangeEvent {
    /// Build a batch. A later change for the same key replaces an earlier one.
    pub fn new(namespace: impl Into<String>, changes: impl IntoIterator<Item = ConfigChange>) -> Self {
        let changes = changes
            .into_iter()
            .map(|change| (change.key.clone(), change))
            .collect();
        Self {
            namespace: namespace.into(),
            changes,
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Keys touched by this batch, in sorted order.
    pub fn changed_keys(&self) -> impl Iterator<Item = &str> + '_ {
        self.changes.keys().map(String::as_str)
    }

    pub fn get_change(&self, key: &str) -> Option<&ConfigChange> {
        self.changes.get(key)
    }

    pub fn changes(&self) -> impl Iterator<Item = &ConfigChange> + '_ {
        self.changes.values()
    }

    pub fn len(&self) -> usize {
        self.changes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.changes.is_empty()
    }

    /// Reject the batch if any record breaks its value-presence invariant.
    pub fn validate(&self) -> Result<(), ReconcileError> {
        self.changes.values().try_for_each(ConfigChange::validate)
    }
}
