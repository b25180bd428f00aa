//! Collaborators driven by the reconciler.

use std::collections::{BTreeMap, BTreeSet};
use thiserror::Error;

/// One indexed-list entry: field path (`id`, `predicates[0]`) → value.
pub type ListEntry = BTreeMap<String, String>;

/// Failure reported by a collaborator.
#[derive(Debug, Clone, Error)]
#[error("{collaborator}: {message}")]
pub struct CollaboratorError {
    pub collaborator: &'static str,
    pub message: String,
}

impl CollaboratorError {
    pub fn new(collaborator: &'static str, message: impl Into<String>) -> Self {
        Self {
            collaborator,
            message: message.into(),
        }
    }
}

/// Receives "environment changed" notifications and re-resolves bound
/// configuration objects from the current key space.
pub trait RebindSink: Send + Sync {
    fn environment_changed(&self, changed_keys: &BTreeSet<String>) -> Result<(), CollaboratorError>;
}

/// Owner of the materialized lists and the active route table.
///
/// Every call is expected to be atomic from the consumer's own view.
pub trait RouteTableConsumer: Send + Sync {
    /// Number of entries currently materialized for `list`.
    fn list_len(&self, list: &str) -> usize;

    /// Replace `list` wholesale.
    fn set_list(&self, list: &str, entries: Vec<ListEntry>) -> Result<(), CollaboratorError>;

    /// Re-derive the active route table from the bound configuration.
    fn refresh_routes(&self) -> Result<(), CollaboratorError>;
}
