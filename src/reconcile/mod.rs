//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! ConfigChangeEvent
//!     → validate (reject malformed batches before touching anything)
//!     → pattern.rs (classify keys per tracked indexed list)
//!     → decision.rs (does the list need a full clear?)
//!     → orchestrator.rs:
//!         PRE_CLEARING  → set_list(name, []) for every list that needs it
//!         REBINDING     → environment_changed(changed keys)
//!         REFRESHING    → refresh_routes()
//!         IDLE
//! ```
//!
//! # Design Decisions
//! - One cycle in flight per reconciler; overlapping batches block on the lock
//! - Phases only advance on success, so a failed rebind never reaches refresh
//! - No retries here; the caller owns retry policy
//! - The clear heuristic sits behind `ClearPolicy` so it can be replaced
//!   without touching the orchestrator

pub mod decision;
pub mod orchestrator;
pub mod pattern;
pub mod phase;
pub mod sinks;

use thiserror::Error;

use crate::change::ChangeType;

pub use decision::{needs_clear, ClearPolicy, DeletionCountPolicy};
pub use orchestrator::{ListBinding, ReconciliationOutcome, Reconciler};
pub use pattern::{matches, ListPattern};
pub use phase::ReconcilePhase;
pub use sinks::{CollaboratorError, ListEntry, RebindSink, RouteTableConsumer};

/// Errors surfaced by a reconcile cycle.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// A change record breaks the ADDED/DELETED value-presence invariant.
    #[error("Malformed change event: {change_type} key '{key}' {reason}")]
    MalformedChangeEvent {
        key: String,
        change_type: ChangeType,
        reason: &'static str,
    },

    /// A collaborator failed; later phases were not run.
    #[error("Reconcile aborted during {phase}: {source}")]
    Collaborator {
        phase: ReconcilePhase,
        #[source]
        source: CollaboratorError,
    },
}
