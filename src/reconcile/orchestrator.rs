//! Reconcile cycle orchestration.
//!
//! # Responsibilities
//! - Reject malformed batches before any collaborator is touched
//! - Pre-clear every tracked list whose clear decision fires
//! - Signal the rebind sink, then the route table refresh
//! - Keep at most one cycle in flight
//!
//! # Design Decisions
//! - A single mutex guards the tracked lists for the whole cycle
//! - The current phase is published through an atomic for observers
//! - A phase only runs after the previous one returned `Ok`

use std::collections::BTreeSet;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Instant;

use crate::change::ConfigChangeEvent;
use crate::observability::metrics;
use crate::reconcile::decision::{ClearPolicy, DeletionCountPolicy};
use crate::reconcile::pattern::ListPattern;
use crate::reconcile::phase::ReconcilePhase;
use crate::reconcile::sinks::{CollaboratorError, RebindSink, RouteTableConsumer};
use crate::reconcile::ReconcileError;

/// One tracked indexed list.
#[derive(Debug, Clone)]
pub struct ListBinding {
    name: String,
    pattern: ListPattern,
    current_size: usize,
}

impl ListBinding {
    pub fn new(name: impl Into<String>, pattern: ListPattern) -> Self {
        Self {
            name: name.into(),
            pattern,
            current_size: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn pattern(&self) -> &ListPattern {
        &self.pattern
    }

    /// Entries materialized as of the end of the last cycle.
    pub fn current_size(&self) -> usize {
        self.current_size
    }
}

/// Result of one successful cycle.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReconciliationOutcome {
    /// Lists emptied during pre-clear.
    pub cleared_lists: BTreeSet<String>,
}

/// Resets the published phase to `Idle` however the cycle ends.
struct PhaseGuard<'a> {
    phase: &'a AtomicU8,
}

impl PhaseGuard<'_> {
    fn enter(&self, phase: ReconcilePhase) {
        self.phase.store(phase as u8, Ordering::Release);
    }
}

impl Drop for PhaseGuard<'_> {
    fn drop(&mut self) {
        self.phase.store(ReconcilePhase::Idle as u8, Ordering::Release);
    }
}

/// Drives clear → rebind → refresh for each change batch.
pub struct Reconciler {
    bindings: Mutex<Vec<ListBinding>>,
    phase: AtomicU8,
    policy: Box<dyn ClearPolicy>,
    rebind: Arc<dyn RebindSink>,
    routes: Arc<dyn RouteTableConsumer>,
}

impl Reconciler {
    /// Create a reconciler using the deletion-count clear policy.
    pub fn new(
        bindings: Vec<ListBinding>,
        rebind: Arc<dyn RebindSink>,
        routes: Arc<dyn RouteTableConsumer>,
    ) -> Self {
        let bindings = bindings
            .into_iter()
            .map(|mut binding| {
                binding.current_size = routes.list_len(&binding.name);
                binding
            })
            .collect();

        Self {
            bindings: Mutex::new(bindings),
            phase: AtomicU8::new(ReconcilePhase::Idle as u8),
            policy: Box::new(DeletionCountPolicy),
            rebind,
            routes,
        }
    }

    /// Replace the clear policy.
    pub fn with_policy(mut self, policy: impl ClearPolicy + 'static) -> Self {
        self.policy = Box::new(policy);
        self
    }

    /// Phase of the cycle currently in flight, `Idle` if none.
    pub fn phase(&self) -> ReconcilePhase {
        ReconcilePhase::from(self.phase.load(Ordering::Acquire))
    }

    /// Copy of the tracked lists. Blocks while a cycle is in flight.
    pub fn bindings(&self) -> Vec<ListBinding> {
        self.bindings
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Reconcile one change batch.
    ///
    /// Overlapping calls run one after the other. On error the remaining
    /// phases are skipped, the reconciler returns to `Idle` and the error is
    /// handed back to the caller.
    pub fn on_configuration_changed(
        &self,
        batch: &ConfigChangeEvent,
    ) -> Result<ReconciliationOutcome, ReconcileError> {
        if let Err(e) = batch.validate() {
            tracing::error!(namespace = %batch.namespace(), error = %e, "Rejecting change batch");
            metrics::record_rejected_batch();
            return Err(e);
        }

        // A panic inside a collaborator leaves no state behind that the next
        // cycle depends on, so a poisoned lock is taken over as is.
        let mut bindings = self.bindings.lock().unwrap_or_else(PoisonError::into_inner);
        let start_time = Instant::now();

        tracing::info!(
            namespace = %batch.namespace(),
            batch_keys = batch.len(),
            "Refreshing gateway properties"
        );

        let result = self.run_cycle(batch, &mut bindings);

        match &result {
            Ok(outcome) => {
                tracing::info!(
                    cleared = ?outcome.cleared_lists,
                    elapsed_ms = start_time.elapsed().as_millis() as u64,
                    "Gateway properties refreshed"
                );
                metrics::record_cycle("success", start_time);
            }
            Err(e) => {
                tracing::error!(error = %e, "Gateway properties refresh failed; keeping current route table");
                metrics::record_cycle("failure", start_time);
            }
        }

        result
    }

    fn run_cycle(
        &self,
        batch: &ConfigChangeEvent,
        bindings: &mut [ListBinding],
    ) -> Result<ReconciliationOutcome, ReconcileError> {
        let guard = PhaseGuard { phase: &self.phase };
        let mut outcome = ReconciliationOutcome::default();

        let mut phase = ReconcilePhase::Idle.next();
        while phase != ReconcilePhase::Idle {
            guard.enter(phase);
            tracing::debug!(phase = %phase, "Entering reconcile phase");

            self.run_phase(phase, batch, bindings, &mut outcome)
                .map_err(|source| ReconcileError::Collaborator { phase, source })?;

            phase = phase.next();
        }

        Ok(outcome)
    }

    fn run_phase(
        &self,
        phase: ReconcilePhase,
        batch: &ConfigChangeEvent,
        bindings: &mut [ListBinding],
        outcome: &mut ReconciliationOutcome,
    ) -> Result<(), CollaboratorError> {
        match phase {
            ReconcilePhase::PreClearing => self.pre_clear(batch, bindings, outcome),
            ReconcilePhase::Rebinding => {
                let changed_keys: BTreeSet<String> =
                    batch.changed_keys().map(str::to_owned).collect();
                self.rebind.environment_changed(&changed_keys)
            }
            ReconcilePhase::Refreshing => {
                self.routes.refresh_routes()?;
                for binding in bindings.iter_mut() {
                    binding.current_size = self.routes.list_len(&binding.name);
                }
                Ok(())
            }
            ReconcilePhase::Idle => Ok(()),
        }
    }

    fn pre_clear(
        &self,
        batch: &ConfigChangeEvent,
        bindings: &mut [ListBinding],
        outcome: &mut ReconciliationOutcome,
    ) -> Result<(), CollaboratorError> {
        for binding in bindings.iter_mut() {
            binding.current_size = self.routes.list_len(&binding.name);

            if !self
                .policy
                .needs_clear(batch, &binding.pattern, binding.current_size)
            {
                continue;
            }

            tracing::debug!(
                list = %binding.name,
                previous_size = binding.current_size,
                "Clearing indexed list before rebind"
            );
            self.routes.set_list(&binding.name, Vec::new())?;
            binding.current_size = 0;
            outcome.cleared_lists.insert(binding.name.clone());
            metrics::record_list_cleared(&binding.name);
        }
        Ok(())
    }
}
