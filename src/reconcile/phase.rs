//! Reconcile cycle state machine.
//!
//! # State Transitions
//! ```text
//! Idle → PreClearing → Rebinding → Refreshing → Idle
//! any phase --error--> Idle
//! ```

use std::fmt;

#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReconcilePhase {
    Idle = 0,
    PreClearing = 1,
    Rebinding = 2,
    Refreshing = 3,
}

impl ReconcilePhase {
    /// The phase that follows a successful run of `self`.
    pub fn next(self) -> Self {
        match self {
            ReconcilePhase::Idle => ReconcilePhase::PreClearing,
            ReconcilePhase::PreClearing => ReconcilePhase::Rebinding,
            ReconcilePhase::Rebinding => ReconcilePhase::Refreshing,
            ReconcilePhase::Refreshing => ReconcilePhase::Idle,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ReconcilePhase::Idle => "idle",
            ReconcilePhase::PreClearing => "pre_clearing",
            ReconcilePhase::Rebinding => "rebinding",
            ReconcilePhase::Refreshing => "refreshing",
        }
    }
}

impl From<u8> for ReconcilePhase {
    fn from(val: u8) -> Self {
        match val {
            1 => ReconcilePhase::PreClearing,
            2 => ReconcilePhase::Rebinding,
            3 => ReconcilePhase::Refreshing,
            _ => ReconcilePhase::Idle,
        }
    }
}

impl fmt::Display for ReconcilePhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cycle_returns_to_idle() {
        let mut phase = ReconcilePhase::Idle.next();
        let mut seen = vec![phase];
        while phase != ReconcilePhase::Idle {
            phase = phase.next();
            seen.push(phase);
        }
        assert_eq!(
            seen,
            vec![
                ReconcilePhase::PreClearing,
                ReconcilePhase::Rebinding,
                ReconcilePhase::Refreshing,
                ReconcilePhase::Idle,
            ]
        );
    }

    #[test]
    fn test_u8_round_trip() {
        for phase in [
            ReconcilePhase::Idle,
            ReconcilePhase::PreClearing,
            ReconcilePhase::Rebinding,
            ReconcilePhase::Refreshing,
        ] {
            assert_eq!(ReconcilePhase::from(phase as u8), phase);
        }
        assert_eq!(ReconcilePhase::from(42), ReconcilePhase::Idle);
    }
}
