//! Gateway route refresher library.

pub mod change;
pub mod config;
pub mod observability;
pub mod reconcile;
pub mod routing;
pub mod source;

pub use change::{ChangeType, ConfigChange, ConfigChangeEvent};
pub use config::RefresherConfig;
pub use reconcile::{ReconcileError, Reconciler};
