//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! Reconciler, source watcher, route table produce:
//!     → logging.rs (structured log events)
//!     → metrics.rs (cycle counters, clear counters, route gauge)
//!
//! Consumers:
//!     → Log aggregation (stdout)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Structured fields on every event (list, phase, batch size)
//! - Metric updates go through the `metrics` facade; without an installed
//!   recorder they are no-ops, so library users and tests pay nothing

pub mod logging;
pub mod metrics;
