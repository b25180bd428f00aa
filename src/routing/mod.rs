//! Routing subsystem: the route table fed by the reconciler.
//!
//! # Data Flow
//! ```text
//! Rebind signal:
//!     binder.rs (latest snapshot under key prefix)
//!     → properties.rs (merge into bound indexed lists)
//!
//! Refresh signal:
//!     properties.rs (bound `routes` + `default-filters`)
//!     → table.rs (derive RouteDefinition[], sort by order)
//!     → atomic swap of the active table
//! ```
//!
//! # Design Decisions
//! - List binding merges into existing entries and never shrinks a list;
//!   only an explicit `set_list` removes entries
//! - The active table is swapped wholesale, readers never see a partial table
//! - Invalid route entries are skipped with a warning, not fatal

pub mod binder;
pub mod gateway;
pub mod properties;
pub mod table;

pub use binder::PropertiesBinder;
pub use gateway::Gateway;
pub use properties::{BoundProperties, GatewayProperties};
pub use table::{RouteDefinition, RouteTable};

/// Indexed list holding route definitions.
pub const ROUTES_LIST: &str = "routes";

/// Indexed list holding filters applied to every route.
pub const DEFAULT_FILTERS_LIST: &str = "default-filters";
