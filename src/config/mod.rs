//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → RefresherConfig (validated, immutable)
//!     → list bindings, source watcher, observability
//! ```
//!
//! # Design Decisions
//! - Config is immutable once loaded; the controller restarts to change it
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{ObservabilityConfig, RefresherConfig, SourceConfig, TrackedListConfig};
pub use validation::{validate_config, ValidationError};
