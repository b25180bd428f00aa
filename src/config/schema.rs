//! Configuration schema definitions.
//!
//! This module defines the configuration structure for the refresher.
//! All types derive `Deserialize` for loading from config files.

use serde::Deserialize;

use crate::reconcile::{ListBinding, ListPattern};

/// Root configuration for the refresher.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RefresherConfig {
    /// Watched configuration source.
    pub source: SourceConfig,

    /// Indexed lists tracked for pre-clear.
    pub lists: Vec<TrackedListConfig>,

    /// Observability settings.
    pub observability: ObservabilityConfig,
}

impl Default for RefresherConfig {
    fn default() -> Self {
        Self {
            source: SourceConfig::default(),
            lists: vec![
                TrackedListConfig::new("routes", "id"),
                TrackedListConfig::new("default-filters", "name"),
            ],
            observability: ObservabilityConfig::default(),
        }
    }
}

impl RefresherConfig {
    /// Build one binding per tracked list.
    pub fn list_bindings(&self) -> Result<Vec<ListBinding>, regex::Error> {
        self.lists
            .iter()
            .map(|list| {
                list.pattern(&self.source.key_prefix)
                    .map(|pattern| ListBinding::new(list.name.clone(), pattern))
            })
            .collect()
    }
}

/// Configuration source settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct SourceConfig {
    /// Path to the watched property file (TOML).
    pub path: String,

    /// Only keys starting with this prefix are reconciled.
    pub key_prefix: String,

    /// Poll interval for the file watcher in seconds.
    pub poll_interval_secs: u64,
}

impl Default for SourceConfig {
    fn default() -> Self {
        Self {
            path: "gateway.toml".to_string(),
            key_prefix: "spring.cloud.gateway.".to_string(),
            poll_interval_secs: 2,
        }
    }
}

/// One tracked indexed list.
#[derive(Debug, Clone, Deserialize)]
pub struct TrackedListConfig {
    /// List name under the key prefix (e.g. "routes").
    pub name: String,

    /// Field identifying each entry (e.g. "id").
    #[serde(default = "default_anchor_field")]
    pub anchor_field: String,

    /// Raw regex overriding the pattern derived from prefix/name/anchor.
    #[serde(default)]
    pub anchor_pattern: Option<String>,
}

fn default_anchor_field() -> String {
    "id".to_string()
}

impl TrackedListConfig {
    pub fn new(name: impl Into<String>, anchor_field: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            anchor_field: anchor_field.into(),
            anchor_pattern: None,
        }
    }

    /// Compile the anchor-key pattern for this list.
    pub fn pattern(&self, key_prefix: &str) -> Result<ListPattern, regex::Error> {
        match &self.anchor_pattern {
            Some(raw) => ListPattern::new(raw.as_str()),
            None => ListPattern::for_list(key_prefix, &self.name, &self.anchor_field),
        }
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ObservabilityConfig {
    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Enable metrics endpoint.
    pub metrics_enabled: bool,

    /// Metrics endpoint bind address.
    pub metrics_address: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            metrics_enabled: false,
            metrics_address: "0.0.0.0:9090".to_string(),
        }
    }
}
