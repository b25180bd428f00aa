//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Check that every tracked list pattern compiles
//! - Reject duplicate or empty list names
//! - Validate value ranges (poll interval > 0, metrics address parses)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: RefresherConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::collections::HashSet;
use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::RefresherConfig;

/// A single semantic problem in the configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("source.path must not be empty")]
    EmptySourcePath,

    #[error("source.key_prefix must not be empty")]
    EmptyKeyPrefix,

    #[error("source.poll_interval_secs must be greater than 0")]
    ZeroPollInterval,

    #[error("lists[{index}].name must not be empty")]
    EmptyListName { index: usize },

    #[error("list '{name}' is tracked more than once")]
    DuplicateList { name: String },

    #[error("list '{name}' has an invalid anchor pattern: {reason}")]
    InvalidPattern { name: String, reason: String },

    #[error("observability.metrics_address '{0}' is not a socket address")]
    InvalidMetricsAddress(String),
}

pub fn validate_config(config: &RefresherConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.source.path.trim().is_empty() {
        errors.push(ValidationError::EmptySourcePath);
    }
    if config.source.key_prefix.is_empty() {
        errors.push(ValidationError::EmptyKeyPrefix);
    }
    if config.source.poll_interval_secs == 0 {
        errors.push(ValidationError::ZeroPollInterval);
    }

    let mut names = HashSet::new();
    for (index, list) in config.lists.iter().enumerate() {
        if list.name.trim().is_empty() {
            errors.push(ValidationError::EmptyListName { index });
            continue;
        }
        if !names.insert(list.name.as_str()) {
            errors.push(ValidationError::DuplicateList {
                name: list.name.clone(),
            });
        }
        if let Err(e) = list.pattern(&config.source.key_prefix) {
            errors.push(ValidationError::InvalidPattern {
                name: list.name.clone(),
                reason: e.to_string(),
            });
        }
    }

    if config.observability.metrics_enabled
        && config.observability.metrics_address.parse::<SocketAddr>().is_err()
    {
        errors.push(ValidationError::InvalidMetricsAddress(
            config.observability.metrics_address.clone(),
        ));
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}
