//! Property snapshots.
//!
//! A snapshot is the flat key/value view of one version of the source:
//!
//! ```text
//! [[spring.cloud.gateway.routes]]        spring.cloud.gateway.routes[0].id = "users"
//! id = "users"                     →     spring.cloud.gateway.routes[0].uri = "http://users:8080"
//! uri = "http://users:8080"              spring.cloud.gateway.routes[0].predicates[0] = "Path=/users/**"
//! predicates = ["Path=/users/**"]
//! ```

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::source::SourceError;

/// Flat key → value view of the configuration source.
pub type PropertySnapshot = BTreeMap<String, String>;

/// Read and flatten a TOML property file.
pub fn load_snapshot(path: &Path) -> Result<PropertySnapshot, SourceError> {
    let content = fs::read_to_string(path)?;
    let document: toml::Table = toml::from_str(&content)?;
    Ok(flatten(&document))
}

/// Flatten a TOML table into dotted, indexed keys.
pub fn flatten(table: &toml::Table) -> PropertySnapshot {
    let mut snapshot = PropertySnapshot::new();
    for (key, value) in table {
        flatten_value(key.clone(), value, &mut snapshot);
    }
    snapshot
}

fn flatten_value(path: String, value: &toml::Value, out: &mut PropertySnapshot) {
    match value {
        toml::Value::Table(table) => {
            for (key, nested) in table {
                flatten_value(format!("{path}.{key}"), nested, out);
            }
        }
        toml::Value::Array(items) => {
            for (index, item) in items.iter().enumerate() {
                flatten_value(format!("{path}[{index}]"), item, out);
            }
        }
        toml::Value::String(s) => {
            out.insert(path, s.clone());
        }
        other => {
            out.insert(path, other.to_string());
        }
    }
}
