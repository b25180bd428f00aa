//! Bound gateway properties.
//!
//! # Responsibilities
//! - Hold the indexed lists and plain settings bound from the source
//! - Replace a list wholesale on request (pre-clear)
//! - Merge a snapshot into the bound state (rebind)
//!
//! # Design Decisions
//! - Merge is additive: entry `n` gains or overwrites fields, new indices are
//!   appended, and entries past the snapshot's last index survive. A list
//!   removed upstream therefore has to be emptied with `set_list` first.
//! - Plain settings are replaced wholesale on every bind

use std::collections::BTreeMap;
use std::sync::{LazyLock, PoisonError, RwLock};

use regex::Regex;

use crate::reconcile::ListEntry;
use crate::source::PropertySnapshot;

/// Field name used for list items that are plain values (`filters[0] = "X"`).
pub const SCALAR_FIELD: &str = "value";

/// Highest list index accepted from the source.
const MAX_LIST_INDEX: usize = 4096;

static LIST_KEY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^\[\].]+)\[(\d+)\](?:\.(.+))?$").expect("list key regex is valid")
});

/// Snapshot of everything currently bound.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoundProperties {
    pub lists: BTreeMap<String, Vec<ListEntry>>,
    pub settings: BTreeMap<String, String>,
}

impl BoundProperties {
    pub fn list(&self, name: &str) -> &[ListEntry] {
        self.lists.get(name).map(Vec::as_slice).unwrap_or_default()
    }
}

/// Thread-safe holder of the bound properties.
#[derive(Debug, Default)]
pub struct GatewayProperties {
    inner: RwLock<BoundProperties>,
}

impl GatewayProperties {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of the current bound state.
    pub fn snapshot(&self) -> BoundProperties {
        self.inner.read().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn list_len(&self, name: &str) -> usize {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .lists
            .get(name)
            .map_or(0, Vec::len)
    }

    /// Replace a list wholesale.
    pub fn set_list(&self, name: &str, entries: Vec<ListEntry>) {
        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        inner.lists.insert(name.to_string(), entries);
    }

    /// Merge every key under `prefix` into the bound state.
    pub fn bind(&self, snapshot: &PropertySnapshot, prefix: &str) {
        let mut incoming: BTreeMap<String, BTreeMap<usize, ListEntry>> = BTreeMap::new();
        let mut settings = BTreeMap::new();

        for (key, value) in snapshot {
            let Some(relative) = key.strip_prefix(prefix) else {
                continue;
            };

            let Some(caps) = LIST_KEY.captures(relative) else {
                settings.insert(relative.to_string(), value.clone());
                continue;
            };

            let index = match caps[2].parse::<usize>() {
                Ok(index) if index <= MAX_LIST_INDEX => index,
                _ => {
                    tracing::warn!(key = %key, "Ignoring list key with out-of-range index");
                    continue;
                }
            };
            let field = caps.get(3).map_or(SCALAR_FIELD, |m| m.as_str());

            incoming
                .entry(caps[1].to_string())
                .or_default()
                .entry(index)
                .or_default()
                .insert(field.to_string(), value.clone());
        }

        let mut inner = self.inner.write().unwrap_or_else(PoisonError::into_inner);
        for (name, entries) in incoming {
            let list = inner.lists.entry(name).or_default();
            for (index, fields) in entries {
                if list.len() <= index {
                    list.resize_with(index + 1, ListEntry::new);
                }
                list[index].extend(fields);
            }
        }
        inner.settings = settings;
    }
}
