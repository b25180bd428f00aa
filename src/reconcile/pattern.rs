//! Indexed-list key matching.
//!
//! # Responsibilities
//! - Recognise keys shaped like `prefix.list[n].field`
//! - Decide which tracked list a changed key belongs to
//!
//! # Design Decisions
//! - Matching is anchored to the whole key (no partial hits)
//! - Matching is case-sensitive
//! - Patterns are compiled once per tracked list, never per key

use regex::Regex;

/// A compiled, fully anchored key pattern for one indexed list.
#[derive(Debug, Clone)]
pub struct ListPattern {
    raw: String,
    regex: Regex,
}

impl ListPattern {
    /// Compile a raw pattern. The pattern must cover the whole key.
    pub fn new(raw: impl Into<String>) -> Result<Self, regex::Error> {
        let raw = raw.into();
        let regex = Regex::new(&format!("^(?:{})$", raw))?;
        Ok(Self { raw, regex })
    }

    /// Pattern for the anchor field of every entry of `list_name`.
    ///
    /// `for_list("spring.cloud.gateway.", "routes", "id")` matches
    /// `spring.cloud.gateway.routes[3].id`.
    pub fn for_list(prefix: &str, list_name: &str, anchor_field: &str) -> Result<Self, regex::Error> {
        Self::new(format!(
            r"{}{}\[\d+\]\.{}",
            regex::escape(prefix),
            regex::escape(list_name),
            regex::escape(anchor_field)
        ))
    }

    /// The pattern as written, without the anchoring wrapper.
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    pub fn is_match(&self, key: &str) -> bool {
        self.regex.is_match(key)
    }
}

/// Returns true if `key` is matched in full by `pattern`.
pub fn matches(key: &str, pattern: &ListPattern) -> bool {
    pattern.is_match(key)
}
