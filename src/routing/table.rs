//! Active route table.
//!
//! # Responsibilities
//! - Derive route definitions from the bound `routes` list
//! - Apply `default-filters` ahead of each route's own filters
//! - Swap the active table atomically on refresh

use std::collections::BTreeSet;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::reconcile::ListEntry;
use crate::routing::properties::{BoundProperties, SCALAR_FIELD};
use crate::routing::{DEFAULT_FILTERS_LIST, ROUTES_LIST};

/// A single materialized route.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDefinition {
    pub id: String,
    pub uri: String,
    /// Lower orders sort first.
    pub order: i32,
    pub predicates: Vec<String>,
    pub filters: Vec<String>,
}

impl RouteDefinition {
    fn from_entry(entry: &ListEntry, default_filters: &[String]) -> Option<Self> {
        let id = entry.get("id")?.clone();
        let Some(uri) = entry.get("uri") else {
            tracing::warn!(route = %id, "Skipping route without uri");
            return None;
        };

        let order = match entry.get("order").map(|o| o.parse::<i32>()) {
            None => 0,
            Some(Ok(order)) => order,
            Some(Err(_)) => {
                tracing::warn!(route = %id, "Invalid route order, using 0");
                0
            }
        };

        let mut filters = default_filters.to_vec();
        filters.extend(indexed_values(entry, "filters"));

        Some(Self {
            id,
            uri: uri.clone(),
            order,
            predicates: indexed_values(entry, "predicates"),
            filters,
        })
    }
}

/// Values of `field[0]`, `field[1]`, ... in index order.
fn indexed_values(entry: &ListEntry, field: &str) -> Vec<String> {
    let mut values: Vec<(usize, &String)> = entry
        .iter()
        .filter_map(|(key, value)| {
            let index = key
                .strip_prefix(field)?
                .strip_prefix('[')?
                .strip_suffix(']')?
                .parse::<usize>()
                .ok()?;
            Some((index, value))
        })
        .collect();
    values.sort_by_key(|(index, _)| *index);
    values.into_iter().map(|(_, value)| value.clone()).collect()
}

/// Derive the ordered route list from bound properties.
pub fn derive_routes(bound: &BoundProperties) -> Vec<RouteDefinition> {
    let default_filters: Vec<String> = bound
        .list(DEFAULT_FILTERS_LIST)
        .iter()
        .filter_map(|entry| entry.get("name").or_else(|| entry.get(SCALAR_FIELD)).cloned())
        .collect();

    let mut seen = BTreeSet::new();
    let mut routes = Vec::new();
    for (index, entry) in bound.list(ROUTES_LIST).iter().enumerate() {
        let Some(route) = RouteDefinition::from_entry(entry, &default_filters) else {
            tracing::warn!(index, "Skipping incomplete route entry");
            continue;
        };
        if !seen.insert(route.id.clone()) {
            tracing::warn!(route = %route.id, "Duplicate route id, keeping the first");
            continue;
        }
        routes.push(route);
    }

    routes.sort_by(|a, b| a.order.cmp(&b.order).then_with(|| a.id.cmp(&b.id)));
    routes
}

/// The route table served to traffic.
#[derive(Debug, Default)]
pub struct RouteTable {
    active: ArcSwap<Vec<RouteDefinition>>,
}

impl RouteTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current table. Holding the returned `Arc` pins that version.
    pub fn routes(&self) -> Arc<Vec<RouteDefinition>> {
        self.active.load_full()
    }

    pub fn get(&self, id: &str) -> Option<RouteDefinition> {
        self.active.load().iter().find(|r| r.id == id).cloned()
    }

    /// Re-derive from `bound` and swap. Returns the new route count.
    pub fn refresh(&self, bound: &BoundProperties) -> usize {
        let routes = derive_routes(bound);
        let count = routes.len();
        self.active.store(Arc::new(routes));
        count
    }
}
