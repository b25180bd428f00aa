//! Route table consumer backed by bound gateway properties.

use std::sync::Arc;

use crate::observability::metrics;
use crate::reconcile::{CollaboratorError, ListEntry, RouteTableConsumer};
use crate::routing::properties::GatewayProperties;
use crate::routing::table::RouteTable;

/// Owns the bound properties and the active route table.
#[derive(Debug, Clone)]
pub struct Gateway {
    properties: Arc<GatewayProperties>,
    table: Arc<RouteTable>,
}

impl Gateway {
    pub fn new(properties: Arc<GatewayProperties>, table: Arc<RouteTable>) -> Self {
        Self { properties, table }
    }

    pub fn properties(&self) -> &Arc<GatewayProperties> {
        &self.properties
    }

    pub fn table(&self) -> &Arc<RouteTable> {
        &self.table
    }
}

impl RouteTableConsumer for Gateway {
    fn list_len(&self, list: &str) -> usize {
        self.properties.list_len(list)
    }

    fn set_list(&self, list: &str, entries: Vec<ListEntry>) -> Result<(), CollaboratorError> {
        self.properties.set_list(list, entries);
        Ok(())
    }

    fn refresh_routes(&self) -> Result<(), CollaboratorError> {
        let count = self.table.refresh(&self.properties.snapshot());
        metrics::record_active_routes(count);
        tracing::info!(routes = count, "Gateway route definitions refreshed");
        Ok(())
    }
}
