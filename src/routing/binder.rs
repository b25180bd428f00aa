//! Rebind of gateway properties from the latest source snapshot.

use std::collections::BTreeSet;
use std::sync::Arc;

use crate::reconcile::{CollaboratorError, RebindSink};
use crate::routing::properties::GatewayProperties;
use crate::source::SharedSnapshot;

/// Re-resolves [`GatewayProperties`] when keys under its prefix change.
pub struct PropertiesBinder {
    source: SharedSnapshot,
    properties: Arc<GatewayProperties>,
    key_prefix: String,
}

impl PropertiesBinder {
    pub fn new(
        source: SharedSnapshot,
        properties: Arc<GatewayProperties>,
        key_prefix: impl Into<String>,
    ) -> Self {
        Self {
            source,
            properties,
            key_prefix: key_prefix.into(),
        }
    }
}

impl RebindSink for PropertiesBinder {
    fn environment_changed(&self, changed_keys: &BTreeSet<String>) -> Result<(), CollaboratorError> {
        if !changed_keys.iter().any(|key| key.starts_with(&self.key_prefix)) {
            tracing::debug!(prefix = %self.key_prefix, "No bound keys changed, skipping rebind");
            return Ok(());
        }

        let snapshot = self.source.load();
        self.properties.bind(&snapshot, &self.key_prefix);
        tracing::debug!(
            prefix = %self.key_prefix,
            changed = changed_keys.len(),
            "Gateway properties rebound"
        );
        Ok(())
    }
}
