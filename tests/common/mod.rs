//! Shared utilities for reconcile integration tests.

#![allow(dead_code)]

use std::collections::{BTreeMap, BTreeSet};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::thread::{self, ThreadId};
use std::time::Duration;

use gateway_refresher::change::{ConfigChange, ConfigChangeEvent};
use gateway_refresher::reconcile::{
    CollaboratorError, ListBinding, ListEntry, ListPattern, RebindSink, Reconciler,
    RouteTableConsumer,
};

pub const PREFIX: &str = "spring.cloud.gateway.";

/// A collaborator call as observed by the recording gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Call {
    SetList { list: String, len: usize },
    Rebind { keys: BTreeSet<String> },
    Refresh,
}

/// Records every call made by the reconciler, with optional failure injection.
#[derive(Default)]
pub struct RecordingGateway {
    lists: Mutex<BTreeMap<String, usize>>,
    calls: Mutex<Vec<(ThreadId, Call)>>,
    pub fail_set_list: AtomicBool,
    pub fail_rebind: AtomicBool,
    pub fail_refresh: AtomicBool,
    /// Sleep inside every call to widen interleaving windows.
    call_delay: Option<Duration>,
}

impl RecordingGateway {
    pub fn with_lists(sizes: &[(&str, usize)]) -> Self {
        let gateway = Self::default();
        {
            let mut lists = gateway.lists.lock().unwrap();
            for (name, size) in sizes {
                lists.insert(name.to_string(), *size);
            }
        }
        gateway
    }

    pub fn with_call_delay(mut self, delay: Duration) -> Self {
        self.call_delay = Some(delay);
        self
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().iter().map(|(_, c)| c.clone()).collect()
    }

    pub fn calls_by_thread(&self) -> Vec<(ThreadId, Call)> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }

    fn record(&self, call: Call) {
        if let Some(delay) = self.call_delay {
            thread::sleep(delay);
        }
        self.calls.lock().unwrap().push((thread::current().id(), call));
    }
}

impl RebindSink for RecordingGateway {
    fn environment_changed(&self, changed_keys: &BTreeSet<String>) -> Result<(), CollaboratorError> {
        self.record(Call::Rebind {
            keys: changed_keys.clone(),
        });
        if self.fail_rebind.load(Ordering::SeqCst) {
            return Err(CollaboratorError::new("binder", "injected rebind failure"));
        }
        Ok(())
    }
}

impl RouteTableConsumer for RecordingGateway {
    fn list_len(&self, list: &str) -> usize {
        self.lists.lock().unwrap().get(list).copied().unwrap_or(0)
    }

    fn set_list(&self, list: &str, entries: Vec<ListEntry>) -> Result<(), CollaboratorError> {
        self.record(Call::SetList {
            list: list.to_string(),
            len: entries.len(),
        });
        if self.fail_set_list.load(Ordering::SeqCst) {
            return Err(CollaboratorError::new("gateway", "injected set_list failure"));
        }
        self.lists.lock().unwrap().insert(list.to_string(), entries.len());
        Ok(())
    }

    fn refresh_routes(&self) -> Result<(), CollaboratorError> {
        self.record(Call::Refresh);
        if self.fail_refresh.load(Ordering::SeqCst) {
            return Err(CollaboratorError::new("gateway", "injected refresh failure"));
        }
        Ok(())
    }
}

pub fn routes_pattern() -> ListPattern {
    ListPattern::for_list(PREFIX, "routes", "id").unwrap()
}

pub fn default_filters_pattern() -> ListPattern {
    ListPattern::for_list(PREFIX, "default-filters", "name").unwrap()
}

/// Reconciler tracking `routes` and `default-filters`, wired to `gateway`.
pub fn reconciler(gateway: Arc<RecordingGateway>) -> Reconciler {
    Reconciler::new(
        vec![
            ListBinding::new("routes", routes_pattern()),
            ListBinding::new("default-filters", default_filters_pattern()),
        ],
        gateway.clone(),
        gateway,
    )
}

pub fn route_key(index: usize, field: &str) -> String {
    format!("{PREFIX}routes[{index}].{field}")
}

pub fn batch(changes: Vec<ConfigChange>) -> ConfigChangeEvent {
    ConfigChangeEvent::new("application", changes)
}
