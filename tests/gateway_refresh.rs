//! Source file → reconcile → route table, with the real gateway collaborators.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use arc_swap::ArcSwap;
use gateway_refresher::config::RefresherConfig;
use gateway_refresher::reconcile::{ReconciliationOutcome, Reconciler, RouteTableConsumer};
use gateway_refresher::routing::{Gateway, GatewayProperties, PropertiesBinder, RouteTable};
use gateway_refresher::source::{load_snapshot, SharedSnapshot, SourceUpdate, SourceWatcher};
use tokio::sync::mpsc::UnboundedReceiver;

mod common;
use common::PREFIX;

const THREE_ROUTES: &str = r#"
[spring.cloud.gateway]
enabled = true

[[spring.cloud.gateway.routes]]
id = "users"
uri = "http://users:8080"
predicates = ["Path=/users/**"]

[[spring.cloud.gateway.routes]]
id = "orders"
uri = "http://orders:8080"
order = -1

[[spring.cloud.gateway.routes]]
id = "billing"
uri = "http://billing:8080"

[[spring.cloud.gateway.default-filters]]
name = "DedupeResponseHeader"
"#;

struct Harness {
    gateway: Arc<Gateway>,
    reconciler: Reconciler,
    current: SharedSnapshot,
    watcher: SourceWatcher,
    updates: UnboundedReceiver<SourceUpdate>,
}

impl Harness {
    /// Take the next queued update and reconcile it the way the main loop does.
    async fn reconcile_next(&mut self) -> (SourceUpdate, ReconciliationOutcome) {
        let update = self.updates.recv().await.unwrap();
        update.publish(&self.current);
        let outcome = self.reconciler.on_configuration_changed(&update.batch).unwrap();
        (update, outcome)
    }
}

fn harness(path: &Path) -> Harness {
    let config = RefresherConfig::default();
    let initial = load_snapshot(path).unwrap();

    let properties = Arc::new(GatewayProperties::new());
    properties.bind(&initial, PREFIX);
    let gateway = Arc::new(Gateway::new(properties.clone(), Arc::new(RouteTable::new())));
    gateway.refresh_routes().unwrap();

    let initial = Arc::new(initial);
    let current: SharedSnapshot = Arc::new(ArcSwap::new(initial.clone()));
    let binder = Arc::new(PropertiesBinder::new(current.clone(), properties, PREFIX));
    let reconciler = Reconciler::new(config.list_bindings().unwrap(), binder, gateway.clone());
    let (watcher, updates) = SourceWatcher::new(path, PREFIX, initial);

    Harness {
        gateway,
        reconciler,
        current,
        watcher,
        updates,
    }
}

fn route_ids(gateway: &Gateway) -> Vec<String> {
    gateway.table().routes().iter().map(|r| r.id.clone()).collect()
}

#[tokio::test]
async fn test_initial_table_is_ordered() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.toml");
    fs::write(&path, THREE_ROUTES).unwrap();

    let h = harness(&path);
    assert_eq!(route_ids(&h.gateway), vec!["orders", "billing", "users"]);
    let users = h.gateway.table().get("users").unwrap();
    assert_eq!(users.filters, vec!["DedupeResponseHeader"]);
    assert_eq!(users.predicates, vec!["Path=/users/**"]);
}

#[tokio::test]
async fn test_removing_all_routes_empties_the_table() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.toml");
    fs::write(&path, THREE_ROUTES).unwrap();
    let mut h = harness(&path);

    fs::write(
        &path,
        "[spring.cloud.gateway]\nenabled = true\n\n[[spring.cloud.gateway.default-filters]]\nname = \"DedupeResponseHeader\"\n",
    )
    .unwrap();
    assert!(h.watcher.reload().unwrap());
    let (_, outcome) = h.reconcile_next().await;

    assert!(outcome.cleared_lists.contains("routes"));
    assert!(route_ids(&h.gateway).is_empty());
    assert_eq!(h.gateway.properties().list_len("default-filters"), 1);
}

#[tokio::test]
async fn test_partial_replacement_is_merged_not_cleared() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.toml");
    fs::write(&path, THREE_ROUTES).unwrap();
    let mut h = harness(&path);

    // Index 0 is rewritten in place, so only two of three anchors are
    // deleted. The binder merges and the old tail entries survive.
    fs::write(
        &path,
        r#"
[[spring.cloud.gateway.routes]]
id = "catalog"
uri = "http://catalog:8080"

[[spring.cloud.gateway.default-filters]]
name = "DedupeResponseHeader"
"#,
    )
    .unwrap();
    assert!(h.watcher.reload().unwrap());
    let (_, outcome) = h.reconcile_next().await;

    assert!(outcome.cleared_lists.is_empty());
    let ids = route_ids(&h.gateway);
    assert_eq!(ids, vec!["orders", "billing", "catalog"]);
    assert_eq!(h.gateway.properties().list_len("routes"), 3);
}

#[tokio::test]
async fn test_editing_a_route_updates_in_place() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.toml");
    fs::write(&path, THREE_ROUTES).unwrap();
    let mut h = harness(&path);

    fs::write(&path, THREE_ROUTES.replace("http://users:8080", "http://users-v2:8080")).unwrap();
    assert!(h.watcher.reload().unwrap());
    let (update, _) = h.reconcile_next().await;
    assert_eq!(update.batch.len(), 1);

    assert_eq!(route_ids(&h.gateway).len(), 3);
    assert_eq!(
        h.gateway.table().get("users").map(|r| r.uri),
        Some("http://users-v2:8080".to_string())
    );
}

#[tokio::test]
async fn test_queued_updates_rebind_from_their_own_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("gateway.toml");
    fs::write(&path, THREE_ROUTES).unwrap();
    let mut h = harness(&path);

    // Both reloads land before either batch is reconciled.
    fs::write(
        &path,
        r#"
[[spring.cloud.gateway.routes]]
id = "users"
uri = "http://users:8080"

[[spring.cloud.gateway.routes]]
id = "orders"
uri = "http://orders:8080"

[[spring.cloud.gateway.routes]]
id = "billing"
uri = "http://billing:8080"

[[spring.cloud.gateway.routes]]
id = "search"
uri = "http://search:8080"

[[spring.cloud.gateway.default-filters]]
name = "DedupeResponseHeader"
"#,
    )
    .unwrap();
    assert!(h.watcher.reload().unwrap());
    fs::write(
        &path,
        "[[spring.cloud.gateway.default-filters]]\nname = \"DedupeResponseHeader\"\n",
    )
    .unwrap();
    assert!(h.watcher.reload().unwrap());

    let (_, first) = h.reconcile_next().await;
    assert!(first.cleared_lists.is_empty());
    assert_eq!(h.gateway.properties().list_len("routes"), 4);
    assert!(h.gateway.table().get("search").is_some());

    let (second_update, second) = h.reconcile_next().await;
    assert_eq!(
        second_update.batch.changed_keys().filter(|k| k.ends_with("].id")).count(),
        4
    );
    assert!(second.cleared_lists.contains("routes"));
    assert!(!second.cleared_lists.contains("default-filters"));
    assert!(route_ids(&h.gateway).is_empty());
    assert_eq!(h.gateway.properties().list_len("default-filters"), 1);
}
