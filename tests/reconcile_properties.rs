//! Reconciliation behaviour over whole snapshots.

use std::sync::Arc;
use std::thread;

use schemagate::error::Error;
use schemagate::graphql::{Endpoint, ExecutableResolvers, ExecutableSchema, ParsedSchema};
use schemagate::model::{ObjectKind, ResolverBinding, ResolverMap, Schema, Snapshot, UpstreamBinding};
use schemagate::routing::EndpointRouter;
use schemagate::storage::ConfigStore;

mod common;
use common::{Harness, BILLING_SDL, ORDERS_SDL};

fn placeholder_map(name: &str, fields: &[&str]) -> ResolverMap {
    fields
        .iter()
        .fold(ResolverMap::new(name), |map, field| map.with_field("Query", *field, None))
}

#[tokio::test]
async fn test_one_report_per_schema() {
    let h = Harness::new();
    let snapshot = Snapshot::new(
        vec![
            Schema::new("billing", BILLING_SDL).with_resolver_map("billing-map"),
            Schema::new("cart", "type Query { items: [String] }").with_resolver_map("missing"),
            Schema::new("broken", "type Query {").with_resolver_map("billing-map"),
        ],
        vec![placeholder_map("billing-map", &["invoices"])],
    );

    let derivation = h.reconciler.derive_endpoints(&snapshot).await;

    let schema_reports: Vec<_> = derivation
        .reports
        .iter()
        .filter(|r| r.object.kind == ObjectKind::Schema)
        .collect();
    assert_eq!(schema_reports.len(), snapshot.schemas.len());
    let names: Vec<_> = schema_reports.iter().map(|r| r.object.name.as_str()).collect();
    assert_eq!(names, ["billing", "cart", "broken"]);
    assert!(schema_reports[0].is_accepted());
    assert!(matches!(schema_reports[2].error, Some(Error::SchemaParse(_))));
}

#[tokio::test]
async fn test_clean_shared_resolver_map_is_silent() {
    let h = Harness::new();
    let schemas = (0..3)
        .map(|i| Schema::new(format!("svc{}", i), BILLING_SDL).with_resolver_map("shared"))
        .collect();
    let snapshot = Snapshot::new(schemas, vec![placeholder_map("shared", &["invoices"])]);

    h.reconciler.reconcile(&snapshot).await.unwrap();

    let reports = h.reporter.last_batch();
    assert_eq!(reports.len(), 3);
    assert!(reports.iter().all(|r| r.object.kind == ObjectKind::Schema && r.is_accepted()));
    assert_eq!(h.router.load().len(), 3);
    assert_eq!(h.operator.registered(), ["shared", "shared", "shared"]);
    assert_eq!(h.operator.reconfigures(), 1);
}

#[tokio::test]
async fn test_shared_resolver_map_failures_collapse_into_one_report() {
    let h = Harness::new();
    let snapshot = Snapshot::new(
        vec![
            Schema::new("a", "type Query { a: Int }").with_resolver_map("shared"),
            Schema::new("b", "type Query { a: Int b: Int }").with_resolver_map("shared"),
            Schema::new("c", "type Query { a: Int c: Int }").with_resolver_map("shared"),
        ],
        vec![placeholder_map("shared", &["a"])],
    );

    let result = h.reconciler.reconcile(&snapshot).await;
    assert!(result.is_err());

    let reports = h.reporter.last_batch();
    let schema_reports: Vec<_> = reports
        .iter()
        .filter(|r| r.object.kind == ObjectKind::Schema)
        .collect();
    assert_eq!(schema_reports.len(), 3);
    assert!(schema_reports.iter().all(|r| r.is_accepted()));

    let map_reports: Vec<_> = reports
        .iter()
        .filter(|r| r.object.kind == ObjectKind::ResolverMap)
        .collect();
    assert_eq!(map_reports.len(), 1);
    assert_eq!(map_reports[0].object.name, "shared");
    match &map_reports[0].error {
        Some(Error::Multi(errs)) => {
            assert_eq!(errs.len(), 2);
            let message = errs.to_string();
            assert!(message.contains("Query.b"));
            assert!(message.contains("Query.c"));
        }
        other => panic!("expected a combined error, got {:?}", other),
    }

    let table = h.router.load();
    assert_eq!(table.len(), 1);
    assert_eq!(table.endpoints()[0].schema_name, "a");
}

#[tokio::test]
async fn test_skeleton_generated_for_schema_without_resolver_map() {
    let h = Harness::new();
    h.store.inner.put_schema(Schema::new("orders", ORDERS_SDL));
    let snapshot = h.store.snapshot().await.unwrap();

    let derivation = h.reconciler.derive_endpoints(&snapshot).await;
    assert!(derivation.endpoints.is_empty());
    assert_eq!(derivation.reports.len(), 1);
    assert!(derivation.reports[0].is_accepted());

    let stored = h.store.get_schema("orders").await.unwrap();
    assert_eq!(stored.resolver_map, "orders-resolvers");

    let skeleton = h.store.get_resolver_map("orders-resolvers").await.unwrap();
    let fields: Vec<_> = skeleton
        .types
        .iter()
        .flat_map(|(t, r)| r.fields.keys().map(move |f| format!("{}.{}", t, f)))
        .collect();
    assert_eq!(fields, ["Order.id", "Order.total", "Query.order", "Query.orders"]);
    assert!(skeleton
        .types
        .values()
        .flat_map(|t| t.fields.values())
        .all(|f| f.resolver.is_none()));

    // The next observation carries the reference and serves the endpoint.
    let next = h.store.snapshot().await.unwrap();
    h.reconciler.reconcile(&next).await.unwrap();
    assert!(h.router.load().match_path("/orders/query").is_some());
}

#[tokio::test]
async fn test_skeleton_retry_only_reattempts_create() {
    let h = Harness::new();
    h.store.inner.put_schema(Schema::new("orders", ORDERS_SDL));
    let snapshot = h.store.snapshot().await.unwrap();
    h.store.fail_next_create();

    let first = h.reconciler.derive_endpoints(&snapshot).await;
    match &first.reports[0].error {
        Some(Error::Storage { context, .. }) => {
            assert_eq!(context, "writing resolver map orders-resolvers to storage")
        }
        other => panic!("expected storage error, got {:?}", other),
    }
    assert_eq!(h.store.schema_updates(), 1);
    assert_eq!(h.store.resolver_map_creates(), 1);

    // Same stale snapshot again: the reference is already in place.
    let retry = h.reconciler.derive_endpoints(&snapshot).await;
    assert!(retry.reports[0].is_accepted());
    assert_eq!(h.store.schema_updates(), 1);
    assert_eq!(h.store.resolver_map_creates(), 2);
    assert!(h.store.get_resolver_map("orders-resolvers").await.is_ok());
}

#[tokio::test]
async fn test_replayed_bootstrap_snapshot_is_accepted() {
    let h = Harness::new();
    h.store.inner.put_schema(Schema::new("orders", ORDERS_SDL));
    let snapshot = h.store.snapshot().await.unwrap();

    let first = h.reconciler.derive_endpoints(&snapshot).await;
    assert!(first.reports[0].is_accepted());

    // Both writes landed; the stale observation arrives again.
    let replay = h.reconciler.derive_endpoints(&snapshot).await;
    assert!(replay.reports[0].is_accepted(), "{:?}", replay.reports[0].error);
    assert_eq!(h.store.schema_updates(), 1);
    assert_eq!(h.store.resolver_map_creates(), 2);
    assert_eq!(
        h.store.get_resolver_map("orders-resolvers").await.unwrap().resource_version,
        1
    );
}

#[tokio::test]
async fn test_missing_resolver_map_is_attributed_to_schema() {
    let h = Harness::new();
    let snapshot = Snapshot::new(
        vec![Schema::new("cart", "type Query { items: [String] }").with_resolver_map("missing")],
        vec![],
    );

    let derivation = h.reconciler.derive_endpoints(&snapshot).await;

    assert!(derivation.endpoints.is_empty());
    assert_eq!(derivation.reports.len(), 1);
    let report = &derivation.reports[0];
    assert_eq!(report.object.kind, ObjectKind::Schema);
    assert_eq!(report.object.name, "cart");
    assert_eq!(
        report.error.as_ref().map(ToString::to_string).as_deref(),
        Some("resolver map missing for schema cart not found")
    );
}

#[tokio::test]
async fn test_endpoint_paths_and_upstream_registration() {
    let h = Harness::new();
    let map = ResolverMap::new("billing-map").with_field(
        "Query",
        "invoices",
        Some(ResolverBinding::Upstream(UpstreamBinding::new("ledger", "list"))),
    );
    let snapshot = Snapshot::new(
        vec![Schema::new("billing", BILLING_SDL).with_resolver_map("billing-map")],
        vec![map],
    );

    h.reconciler.reconcile(&snapshot).await.unwrap();

    let table = h.router.load();
    let endpoint = &table.endpoints()[0];
    assert_eq!(endpoint.root_path, "/billing");
    assert_eq!(endpoint.query_path, "/billing/query");
    assert_eq!(h.operator.registered(), ["billing-map"]);
}

#[tokio::test]
async fn test_endpoints_that_no_longer_derive_are_dropped() {
    let h = Harness::new();
    let map = placeholder_map("billing-map", &["invoices"]);
    let both = Snapshot::new(
        vec![
            Schema::new("billing", BILLING_SDL).with_resolver_map("billing-map"),
            Schema::new("billing2", BILLING_SDL).with_resolver_map("billing-map"),
        ],
        vec![map.clone()],
    );
    h.reconciler.reconcile(&both).await.unwrap();
    assert_eq!(h.router.load().len(), 2);

    let one = Snapshot::new(
        vec![Schema::new("billing", BILLING_SDL).with_resolver_map("billing-map")],
        vec![map],
    );
    h.reconciler.reconcile(&one).await.unwrap();
    let table = h.router.load();
    assert_eq!(table.len(), 1);
    assert!(table.match_path("/billing2").is_none());
}

#[tokio::test]
async fn test_reconfigure_failure_is_pass_level() {
    let h = Harness::new();
    h.operator
        .fail_reconfigure
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let snapshot = Snapshot::new(
        vec![Schema::new("billing", BILLING_SDL).with_resolver_map("billing-map")],
        vec![placeholder_map("billing-map", &["invoices"])],
    );

    let err = h.reconciler.reconcile(&snapshot).await.unwrap_err();

    assert!(matches!(err, Error::Operator(_)));
    assert!(h.reporter.last_batch().iter().all(|r| r.is_accepted()));
    assert_eq!(h.router.load().len(), 1);
}

#[tokio::test]
async fn test_register_failure_is_pass_level_and_endpoint_still_served() {
    let h = Harness::new();
    h.operator
        .fail_register
        .store(true, std::sync::atomic::Ordering::SeqCst);
    let snapshot = Snapshot::new(
        vec![Schema::new("billing", BILLING_SDL).with_resolver_map("billing-map")],
        vec![placeholder_map("billing-map", &["invoices"])],
    );

    let err = h.reconciler.reconcile(&snapshot).await.unwrap_err();

    assert!(matches!(err, Error::Operator(_)));
    let reports = h.reporter.last_batch();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].object.kind, ObjectKind::Schema);
    assert!(reports[0].is_accepted());
    assert!(h.router.load().match_path("/billing/query").is_some());
    assert_eq!(h.operator.reconfigures(), 1);
}

fn generation(prefix: &str) -> Vec<Endpoint> {
    let schema = Arc::new(ParsedSchema::parse("type Query { ok: Boolean }").unwrap());
    (0..5)
        .map(|i| {
            Endpoint::new(
                format!("{}{}", prefix, i),
                ExecutableSchema::new(schema.clone(), ExecutableResolvers::default()),
            )
        })
        .collect()
}

#[test]
fn test_concurrent_readers_never_see_a_mixed_endpoint_set() {
    let router = Arc::new(EndpointRouter::new());
    router.update_endpoints(generation("old"));

    thread::scope(|s| {
        for _ in 0..4 {
            let router = router.clone();
            s.spawn(move || {
                for _ in 0..2_000 {
                    let table = router.load();
                    assert_eq!(table.len(), 5);
                    let prefix = &table.endpoints()[0].schema_name[..3];
                    assert!(table
                        .endpoints()
                        .iter()
                        .all(|e| e.schema_name.starts_with(prefix)));
                }
            });
        }

        for i in 0..500 {
            let prefix = if i % 2 == 0 { "new" } else { "old" };
            router.update_endpoints(generation(prefix));
        }
    });
}
