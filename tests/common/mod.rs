//! Shared fixtures for integration tests.
#![allow(dead_code)]

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;

use schemagate::error::Result;
use schemagate::graphql::ProxyResolverFactory;
use schemagate::model::{ResolverMap, Schema};
use schemagate::operator::{OperatorError, ProxyOperator};
use schemagate::reconcile::Reconciler;
use schemagate::reporter::{ConfigObjectReport, Reporter};
use schemagate::routing::EndpointRouter;
use schemagate::storage::{ConfigStore, MemoryStore, StorageError, StorageResult};

pub const ORDERS_SDL: &str = r#"
    type Query {
        orders: [Order]
        order(id: ID!): Order
    }

    type Order {
        id: ID!
        total: Float
    }
"#;

pub const BILLING_SDL: &str = "type Query { invoices: [String] }";

/// A [`MemoryStore`] that can be told to fail and counts writes.
#[derive(Default)]
pub struct FlakyStore {
    pub inner: MemoryStore,
    fail_next_create: AtomicBool,
    pub schema_updates: AtomicUsize,
    pub resolver_map_creates: AtomicUsize,
}

impl FlakyStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fail_next_create(&self) {
        self.fail_next_create.store(true, Ordering::SeqCst);
    }

    pub fn schema_updates(&self) -> usize {
        self.schema_updates.load(Ordering::SeqCst)
    }

    pub fn resolver_map_creates(&self) -> usize {
        self.resolver_map_creates.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ConfigStore for FlakyStore {
    async fn get_schema(&self, name: &str) -> StorageResult<Schema> {
        self.inner.get_schema(name).await
    }

    async fn update_schema(&self, schema: Schema) -> StorageResult<Schema> {
        self.schema_updates.fetch_add(1, Ordering::SeqCst);
        self.inner.update_schema(schema).await
    }

    async fn list_schemas(&self) -> StorageResult<Vec<Schema>> {
        self.inner.list_schemas().await
    }

    async fn get_resolver_map(&self, name: &str) -> StorageResult<ResolverMap> {
        self.inner.get_resolver_map(name).await
    }

    async fn create_resolver_map(&self, resolver_map: ResolverMap) -> StorageResult<ResolverMap> {
        self.resolver_map_creates.fetch_add(1, Ordering::SeqCst);
        if self.fail_next_create.swap(false, Ordering::SeqCst) {
            return Err(StorageError::Io("injected create failure".into()));
        }
        self.inner.create_resolver_map(resolver_map).await
    }

    async fn update_resolver_map(&self, resolver_map: ResolverMap) -> StorageResult<ResolverMap> {
        self.inner.update_resolver_map(resolver_map).await
    }

    async fn list_resolver_maps(&self) -> StorageResult<Vec<ResolverMap>> {
        self.inner.list_resolver_maps().await
    }
}

/// Records registrations and reconfigurations.
#[derive(Default)]
pub struct RecordingOperator {
    pub registered: Mutex<Vec<String>>,
    pub reconfigures: AtomicUsize,
    pub fail_register: AtomicBool,
    pub fail_reconfigure: AtomicBool,
}

impl RecordingOperator {
    pub fn registered(&self) -> Vec<String> {
        self.registered.lock().unwrap().clone()
    }

    pub fn reconfigures(&self) -> usize {
        self.reconfigures.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProxyOperator for RecordingOperator {
    fn register(&self, resolver_map: &ResolverMap) -> std::result::Result<(), OperatorError> {
        if self.fail_register.load(Ordering::SeqCst) {
            return Err(OperatorError::InvalidRoute {
                resolver_map: resolver_map.name.clone(),
                reason: "injected".into(),
            });
        }
        self.registered
            .lock()
            .unwrap()
            .push(resolver_map.name.clone());
        Ok(())
    }

    async fn reconfigure(&self) -> std::result::Result<(), OperatorError> {
        self.reconfigures.fetch_add(1, Ordering::SeqCst);
        if self.fail_reconfigure.load(Ordering::SeqCst) {
            return Err(OperatorError::Write {
                path: "routes.toml".into(),
                reason: "injected".into(),
            });
        }
        Ok(())
    }
}

/// Keeps every batch of reports it is given.
#[derive(Default)]
pub struct RecordingReporter {
    pub batches: Mutex<Vec<Vec<ConfigObjectReport>>>,
}

impl RecordingReporter {
    pub fn last_batch(&self) -> Vec<ConfigObjectReport> {
        self.batches.lock().unwrap().last().cloned().unwrap_or_default()
    }

    pub fn batch_count(&self) -> usize {
        self.batches.lock().unwrap().len()
    }
}

#[async_trait]
impl Reporter for RecordingReporter {
    async fn write_reports(&self, reports: &[ConfigObjectReport]) -> Result<()> {
        self.batches.lock().unwrap().push(reports.to_vec());
        Ok(())
    }
}

/// Everything a reconciliation test needs to inspect.
pub struct Harness {
    pub store: Arc<FlakyStore>,
    pub operator: Arc<RecordingOperator>,
    pub reporter: Arc<RecordingReporter>,
    pub router: Arc<EndpointRouter>,
    pub reconciler: Arc<Reconciler>,
}

impl Harness {
    pub fn new() -> Self {
        let store = Arc::new(FlakyStore::new());
        let operator = Arc::new(RecordingOperator::default());
        let reporter = Arc::new(RecordingReporter::default());
        let router = Arc::new(EndpointRouter::new());
        let reconciler = Arc::new(Reconciler::new(
            store.clone(),
            Arc::new(ProxyResolverFactory::new("127.0.0.1:8081").unwrap()),
            operator.clone(),
            reporter.clone(),
            router.clone(),
        ));
        Self {
            store,
            operator,
            reporter,
            router,
            reconciler,
        }
    }
}
