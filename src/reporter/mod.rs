//! Status reporting subsystem.
//!
//! # Data Flow
//! ```text
//! reconciliation pass
//!     → Vec<ConfigObjectReport> (one per schema, one per faulty resolver map)
//!     → Reporter::write_reports
//!     → Status written onto each object in storage
//! ```
//!
//! # Design Decisions
//! - Unchanged statuses are not rewritten, so storage watches settle
//! - One failing object never stops the rest of the batch

use std::sync::Arc;

use async_trait::async_trait;

use crate::error::{Error, MultiError, Result};
use crate::model::{ObjectKind, ObjectRef, Status};
use crate::observability::metrics;
use crate::storage::ConfigStore;

/// Outcome of one pass for one configuration object.
#[derive(Debug, Clone)]
pub struct ConfigObjectReport {
    pub object: ObjectRef,
    pub error: Option<Error>,
}

impl ConfigObjectReport {
    pub fn new(object: ObjectRef, error: Option<Error>) -> Self {
        Self { object, error }
    }

    pub fn is_accepted(&self) -> bool {
        self.error.is_none()
    }

    pub fn status(&self) -> Status {
        match &self.error {
            None => Status::accepted(),
            Some(err) => Status::rejected(err.to_string()),
        }
    }
}

/// Sink for per-pass reports.
#[async_trait]
pub trait Reporter: Send + Sync {
    async fn write_reports(&self, reports: &[ConfigObjectReport]) -> Result<()>;
}

/// Writes report outcomes back onto the objects' `status`.
pub struct StorageReporter {
    store: Arc<dyn ConfigStore>,
}

impl StorageReporter {
    pub fn new(store: Arc<dyn ConfigStore>) -> Self {
        Self { store }
    }

    async fn write_report(&self, report: &ConfigObjectReport) -> Result<bool> {
        let status = report.status();
        let name = &report.object.name;
        let context = |action: &str| format!("{} status of {}", action, report.object);
        match report.object.kind {
            ObjectKind::Schema => {
                let mut schema = self
                    .store
                    .get_schema(name)
                    .await
                    .map_err(|e| Error::storage(context("reading"), e))?;
                if schema.status == status {
                    return Ok(false);
                }
                schema.status = status;
                self.store
                    .update_schema(schema)
                    .await
                    .map_err(|e| Error::storage(context("writing"), e))?;
            }
            ObjectKind::ResolverMap => {
                let mut resolver_map = self
                    .store
                    .get_resolver_map(name)
                    .await
                    .map_err(|e| Error::storage(context("reading"), e))?;
                if resolver_map.status == status {
                    return Ok(false);
                }
                resolver_map.status = status;
                self.store
                    .update_resolver_map(resolver_map)
                    .await
                    .map_err(|e| Error::storage(context("writing"), e))?;
            }
        }
        Ok(true)
    }
}

#[async_trait]
impl Reporter for StorageReporter {
    async fn write_reports(&self, reports: &[ConfigObjectReport]) -> Result<()> {
        let mut errs = MultiError::new();
        let mut written = 0usize;
        for report in reports {
            metrics::record_report(report.object.kind, report.is_accepted());
            match self.write_report(report).await {
                Ok(true) => written += 1,
                Ok(false) => {}
                Err(e) => errs.push(e),
            }
        }
        tracing::debug!(
            reports = reports.len(),
            written,
            failed = errs.len(),
            "Reports written"
        );
        errs.into_result()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{ResolverMap, Schema, State};
    use crate::storage::MemoryStore;

    fn missing(schema: &str) -> Error {
        Error::ResolverMapNotFound {
            schema: schema.into(),
            resolver_map: "missing".into(),
        }
    }

    #[tokio::test]
    async fn test_writes_status_onto_objects() {
        let store = Arc::new(MemoryStore::new());
        store.put_schema(Schema::new("cart", "type Query { a: Int }"));
        store.put_resolver_map(ResolverMap::new("m"));
        let reporter = StorageReporter::new(store.clone());

        reporter
            .write_reports(&[
                ConfigObjectReport::new(ObjectRef::schema("cart"), Some(missing("cart"))),
                ConfigObjectReport::new(ObjectRef::resolver_map("m"), None),
            ])
            .await
            .unwrap();

        let cart = store.get_schema("cart").await.unwrap();
        assert_eq!(cart.status.state, State::Rejected);
        assert!(cart.status.reason.unwrap().contains("missing"));
        let m = store.get_resolver_map("m").await.unwrap();
        assert_eq!(m.status.state, State::Accepted);
    }

    #[tokio::test]
    async fn test_unchanged_status_is_not_rewritten() {
        let store = Arc::new(MemoryStore::new());
        store.put_schema(Schema::new("cart", "type Query { a: Int }"));
        let reporter = StorageReporter::new(store.clone());
        let reports = [ConfigObjectReport::new(ObjectRef::schema("cart"), None)];

        reporter.write_reports(&reports).await.unwrap();
        let version = store.get_schema("cart").await.unwrap().resource_version;
        reporter.write_reports(&reports).await.unwrap();
        assert_eq!(store.get_schema("cart").await.unwrap().resource_version, version);
    }

    #[tokio::test]
    async fn test_failures_do_not_stop_the_batch() {
        let store = Arc::new(MemoryStore::new());
        store.put_schema(Schema::new("cart", "type Query { a: Int }"));
        let reporter = StorageReporter::new(store.clone());

        let err = reporter
            .write_reports(&[
                ConfigObjectReport::new(ObjectRef::schema("gone"), None),
                ConfigObjectReport::new(ObjectRef::schema("cart"), None),
            ])
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Storage { .. }));
        assert_eq!(
            store.get_schema("cart").await.unwrap().status.state,
            State::Accepted
        );
    }
}
