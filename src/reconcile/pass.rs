//! A single reconciliation pass.

use std::time::Instant;

use crate::error::{MultiError, Result};
use crate::model::Snapshot;
use crate::observability::metrics;
use crate::reconcile::derive::Derivation;
use crate::reconcile::Reconciler;
use crate::reporter::ConfigObjectReport;

impl Reconciler {
    /// Run one full pass over a snapshot.
    ///
    /// Every step runs regardless of earlier failures. The returned error
    /// combines object failures, report persistence and proxy reconfiguration.
    pub async fn reconcile(&self, snapshot: &Snapshot) -> Result<()> {
        let started = Instant::now();
        let Derivation {
            endpoints,
            reports,
            errors,
        } = self.derive_endpoints(snapshot).await;

        let endpoint_count = endpoints.len();
        self.router.update_endpoints(endpoints);
        metrics::record_endpoints(endpoint_count);

        let mut errs = config_errors(&reports);
        errs.extend(errors);
        if let Err(e) = self.reporter.write_reports(&reports).await {
            errs.push(e);
        }
        if let Err(e) = self.operator.reconfigure().await {
            errs.push(e);
        }

        let elapsed = started.elapsed();
        metrics::record_pass(elapsed, errs.is_empty());
        tracing::info!(
            schemas = snapshot.schemas.len(),
            resolver_maps = snapshot.resolver_maps.len(),
            endpoints = endpoint_count,
            reports = reports.len(),
            errors = errs.len(),
            elapsed_ms = elapsed.as_millis() as u64,
            "Reconciliation pass complete"
        );
        errs.into_result()
    }
}

/// Combine the failures carried by reports.
pub fn config_errors(reports: &[ConfigObjectReport]) -> MultiError {
    let mut errs = MultiError::new();
    errs.extend(reports.iter().filter_map(|r| r.error.clone()));
    errs
}
