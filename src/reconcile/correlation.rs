//! Folding resolver map failures across referencing schemas.

use indexmap::IndexMap;

use crate::error::{Error, MultiError};
use crate::model::ObjectRef;
use crate::reporter::ConfigObjectReport;

/// Errors accumulated per resolver map during one pass.
///
/// Keyed by resolver map name in first-failure order. Built fresh for each
/// pass and consumed when reports are emitted.
#[derive(Debug, Default)]
pub struct ResolverMapErrors {
    errors: IndexMap<String, MultiError>,
}

impl ResolverMapErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, resolver_map: &str, err: Error) {
        self.errors
            .entry(resolver_map.to_string())
            .or_default()
            .push(err);
    }

    /// Number of resolver maps with at least one failure.
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// One report per faulty resolver map.
    pub fn into_reports(self) -> Vec<ConfigObjectReport> {
        self.errors
            .into_iter()
            .filter_map(|(name, errs)| {
                errs.into_error()
                    .map(|err| ConfigObjectReport::new(ObjectRef::resolver_map(name), Some(err)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::graphql::{BuildError, FieldCoordinate};

    fn missing(field: &str) -> Error {
        BuildError::MissingResolver(FieldCoordinate::new("Query", field)).into()
    }

    #[test]
    fn test_collapses_errors_per_resolver_map() {
        let mut errs = ResolverMapErrors::new();
        errs.record("shared", missing("a"));
        errs.record("other", missing("x"));
        errs.record("shared", missing("b"));

        let reports = errs.into_reports();
        assert_eq!(reports.len(), 2);
        assert_eq!(reports[0].object, ObjectRef::resolver_map("shared"));
        match reports[0].error.as_ref().unwrap() {
            Error::Multi(multi) => assert_eq!(multi.len(), 2),
            other => panic!("expected combined error, got {:?}", other),
        }
        assert!(matches!(reports[1].error, Some(Error::ResolverBuild(_))));
    }

    #[test]
    fn test_no_failures_no_reports() {
        assert!(ResolverMapErrors::new().into_reports().is_empty());
    }
}
