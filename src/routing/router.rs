//! Endpoint lookup for the serving layer.
//!
//! # Responsibilities
//! - Hold the endpoint set produced by the latest reconciliation pass
//! - Resolve a request path to an endpoint and its route kind
//!
//! # Design Decisions
//! - The table is immutable; a pass builds a new one and swaps it in
//! - Readers load an `Arc` and never observe a partially replaced set

use std::collections::HashMap;
use std::sync::Arc;

use arc_swap::ArcSwap;

use crate::graphql::Endpoint;

/// Which of an endpoint's paths matched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteKind {
    Root,
    Query,
}

/// One generation of served endpoints.
#[derive(Debug, Default)]
pub struct EndpointTable {
    endpoints: Vec<Arc<Endpoint>>,
    by_path: HashMap<String, (usize, RouteKind)>,
}

impl EndpointTable {
    /// Build a table. Later endpoints with the same path replace earlier ones.
    pub fn new(endpoints: Vec<Endpoint>) -> Self {
        let mut table = Self::default();
        for endpoint in endpoints {
            let index = table.endpoints.len();
            table
                .by_path
                .insert(endpoint.root_path.clone(), (index, RouteKind::Root));
            table
                .by_path
                .insert(endpoint.query_path.clone(), (index, RouteKind::Query));
            table.endpoints.push(Arc::new(endpoint));
        }
        table
    }

    pub fn match_path(&self, path: &str) -> Option<(&Arc<Endpoint>, RouteKind)> {
        let trimmed = if path.len() > 1 {
            path.trim_end_matches('/')
        } else {
            path
        };
        let (index, kind) = self.by_path.get(trimmed)?;
        self.endpoints.get(*index).map(|e| (e, *kind))
    }

    /// Endpoints in derivation order.
    pub fn endpoints(&self) -> &[Arc<Endpoint>] {
        &self.endpoints
    }

    pub fn len(&self) -> usize {
        self.endpoints.len()
    }

    pub fn is_empty(&self) -> bool {
        self.endpoints.is_empty()
    }
}

/// Shared handle to the current endpoint table.
#[derive(Debug, Default)]
pub struct EndpointRouter {
    table: ArcSwap<EndpointTable>,
}

impl EndpointRouter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole endpoint set.
    pub fn update_endpoints(&self, endpoints: Vec<Endpoint>) {
        let table = EndpointTable::new(endpoints);
        tracing::info!(endpoints = table.len(), "Endpoint set replaced");
        self.table.store(Arc::new(table));
    }

    /// The current table. Holding it pins one consistent generation.
    pub fn load(&self) -> Arc<EndpointTable> {
        self.table.load_full()
    }
}
