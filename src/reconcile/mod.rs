//! Reconciliation subsystem.
//!
//! # Data Flow
//! ```text
//! Snapshot
//!     → derive.rs (endpoints + per-object reports; skeleton generation)
//!     → correlation.rs (resolver map failures folded into one report each)
//!     → pass.rs (publish endpoints, persist reports, reconfigure proxy)
//!
//! event_loop.rs multiplexes:
//!     snapshots | watcher errors | internal errors | shutdown
//! ```
//!
//! # Design Decisions
//! - Passes are serialized by the event loop; no locking inside a pass
//! - No single object's failure stops the others
//! - Every pass ends in exactly one combined result

pub mod correlation;
pub mod derive;
pub mod event_loop;
pub mod pass;

use std::sync::Arc;

use crate::graphql::{GraphqlParser, ResolverFactory, SchemaParser};
use crate::operator::ProxyOperator;
use crate::reporter::Reporter;
use crate::routing::EndpointRouter;
use crate::storage::ConfigStore;

pub use correlation::ResolverMapErrors;
pub use derive::Derivation;
pub use event_loop::{ErrorOrigin, EventLoop, LoopError};

/// Turns configuration snapshots into served endpoints.
pub struct Reconciler {
    store: Arc<dyn ConfigStore>,
    parser: Arc<dyn SchemaParser>,
    resolvers: Arc<dyn ResolverFactory>,
    operator: Arc<dyn ProxyOperator>,
    reporter: Arc<dyn Reporter>,
    router: Arc<EndpointRouter>,
}

impl Reconciler {
    pub fn new(
        store: Arc<dyn ConfigStore>,
        resolvers: Arc<dyn ResolverFactory>,
        operator: Arc<dyn ProxyOperator>,
        reporter: Arc<dyn Reporter>,
        router: Arc<EndpointRouter>,
    ) -> Self {
        Self {
            store,
            parser: Arc::new(GraphqlParser),
            resolvers,
            operator,
            reporter,
            router,
        }
    }

    /// Replace the schema parser.
    pub fn with_parser(mut self, parser: Arc<dyn SchemaParser>) -> Self {
        self.parser = parser;
        self
    }

    /// The serving layer this reconciler publishes to.
    pub fn router(&self) -> &Arc<EndpointRouter> {
        &self.router
    }
}
