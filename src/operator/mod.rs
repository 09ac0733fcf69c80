//! Proxy operator subsystem.
//!
//! # Data Flow
//! ```text
//! reconciliation pass
//!     → register(resolver map)   once per endpoint built
//!     → reconfigure()            once per pass
//!     → route_table.rs (routes for every upstream function in use)
//!     → proxy picks up the new route table
//! ```
//!
//! # Design Decisions
//! - Registration is per pass; routes for maps not registered again are dropped
//! - Failures are pass-level, never attributed to a configuration object

pub mod route_table;

use async_trait::async_trait;
use thiserror::Error;

use crate::model::ResolverMap;

pub use route_table::{RouteEntry, RouteTable, RouteTableOperator};

#[derive(Debug, Clone, Error)]
pub enum OperatorError {
    #[error("cannot route resolver map {resolver_map}: {reason}")]
    InvalidRoute { resolver_map: String, reason: String },

    #[error("writing route table {path}: {reason}")]
    Write { path: String, reason: String },

    #[error("serializing route table: {0}")]
    Serialize(String),
}

/// Prepares the proxy to route resolver traffic to upstreams.
#[async_trait]
pub trait ProxyOperator: Send + Sync {
    /// Record that a resolver map backs a live endpoint this pass.
    fn register(&self, resolver_map: &ResolverMap) -> Result<(), OperatorError>;

    /// Push the routes registered since the last call to the proxy.
    async fn reconfigure(&self) -> Result<(), OperatorError>;
}
