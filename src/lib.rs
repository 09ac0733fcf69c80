//! GraphQL gateway control plane.
//!
//! Watches schemas and resolver maps in storage, derives one GraphQL endpoint
//! per valid schema, reports per-object status back to storage and keeps the
//! function proxy's route table in step.

pub mod config;
pub mod error;
pub mod graphql;
pub mod http;
pub mod lifecycle;
pub mod model;
pub mod observability;
pub mod operator;
pub mod reconcile;
pub mod reporter;
pub mod routing;
pub mod storage;

pub use config::ControlPlaneConfig;
pub use error::{Error, MultiError, Result};
pub use http::HttpServer;
pub use lifecycle::{ControlPlane, Shutdown};
pub use reconcile::{EventLoop, Reconciler};
