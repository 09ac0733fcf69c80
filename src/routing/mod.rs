//! Endpoint routing for the serving layer.
//!
//! # Data Flow
//! ```text
//! reconciliation pass
//!     → Vec<Endpoint>
//!     → router.rs (EndpointTable built, swapped in atomically)
//!
//! Incoming request path
//!     → router.rs (lookup in the current table)
//!     → (Endpoint, Root | Query) or no match
//! ```
//!
//! # Design Decisions
//! - Exact path matching; paths derive from schema names
//! - Lock-free reads via `arc-swap`

pub mod router;

pub use router::{EndpointRouter, EndpointTable, RouteKind};
