//! Configuration object model.
//!
//! # Data Flow
//! ```text
//! storage backend (TOML documents)
//!     → Schema / ResolverMap (deserialized, versioned)
//!     → Snapshot (immutable, ordered, whole desired state)
//!     → reconciliation pass
//!     → Status (written back per object)
//! ```
//!
//! # Design Decisions
//! - Objects are identified by unique name, never by in-memory identity
//! - A snapshot supersedes the previous one wholesale; no diffing
//! - `resource_version` carries optimistic concurrency through storage

pub mod metadata;
pub mod resolver_map;
pub mod schema;
pub mod snapshot;

pub use metadata::{validate_name, ObjectKind, ObjectRef, State, Status};
pub use resolver_map::{FieldResolver, ResolverBinding, ResolverMap, TypeResolver, UpstreamBinding};
pub use schema::Schema;
pub use snapshot::Snapshot;
