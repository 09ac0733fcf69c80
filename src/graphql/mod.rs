//! GraphQL schema handling.
//!
//! # Data Flow
//! ```text
//! Schema.inline_schema
//!     → parser.rs (SDL → ParsedSchema)
//!     → resolvers.rs (ParsedSchema + ResolverMap → ExecutableResolvers)
//!     → executable.rs (ExecutableSchema)
//!     → endpoint.rs (Endpoint with derived paths)
//!
//! Schema without a resolver map:
//!     → parser.rs
//!     → skeleton.rs (placeholder ResolverMap covering every field)
//! ```
//!
//! # Design Decisions
//! - Only object types carry resolvers; scalars, enums, inputs, unions and
//!   interfaces are tracked for type checking only
//! - Parsing and resolver construction are pure; no I/O

pub mod endpoint;
pub mod executable;
pub mod parser;
pub mod resolvers;
pub mod skeleton;
pub mod template;

pub use endpoint::Endpoint;
pub use executable::{ExecutableResolvers, ExecutableSchema, FieldCoordinate};
pub use parser::{GraphqlParser, ParseError, ParsedSchema, SchemaParser};
pub use resolvers::{BuildError, ProxyResolverFactory, Resolver, ResolverFactory};
pub use skeleton::{generate_skeleton, resolver_map_name};
