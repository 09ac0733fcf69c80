//! HTTP serving of derived endpoints.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum, request ID, timeout, trace)
//!     → routing (current EndpointTable lookup)
//!     → root path: endpoint description
//!     → query path: GraphQL request validation
//! ```

pub mod server;

pub use server::{AppState, HttpServer};
