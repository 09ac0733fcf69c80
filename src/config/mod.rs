//! Configuration management subsystem.
//!
//! # Data Flow
//! ```text
//! config file (TOML)
//!     → loader.rs (parse & deserialize)
//!     → validation.rs (semantic checks)
//!     → ControlPlaneConfig (validated, immutable)
//!     → command-line overrides applied by main
//! ```
//!
//! # Design Decisions
//! - All fields have defaults to allow minimal configs
//! - Validation separates syntactic (serde) from semantic checks
//! - The control plane's own config is static; the objects it reconciles
//!   are watched through storage instead

pub mod loader;
pub mod schema;
pub mod validation;

pub use loader::{load_config, ConfigError};
pub use schema::{
    ControlPlaneConfig, ObservabilityConfig, ProxyConfig, ReconcileConfig, ServerConfig,
    StorageConfig,
};
pub use validation::{validate_config, ValidationError};
