//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! event loop, reconciliation passes, reporters
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters, gauges, histograms)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Prometheus scrape endpoint
//! ```
//!
//! # Design Decisions
//! - `RUST_LOG` wins over the configured level
//! - Metric calls are no-ops until a recorder is installed, so tests and
//!   library users pay nothing

pub mod logging;
pub mod metrics;
