//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, addresses parse)
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ControlPlaneConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ControlPlaneConfig;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field}: invalid socket address {value:?}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("{field} must be greater than zero")]
    Zero { field: &'static str },

    #[error("{field} must not be empty")]
    Empty { field: &'static str },
}

pub fn validate_config(config: &ControlPlaneConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    check_address(&mut errors, "server.bind_address", &config.server.bind_address);
    if config.observability.metrics_enabled {
        check_address(
            &mut errors,
            "observability.metrics_address",
            &config.observability.metrics_address,
        );
    }

    let counts = [
        ("server.request_timeout_secs", config.server.request_timeout_secs as usize),
        ("storage.poll_interval_secs", config.storage.poll_interval_secs as usize),
        ("reconcile.error_queue_capacity", config.reconcile.error_queue_capacity),
    ];
    for (field, value) in counts {
        if value == 0 {
            errors.push(ValidationError::Zero { field });
        }
    }

    if config.proxy.address.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "proxy.address" });
    }
    if config.proxy.virtual_service.trim().is_empty() {
        errors.push(ValidationError::Empty { field: "proxy.virtual_service" });
    }
    if config.storage.root.as_os_str().is_empty() {
        errors.push(ValidationError::Empty { field: "storage.root" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_address(errors: &mut Vec<ValidationError>, field: &'static str, value: &str) {
    if value.parse::<SocketAddr>().is_err() {
        errors.push(ValidationError::InvalidAddress {
            field,
            value: value.to_string(),
        });
    }
}
