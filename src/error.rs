//! Crate-wide error types.
//!
//! # Taxonomy
//! - Object-attributed: schema parse, missing resolver map, resolver
//!   construction, storage read/write. Surfaced through that object's report.
//! - Pass-level: watcher failures, proxy registration/reconfiguration,
//!   report persistence. Combined into the pass result and logged.
//!
//! Several causes for the same object collapse into one [`MultiError`].

use std::fmt;

use thiserror::Error;

use crate::graphql::parser::ParseError;
use crate::graphql::resolvers::BuildError;
use crate::operator::OperatorError;
use crate::storage::watcher::WatchError;
use crate::storage::StorageError;

/// Errors produced while reconciling configuration.
#[derive(Debug, Clone, Error)]
pub enum Error {
    /// The object cannot be served under its name.
    #[error("invalid name: {0}")]
    InvalidName(String),

    /// The schema's inline source did not parse.
    #[error("failed to parse schema: {0}")]
    SchemaParse(#[from] ParseError),

    /// A schema references a resolver map that is not in the snapshot.
    #[error("resolver map {resolver_map} for schema {schema} not found")]
    ResolverMapNotFound {
        schema: String,
        resolver_map: String,
    },

    /// Resolvers could not be built from a resolver map.
    #[error("failed to generate resolvers from map: {0}")]
    ResolverBuild(#[from] BuildError),

    /// A storage operation failed.
    #[error("{context}: {source}")]
    Storage {
        context: String,
        #[source]
        source: StorageError,
    },

    /// The watch transport reported a failure.
    #[error("config watcher error: {0}")]
    Watcher(#[from] WatchError),

    /// The proxy operator failed to register or reconfigure.
    #[error(transparent)]
    Operator(#[from] OperatorError),

    /// Several independent failures.
    #[error(transparent)]
    Multi(#[from] MultiError),
}

impl Error {
    /// Wrap a storage failure with a description of the attempted operation.
    pub fn storage(context: impl Into<String>, source: StorageError) -> Self {
        Self::Storage {
            context: context.into(),
            source,
        }
    }
}

/// Result type for reconciliation operations.
pub type Result<T> = std::result::Result<T, Error>;

/// An accumulating, multi-cause error value.
///
/// Pushing a [`Error::Multi`] flattens its causes, so nesting never grows
/// beyond one level.
#[derive(Debug, Clone, Default)]
pub struct MultiError {
    errors: Vec<Error>,
}

impl MultiError {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a cause.
    pub fn push(&mut self, err: impl Into<Error>) {
        match err.into() {
            Error::Multi(inner) => self.errors.extend(inner.errors),
            err => self.errors.push(err),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    /// The individual causes, in the order they were pushed.
    pub fn errors(&self) -> &[Error] {
        &self.errors
    }

    /// Collapse into a single error, or `None` when no cause was recorded.
    ///
    /// A single cause is returned as-is rather than wrapped.
    pub fn into_error(mut self) -> Option<Error> {
        match self.errors.len() {
            0 => None,
            1 => self.errors.pop(),
            _ => Some(Error::Multi(self)),
        }
    }

    pub fn into_result(self) -> Result<()> {
        match self.into_error() {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Extend<Error> for MultiError {
    fn extend<I: IntoIterator<Item = Error>>(&mut self, iter: I) {
        for err in iter {
            self.push(err);
        }
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.errors.len() {
            1 => write!(f, "1 error occurred: ")?,
            n => write!(f, "{} errors occurred: ", n)?,
        }
        for (i, err) in self.errors.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", err)?;
        }
        Ok(())
    }
}

impl std::error::Error for MultiError {}
