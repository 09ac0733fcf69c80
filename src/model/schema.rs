//! Schema configuration objects.

use serde::{Deserialize, Serialize};

use crate::model::metadata::Status;

/// A GraphQL schema submitted by an operator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct Schema {
    /// Unique name; also the endpoint path segment.
    pub name: String,

    /// Name of the resolver map implementing this schema. Empty requests a
    /// generated skeleton.
    #[serde(default)]
    pub resolver_map: String,

    /// SDL source.
    #[serde(default)]
    pub inline_schema: String,

    #[serde(default)]
    pub resource_version: u64,

    #[serde(default)]
    pub status: Status,
}

impl Schema {
    pub fn new(name: impl Into<String>, inline_schema: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            inline_schema: inline_schema.into(),
            ..Default::default()
        }
    }

    pub fn with_resolver_map(mut self, resolver_map: impl Into<String>) -> Self {
        self.resolver_map = resolver_map.into();
        self
    }
}
