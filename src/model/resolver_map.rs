//! Resolver map configuration objects.
//!
//! A resolver map binds `Type.field` coordinates of a schema to the
//! implementation that resolves them. A field entry without a binding is a
//! placeholder, as produced by skeleton generation.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::model::metadata::Status;

/// A named set of field-to-implementation bindings.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ResolverMap {
    pub name: String,

    /// Bindings grouped by object type name.
    #[serde(default)]
    pub types: BTreeMap<String, TypeResolver>,

    #[serde(default)]
    pub resource_version: u64,

    #[serde(default)]
    pub status: Status,
}

/// Bindings for the fields of one object type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TypeResolver {
    #[serde(default)]
    pub fields: BTreeMap<String, FieldResolver>,
}

/// The entry for one field.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct FieldResolver {
    /// `None` marks a placeholder that resolves to null.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolver: Option<ResolverBinding>,
}

/// How a field is resolved.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolverBinding {
    /// Call an upstream function through the proxy.
    Upstream(UpstreamBinding),
    /// Render an inline template against the parent value and arguments.
    Template { inline: String },
}

/// A call to a function exposed by a proxy upstream.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct UpstreamBinding {
    pub upstream: String,
    pub function: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_template: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_template: Option<String>,
}

impl ResolverMap {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Set the entry for `type_name.field_name`, creating the type if needed.
    pub fn with_field(
        mut self,
        type_name: impl Into<String>,
        field_name: impl Into<String>,
        resolver: Option<ResolverBinding>,
    ) -> Self {
        self.types
            .entry(type_name.into())
            .or_default()
            .fields
            .insert(field_name.into(), FieldResolver { resolver });
        self
    }

    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldResolver> {
        self.types.get(type_name)?.fields.get(field_name)
    }

    /// All upstream bindings in the map, in type/field order.
    pub fn upstream_bindings(&self) -> impl Iterator<Item = &UpstreamBinding> {
        self.types
            .values()
            .flat_map(|t| t.fields.values())
            .filter_map(|f| match &f.resolver {
                Some(ResolverBinding::Upstream(binding)) => Some(binding),
                _ => None,
            })
    }
}

impl UpstreamBinding {
    pub fn new(upstream: impl Into<String>, function: impl Into<String>) -> Self {
        Self {
            upstream: upstream.into(),
            function: function.into(),
            request_template: None,
            response_template: None,
        }
    }
}
