//! Executable schemas: a parsed schema paired with built resolvers.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use crate::graphql::parser::ParsedSchema;
use crate::graphql::resolvers::Resolver;

/// A `Type.field` coordinate.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FieldCoordinate {
    pub type_name: String,
    pub field_name: String,
}

impl FieldCoordinate {
    pub fn new(type_name: impl Into<String>, field_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            field_name: field_name.into(),
        }
    }
}

impl fmt::Display for FieldCoordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.type_name, self.field_name)
    }
}

/// One resolver per object-type field.
#[derive(Debug, Clone, Default)]
pub struct ExecutableResolvers {
    resolvers: BTreeMap<FieldCoordinate, Resolver>,
}

impl ExecutableResolvers {
    pub fn insert(&mut self, coordinate: FieldCoordinate, resolver: Resolver) {
        self.resolvers.insert(coordinate, resolver);
    }

    pub fn get(&self, type_name: &str, field_name: &str) -> Option<&Resolver> {
        self.resolvers
            .get(&FieldCoordinate::new(type_name, field_name))
    }

    pub fn len(&self) -> usize {
        self.resolvers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.resolvers.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldCoordinate, &Resolver)> {
        self.resolvers.iter()
    }
}

/// A schema ready to serve.
#[derive(Debug, Clone)]
pub struct ExecutableSchema {
    schema: Arc<ParsedSchema>,
    resolvers: ExecutableResolvers,
}

impl ExecutableSchema {
    pub fn new(schema: Arc<ParsedSchema>, resolvers: ExecutableResolvers) -> Self {
        Self { schema, resolvers }
    }

    pub fn schema(&self) -> &ParsedSchema {
        &self.schema
    }

    pub fn resolvers(&self) -> &ExecutableResolvers {
        &self.resolvers
    }
}
