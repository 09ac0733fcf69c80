//! Servable GraphQL endpoints.

use std::sync::Arc;

use crate::graphql::executable::ExecutableSchema;

/// An executable schema mounted under paths derived from the schema name.
#[derive(Debug, Clone)]
pub struct Endpoint {
    pub schema_name: String,
    pub root_path: String,
    pub query_path: String,
    pub exec_schema: Arc<ExecutableSchema>,
}

impl Endpoint {
    pub fn new(schema_name: impl Into<String>, exec_schema: ExecutableSchema) -> Self {
        let schema_name = schema_name.into();
        Self {
            root_path: root_path(&schema_name),
            query_path: query_path(&schema_name),
            schema_name,
            exec_schema: Arc::new(exec_schema),
        }
    }
}

/// `/<schema>`
pub fn root_path(schema_name: &str) -> String {
    format!("/{}", schema_name)
}

/// `/<schema>/query`
pub fn query_path(schema_name: &str) -> String {
    format!("/{}/query", schema_name)
}
