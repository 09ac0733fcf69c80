//! Skeleton resolver map generation.

use crate::graphql::parser::ParsedSchema;
use crate::model::{FieldResolver, ResolverMap, TypeResolver};

/// Name of the resolver map generated for a schema.
pub fn resolver_map_name(schema_name: &str) -> String {
    format!("{}-resolvers", schema_name)
}

/// Build a resolver map with a placeholder entry for every object-type field.
pub fn generate_skeleton(name: &str, schema: &ParsedSchema) -> ResolverMap {
    let mut resolver_map = ResolverMap::new(name);
    for object in schema.object_types() {
        let fields = object
            .fields
            .iter()
            .map(|f| (f.name.clone(), FieldResolver::default()))
            .collect();
        resolver_map
            .types
            .insert(object.name.clone(), TypeResolver { fields });
    }
    resolver_map
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_naming_is_suffixed() {
        assert_eq!(resolver_map_name("orders"), "orders-resolvers");
    }

    #[test]
    fn test_skeleton_covers_every_field() {
        let schema = ParsedSchema::parse(
            "type Query { orders: [Order] } type Order { id: ID total: Float } scalar Money",
        )
        .unwrap();
        let skeleton = generate_skeleton("orders-resolvers", &schema);

        assert_eq!(skeleton.name, "orders-resolvers");
        assert_eq!(skeleton.types.len(), 2);
        let bindings: usize = skeleton.types.values().map(|t| t.fields.len()).sum();
        assert_eq!(bindings, schema.field_count());
        assert!(skeleton.field("Order", "total").unwrap().resolver.is_none());
    }
}
