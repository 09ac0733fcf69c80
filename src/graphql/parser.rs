//! Schema definition language parsing.

use std::collections::{BTreeSet, HashSet};

use async_graphql_parser::types::{BaseType, FieldDefinition, Type, TypeKind, TypeSystemDefinition};
use async_graphql_parser::Positioned;
use thiserror::Error;

const BUILTIN_SCALARS: [&str; 5] = ["Int", "Float", "String", "Boolean", "ID"];

/// A schema that failed to parse or type-check.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message}")]
pub struct ParseError {
    message: String,
}

impl ParseError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// Turns schema source text into a structural schema.
pub trait SchemaParser: Send + Sync {
    fn parse(&self, source: &str) -> Result<ParsedSchema, ParseError>;
}

/// Parser backed by `async-graphql-parser`.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphqlParser;

impl SchemaParser for GraphqlParser {
    fn parse(&self, source: &str) -> Result<ParsedSchema, ParseError> {
        ParsedSchema::parse(source)
    }
}

/// A field of an object type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectField {
    pub name: String,
    /// Rendered type, e.g. `[Order!]!`.
    pub ty: String,
    pub arguments: Vec<String>,
}

/// An object type and its fields in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectType {
    pub name: String,
    pub fields: Vec<ObjectField>,
}

impl ObjectType {
    pub fn field(&self, name: &str) -> Option<&ObjectField> {
        self.fields.iter().find(|f| f.name == name)
    }
}

/// Structural view of a parsed schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedSchema {
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
    object_types: Vec<ObjectType>,
    other_types: BTreeSet<String>,
}

#[derive(Default)]
struct RootTypes {
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl ParsedSchema {
    /// Parse and type-check SDL source.
    pub fn parse(source: &str) -> Result<Self, ParseError> {
        let document = async_graphql_parser::parse_schema(source)
            .map_err(|e| ParseError::new(e.to_string()))?;

        let mut roots = RootTypes::default();
        let mut object_types: Vec<ObjectType> = Vec::new();
        let mut other_types = BTreeSet::new();
        let mut extensions: Vec<(String, Vec<ObjectField>)> = Vec::new();
        // Every field and argument type, checked once all names are known.
        let mut referenced: Vec<(String, String)> = Vec::new();

        for definition in document.definitions {
            match definition {
                TypeSystemDefinition::Schema(schema) => {
                    let schema = schema.node;
                    if let Some(query) = schema.query {
                        roots.query = Some(query.node.to_string());
                    }
                    if let Some(mutation) = schema.mutation {
                        roots.mutation = Some(mutation.node.to_string());
                    }
                    if let Some(subscription) = schema.subscription {
                        roots.subscription = Some(subscription.node.to_string());
                    }
                }
                TypeSystemDefinition::Type(ty) => {
                    let ty = ty.node;
                    let name = ty.name.node.to_string();
                    match ty.kind {
                        TypeKind::Object(object) => {
                            let fields = collect_fields(&name, &object.fields, &mut referenced);
                            if ty.extend {
                                extensions.push((name, fields));
                            } else if object_types.iter().any(|t| t.name == name)
                                || other_types.contains(&name)
                            {
                                return Err(ParseError::new(format!("type {} is defined more than once", name)));
                            } else {
                                object_types.push(ObjectType { name, fields });
                            }
                        }
                        TypeKind::Interface(interface) => {
                            collect_fields(&name, &interface.fields, &mut referenced);
                            if !ty.extend {
                                insert_other(&mut other_types, &object_types, name)?;
                            }
                        }
                        _ => {
                            if !ty.extend {
                                insert_other(&mut other_types, &object_types, name)?;
                            }
                        }
                    }
                }
                TypeSystemDefinition::Directive(_) => {}
            }
        }

        for (name, fields) in extensions {
            let target = object_types
                .iter_mut()
                .find(|t| t.name == name)
                .ok_or_else(|| ParseError::new(format!("cannot extend undefined type {}", name)))?;
            for field in fields {
                if target.field(&field.name).is_some() {
                    return Err(ParseError::new(format!(
                        "field {}.{} is defined more than once",
                        name, field.name
                    )));
                }
                target.fields.push(field);
            }
        }

        let mut known: HashSet<&str> = HashSet::new();
        for scalar in BUILTIN_SCALARS {
            known.insert(scalar);
        }
        known.extend(object_types.iter().map(|t| t.name.as_str()));
        known.extend(other_types.iter().map(String::as_str));
        if let Some((owner, unknown)) = referenced
            .iter()
            .find(|(_, ty)| !known.contains(ty.as_str()))
        {
            return Err(ParseError::new(format!("unknown type {} referenced by {}", unknown, owner)));
        }

        let is_object = |n: &str| object_types.iter().any(|t| t.name == n);
        let query_type = roots.query.unwrap_or_else(|| "Query".to_string());
        if !is_object(&query_type) {
            return Err(ParseError::new(format!(
                "schema does not define query type {}",
                query_type
            )));
        }
        let optional_root = |explicit: Option<String>, default: &str| -> Result<Option<String>, ParseError> {
            match explicit {
                Some(name) if is_object(&name) => Ok(Some(name)),
                Some(name) => Err(ParseError::new(format!("root type {} is not defined", name))),
                None => Ok(is_object(default).then(|| default.to_string())),
            }
        };
        let mutation_type = optional_root(roots.mutation, "Mutation")?;
        let subscription_type = optional_root(roots.subscription, "Subscription")?;

        Ok(Self {
            query_type,
            mutation_type,
            subscription_type,
            object_types,
            other_types,
        })
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    pub fn mutation_type(&self) -> Option<&str> {
        self.mutation_type.as_deref()
    }

    pub fn subscription_type(&self) -> Option<&str> {
        self.subscription_type.as_deref()
    }

    /// Object types in declaration order.
    pub fn object_types(&self) -> &[ObjectType] {
        &self.object_types
    }

    pub fn object_type(&self, name: &str) -> Option<&ObjectType> {
        self.object_types.iter().find(|t| t.name == name)
    }

    /// Names of non-object types (scalars, enums, inputs, unions, interfaces).
    pub fn other_types(&self) -> impl Iterator<Item = &str> {
        self.other_types.iter().map(String::as_str)
    }

    /// Total number of object-type fields.
    pub fn field_count(&self) -> usize {
        self.object_types.iter().map(|t| t.fields.len()).sum()
    }
}

fn insert_other(
    other_types: &mut BTreeSet<String>,
    object_types: &[ObjectType],
    name: String,
) -> Result<(), ParseError> {
    if object_types.iter().any(|t| t.name == name) || !other_types.insert(name.clone()) {
        return Err(ParseError::new(format!("type {} is defined more than once", name)));
    }
    Ok(())
}

fn collect_fields(
    owner: &str,
    fields: &[Positioned<FieldDefinition>],
    referenced: &mut Vec<(String, String)>,
) -> Vec<ObjectField> {
    fields
        .iter()
        .map(|field| {
            let field = &field.node;
            let coordinate = format!("{}.{}", owner, field.name.node);
            referenced.push((coordinate.clone(), base_name(&field.ty.node).to_string()));
            for arg in &field.arguments {
                referenced.push((coordinate.clone(), base_name(&arg.node.ty.node).to_string()));
            }
            ObjectField {
                name: field.name.node.to_string(),
                ty: field.ty.node.to_string(),
                arguments: field
                    .arguments
                    .iter()
                    .map(|a| a.node.name.node.to_string())
                    .collect(),
            }
        })
        .collect()
}

/// The named type at the bottom of any list/non-null wrapping.
fn base_name(ty: &Type) -> &str {
    match &ty.base {
        BaseType::Named(name) => name.as_str(),
        BaseType::List(inner) => base_name(inner),
    }
}
