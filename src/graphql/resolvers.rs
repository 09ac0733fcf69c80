//! Resolver construction from resolver maps.
//!
//! # Responsibilities
//! - Check every binding targets a field of the schema
//! - Require an entry for every object-type field
//! - Turn each binding into a [`Resolver`] aimed at the proxy
//!
//! Failures here belong to the resolver map, not the schema: the same map may
//! back several schemas.

use std::sync::Arc;

use thiserror::Error;
use url::Url;

use crate::graphql::executable::{ExecutableResolvers, FieldCoordinate};
use crate::graphql::parser::ParsedSchema;
use crate::graphql::template::{Template, TemplateError};
use crate::model::{validate_name, ResolverBinding, ResolverMap, UpstreamBinding};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuildError {
    #[error("type {0} is not an object type in the schema")]
    UnknownType(String),

    #[error("field {0} does not exist in the schema")]
    UnknownField(FieldCoordinate),

    #[error("no resolver for field {0}")]
    MissingResolver(FieldCoordinate),

    #[error("invalid upstream binding for {coordinate}: {reason}")]
    InvalidUpstream {
        coordinate: FieldCoordinate,
        reason: String,
    },

    #[error("invalid template for {coordinate}: {source}")]
    InvalidTemplate {
        coordinate: FieldCoordinate,
        #[source]
        source: TemplateError,
    },

    #[error("invalid proxy address {0}")]
    InvalidProxyAddress(String),
}

/// A built resolver for one field.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolver {
    /// Placeholder; always resolves to null.
    Null,
    /// Rendered from an inline template.
    Template(Template),
    /// Forwarded through the proxy to an upstream function.
    Upstream(UpstreamResolver),
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpstreamResolver {
    pub upstream: String,
    pub function: String,
    /// Proxy URL the call is sent to.
    pub url: Url,
    pub request_template: Option<Template>,
    pub response_template: Option<Template>,
}

/// Builds executable resolvers for a schema from a resolver map.
pub trait ResolverFactory: Send + Sync {
    fn build(
        &self,
        schema: &ParsedSchema,
        resolver_map: &ResolverMap,
    ) -> Result<ExecutableResolvers, BuildError>;
}

/// Factory producing resolvers that call upstreams through the proxy.
#[derive(Debug, Clone)]
pub struct ProxyResolverFactory {
    proxy_url: Arc<Url>,
}

impl ProxyResolverFactory {
    /// `proxy_address` is `host:port` or a full `http(s)://` URL.
    pub fn new(proxy_address: &str) -> Result<Self, BuildError> {
        let raw = if proxy_address.contains("://") {
            proxy_address.to_string()
        } else {
            format!("http://{}", proxy_address)
        };
        let mut url = Url::parse(&raw)
            .ok()
            .filter(|u| u.has_host())
            .ok_or_else(|| BuildError::InvalidProxyAddress(proxy_address.to_string()))?;
        // Upstream paths are joined relative to any prefix in the address.
        if !url.path().ends_with('/') {
            let path = format!("{}/", url.path());
            url.set_path(&path);
        }
        Ok(Self {
            proxy_url: Arc::new(url),
        })
    }

    pub fn proxy_url(&self) -> &Url {
        &self.proxy_url
    }

    fn upstream_resolver(
        &self,
        coordinate: &FieldCoordinate,
        binding: &UpstreamBinding,
    ) -> Result<Resolver, BuildError> {
        let invalid = |reason: String| BuildError::InvalidUpstream {
            coordinate: coordinate.clone(),
            reason,
        };
        validate_name(&binding.upstream).map_err(|e| invalid(format!("upstream {}", e)))?;
        validate_name(&binding.function).map_err(|e| invalid(format!("function {}", e)))?;

        let url = self
            .proxy_url
            .join(&format!("{}/{}", binding.upstream, binding.function))
            .map_err(|e| invalid(e.to_string()))?;

        Ok(Resolver::Upstream(UpstreamResolver {
            upstream: binding.upstream.clone(),
            function: binding.function.clone(),
            url,
            request_template: parse_optional(coordinate, binding.request_template.as_deref())?,
            response_template: parse_optional(coordinate, binding.response_template.as_deref())?,
        }))
    }
}

fn parse_template(coordinate: &FieldCoordinate, source: &str) -> Result<Template, BuildError> {
    Template::parse(source).map_err(|source| BuildError::InvalidTemplate {
        coordinate: coordinate.clone(),
        source,
    })
}

fn parse_optional(
    coordinate: &FieldCoordinate,
    source: Option<&str>,
) -> Result<Option<Template>, BuildError> {
    source.map(|s| parse_template(coordinate, s)).transpose()
}

impl ResolverFactory for ProxyResolverFactory {
    fn build(
        &self,
        schema: &ParsedSchema,
        resolver_map: &ResolverMap,
    ) -> Result<ExecutableResolvers, BuildError> {
        // Bindings must not point outside the schema.
        for (type_name, type_resolver) in &resolver_map.types {
            let object = schema
                .object_type(type_name)
                .ok_or_else(|| BuildError::UnknownType(type_name.clone()))?;
            if let Some(field) = type_resolver
                .fields
                .keys()
                .find(|f| object.field(f).is_none())
            {
                return Err(BuildError::UnknownField(FieldCoordinate::new(
                    type_name.as_str(),
                    field.as_str(),
                )));
            }
        }

        let mut resolvers = ExecutableResolvers::default();
        for object in schema.object_types() {
            for field in &object.fields {
                let coordinate = FieldCoordinate::new(object.name.as_str(), field.name.as_str());
                let entry = resolver_map
                    .field(&object.name, &field.name)
                    .ok_or_else(|| BuildError::MissingResolver(coordinate.clone()))?;
                let resolver = match &entry.resolver {
                    None => Resolver::Null,
                    Some(ResolverBinding::Template { inline }) => {
                        Resolver::Template(parse_template(&coordinate, inline)?)
                    }
                    Some(ResolverBinding::Upstream(binding)) => {
                        self.upstream_resolver(&coordinate, binding)?
                    }
                };
                resolvers.insert(coordinate, resolver);
            }
        }
        Ok(resolvers)
    }
}
