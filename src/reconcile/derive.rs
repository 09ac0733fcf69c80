//! Endpoint derivation for one snapshot.
//!
//! # Responsibilities
//! - Resolve each schema's resolver map reference within the snapshot
//! - Build endpoints, attributing parse failures to the schema and
//!   resolver construction failures to the resolver map
//! - Bootstrap schemas without a reference by generating a skeleton map
//!
//! # Design Decisions
//! - Exactly one report per schema; resolver maps only report failures
//! - The skeleton path never yields an endpoint in the same pass; the
//!   updated schema arrives with the next snapshot

use std::sync::Arc;

use crate::error::{Error, Result};
use crate::graphql::{generate_skeleton, resolver_map_name, Endpoint, ExecutableSchema};
use crate::model::{validate_name, ObjectRef, ResolverMap, Schema, Snapshot};
use crate::reconcile::correlation::ResolverMapErrors;
use crate::reconcile::Reconciler;
use crate::reporter::ConfigObjectReport;
use crate::storage::StorageError;

/// Result of deriving endpoints from a snapshot.
#[derive(Debug, Default)]
pub struct Derivation {
    /// Endpoints in schema order.
    pub endpoints: Vec<Endpoint>,
    /// Schema reports in schema order, then resolver map reports.
    pub reports: Vec<ConfigObjectReport>,
    /// Pass-level failures not attributed to any object.
    pub errors: Vec<Error>,
}

/// Outcome of handling a single schema.
#[derive(Default)]
struct SchemaOutcome {
    endpoint: Option<Endpoint>,
    schema_error: Option<Error>,
    resolver_map_error: Option<(String, Error)>,
    pass_error: Option<Error>,
}

impl SchemaOutcome {
    fn schema_failed(err: Error) -> Self {
        Self {
            schema_error: Some(err),
            ..Default::default()
        }
    }
}

impl Reconciler {
    /// Derive the endpoint set and reports for a snapshot.
    ///
    /// Touches storage only to bootstrap schemas that have no resolver map.
    pub async fn derive_endpoints(&self, snapshot: &Snapshot) -> Derivation {
        let mut derivation = Derivation::default();
        let mut resolver_map_errors = ResolverMapErrors::new();

        for schema in &snapshot.schemas {
            let outcome = self.handle_schema(schema, snapshot).await;

            if let Some((name, err)) = outcome.resolver_map_error {
                tracing::warn!(schema = %schema.name, resolver_map = %name, error = %err, "Resolver map rejected");
                resolver_map_errors.record(&name, err);
            }
            if let Some(err) = &outcome.schema_error {
                tracing::warn!(schema = %schema.name, error = %err, "Schema rejected");
            }
            derivation.errors.extend(outcome.pass_error);
            derivation.reports.push(ConfigObjectReport::new(
                ObjectRef::schema(schema.name.as_str()),
                outcome.schema_error,
            ));
            derivation.endpoints.extend(outcome.endpoint);
        }

        derivation.reports.extend(resolver_map_errors.into_reports());
        derivation
    }

    async fn handle_schema(&self, schema: &Schema, snapshot: &Snapshot) -> SchemaOutcome {
        if let Err(reason) = validate_name(&schema.name) {
            return SchemaOutcome::schema_failed(Error::InvalidName(reason));
        }

        if schema.resolver_map.is_empty() {
            return match self.create_skeleton_resolver_map(schema).await {
                Ok(()) => SchemaOutcome::default(),
                Err(err) => SchemaOutcome::schema_failed(err),
            };
        }

        match snapshot.resolver_map(&schema.resolver_map) {
            Some(resolver_map) => self.build_endpoint(schema, resolver_map),
            None => SchemaOutcome::schema_failed(Error::ResolverMapNotFound {
                schema: schema.name.clone(),
                resolver_map: schema.resolver_map.clone(),
            }),
        }
    }

    fn build_endpoint(&self, schema: &Schema, resolver_map: &ResolverMap) -> SchemaOutcome {
        let parsed = match self.parser.parse(&schema.inline_schema) {
            Ok(parsed) => parsed,
            Err(e) => return SchemaOutcome::schema_failed(e.into()),
        };

        let resolvers = match self.resolvers.build(&parsed, resolver_map) {
            Ok(resolvers) => resolvers,
            Err(e) => {
                return SchemaOutcome {
                    resolver_map_error: Some((resolver_map.name.clone(), e.into())),
                    ..Default::default()
                }
            }
        };

        let pass_error = self.operator.register(resolver_map).err().map(Error::from);
        let endpoint = Endpoint::new(
            schema.name.as_str(),
            ExecutableSchema::new(Arc::new(parsed), resolvers),
        );
        tracing::debug!(
            schema = %schema.name,
            resolver_map = %resolver_map.name,
            path = %endpoint.root_path,
            "Endpoint built"
        );

        SchemaOutcome {
            endpoint: Some(endpoint),
            pass_error,
            ..Default::default()
        }
    }

    /// Point the schema at a generated resolver map, then create that map.
    ///
    /// The schema update is written first. Repeating it with the same target
    /// is a no-op, so a retry after a failed create only re-attempts the create.
    async fn create_skeleton_resolver_map(&self, schema: &Schema) -> Result<()> {
        let parsed = self.parser.parse(&schema.inline_schema)?;
        let name = resolver_map_name(&schema.name);
        let skeleton = generate_skeleton(&name, &parsed);

        let mut stored = self
            .store
            .get_schema(&schema.name)
            .await
            .map_err(|e| Error::storage(format!("retrieving schema {} from storage", schema.name), e))?;

        let already_referenced = stored.resolver_map == name;
        if stored.resolver_map.is_empty() {
            stored.resolver_map = name.clone();
            self.store
                .update_schema(stored)
                .await
                .map_err(|e| Error::storage(format!("updating schema {} in storage", schema.name), e))?;
        } else if !already_referenced {
            // Storage is ahead of this snapshot; the next one will carry the reference.
            tracing::debug!(
                schema = %schema.name,
                resolver_map = %stored.resolver_map,
                "Schema already references a resolver map"
            );
            return Ok(());
        }

        match self.store.create_resolver_map(skeleton).await {
            Ok(_) => {}
            // A replayed snapshot; both writes landed on an earlier pass.
            Err(StorageError::AlreadyExists { .. }) if already_referenced => {
                tracing::debug!(
                    schema = %schema.name,
                    resolver_map = %name,
                    "Skeleton resolver map already exists"
                );
                return Ok(());
            }
            Err(e) => {
                return Err(Error::storage(
                    format!("writing resolver map {} to storage", name),
                    e,
                ))
            }
        }

        tracing::info!(
            schema = %schema.name,
            resolver_map = %name,
            fields = parsed.field_count(),
            "Generated skeleton resolver map"
        );
        Ok(())
    }
}
