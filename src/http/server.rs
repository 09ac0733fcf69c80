//! HTTP server setup and configuration.
//!
//! # Responsibilities
//! - Create Axum Router with all handlers
//! - Wire up middleware (tracing, timeout, request ID)
//! - Dispatch requests to the endpoint matching their path
//! - Serve until the shutdown signal fires

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    body::Bytes,
    extract::{Query, State},
    http::{Method, StatusCode, Uri},
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tower_http::{
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use crate::config::ServerConfig;
use crate::graphql::{Endpoint, Resolver};
use crate::routing::{EndpointRouter, RouteKind};

/// Application state injected into handlers.
#[derive(Clone)]
pub struct AppState {
    pub endpoints: Arc<EndpointRouter>,
}

/// HTTP server for the derived GraphQL endpoints.
pub struct HttpServer {
    router: Router,
}

impl HttpServer {
    pub fn new(endpoints: Arc<EndpointRouter>, config: &ServerConfig) -> Self {
        let state = AppState { endpoints };
        Self {
            router: Self::build_router(config, state),
        }
    }

    /// Build the Axum router with all middleware layers.
    #[allow(deprecated)]
    fn build_router(config: &ServerConfig, state: AppState) -> Router {
        Router::new()
            .route("/", get(list_endpoints))
            .fallback(endpoint_handler)
            .with_state(state)
            .layer(TimeoutLayer::new(Duration::from_secs(config.request_timeout_secs)))
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TraceLayer::new_for_http())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
    }

    /// The Axum router, for embedding or in-process testing.
    pub fn router(&self) -> Router {
        self.router.clone()
    }

    /// Serve on `listener` until `shutdown` fires.
    pub async fn run(
        self,
        listener: TcpListener,
        mut shutdown: broadcast::Receiver<()>,
    ) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!(address = %addr, "HTTP server starting");

        axum::serve(listener, self.router)
            .with_graceful_shutdown(async move {
                let _ = shutdown.recv().await;
                tracing::info!("HTTP server received shutdown signal");
            })
            .await?;

        tracing::info!("HTTP server stopped");
        Ok(())
    }
}

#[derive(Serialize)]
struct EndpointSummary {
    schema: String,
    root_path: String,
    query_path: String,
}

#[derive(Serialize)]
struct FieldDescription {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    resolver: &'static str,
}

#[derive(Serialize)]
struct TypeDescription {
    name: String,
    fields: Vec<FieldDescription>,
}

#[derive(Serialize)]
struct EndpointDescription {
    schema: String,
    root_path: String,
    query_path: String,
    query_type: String,
    mutation_type: Option<String>,
    types: Vec<TypeDescription>,
}

/// Body of a GraphQL POST request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GraphqlRequest {
    pub query: String,
    #[serde(default)]
    pub operation_name: Option<String>,
    #[serde(default)]
    pub variables: Option<serde_json::Value>,
}

fn summary(endpoint: &Endpoint) -> EndpointSummary {
    EndpointSummary {
        schema: endpoint.schema_name.clone(),
        root_path: endpoint.root_path.clone(),
        query_path: endpoint.query_path.clone(),
    }
}

fn describe(endpoint: &Endpoint) -> EndpointDescription {
    let exec = &endpoint.exec_schema;
    let schema = exec.schema();
    let types = schema
        .object_types()
        .iter()
        .map(|object| TypeDescription {
            name: object.name.clone(),
            fields: object
                .fields
                .iter()
                .map(|field| FieldDescription {
                    name: field.name.clone(),
                    ty: field.ty.clone(),
                    resolver: match exec.resolvers().get(&object.name, &field.name) {
                        Some(Resolver::Upstream(_)) => "upstream",
                        Some(Resolver::Template(_)) => "template",
                        Some(Resolver::Null) | None => "null",
                    },
                })
                .collect(),
        })
        .collect();

    EndpointDescription {
        schema: endpoint.schema_name.clone(),
        root_path: endpoint.root_path.clone(),
        query_path: endpoint.query_path.clone(),
        query_type: schema.query_type().to_string(),
        mutation_type: schema.mutation_type().map(str::to_string),
        types,
    }
}

fn graphql_error(status: StatusCode, message: impl Into<String>) -> Response {
    (status, Json(json!({ "errors": [{ "message": message.into() }] }))).into_response()
}

/// `GET /`: every endpoint currently served.
async fn list_endpoints(State(state): State<AppState>) -> Json<Vec<EndpointSummary>> {
    let table = state.endpoints.load();
    Json(table.endpoints().iter().map(|e| summary(e)).collect())
}

/// Every other path: resolve against the current endpoint table.
async fn endpoint_handler(
    State(state): State<AppState>,
    method: Method,
    uri: Uri,
    Query(params): Query<HashMap<String, String>>,
    body: Bytes,
) -> Response {
    let table = state.endpoints.load();
    let Some((endpoint, kind)) = table.match_path(uri.path()) else {
        tracing::debug!(path = %uri.path(), "No endpoint matched");
        return (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": format!("no endpoint for path {}", uri.path()) })),
        )
            .into_response();
    };

    match (kind, method) {
        (RouteKind::Root, Method::GET) => Json(describe(endpoint)).into_response(),
        (RouteKind::Root, _) => StatusCode::METHOD_NOT_ALLOWED.into_response(),
        (RouteKind::Query, Method::GET) => match params.get("query") {
            Some(query) => handle_query(endpoint, query),
            None => graphql_error(StatusCode::BAD_REQUEST, "missing query parameter"),
        },
        (RouteKind::Query, Method::POST) => match serde_json::from_slice::<GraphqlRequest>(&body) {
            Ok(request) => handle_query(endpoint, &request.query),
            Err(e) => graphql_error(StatusCode::BAD_REQUEST, format!("invalid request body: {}", e)),
        },
        (RouteKind::Query, _) => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

/// Validate a query document against the endpoint.
///
/// Execution belongs to the resolver engine; this layer only checks the
/// document and reports that it cannot run it.
fn handle_query(endpoint: &Endpoint, query: &str) -> Response {
    if let Err(e) = async_graphql_parser::parse_query(query) {
        return graphql_error(StatusCode::BAD_REQUEST, e.to_string());
    }
    tracing::debug!(schema = %endpoint.schema_name, "Query accepted for validation only");
    graphql_error(
        StatusCode::NOT_IMPLEMENTED,
        format!("query execution is not available for {}", endpoint.schema_name),
    )
}
