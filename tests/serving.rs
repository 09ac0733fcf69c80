//! HTTP serving of derived endpoints.

use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::Value;
use tower::ServiceExt;

use schemagate::config::ServerConfig;
use schemagate::graphql::{
    Endpoint, ExecutableSchema, ParsedSchema, ProxyResolverFactory, ResolverFactory,
};
use schemagate::http::HttpServer;
use schemagate::model::{ResolverBinding, ResolverMap, UpstreamBinding};
use schemagate::routing::EndpointRouter;

fn billing_router() -> (Arc<EndpointRouter>, Router) {
    let schema = ParsedSchema::parse("type Query { invoices: [String] total: Float }").unwrap();
    let map = ResolverMap::new("billing-map")
        .with_field(
            "Query",
            "invoices",
            Some(ResolverBinding::Upstream(UpstreamBinding::new("ledger", "list"))),
        )
        .with_field("Query", "total", None);
    let resolvers = ProxyResolverFactory::new("127.0.0.1:8081")
        .unwrap()
        .build(&schema, &map)
        .unwrap();

    let endpoints = Arc::new(EndpointRouter::new());
    endpoints.update_endpoints(vec![Endpoint::new(
        "billing",
        ExecutableSchema::new(Arc::new(schema), resolvers),
    )]);
    let server = HttpServer::new(endpoints.clone(), &ServerConfig::default());
    (endpoints, server.router())
}

async fn send(router: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.oneshot(request).await.unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let json = serde_json::from_slice(&body).unwrap_or(Value::Null);
    (status, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_index_lists_endpoints() {
    let (_, router) = billing_router();
    let (status, body) = send(router, get("/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["schema"], "billing");
    assert_eq!(body[0]["query_path"], "/billing/query");
}

#[tokio::test]
async fn test_root_path_describes_endpoint() {
    let (_, router) = billing_router();
    let (status, body) = send(router, get("/billing/")).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["query_type"], "Query");
    let fields = &body["types"][0]["fields"];
    assert_eq!(fields[0]["name"], "invoices");
    assert_eq!(fields[0]["resolver"], "upstream");
    assert_eq!(fields[1]["resolver"], "null");
}

#[tokio::test]
async fn test_query_path_validates_documents() {
    let (_, router) = billing_router();

    let (status, _) = send(router.clone(), get("/billing/query?query=%7B%20invoices%20%7D")).await;
    assert_eq!(status, StatusCode::NOT_IMPLEMENTED);

    let request = Request::builder()
        .method("POST")
        .uri("/billing/query")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"query": "{ invoices"}"#))
        .unwrap();
    let (status, body) = send(router.clone(), request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["errors"][0]["message"].is_string());

    let (status, _) = send(router, get("/billing/query")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_and_replaced_paths_are_not_found() {
    let (endpoints, router) = billing_router();
    let (status, _) = send(router.clone(), get("/orders")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    endpoints.update_endpoints(Vec::new());
    let (status, _) = send(router, get("/billing")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_request_id_is_propagated() {
    let (_, router) = billing_router();
    let response = router.oneshot(get("/")).await.unwrap();
    assert!(response.headers().contains_key("x-request-id"));
}
