//! Route table and middleware stack

use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::WWW_AUTHENTICATE;
use axum::http::{HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::{any, get, post};
use axum::{Json, Router};
use serde_json::json;
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;
use turbomcp_gate::tower::AuthGateLayer;

use super::{AppState, discovery, health};

/// Endpoints listed by the 404 fallback
pub const KNOWN_ENDPOINTS: [&str; 10] = [
    "/",
    "/mcp",
    "/mcp/messages",
    "/mcp/{path}",
    "/.well-known/oauth-authorization-server",
    "/.well-known/openid-configuration",
    "/.well-known/oauth-protected-resource",
    "/oauth/register",
    "/health",
    "/test",
];

/// Assemble the bridge router
///
/// MCP routes sit behind the admission gate; discovery, registration and
/// health routes are public.
pub fn build_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/", any(bridge))
        .route("/mcp", any(bridge))
        .route("/mcp/messages", any(bridge))
        .route("/mcp/{*path}", any(bridge))
        .route_layer(AuthGateLayer::from_arc(Arc::clone(&state.gate)));

    let public = Router::new()
        .route(
            "/.well-known/oauth-authorization-server",
            get(discovery::authorization_server_metadata),
        )
        .route(
            "/.well-known/oauth-authorization-server/mcp",
            get(discovery::authorization_server_metadata),
        )
        .route(
            "/.well-known/openid-configuration",
            get(discovery::authorization_server_metadata),
        )
        .route(
            "/.well-known/oauth-protected-resource",
            get(discovery::protected_resource),
        )
        .route(
            "/.well-known/oauth-protected-resource/mcp",
            get(discovery::protected_resource),
        )
        .route("/oauth/register", post(discovery::register))
        .route("/health", get(health::health))
        .route("/test", get(health::test));

    let cors = cors_layer(&state.config.cors_origins);
    let body_limit = RequestBodyLimitLayer::new(state.config.max_body_bytes);

    gated
        .merge(public)
        .fallback(not_found)
        .layer(body_limit)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn bridge(State(state): State<AppState>, request: Request) -> Response {
    state.bridge.handle(request).await
}

async fn not_found(method: Method, uri: Uri) -> impl IntoResponse {
    debug!(%method, path = %uri.path(), "No route");
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": format!("No endpoint at {}", uri.path()),
            "available_endpoints": KNOWN_ENDPOINTS,
        })),
    )
}

/// CORS for browser-based MCP clients; an empty list allows any origin
fn cors_layer(origins: &[String]) -> CorsLayer {
    let cors = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any)
        .expose_headers([WWW_AUTHENTICATE]);

    if origins.is_empty() {
        cors.allow_origin(Any)
    } else {
        let allowed: Vec<HeaderValue> = origins.iter().filter_map(|o| o.parse().ok()).collect();
        cors.allow_origin(allowed)
    }
}
