//! OAuth discovery documents and dynamic client registration stub
//!
//! The bridge advertises the authorization server it trusts (RFC 8414) but
//! issues nothing itself; registration hands every client the same public
//! client id.

use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::debug;

use super::AppState;
use crate::config::BridgeConfig;

/// Client id handed out by the registration stub
pub const PUBLIC_CLIENT_ID: &str = "mcp-bridge-public-client";

/// Name used when a registration request carries none
pub const DEFAULT_CLIENT_NAME: &str = "MCP Client";

/// RFC 8414 authorization server metadata
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct AuthorizationServerMetadata {
    /// Public issuer of the bridge
    pub issuer: String,
    /// Authorization endpoint on the authorization server
    pub authorization_endpoint: String,
    /// Token endpoint on the authorization server
    pub token_endpoint: String,
    /// Key-set endpoint
    pub jwks_uri: String,
    /// Userinfo endpoint
    pub userinfo_endpoint: String,
    /// Registration stub on the bridge
    pub registration_endpoint: String,
    /// Always `code`
    pub response_types_supported: Vec<&'static str>,
    /// Grants accepted by the authorization server
    pub grant_types_supported: Vec<&'static str>,
    /// PKCE methods (`S256` only)
    pub code_challenge_methods_supported: Vec<&'static str>,
    /// Client authentication methods at the token endpoint
    pub token_endpoint_auth_methods_supported: Vec<&'static str>,
    /// Token signing algorithms
    pub id_token_signing_alg_values_supported: Vec<&'static str>,
    /// Advertised scopes
    pub scopes_supported: Vec<&'static str>,
}

impl AuthorizationServerMetadata {
    /// Metadata for a configuration
    ///
    /// Without an authorization server URL the endpoints are placed under the
    /// public issuer.
    pub fn from_config(config: &BridgeConfig) -> Self {
        let issuer = config.public_issuer.clone();
        let endpoint = |leaf: &str| {
            config
                .auth
                .endpoint(leaf)
                .unwrap_or_else(|| format!("{issuer}/protocol/openid-connect/{leaf}"))
        };

        Self {
            authorization_endpoint: endpoint("auth"),
            token_endpoint: endpoint("token"),
            jwks_uri: config.auth.jwks_uri().unwrap_or_else(|| endpoint("certs")),
            userinfo_endpoint: endpoint("userinfo"),
            registration_endpoint: format!("{issuer}/oauth/register"),
            response_types_supported: vec!["code"],
            grant_types_supported: vec!["authorization_code", "refresh_token", "client_credentials"],
            code_challenge_methods_supported: vec!["S256"],
            token_endpoint_auth_methods_supported: vec!["none", "client_secret_basic", "client_secret_post"],
            id_token_signing_alg_values_supported: vec!["RS256"],
            scopes_supported: vec!["openid", "profile", "email"],
            issuer,
        }
    }
}

/// `GET /.well-known/oauth-authorization-server` and aliases
pub async fn authorization_server_metadata(
    State(state): State<AppState>,
) -> Json<AuthorizationServerMetadata> {
    Json(AuthorizationServerMetadata::from_config(&state.config))
}

/// `GET /.well-known/oauth-protected-resource`: not published
pub async fn protected_resource() -> impl IntoResponse {
    (
        StatusCode::NOT_FOUND,
        Json(json!({
            "error": "not_found",
            "message": "Protected resource metadata is not available",
        })),
    )
}

#[derive(Debug, Default, Deserialize)]
struct RegistrationRequest {
    #[serde(default)]
    redirect_uris: Vec<String>,
    #[serde(default)]
    client_name: Option<String>,
}

/// `POST /oauth/register`: answer with the fixed public client, store nothing
///
/// Unparsable bodies are treated as empty requests.
pub async fn register(body: Bytes) -> impl IntoResponse {
    let request: RegistrationRequest = serde_json::from_slice(&body).unwrap_or_default();
    debug!(
        client_name = request.client_name.as_deref(),
        redirect_uris = request.redirect_uris.len(),
        "Client registration"
    );

    (
        StatusCode::CREATED,
        Json(json!({
            "client_id": PUBLIC_CLIENT_ID,
            "client_name": request.client_name.as_deref().unwrap_or(DEFAULT_CLIENT_NAME),
            "redirect_uris": request.redirect_uris,
            "grant_types": ["authorization_code", "refresh_token"],
            "response_types": ["code"],
            "token_endpoint_auth_method": "none",
        })),
    )
}
