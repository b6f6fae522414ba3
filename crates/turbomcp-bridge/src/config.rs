//! Bridge configuration
//!
//! [`BridgeConfig`] is built once at startup from the parsed command line
//! (see [`crate::cli::BridgeArgs`]) and shared read-only afterwards.

use std::net::SocketAddr;
use std::time::Duration;

use http::HeaderValue;
use secrecy::SecretString;
use turbomcp_gate::jwt::{JwksSettings, keycloak_jwks_uri};
use url::Url;

use crate::error::{BridgeError, BridgeErrorExt, BridgeResult};

/// Default listen address
pub const DEFAULT_BIND: &str = "127.0.0.1:3000";

/// Default relay channel capacity (chunks)
pub const DEFAULT_STREAM_BUFFER: usize = 32;

/// Maximum accepted request body
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;

/// Authentication settings
#[derive(Debug, Clone)]
pub struct AuthSettings {
    /// Base URL of the authorization server, without trailing slash
    pub server_url: Option<String>,
    /// Realm on the authorization server
    pub realm: String,
    /// Issuer tokens must carry; derived from server and realm when unset
    pub expected_issuer: Option<String>,
    /// Key-set URL; derived from server and realm when unset
    pub jwks_url: Option<String>,
    /// Shared secret accepted instead of a bearer token
    pub api_key: Option<SecretString>,
    /// Admit everything
    pub disabled: bool,
    /// Key-set fetch and cache tuning
    pub jwks: JwksSettings,
}

impl AuthSettings {
    /// `{server}/realms/{realm}/protocol/openid-connect`
    fn openid_connect_base(&self) -> Option<String> {
        self.server_url
            .as_ref()
            .map(|server| format!("{server}/realms/{}/protocol/openid-connect", self.realm))
    }

    /// Key-set URL used for token validation
    pub fn jwks_uri(&self) -> Option<String> {
        self.jwks_url.clone().or_else(|| {
            self.server_url
                .as_deref()
                .map(|server| keycloak_jwks_uri(server, &self.realm))
        })
    }

    /// Issuer tokens must carry
    pub fn issuer(&self) -> Option<String> {
        self.expected_issuer.clone().or_else(|| {
            self.server_url
                .as_ref()
                .map(|server| format!("{server}/realms/{}", self.realm))
        })
    }

    /// OpenID Connect endpoint on the authorization server, e.g. `token`
    pub fn endpoint(&self, leaf: &str) -> Option<String> {
        self.openid_connect_base().map(|base| format!("{base}/{leaf}"))
    }
}

/// Backend settings
#[derive(Debug, Clone)]
pub struct BackendSettings {
    /// Configured backend endpoint (the SSE endpoint)
    pub url: Url,
    /// Bearer token presented to the backend
    pub token: Option<SecretString>,
    /// Timeout for buffered backend calls; streams are never timed out
    pub timeout: Option<Duration>,
    /// Relay channel capacity
    pub stream_buffer: usize,
}

/// Complete bridge configuration
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Listen address
    pub bind: SocketAddr,
    /// Externally visible base URL, without trailing slash
    pub public_issuer: String,
    /// Authentication
    pub auth: AuthSettings,
    /// Backend
    pub backend: BackendSettings,
    /// Allowed CORS origins; empty allows any
    pub cors_origins: Vec<String>,
    /// Maximum accepted request body
    pub max_body_bytes: usize,
}

impl BridgeConfig {
    /// Check cross-field constraints
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Configuration` naming the offending setting.
    pub fn validate(&self) -> BridgeResult<()> {
        match self.backend.url.scheme() {
            "http" | "https" => {}
            other => {
                return Err(BridgeError::configuration_with_key(
                    format!("unsupported scheme '{other}'"),
                    "backend_url",
                ));
            }
        }

        if self.backend.stream_buffer == 0 {
            return Err(BridgeError::configuration_with_key(
                "must be greater than zero",
                "stream_buffer",
            ));
        }

        if !self.auth.disabled && (self.auth.jwks_uri().is_none() || self.auth.issuer().is_none()) {
            return Err(BridgeError::configuration_with_key(
                "required unless authentication is disabled (or set both --jwks-url and --expected-issuer)",
                "auth_server_url",
            ));
        }

        for origin in &self.cors_origins {
            HeaderValue::from_str(origin).config_context("cors_origin")?;
        }

        Ok(())
    }

    /// Whether bearer tokens can be validated
    pub fn token_validation_enabled(&self) -> bool {
        !self.auth.disabled && self.auth.jwks_uri().is_some() && self.auth.issuer().is_some()
    }
}

/// Parse an absolute URL and drop any trailing slash
///
/// # Errors
///
/// Returns `BridgeError::Configuration` keyed by `key` when `value` is not a URL.
pub fn base_url(value: &str, key: &str) -> BridgeResult<String> {
    let url = Url::parse(value).config_context(key)?;
    if url.cannot_be_a_base() {
        return Err(BridgeError::configuration_with_key("not a base URL", key));
    }
    Ok(value.trim_end_matches('/').to_string())
}
