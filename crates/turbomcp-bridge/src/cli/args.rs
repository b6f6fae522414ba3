//! Bridge configuration arguments
//!
//! Every setting can also come from a `BRIDGE_*` environment variable.

use std::fmt;
use std::net::SocketAddr;
use std::time::Duration;

use clap::Args;
use secrecy::SecretString;
use turbomcp_gate::gate::DEFAULT_REALM;
use turbomcp_gate::jwt::JwksSettings;
use url::Url;

use crate::config::{
    AuthSettings, BackendSettings, BridgeConfig, DEFAULT_BIND, DEFAULT_MAX_BODY_BYTES,
    DEFAULT_STREAM_BUFFER, base_url,
};
use crate::error::{BridgeErrorExt, BridgeResult};

/// Bridge settings
#[derive(Clone, Args)]
pub struct BridgeArgs {
    /// Address to listen on
    #[arg(long, env = "BRIDGE_BIND", value_name = "ADDR", default_value = DEFAULT_BIND)]
    pub bind: SocketAddr,

    /// Externally visible base URL of the bridge (issuer in discovery documents)
    #[arg(long, env = "BRIDGE_PUBLIC_ISSUER", value_name = "URL")]
    pub public_issuer: String,

    /// Authorization server base URL (e.g. https://id.example.com)
    #[arg(long, env = "BRIDGE_AUTH_SERVER_URL", value_name = "URL")]
    pub auth_server_url: Option<String>,

    /// Realm on the authorization server
    #[arg(long, env = "BRIDGE_REALM", default_value = DEFAULT_REALM)]
    pub realm: String,

    /// Issuer tokens must carry [default: {auth-server-url}/realms/{realm}]
    #[arg(long, env = "BRIDGE_EXPECTED_ISSUER", value_name = "ISSUER")]
    pub expected_issuer: Option<String>,

    /// Key-set URL [default: derived from auth server and realm]
    #[arg(long, env = "BRIDGE_JWKS_URL", value_name = "URL")]
    pub jwks_url: Option<String>,

    /// Backend MCP endpoint (SSE endpoint URL)
    #[arg(long, env = "BRIDGE_BACKEND_URL", value_name = "URL")]
    pub backend_url: String,

    /// Bearer token presented to the backend
    #[arg(long, env = "BRIDGE_BACKEND_TOKEN", value_name = "TOKEN", hide_env_values = true)]
    pub backend_token: Option<String>,

    /// Shared secret accepted in X-API-Key or ?api_key=
    #[arg(long, env = "BRIDGE_API_KEY", value_name = "SECRET", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Admit every request without credentials (development only)
    #[arg(long, env = "BRIDGE_DISABLE_AUTH")]
    pub disable_auth: bool,

    /// Key-set fetch timeout in seconds
    #[arg(long, value_name = "SECS", default_value_t = 30)]
    pub jwks_timeout_secs: u64,

    /// Lifetime of cached signing keys in seconds
    #[arg(long, value_name = "SECS", default_value_t = 600)]
    pub jwks_cache_ttl_secs: u64,

    /// Timeout for buffered backend calls in seconds (streams are never timed out)
    #[arg(long, value_name = "SECS")]
    pub upstream_timeout_secs: Option<u64>,

    /// Relay channel capacity in chunks
    #[arg(long, value_name = "CHUNKS", default_value_t = DEFAULT_STREAM_BUFFER)]
    pub stream_buffer: usize,

    /// Allowed CORS origin (repeatable; none allows any origin)
    #[arg(long = "cors-origin", value_name = "ORIGIN")]
    pub cors_origins: Vec<String>,
}

impl fmt::Debug for BridgeArgs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BridgeArgs")
            .field("bind", &self.bind)
            .field("public_issuer", &self.public_issuer)
            .field("auth_server_url", &self.auth_server_url)
            .field("realm", &self.realm)
            .field("expected_issuer", &self.expected_issuer)
            .field("jwks_url", &self.jwks_url)
            .field("backend_url", &self.backend_url)
            .field("backend_token", &self.backend_token.as_ref().map(|_| "[REDACTED]"))
            .field("api_key", &self.api_key.as_ref().map(|_| "[REDACTED]"))
            .field("disable_auth", &self.disable_auth)
            .field("jwks_timeout_secs", &self.jwks_timeout_secs)
            .field("jwks_cache_ttl_secs", &self.jwks_cache_ttl_secs)
            .field("upstream_timeout_secs", &self.upstream_timeout_secs)
            .field("stream_buffer", &self.stream_buffer)
            .field("cors_origins", &self.cors_origins)
            .finish()
    }
}

fn secret(value: Option<String>) -> Option<SecretString> {
    value.filter(|v| !v.is_empty()).map(SecretString::from)
}

impl BridgeArgs {
    /// Parse URLs and assemble the immutable configuration
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Configuration` naming the setting that failed to parse.
    pub fn into_config(self) -> BridgeResult<BridgeConfig> {
        let public_issuer = base_url(&self.public_issuer, "public_issuer")?;
        let server_url = self
            .auth_server_url
            .as_deref()
            .map(|url| base_url(url, "auth_server_url"))
            .transpose()?;
        let jwks_url = self
            .jwks_url
            .map(|url| Url::parse(&url).config_context("jwks_url").map(|_| url))
            .transpose()?;
        let backend_url = Url::parse(&self.backend_url).config_context("backend_url")?;

        Ok(BridgeConfig {
            bind: self.bind,
            public_issuer,
            auth: AuthSettings {
                server_url,
                realm: self.realm,
                expected_issuer: self.expected_issuer,
                jwks_url,
                api_key: secret(self.api_key),
                disabled: self.disable_auth,
                jwks: JwksSettings {
                    fetch_timeout: Duration::from_secs(self.jwks_timeout_secs),
                    cache_ttl: Duration::from_secs(self.jwks_cache_ttl_secs),
                    ..JwksSettings::default()
                },
            },
            backend: BackendSettings {
                url: backend_url,
                token: secret(self.backend_token),
                timeout: self.upstream_timeout_secs.map(Duration::from_secs),
                stream_buffer: self.stream_buffer,
            },
            cors_origins: self.cors_origins,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }
}
