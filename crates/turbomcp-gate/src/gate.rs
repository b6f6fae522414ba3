//! Per-request admission decision
//!
//! Decision order, first match wins:
//! 1. Authentication disabled by configuration: admit as `anonymous`
//! 2. `Authorization: Bearer <token>` present: validate; success admits with the
//!    token's username/subject, failure denies with `invalid_token`
//! 3. Shared secret in the API-key header or query parameter equal to the
//!    configured secret: admit as `api-key`
//! 4. Otherwise deny with `unauthorized`
//!
//! The gate holds no per-request state.

use std::borrow::Cow;
use std::fmt;

use http::header::{AUTHORIZATION, CONTENT_TYPE, WWW_AUTHENTICATE};
use http::{HeaderMap, HeaderName, HeaderValue, Response, StatusCode, request::Parts};
use secrecy::SecretString;
use serde_json::json;
use thiserror::Error;
use tracing::{debug, warn};

use crate::challenge::BearerChallenge;
use crate::error::TokenError;
use crate::jwt::{Claims, TokenValidator};
use crate::secret::SharedSecret;

/// Default header carrying the shared secret
pub const DEFAULT_API_KEY_HEADER: &str = "x-api-key";

/// Default query parameter carrying the shared secret
pub const DEFAULT_API_KEY_QUERY_PARAM: &str = "api_key";

/// Default realm advertised in challenges
pub const DEFAULT_REALM: &str = "mcp";

/// Identity name for shared-secret admissions
pub const API_KEY_IDENTITY: &str = "api-key";

/// Identity name while authentication is disabled
pub const BYPASS_IDENTITY: &str = "anonymous";

/// Gate configuration, fixed at startup
#[derive(Clone)]
pub struct GateConfig {
    realm: String,
    shared_secret: Option<SharedSecret>,
    disabled: bool,
    api_key_header: HeaderName,
    api_key_query_param: String,
}

impl Default for GateConfig {
    fn default() -> Self {
        Self {
            realm: DEFAULT_REALM.to_string(),
            shared_secret: None,
            disabled: false,
            api_key_header: HeaderName::from_static(DEFAULT_API_KEY_HEADER),
            api_key_query_param: DEFAULT_API_KEY_QUERY_PARAM.to_string(),
        }
    }
}

impl fmt::Debug for GateConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GateConfig")
            .field("realm", &self.realm)
            .field("shared_secret", &self.shared_secret.as_ref().map(|_| "[REDACTED]"))
            .field("disabled", &self.disabled)
            .field("api_key_header", &self.api_key_header)
            .field("api_key_query_param", &self.api_key_query_param)
            .finish()
    }
}

impl GateConfig {
    /// Configuration for `realm` with defaults elsewhere
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            ..Self::default()
        }
    }

    /// Accept this shared secret (an empty secret disables the check)
    pub fn with_shared_secret(mut self, secret: SecretString) -> Self {
        self.shared_secret = SharedSecret::new(secret);
        self
    }

    /// Admit every request without checking credentials
    pub fn with_auth_disabled(mut self, disabled: bool) -> Self {
        self.disabled = disabled;
        self
    }

    /// Header carrying the shared secret
    pub fn with_api_key_header(mut self, header: HeaderName) -> Self {
        self.api_key_header = header;
        self
    }

    /// Query parameter carrying the shared secret
    pub fn with_api_key_query_param(mut self, param: impl Into<String>) -> Self {
        self.api_key_query_param = param.into();
        self
    }

    /// Realm advertised in challenges
    pub fn realm(&self) -> &str {
        &self.realm
    }

    /// Whether authentication is disabled
    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    /// Header carrying the shared secret
    pub fn api_key_header(&self) -> &HeaderName {
        &self.api_key_header
    }

    /// Query parameter carrying the shared secret
    pub fn api_key_query_param(&self) -> &str {
        &self.api_key_query_param
    }
}

/// How a request was admitted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthMethod {
    /// Validated bearer token
    Bearer,
    /// Matching shared secret
    SharedSecret,
    /// Authentication disabled
    Bypass,
}

/// Identity of an admitted request
///
/// Inserted into request extensions by [`AuthGateLayer`](crate::tower::AuthGateLayer).
#[derive(Debug, Clone, PartialEq)]
pub struct Identity {
    /// Username or subject, `api-key`, or `anonymous`
    pub name: String,
    /// How the request was admitted
    pub method: AuthMethod,
    /// Token claims for bearer admissions
    pub claims: Option<Claims>,
}

impl Identity {
    fn bearer(claims: Claims) -> Self {
        Self {
            name: claims.identity().unwrap_or("unknown").to_string(),
            method: AuthMethod::Bearer,
            claims: Some(claims),
        }
    }

    fn shared_secret() -> Self {
        Self {
            name: API_KEY_IDENTITY.to_string(),
            method: AuthMethod::SharedSecret,
            claims: None,
        }
    }

    fn bypass() -> Self {
        Self {
            name: BYPASS_IDENTITY.to_string(),
            method: AuthMethod::Bypass,
            claims: None,
        }
    }
}

/// Reason a request was denied
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Denial {
    /// No bearer token and no matching shared secret
    #[error("no acceptable credential presented")]
    Unauthorized,

    /// A bearer token was presented and rejected
    #[error(transparent)]
    InvalidToken(#[from] TokenError),
}

impl Denial {
    /// HTTP status for every denial
    pub fn status(&self) -> StatusCode {
        StatusCode::UNAUTHORIZED
    }

    /// Error code reported in the body and challenge
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::Unauthorized => "unauthorized",
            Self::InvalidToken(e) => e.error_code(),
        }
    }

    /// Human-readable description
    pub fn description(&self) -> &'static str {
        match self {
            Self::Unauthorized => "Authentication required: present a bearer token or API key",
            Self::InvalidToken(e) => e.description(),
        }
    }

    /// `WWW-Authenticate` challenge; bare for missing credentials
    pub fn challenge(&self, realm: &str) -> BearerChallenge {
        match self {
            Self::Unauthorized => BearerChallenge::new(realm),
            Self::InvalidToken(_) => {
                BearerChallenge::new(realm).with_error(self.error_code(), self.description())
            }
        }
    }

    /// JSON body `{error, error_description}`
    pub fn body(&self) -> serde_json::Value {
        json!({
            "error": self.error_code(),
            "error_description": self.description(),
        })
    }

    /// Complete 401 response with challenge header and JSON body
    pub fn into_response<B: From<String>>(self, realm: &str) -> Response<B> {
        let mut response = Response::new(B::from(self.body().to_string()));
        *response.status_mut() = self.status();

        let headers = response.headers_mut();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        if let Ok(value) = HeaderValue::from_bytes(self.challenge(realm).to_header_value().as_bytes())
        {
            headers.insert(WWW_AUTHENTICATE, value);
        }
        response
    }
}

/// Admission gate combining token validation and the shared-secret check
#[derive(Debug, Clone)]
pub struct AuthenticationGate {
    config: GateConfig,
    validator: Option<TokenValidator>,
}

impl AuthenticationGate {
    /// Create a gate
    ///
    /// Without a validator every bearer token is rejected as `invalid_token`.
    pub fn new(config: GateConfig, validator: Option<TokenValidator>) -> Self {
        if config.is_disabled() {
            warn!("Authentication is DISABLED: every request will be admitted");
        }
        Self { config, validator }
    }

    /// Gate configuration
    pub fn config(&self) -> &GateConfig {
        &self.config
    }

    /// Realm advertised in challenges
    pub fn realm(&self) -> &str {
        self.config.realm()
    }

    /// Decide whether to admit a request
    ///
    /// # Errors
    ///
    /// Returns [`Denial`] when the request must be rejected with 401.
    pub async fn authorize(&self, parts: &Parts) -> Result<Identity, Denial> {
        if self.config.disabled {
            return Ok(Identity::bypass());
        }

        if let Some(token) = bearer_token(&parts.headers) {
            let result = match &self.validator {
                Some(validator) => validator.validate(token).await,
                None => Err(TokenError::Invalid(
                    "bearer tokens are not accepted".to_string(),
                )),
            };
            return result.map(Identity::bearer).map_err(|e| {
                warn!(
                    reason = e.kind(),
                    error = %e,
                    path = %parts.uri.path(),
                    "Bearer credential rejected"
                );
                Denial::InvalidToken(e)
            });
        }

        if let Some(secret) = &self.config.shared_secret
            && self
                .shared_secret_candidates(parts)
                .any(|candidate| secret.matches(&candidate))
        {
            debug!(path = %parts.uri.path(), "Admitted with shared secret");
            return Ok(Identity::shared_secret());
        }

        debug!(path = %parts.uri.path(), "Request carries no acceptable credential");
        Err(Denial::Unauthorized)
    }

    fn shared_secret_candidates<'a>(
        &'a self,
        parts: &'a Parts,
    ) -> impl Iterator<Item = Cow<'a, str>> + 'a {
        let from_header = parts
            .headers
            .get(&self.config.api_key_header)
            .and_then(|value| value.to_str().ok())
            .map(Cow::Borrowed);

        let from_query = parts.uri.query().and_then(|query| {
            url::form_urlencoded::parse(query.as_bytes())
                .find(|(name, _)| name == self.config.api_key_query_param.as_str())
                .map(|(_, value)| value)
        });

        from_header.into_iter().chain(from_query)
    }
}

/// Token from `Authorization: Bearer <token>`; the scheme is case-insensitive
pub fn bearer_token(headers: &HeaderMap) -> Option<&str> {
    let value = headers.get(AUTHORIZATION)?.to_str().ok()?;
    let (scheme, token) = value.split_once(' ').unwrap_or((value, ""));
    scheme
        .eq_ignore_ascii_case("bearer")
        .then(|| token.trim())
}
