//! Bearer token validation against a [`SigningKeySource`]
//!
//! Checks, in order:
//! 1. The token parses and its header names a key id
//! 2. The key id resolves to a verification key
//! 3. The signature verifies with exactly RS256, `iss` equals the expected
//!    issuer and `exp` has not lapsed (with clock-skew leeway)
//!
//! The audience is not checked. Claims are never cached.

use std::sync::Arc;
use std::time::Duration;

use jsonwebtoken::{Algorithm, TokenData, Validation, decode, decode_header};
use tracing::{debug, warn};

use super::{Claims, SigningKeySource};
use crate::error::TokenError;

/// Default clock-skew tolerance applied to `exp`
pub const DEFAULT_CLOCK_SKEW: Duration = Duration::from_secs(60);

/// Verifies bearer tokens
///
/// # Example
///
/// ```rust,no_run
/// # use std::sync::Arc;
/// # use turbomcp_gate::jwt::{JwksKeySource, JwksSettings, TokenValidator, keycloak_jwks_uri};
/// # tokio_test::block_on(async {
/// let keys = JwksKeySource::new(
///     keycloak_jwks_uri("https://id.example.com", "mcp"),
///     JwksSettings::default(),
/// )?;
/// let validator = TokenValidator::new("https://id.example.com/realms/mcp", Arc::new(keys));
///
/// let claims = validator.validate("eyJ0eXAiOiJKV1QiLCJhbGc...").await?;
/// println!("token issued to {:?}", claims.identity());
/// # Ok::<(), Box<dyn std::error::Error>>(())
/// # });
/// ```
#[derive(Debug, Clone)]
pub struct TokenValidator {
    expected_issuer: String,
    algorithm: Algorithm,
    key_source: Arc<dyn SigningKeySource>,
    clock_skew_leeway: Duration,
}

impl TokenValidator {
    /// Create a validator accepting RS256 tokens from `expected_issuer`
    pub fn new(expected_issuer: impl Into<String>, key_source: Arc<dyn SigningKeySource>) -> Self {
        Self {
            expected_issuer: expected_issuer.into(),
            algorithm: Algorithm::RS256,
            key_source,
            clock_skew_leeway: DEFAULT_CLOCK_SKEW,
        }
    }

    /// Set custom clock skew tolerance
    pub fn with_clock_skew(mut self, leeway: Duration) -> Self {
        self.clock_skew_leeway = leeway;
        self
    }

    /// The issuer string tokens must carry
    pub fn expected_issuer(&self) -> &str {
        &self.expected_issuer
    }

    /// Validate a bearer token and return its claims
    ///
    /// # Errors
    ///
    /// - [`TokenError::Malformed`] if the token or its header cannot be parsed,
    ///   or the header has no `kid`
    /// - [`TokenError::KeyUnavailable`] if the key id cannot be resolved
    /// - [`TokenError::Invalid`] on algorithm, signature, issuer or expiry failure
    pub async fn validate(&self, token: &str) -> Result<Claims, TokenError> {
        let header = decode_header(token).map_err(|e| {
            debug!(error = %e, "Failed to decode token header");
            TokenError::Malformed(e.to_string())
        })?;

        if header.alg != self.algorithm {
            warn!(
                algorithm = ?header.alg,
                expected = ?self.algorithm,
                "Token signed with unexpected algorithm"
            );
            return Err(TokenError::Invalid(format!(
                "algorithm {:?} is not accepted",
                header.alg
            )));
        }

        let kid = header
            .kid
            .ok_or_else(|| TokenError::Malformed("token header carries no key id".to_string()))?;

        let key = self.key_source.resolve(&kid).await?;

        let mut validation = Validation::new(self.algorithm);
        validation.set_issuer(&[&self.expected_issuer]);
        validation.validate_aud = false;
        validation.leeway = self.clock_skew_leeway.as_secs();

        let token_data: TokenData<Claims> = decode(token, &key, &validation).map_err(|e| {
            warn!(
                error = %e,
                kid = %kid,
                issuer = %self.expected_issuer,
                "Token validation failed"
            );
            TokenError::Invalid(e.to_string())
        })?;

        debug!(
            kid = %kid,
            subject = ?token_data.claims.sub,
            "Token validated"
        );

        Ok(token_data.claims)
    }
}
