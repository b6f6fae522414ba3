//! Bearer token verification
//!
//! ```text
//! ┌──────────────────────────────┐
//! │  TokenValidator              │  RS256 only, exact issuer, exp
//! └──────────────┬───────────────┘
//!                │ kid
//! ┌──────────────▼───────────────┐
//! │  SigningKeySource            │  trait seam
//! │   └─ JwksKeySource           │  remote key set + per-kid cache
//! └──────────────────────────────┘
//! ```
//!
//! # Modules
//!
//! - `jwks` - key-set fetching and per-key caching
//! - `validator` - token verification

pub mod jwks;
pub mod validator;

pub use jwks::{JwksKeySource, JwksSettings, SigningKeySource, keycloak_jwks_uri};
pub use validator::TokenValidator;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Claims of a validated token
///
/// Registered claims used by the gate are typed; everything else lands in
/// `additional`. Claims are owned by the request that produced them and are
/// never cached.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct Claims {
    /// Issuer (iss)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iss: Option<String>,

    /// Subject (sub)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub: Option<String>,

    /// Human-facing username, when the issuer provides one
    #[serde(skip_serializing_if = "Option::is_none")]
    pub preferred_username: Option<String>,

    /// Audience (aud) - a string or an array, left untyped
    #[serde(skip_serializing_if = "Option::is_none")]
    pub aud: Option<Value>,

    /// Expiration Time (exp) - Unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<u64>,

    /// Issued At (iat) - Unix timestamp
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<u64>,

    /// Remaining claims
    #[serde(flatten)]
    pub additional: HashMap<String, Value>,
}

impl Claims {
    /// Identity to attribute the request to: username if present, else subject
    pub fn identity(&self) -> Option<&str> {
        self.preferred_username
            .as_deref()
            .filter(|name| !name.is_empty())
            .or(self.sub.as_deref())
    }
}
