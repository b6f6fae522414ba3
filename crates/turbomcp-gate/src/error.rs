//! Error types for turbomcp-gate
//!
//! Two layers of failure exist:
//! - [`KeySourceError`]: the verification key for a `kid` could not be produced
//! - [`TokenError`]: a bearer credential was rejected (the reason is kept for logs,
//!   but every variant is reported to clients as `invalid_token`)

use thiserror::Error;

/// Failure to resolve a signing key from the key-set endpoint
///
/// `Clone` because resolutions are shared between concurrent callers waiting
/// on the same key id.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum KeySourceError {
    /// The HTTP client could not be constructed
    #[error("key set client error: {message}")]
    Client {
        /// Builder error detail
        message: String,
    },

    /// Network failure or timeout while fetching the key set
    #[error("key set fetch from {uri} failed: {message}")]
    Fetch {
        /// Key-set endpoint
        uri: String,
        /// Transport error detail
        message: String,
    },

    /// The key-set endpoint answered with a non-success status
    #[error("key set endpoint {uri} returned status {status}")]
    Status {
        /// Key-set endpoint
        uri: String,
        /// HTTP status returned
        status: u16,
    },

    /// The key-set body is not a JWK set
    #[error("key set from {uri} could not be decoded: {message}")]
    Decode {
        /// Key-set endpoint
        uri: String,
        /// Parser error detail
        message: String,
    },

    /// The key set does not contain the requested key id
    #[error("no key with id `{kid}` in the published key set")]
    UnknownKey {
        /// Key id from the token header
        kid: String,
    },

    /// The JWK exists but cannot be turned into a verification key
    #[error("key `{kid}` is not usable for verification: {message}")]
    UnusableKey {
        /// Key id from the token header
        kid: String,
        /// Conversion error detail
        message: String,
    },
}

/// Reason a bearer credential was rejected
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    /// The credential could not be parsed, or its header lacks a key id
    #[error("malformed credential: {0}")]
    Malformed(String),

    /// The verification key could not be resolved
    #[error("verification key unavailable: {0}")]
    KeyUnavailable(#[from] KeySourceError),

    /// Signature, algorithm, issuer or expiry check failed
    #[error("invalid token: {0}")]
    Invalid(String),
}

impl TokenError {
    /// Internal classification, used as a structured log field
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "malformed_credential",
            Self::KeyUnavailable(_) => "key_unavailable",
            Self::Invalid(_) => "invalid_token",
        }
    }

    /// RFC 6750 error code reported to the client
    pub fn error_code(&self) -> &'static str {
        "invalid_token"
    }

    /// Human-readable description safe to send to the client
    pub fn description(&self) -> &'static str {
        match self {
            Self::Malformed(_) => "The access token is malformed",
            Self::KeyUnavailable(_) => "The access token signing key could not be verified",
            Self::Invalid(_) => "The access token is invalid or expired",
        }
    }
}
