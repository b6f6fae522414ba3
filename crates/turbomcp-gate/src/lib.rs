//! # TurboMCP Gate
//!
//! Admission control for TurboMCP bridges: a request is let through if it
//! carries a valid RS256 bearer token from the expected issuer, or the
//! configured shared secret.
//!
//! ## Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │  tower::AuthGateLayer / AuthGateService    │  401 + WWW-Authenticate
//! └─────────────────────┬──────────────────────┘
//!                       │
//! ┌─────────────────────▼──────────────────────┐
//! │  gate::AuthenticationGate                  │  bypass → bearer → secret
//! └──────────┬──────────────────────┬──────────┘
//!            │                      │
//! ┌──────────▼──────────┐  ┌────────▼─────────┐
//! │ jwt::TokenValidator │  │ secret (blake3 + │
//! │ jwt::JwksKeySource  │  │  constant time)  │
//! └─────────────────────┘  └──────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use secrecy::SecretString;
//! use turbomcp_gate::gate::{AuthenticationGate, GateConfig};
//! use turbomcp_gate::jwt::{JwksKeySource, JwksSettings, TokenValidator, keycloak_jwks_uri};
//! use turbomcp_gate::tower::AuthGateLayer;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let keys = JwksKeySource::new(
//!     keycloak_jwks_uri("https://id.example.com", "mcp"),
//!     JwksSettings::default(),
//! )?;
//! let validator = TokenValidator::new("https://id.example.com/realms/mcp", Arc::new(keys));
//!
//! let config = GateConfig::new("mcp").with_shared_secret(SecretString::from("s3cret".to_string()));
//! let layer = AuthGateLayer::new(AuthenticationGate::new(config, Some(validator)));
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod challenge;
pub mod error;
pub mod gate;
pub mod jwt;
pub mod secret;
pub mod tower;

pub use error::{KeySourceError, TokenError};
pub use gate::{AuthMethod, AuthenticationGate, Denial, GateConfig, Identity};
pub use jwt::{Claims, JwksKeySource, JwksSettings, SigningKeySource, TokenValidator};
