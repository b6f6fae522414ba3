//! Error types for turbomcp-bridge
//!
//! - [`BridgeError`]: startup and proxying failures
//! - JSON-RPC error envelope used when a proxied call fails
//! - Transport-fallback body used to tell clients to open the SSE stream first

use serde::Serialize;
use serde_json::{Value, json};
use thiserror::Error;

/// Result type for bridge operations
pub type BridgeResult<T> = std::result::Result<T, BridgeError>;

/// JSON-RPC "Internal error" code
pub const JSONRPC_INTERNAL_ERROR: i64 = -32603;

/// Main error type for turbomcp-bridge
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum BridgeError {
    /// Configuration error
    ///
    /// Invalid bridge configuration (missing or malformed values).
    #[error("Configuration error: {message}")]
    Configuration {
        /// What is wrong
        message: String,
        /// Setting at fault
        key: Option<String>,
    },

    /// The backend could not be reached (connect failure, timeout, reset)
    #[error("Backend unreachable: {message}")]
    UpstreamUnreachable {
        /// HTTP client error detail, logged only
        message: String,
    },

    /// The backend answered with a non-success status
    #[error("Backend returned status {status}")]
    Upstream {
        /// Backend status code
        status: u16,
        /// Which backend call failed
        message: String,
    },

    /// The client request body exceeds the configured limit
    #[error("Request body exceeds {limit} bytes")]
    PayloadTooLarge {
        /// Configured limit in bytes
        limit: usize,
    },

    /// Key-set configuration error from the gate
    #[error("Key source error: {0}")]
    KeySource(#[from] turbomcp_gate::KeySourceError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BridgeError {
    /// Create a configuration error
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            key: None,
        }
    }

    /// Create a configuration error with key context
    pub fn configuration_with_key(message: impl Into<String>, key: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
            key: Some(key.into()),
        }
    }

    /// Create an unreachable-backend error
    pub fn upstream_unreachable(message: impl Into<String>) -> Self {
        Self::UpstreamUnreachable {
            message: message.into(),
        }
    }

    /// Create a backend status error
    pub fn upstream_status(status: u16, message: impl Into<String>) -> Self {
        Self::Upstream {
            status,
            message: message.into(),
        }
    }

    /// Sanitize error message for client responses
    ///
    /// Never includes backend addresses or credentials.
    pub fn sanitize(&self) -> String {
        match self {
            Self::Configuration { .. } => "Configuration error".to_string(),
            Self::UpstreamUnreachable { .. } => "Backend unreachable".to_string(),
            Self::Upstream { status, .. } => format!("Backend returned status {status}"),
            Self::PayloadTooLarge { .. } => "Request body too large".to_string(),
            Self::KeySource(_) => "Key source error".to_string(),
            Self::Serialization(_) => "Data serialization error".to_string(),
            Self::Io(_) => "IO error occurred".to_string(),
        }
    }

    /// JSON-RPC error envelope for this failure, echoing the caller's request id
    pub fn to_jsonrpc(&self, id: Value) -> JsonRpcErrorResponse {
        JsonRpcErrorResponse::internal(self.sanitize(), id)
    }
}

/// Extension trait for Result types to add bridge error context
pub trait BridgeErrorExt<T> {
    /// Add configuration context to error
    fn config_context(self, key: impl Into<String>) -> BridgeResult<T>;
}

impl<T, E> BridgeErrorExt<T> for Result<T, E>
where
    E: std::error::Error + Send + Sync + 'static,
{
    fn config_context(self, key: impl Into<String>) -> BridgeResult<T> {
        self.map_err(|e| BridgeError::configuration_with_key(e.to_string(), key.into()))
    }
}

/// JSON-RPC 2.0 error object
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JsonRpcErrorObject {
    /// Error code
    pub code: i64,
    /// Short message
    pub message: String,
    /// Detail
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
}

/// JSON-RPC 2.0 error response
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct JsonRpcErrorResponse {
    /// Always "2.0"
    pub jsonrpc: &'static str,
    /// Error object
    pub error: JsonRpcErrorObject,
    /// Id of the failed request, or null
    pub id: Value,
}

impl JsonRpcErrorResponse {
    /// `-32603 Internal error` with `detail` as data
    pub fn internal(detail: impl Into<String>, id: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            error: JsonRpcErrorObject {
                code: JSONRPC_INTERNAL_ERROR,
                message: "Internal error".to_string(),
                data: Some(Value::String(detail.into())),
            },
            id,
        }
    }
}

/// Id of a JSON-RPC request body, or null when absent or unparsable
///
/// Only string, number and null ids are echoed.
pub fn request_id(body: &[u8]) -> Value {
    serde_json::from_slice::<Value>(body)
        .ok()
        .and_then(|value| value.get("id").cloned())
        .filter(|id| id.is_string() || id.is_number())
        .unwrap_or(Value::Null)
}

/// Body of the 405 transport-fallback response
pub fn transport_fallback_body() -> Value {
    json!({
        "error": "method_not_allowed",
        "message": "Use GET for SSE connection",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_jsonrpc_envelope_shape() {
        let envelope = BridgeError::upstream_unreachable("connect refused 10.0.0.7:8080")
            .to_jsonrpc(json!(7));

        assert_eq!(
            serde_json::to_value(&envelope).unwrap(),
            json!({
                "jsonrpc": "2.0",
                "error": {
                    "code": -32603,
                    "message": "Internal error",
                    "data": "Backend unreachable"
                },
                "id": 7
            })
        );
    }

    #[test]
    fn test_request_id_extraction() {
        assert_eq!(request_id(br#"{"jsonrpc":"2.0","id":"abc","method":"x"}"#), json!("abc"));
        assert_eq!(request_id(br#"{"jsonrpc":"2.0","id":3}"#), json!(3));
        assert_eq!(request_id(br#"{"jsonrpc":"2.0","method":"notify"}"#), Value::Null);
        assert_eq!(request_id(br#"{"id":{"nested":true}}"#), Value::Null);
        assert_eq!(request_id(b"not json"), Value::Null);
        assert_eq!(request_id(b""), Value::Null);
    }

    #[test]
    fn test_sanitize_hides_backend_details() {
        let error = BridgeError::upstream_status(502, "http://10.0.0.7:8080/messages");
        assert_eq!(error.sanitize(), "Backend returned status 502");
    }

    #[test]
    fn test_oversized_body_is_reported_as_such() {
        let error = BridgeError::PayloadTooLarge { limit: 1024 };
        assert_eq!(error.to_string(), "Request body exceeds 1024 bytes");
        assert_eq!(
            error.to_jsonrpc(Value::Null).error.data,
            Some(json!("Request body too large"))
        );
    }

    #[test]
    fn test_config_context() {
        let result: BridgeResult<url::Url> = url::Url::parse("not a url").config_context("backend_url");
        match result {
            Err(BridgeError::Configuration { key, .. }) => assert_eq!(key.as_deref(), Some("backend_url")),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_transport_fallback_body() {
        assert_eq!(
            transport_fallback_body().to_string(),
            r#"{"error":"method_not_allowed","message":"Use GET for SSE connection"}"#
        );
    }
}
