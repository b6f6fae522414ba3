//! Request classification
//!
//! Maps an inbound request onto one of the transport behaviours the bridge
//! implements. Pure: no I/O, no configuration.

use http::header::ACCEPT;
use http::{HeaderMap, Method};

/// Media type of Server-Sent Events
pub const SSE_MEDIA_TYPE: &str = "text/event-stream";

/// Query parameter naming the backend session
pub const SESSION_ID_PARAM: &str = "sessionId";

/// Prefix of the gated MCP surface
pub const MCP_PREFIX: &str = "/mcp";

/// Path of the messages endpoint on the bridge
pub const MESSAGES_PATH: &str = "/mcp/messages";

/// What the bridge should do with a request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransportRequest {
    /// `GET` asking for `text/event-stream`: relay the backend stream
    StreamOpen,
    /// `POST` asking for SSE without a session: tell the client to open the stream first
    CallWithoutSession,
    /// `POST` carrying a session: forward to the backend messages endpoint
    CallWithSession {
        /// Backend session id
        session_id: String,
    },
    /// Plain JSON-RPC `POST` without a session
    StatelessCall,
    /// Anything under `/mcp/` other than the messages endpoint
    SubPath {
        /// Path with the `/mcp` prefix removed
        path: String,
        /// Query string, verbatim
        query: Option<String>,
    },
    /// Method/Accept combination the primary endpoint does not serve
    Unsupported,
}

impl TransportRequest {
    /// Short name for logs
    pub fn kind(&self) -> &'static str {
        match self {
            Self::StreamOpen => "stream_open",
            Self::CallWithoutSession => "call_without_session",
            Self::CallWithSession { .. } => "call_with_session",
            Self::StatelessCall => "stateless_call",
            Self::SubPath { .. } => "sub_path",
            Self::Unsupported => "unsupported",
        }
    }
}

/// Whether any `Accept` value lists `text/event-stream`
pub fn accepts_sse(headers: &HeaderMap) -> bool {
    headers
        .get_all(ACCEPT)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(','))
        .filter_map(|range| range.split(';').next())
        .any(|media| media.trim().eq_ignore_ascii_case(SSE_MEDIA_TYPE))
}

/// Whether `Accept` is exactly `text/event-stream`
pub fn accept_is_exactly_sse(headers: &HeaderMap) -> bool {
    headers
        .get(ACCEPT)
        .and_then(|value| value.to_str().ok())
        .is_some_and(|value| value.trim().eq_ignore_ascii_case(SSE_MEDIA_TYPE))
}

/// Non-empty `sessionId` from a query string
pub fn session_id(query: Option<&str>) -> Option<String> {
    url::form_urlencoded::parse(query?.as_bytes())
        .find(|(name, _)| name == SESSION_ID_PARAM)
        .map(|(_, value)| value.into_owned())
        .filter(|value| !value.is_empty())
}

/// Classify a request by method, path, headers and query
pub fn classify(
    method: &Method,
    path: &str,
    headers: &HeaderMap,
    query: Option<&str>,
) -> TransportRequest {
    match path {
        "/" | MCP_PREFIX => classify_primary(method, headers, query),
        MESSAGES_PATH if method == Method::POST => classify_call(headers, query),
        _ => match path.strip_prefix(MCP_PREFIX) {
            Some(rest) if rest.starts_with('/') => TransportRequest::SubPath {
                path: rest.to_string(),
                query: query.map(str::to_string),
            },
            _ => TransportRequest::Unsupported,
        },
    }
}

fn classify_primary(method: &Method, headers: &HeaderMap, query: Option<&str>) -> TransportRequest {
    if method == Method::GET && accept_is_exactly_sse(headers) {
        TransportRequest::StreamOpen
    } else if method == Method::POST {
        classify_call(headers, query)
    } else {
        TransportRequest::Unsupported
    }
}

fn classify_call(headers: &HeaderMap, query: Option<&str>) -> TransportRequest {
    match session_id(query) {
        Some(session_id) => TransportRequest::CallWithSession { session_id },
        None if accepts_sse(headers) => TransportRequest::CallWithoutSession,
        None => TransportRequest::StatelessCall,
    }
}
