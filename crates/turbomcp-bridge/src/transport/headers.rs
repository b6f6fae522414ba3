//! Header forwarding policy

use http::header::{AUTHORIZATION, CONTENT_LENGTH, HOST, HeaderName};
use http::HeaderMap;

/// Hop-by-hop headers (RFC 9110 §7.6.1) plus legacy variants
const HOP_BY_HOP: [&str; 7] = [
    "connection",
    "keep-alive",
    "proxy-connection",
    "transfer-encoding",
    "te",
    "trailer",
    "upgrade",
];

fn is_hop_by_hop(name: &HeaderName) -> bool {
    HOP_BY_HOP.contains(&name.as_str())
}

/// Whether an inbound request header may be sent to the backend
///
/// `extra_denied` holds deployment-specific names such as the shared-secret header.
pub fn is_forwardable(name: &HeaderName, extra_denied: &[HeaderName]) -> bool {
    let denied = [HOST, CONTENT_LENGTH, AUTHORIZATION];
    !(denied.contains(name) || is_hop_by_hop(name) || extra_denied.contains(name))
}

/// Upstream request headers for a forwarded request
pub fn forward_headers(inbound: &HeaderMap, extra_denied: &[HeaderName]) -> HeaderMap {
    inbound
        .iter()
        .filter(|(name, _)| is_forwardable(name, extra_denied))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

/// Whether a backend response header may be relayed to the client
pub fn is_relayable_response_header(name: &HeaderName) -> bool {
    name != CONTENT_LENGTH && !is_hop_by_hop(name)
}
