//! MCP transport bridging
//!
//! ```text
//! request ──► classify ──► TransportBridge ──► upstream URL + forwarded headers
//!                                │
//!                                ├─ buffered: status, content-type, body verbatim
//!                                ├─ streamed: relay (bounded channel, aborts on disconnect)
//!                                └─ failure: JSON-RPC error envelope / 405 fallback
//! ```

pub mod bridge;
pub mod classify;
pub mod headers;
pub mod relay;
pub mod upstream;

pub use bridge::{TransportBridge, transport_fallback};
pub use classify::{TransportRequest, accepts_sse, classify};
pub use headers::{forward_headers, is_forwardable};
pub use relay::{relay, relay_stream};
pub use upstream::UpstreamTarget;
