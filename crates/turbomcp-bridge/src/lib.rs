//! # TurboMCP Bridge
//!
//! Authenticating transport bridge for MCP servers.
//!
//! Clients are admitted by [`turbomcp_gate`] (RS256 bearer token from a
//! trusted issuer, or a shared secret) and then bridged to one backend MCP
//! server:
//!
//! - `GET /mcp` with `Accept: text/event-stream` relays the backend event
//!   stream chunk by chunk, closing the backend connection when the client
//!   disconnects
//! - `POST /mcp?sessionId=...` forwards the JSON-RPC message to the backend
//!   messages endpoint and returns its answer verbatim
//! - other `/mcp/...` paths are proxied to the same path on the backend
//!
//! Discovery documents, a client registration stub and health endpoints are
//! served without authentication.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌──────────────────┐   ┌────────────────────┐   ┌─────────┐
//! │ MCP client  │──►│ server::router   │──►│ transport::bridge  │──►│ backend │
//! │             │◄──│  + AuthGateLayer │◄──│  classify / relay  │◄──│ (SSE)   │
//! └─────────────┘   └──────────────────┘   └────────────────────┘   └─────────┘
//! ```
//!
//! ## Example
//!
//! ```bash
//! turbomcp-bridge \
//!     --public-issuer https://mcp.example.com \
//!     --auth-server-url https://id.example.com --realm mcp \
//!     --backend-url http://127.0.0.1:8080/sse
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![allow(clippy::module_name_repetitions)]

pub mod cli;
pub mod config;
pub mod error;
pub mod server;
pub mod transport;

pub use config::BridgeConfig;
pub use error::{BridgeError, BridgeResult};
pub use server::{AppState, build_router, serve};
pub use transport::TransportBridge;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
