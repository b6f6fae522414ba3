//! # Tower middleware for the admission gate
//!
//! - [`AuthGateLayer`] - wraps a service with [`AuthenticationGate`](crate::gate::AuthenticationGate)
//! - [`AuthGateService`] - runs the gate, then either forwards or answers 401
//!
//! ## Usage
//!
//! ```rust,ignore
//! use tower::ServiceBuilder;
//! use turbomcp_gate::tower::AuthGateLayer;
//!
//! let service = ServiceBuilder::new()
//!     .layer(AuthGateLayer::new(gate))
//!     .service(my_http_handler);
//! ```
//!
//! ## Request Extensions
//!
//! On admission the [`Identity`](crate::gate::Identity) is inserted into the
//! request's extensions:
//!
//! ```rust,ignore
//! if let Some(identity) = req.extensions().get::<Identity>() {
//!     println!("admitted: {}", identity.name);
//! }
//! ```

mod layer;
mod service;

pub use layer::AuthGateLayer;
pub use service::{AuthGateFuture, AuthGateService};
