//! Tower Layer for the admission gate

use std::sync::Arc;
use tower::Layer;

use super::service::AuthGateService;
use crate::gate::AuthenticationGate;

/// Tower Layer that puts an [`AuthenticationGate`] in front of a service
#[derive(Debug, Clone)]
pub struct AuthGateLayer {
    gate: Arc<AuthenticationGate>,
}

impl AuthGateLayer {
    /// Create a layer owning `gate`
    pub fn new(gate: AuthenticationGate) -> Self {
        Self::from_arc(Arc::new(gate))
    }

    /// Create a layer sharing an existing gate
    pub fn from_arc(gate: Arc<AuthenticationGate>) -> Self {
        Self { gate }
    }

    /// The wrapped gate
    pub fn gate(&self) -> &AuthenticationGate {
        &self.gate
    }
}

impl<S> Layer<S> for AuthGateLayer {
    type Service = AuthGateService<S>;

    fn layer(&self, inner: S) -> Self::Service {
        AuthGateService::new(inner, Arc::clone(&self.gate))
    }
}
