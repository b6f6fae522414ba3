//! Tower Service implementation for the admission gate
//!
//! Works with any `Service<http::Request<B>>` whose response body can be
//! built from a `String` (axum's `Body`, `String`, `Full<Bytes>` ...):
//!
//! - admitted requests get an [`Identity`](crate::gate::Identity) extension and
//!   are forwarded
//! - denied requests are answered with 401 and never reach the inner service

use std::sync::Arc;
use std::task::{Context, Poll};

use futures::future::BoxFuture;
use tower::Service;

use crate::gate::AuthenticationGate;

/// Tower Service that runs the admission gate before the inner service
#[derive(Debug, Clone)]
pub struct AuthGateService<S> {
    inner: S,
    gate: Arc<AuthenticationGate>,
}

impl<S> AuthGateService<S> {
    /// Create a new gate service
    pub fn new(inner: S, gate: Arc<AuthenticationGate>) -> Self {
        Self { inner, gate }
    }
}

/// Future type for gate service responses
pub type AuthGateFuture<T, E> = BoxFuture<'static, Result<T, E>>;

impl<S, B, ResBody> Service<http::Request<B>> for AuthGateService<S>
where
    S: Service<http::Request<B>, Response = http::Response<ResBody>> + Clone + Send + 'static,
    S::Future: Send,
    B: Send + 'static,
    ResBody: From<String>,
{
    type Response = http::Response<ResBody>;
    type Error = S::Error;
    type Future = AuthGateFuture<Self::Response, Self::Error>;

    fn poll_ready(&mut self, cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        self.inner.poll_ready(cx)
    }

    fn call(&mut self, req: http::Request<B>) -> Self::Future {
        // The clone is not ready; keep the ready one for this call
        let clone = self.inner.clone();
        let mut inner = std::mem::replace(&mut self.inner, clone);
        let gate = Arc::clone(&self.gate);

        Box::pin(async move {
            let (mut parts, body) = req.into_parts();
            match gate.authorize(&parts).await {
                Ok(identity) => {
                    parts.extensions.insert(identity);
                    inner.call(http::Request::from_parts(parts, body)).await
                }
                Err(denial) => Ok(denial.into_response(gate.realm())),
            }
        })
    }
}
