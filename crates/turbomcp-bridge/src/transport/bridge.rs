//! Transport bridge
//!
//! Turns one admitted client request into at most one backend request and
//! shapes the backend's answer (or failure) into the client response.

use std::time::Duration;

use axum::Json;
use axum::body::Body;
use axum::response::{IntoResponse, Response};
use bytes::Bytes;
use http::header::{ACCEPT, CACHE_CONTROL, CONTENT_TYPE, HeaderName};
use http::{HeaderMap, HeaderValue, Request, StatusCode, request::Parts};
use secrecy::{ExposeSecret, SecretString};
use serde_json::Value;
use tracing::{debug, warn};
use turbomcp_gate::Identity;

use super::classify::{SSE_MEDIA_TYPE, TransportRequest, accepts_sse, classify};
use super::headers::{forward_headers, is_relayable_response_header};
use super::relay::relay;
use super::upstream::UpstreamTarget;
use crate::config::BackendSettings;
use crate::error::{BridgeError, BridgeResult, request_id, transport_fallback_body};

/// Connect timeout for backend requests
pub const BACKEND_CONNECT_TIMEOUT: Duration = Duration::from_secs(10);

/// Which failure status applies to a forwarded call
#[derive(Debug, Clone, Copy)]
enum Route {
    /// `/`, `/mcp`, `/mcp/messages`
    Primary,
    /// Everything else under `/mcp/`
    SubPath,
}

impl Route {
    fn network_failure_status(self) -> StatusCode {
        match self {
            Self::Primary => StatusCode::INTERNAL_SERVER_ERROR,
            Self::SubPath => StatusCode::BAD_GATEWAY,
        }
    }
}

/// Forwards classified requests to the backend
#[derive(Debug, Clone)]
pub struct TransportBridge {
    client: reqwest::Client,
    target: UpstreamTarget,
    backend_token: Option<SecretString>,
    upstream_timeout: Option<Duration>,
    stream_buffer: usize,
    max_body_bytes: usize,
    denied_headers: Vec<HeaderName>,
}

impl TransportBridge {
    /// Create a bridge for `backend`
    ///
    /// `denied_headers` are never forwarded on sub-path calls, in addition to
    /// the built-in hop-by-hop and credential headers.
    ///
    /// # Errors
    ///
    /// Returns `BridgeError::Configuration` if the HTTP client cannot be built.
    pub fn new(
        backend: &BackendSettings,
        max_body_bytes: usize,
        denied_headers: Vec<HeaderName>,
    ) -> BridgeResult<Self> {
        let client = reqwest::Client::builder()
            .connect_timeout(BACKEND_CONNECT_TIMEOUT)
            .redirect(reqwest::redirect::Policy::none())
            .user_agent(concat!("turbomcp-bridge/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| BridgeError::configuration_with_key(e.to_string(), "backend_url"))?;

        Ok(Self {
            client,
            target: UpstreamTarget::new(backend.url.clone()),
            backend_token: backend.token.clone(),
            upstream_timeout: backend.timeout,
            stream_buffer: backend.stream_buffer,
            max_body_bytes,
            denied_headers,
        })
    }

    /// Handle one admitted request
    pub async fn handle(&self, request: Request<Body>) -> Response {
        let (parts, body) = request.into_parts();
        let transport = classify(&parts.method, parts.uri.path(), &parts.headers, parts.uri.query());

        debug!(
            kind = transport.kind(),
            method = %parts.method,
            path = %parts.uri.path(),
            identity = parts.extensions.get::<Identity>().map_or("-", |identity| identity.name.as_str()),
            "Bridging request"
        );

        match transport {
            TransportRequest::StreamOpen => self.open_stream().await,
            TransportRequest::CallWithSession { session_id } => {
                self.forward_call(&parts, body, Some(&session_id)).await
            }
            TransportRequest::StatelessCall => self.forward_call(&parts, body, None).await,
            TransportRequest::SubPath { path, query } => {
                self.forward_sub_path(&parts, body, &path, query.as_deref()).await
            }
            TransportRequest::CallWithoutSession | TransportRequest::Unsupported => {
                debug!(
                    method = %parts.method,
                    path = %parts.uri.path(),
                    "Transport fallback: client must open the event stream first"
                );
                transport_fallback()
            }
        }
    }

    async fn open_stream(&self) -> Response {
        let request = self
            .client
            .get(self.target.stream_url())
            .header(ACCEPT, SSE_MEDIA_TYPE);

        match self.with_backend_token(request).send().await {
            Ok(response) if response.status().is_success() => {
                debug!(status = %response.status(), "Backend event stream opened");
                self.streamed(response)
            }
            Ok(response) => {
                let status = response.status();
                warn!(%status, "Backend refused event stream");
                jsonrpc_failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &BridgeError::upstream_status(status.as_u16(), "event stream"),
                    Value::Null,
                )
            }
            Err(e) => {
                warn!(error = %e, "Backend unreachable for event stream");
                jsonrpc_failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &BridgeError::upstream_unreachable(e.to_string()),
                    Value::Null,
                )
            }
        }
    }

    async fn forward_call(&self, parts: &Parts, body: Body, session_id: Option<&str>) -> Response {
        let body = match self.read_body(body).await {
            Ok(body) => body,
            Err(response) => return response,
        };
        let id = request_id(&body);
        let wants_sse = accepts_sse(&parts.headers);

        let mut request = self
            .client
            .post(self.target.messages_url(session_id))
            .header(CONTENT_TYPE, "application/json");
        if let Some(accept) = parts.headers.get(ACCEPT) {
            request = request.header(ACCEPT, accept.clone());
        }
        let request = self.with_timeout(self.with_backend_token(request), wants_sse).body(body);

        match request.send().await {
            Ok(response) if response.status() == StatusCode::NOT_FOUND && wants_sse => {
                debug!(session = session_id, "Backend has no such session, falling back");
                transport_fallback()
            }
            Ok(response) if response.status().is_success() => {
                let stream = wants_sse && is_event_stream(response.headers());
                self.respond(response, stream, Route::Primary, id).await
            }
            Ok(response) => {
                let status = response.status();
                warn!(%status, session = session_id, "Backend rejected message");
                jsonrpc_failure(
                    StatusCode::INTERNAL_SERVER_ERROR,
                    &BridgeError::upstream_status(status.as_u16(), "messages"),
                    id,
                )
            }
            Err(e) => {
                warn!(error = %e, session = session_id, "Backend unreachable for message");
                jsonrpc_failure(
                    Route::Primary.network_failure_status(),
                    &BridgeError::upstream_unreachable(e.to_string()),
                    id,
                )
            }
        }
    }

    async fn forward_sub_path(
        &self,
        parts: &Parts,
        body: Body,
        path: &str,
        query: Option<&str>,
    ) -> Response {
        let body = match self.read_body(body).await {
            Ok(body) => body,
            Err(response) => return response,
        };
        let id = request_id(&body);
        let wants_sse = accepts_sse(&parts.headers);

        let mut request = self
            .client
            .request(parts.method.clone(), self.target.sub_path_url(path, query))
            .headers(forward_headers(&parts.headers, &self.denied_headers));
        if !body.is_empty() {
            request = request.body(body);
        }
        let request = self.with_timeout(self.with_backend_token(request), wants_sse);

        match request.send().await {
            Ok(response) if response.status() == StatusCode::NOT_FOUND && wants_sse => {
                debug!(path, "Backend has no such path for event-stream client, falling back");
                transport_fallback()
            }
            Ok(response) => self.respond(response, wants_sse, Route::SubPath, id).await,
            Err(e) => {
                warn!(error = %e, path, "Backend unreachable for sub-path request");
                jsonrpc_failure(
                    Route::SubPath.network_failure_status(),
                    &BridgeError::upstream_unreachable(e.to_string()),
                    id,
                )
            }
        }
    }

    /// Relay as a live stream, or buffer status, headers and body
    async fn respond(
        &self,
        response: reqwest::Response,
        stream: bool,
        route: Route,
        id: Value,
    ) -> Response {
        if stream {
            return self.streamed(response);
        }

        let status = response.status();
        let headers = relayable_headers(response.headers());
        match response.bytes().await {
            Ok(bytes) => {
                let mut buffered = Response::new(Body::from(bytes));
                *buffered.status_mut() = status;
                *buffered.headers_mut() = headers;
                buffered
            }
            Err(e) => {
                warn!(error = %e, %status, "Backend response body failed");
                jsonrpc_failure(
                    route.network_failure_status(),
                    &BridgeError::upstream_unreachable(e.to_string()),
                    id,
                )
            }
        }
    }

    fn streamed(&self, response: reqwest::Response) -> Response {
        let status = response.status();
        let mut headers = relayable_headers(response.headers());
        headers.insert(CACHE_CONTROL, HeaderValue::from_static("no-cache"));

        let mut streamed = Response::new(relay(response, self.stream_buffer));
        *streamed.status_mut() = status;
        *streamed.headers_mut() = headers;
        streamed
    }

    async fn read_body(&self, body: Body) -> Result<Bytes, Response> {
        axum::body::to_bytes(body, self.max_body_bytes)
            .await
            .map_err(|e| {
                debug!(error = %e, "Request body rejected");
                jsonrpc_failure(
                    StatusCode::PAYLOAD_TOO_LARGE,
                    &BridgeError::PayloadTooLarge {
                        limit: self.max_body_bytes,
                    },
                    Value::Null,
                )
            })
    }

    fn with_backend_token(&self, request: reqwest::RequestBuilder) -> reqwest::RequestBuilder {
        match &self.backend_token {
            Some(token) => request.bearer_auth(token.expose_secret()),
            None => request,
        }
    }

    /// Streams are never timed out
    fn with_timeout(&self, request: reqwest::RequestBuilder, wants_sse: bool) -> reqwest::RequestBuilder {
        match self.upstream_timeout {
            Some(timeout) if !wants_sse => request.timeout(timeout),
            _ => request,
        }
    }
}

fn is_event_stream(headers: &HeaderMap) -> bool {
    headers
        .get(CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| value.split(';').next())
        .is_some_and(|media| media.trim().eq_ignore_ascii_case(SSE_MEDIA_TYPE))
}

fn relayable_headers(upstream: &HeaderMap) -> HeaderMap {
    upstream
        .iter()
        .filter(|(name, _)| is_relayable_response_header(name))
        .map(|(name, value)| (name.clone(), value.clone()))
        .collect()
}

fn jsonrpc_failure(status: StatusCode, error: &BridgeError, id: Value) -> Response {
    (status, Json(error.to_jsonrpc(id))).into_response()
}

/// 405 telling the client to open the event stream first
pub fn transport_fallback() -> Response {
    (StatusCode::METHOD_NOT_ALLOWED, Json(transport_fallback_body())).into_response()
}
