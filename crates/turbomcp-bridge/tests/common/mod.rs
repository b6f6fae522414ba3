//! Shared fixtures for bridge scenario tests

#![allow(dead_code)]

use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use axum::body::Body;
use http::{Request, Response};
use secrecy::SecretString;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::oneshot;
use tower::ServiceExt;
use turbomcp_bridge::cli::BridgeArgs;
use turbomcp_bridge::config::BridgeConfig;
use turbomcp_bridge::{AppState, build_router};

/// Shared secret configured on every test bridge
pub const API_KEY: &str = "scenario-shared-secret";

/// Token the bridge presents to the backend
pub const BACKEND_TOKEN: &str = "backend-service-token";

/// Bridge configuration pointing at `backend_url`, authenticated by [`API_KEY`]
pub fn config(backend_url: &str) -> BridgeConfig {
    use clap::Parser;

    #[derive(Parser)]
    struct Harness {
        #[command(flatten)]
        args: BridgeArgs,
    }

    let mut config = Harness::try_parse_from([
        "turbomcp-bridge",
        "--public-issuer",
        "https://bridge.example.com",
        "--auth-server-url",
        "https://id.example.com",
        "--backend-url",
        backend_url,
        "--upstream-timeout-secs",
        "5",
    ])
    .unwrap()
    .args
    .into_config()
    .unwrap();
    config.auth.api_key = Some(SecretString::from(API_KEY.to_string()));
    config.backend.token = Some(SecretString::from(BACKEND_TOKEN.to_string()));
    config
}

/// Router for a configuration
pub fn router(config: BridgeConfig) -> Router {
    build_router(AppState::from_config(config).unwrap())
}

/// Send one request through a fresh router
pub async fn send(config: BridgeConfig, request: Request<Body>) -> Response<Body> {
    router(config).oneshot(request).await.unwrap()
}

/// Collect a response body
pub async fn body_bytes(response: Response<Body>) -> bytes::Bytes {
    axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap()
}

/// Collect a JSON response body
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

/// Serve a router on an ephemeral port
pub async fn spawn_bridge(config: BridgeConfig) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap();
    let app = router(config);
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    address
}

/// Hand-rolled SSE backend
///
/// Answers the first connection with a chunked event stream. Each chunk
/// is written after the previous one, with `pause` in between, until the
/// peer goes away. `closed` fires once a write fails or the peer closes.
pub struct StreamingBackend {
    pub address: SocketAddr,
    pub request_head: oneshot::Receiver<String>,
    pub closed: oneshot::Receiver<()>,
}

impl StreamingBackend {
    pub async fn start(chunks: Vec<&'static str>, pause: Duration, keep_open: bool) -> Self {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = listener.local_addr().unwrap();
        let (head_tx, request_head) = oneshot::channel();
        let (closed_tx, closed) = oneshot::channel();

        tokio::spawn(async move {
            let (mut socket, _) = listener.accept().await.unwrap();
            let head = read_head(&mut socket).await;
            let _ = head_tx.send(head);

            let preamble = "HTTP/1.1 200 OK\r\n\
                            content-type: text/event-stream\r\n\
                            transfer-encoding: chunked\r\n\
                            connection: close\r\n\r\n";
            if socket.write_all(preamble.as_bytes()).await.is_err() {
                let _ = closed_tx.send(());
                return;
            }

            for chunk in chunks {
                let frame = format!("{:x}\r\n{chunk}\r\n", chunk.len());
                if socket.write_all(frame.as_bytes()).await.is_err() {
                    let _ = closed_tx.send(());
                    return;
                }
                tokio::time::sleep(pause).await;
            }

            if !keep_open {
                let _ = socket.write_all(b"0\r\n\r\n").await;
                return;
            }

            // Heartbeats until the bridge drops the connection
            loop {
                let frame = ": keep-alive\n\n";
                let frame = format!("{:x}\r\n{frame}\r\n", frame.len());
                if socket.write_all(frame.as_bytes()).await.is_err() {
                    break;
                }
                let mut probe = [0u8; 1];
                match tokio::time::timeout(pause, socket.read(&mut probe)).await {
                    Ok(Ok(0) | Err(_)) => break,
                    _ => {}
                }
            }
            let _ = closed_tx.send(());
        });

        Self {
            address,
            request_head,
            closed,
        }
    }

    pub fn url(&self) -> String {
        format!("http://{}/sse", self.address)
    }
}

async fn read_head(socket: &mut TcpStream) -> String {
    let mut head = Vec::new();
    let mut buf = [0u8; 1024];
    while !head.windows(4).any(|w| w == b"\r\n\r\n") {
        let n = socket.read(&mut buf).await.unwrap();
        if n == 0 {
            break;
        }
        head.extend_from_slice(&buf[..n]);
    }
    String::from_utf8_lossy(&head).into_owned()
}
