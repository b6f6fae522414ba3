//! HTTP surface of the bridge
//!
//! - [`router`]: route table, middleware stack and 404 fallback
//! - [`discovery`]: OAuth metadata documents and the registration stub
//! - [`health`]: liveness endpoints

pub mod discovery;
pub mod health;
pub mod router;

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::signal;
use tracing::{info, warn};
use turbomcp_gate::gate::{AuthenticationGate, GateConfig};
use turbomcp_gate::jwt::{JwksKeySource, TokenValidator};

use crate::config::BridgeConfig;
use crate::error::{BridgeError, BridgeResult};
use crate::transport::TransportBridge;

pub use router::build_router;

/// Shared state handed to every handler
#[derive(Debug, Clone)]
pub struct AppState {
    /// Startup configuration
    pub config: Arc<BridgeConfig>,
    /// Admission gate for the MCP routes
    pub gate: Arc<AuthenticationGate>,
    /// Backend forwarding
    pub bridge: Arc<TransportBridge>,
}

impl AppState {
    /// Build gate and bridge from a validated configuration
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if the configuration is inconsistent or an HTTP
    /// client cannot be built.
    pub fn from_config(config: BridgeConfig) -> BridgeResult<Self> {
        config.validate()?;

        let gate = build_gate(&config)?;
        let denied_headers = vec![gate.config().api_key_header().clone()];
        let bridge = TransportBridge::new(&config.backend, config.max_body_bytes, denied_headers)?;

        Ok(Self {
            config: Arc::new(config),
            gate: Arc::new(gate),
            bridge: Arc::new(bridge),
        })
    }
}

fn build_gate(config: &BridgeConfig) -> BridgeResult<AuthenticationGate> {
    let auth = &config.auth;

    let mut gate_config = GateConfig::new(auth.realm.clone()).with_auth_disabled(auth.disabled);
    if let Some(secret) = &auth.api_key {
        gate_config = gate_config.with_shared_secret(secret.clone());
    }

    let validator = match (config.token_validation_enabled(), auth.jwks_uri(), auth.issuer()) {
        (true, Some(jwks_uri), Some(issuer)) => {
            info!(%jwks_uri, %issuer, "Bearer token validation enabled");
            let source = JwksKeySource::new(jwks_uri, auth.jwks.clone())?;
            Some(TokenValidator::new(issuer, Arc::new(source)))
        }
        _ => None,
    };

    Ok(AuthenticationGate::new(gate_config, validator))
}

/// Bind the configured address and serve until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns `BridgeError` if the address cannot be bound or the server fails.
pub async fn serve(state: AppState) -> BridgeResult<()> {
    let bind = state.config.bind;
    let listener = TcpListener::bind(bind).await.map_err(|e| {
        BridgeError::configuration_with_key(format!("failed to bind {bind}: {e}"), "bind")
    })?;
    serve_on(listener, state).await
}

/// Serve on an already bound listener until Ctrl-C or SIGTERM
///
/// # Errors
///
/// Returns `BridgeError::Io` if the server fails.
pub async fn serve_on(listener: TcpListener, state: AppState) -> BridgeResult<()> {
    let address: SocketAddr = listener.local_addr()?;
    info!(
        %address,
        backend = %state.config.backend.url,
        auth_enabled = !state.config.auth.disabled,
        "Bridge listening"
    );

    axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Bridge shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!(error = %e, "Failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            info!("Received Ctrl+C signal");
        },
        () = terminate => {
            info!("Received SIGTERM signal");
        },
    }
}
