//! Command-line interface for turbomcp-bridge
//!
//! ```text
//! cli/
//! ├── args.rs       # Bridge settings (flags + BRIDGE_* env)
//! └── error.rs      # User-friendly error display
//! ```

pub mod args;
pub mod error;

use std::io::IsTerminal;

use clap::{Parser, ValueEnum};
use tracing_subscriber::EnvFilter;

use crate::error::BridgeResult;
use crate::server::{AppState, serve};

pub use args::BridgeArgs;

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    /// Human-readable
    Pretty,
    /// One JSON object per line
    Json,
}

/// turbomcp-bridge - authenticating MCP transport bridge
///
/// Admits clients with a bearer token or shared secret and bridges them to
/// a backend MCP server over SSE and JSON-RPC.
#[derive(Parser, Debug)]
#[command(
    name = "turbomcp-bridge",
    version,
    about = "Authenticating MCP transport bridge - SSE pass-through and JSON-RPC forwarding",
    long_about = "Puts bearer-token (RS256/JWKS) or shared-secret admission in front of a\n\
                  backend MCP server and bridges SSE streams and JSON-RPC calls to it.",
    author
)]
pub struct Cli {
    /// Bridge settings
    #[command(flatten)]
    pub bridge: BridgeArgs,

    /// Enable verbose logging (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log output format
    #[arg(long, value_enum, default_value = "pretty", env = "BRIDGE_LOG_FORMAT")]
    pub log_format: LogFormat,
}

impl Cli {
    /// Run the bridge until shutdown
    ///
    /// # Errors
    ///
    /// Returns `BridgeError` if configuration is invalid or the server fails.
    pub async fn execute(self) -> BridgeResult<()> {
        self.init_tracing();

        let config = self.bridge.into_config()?;
        let state = AppState::from_config(config)?;
        serve(state).await
    }

    /// Filter used when `RUST_LOG` is unset
    fn default_directive(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "info",
            1 => "debug",
            _ => "trace",
        }
    }

    /// Initialize tracing subscriber; `RUST_LOG` overrides the verbosity flags
    fn init_tracing(&self) {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.default_directive()));

        let builder = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .with_writer(std::io::stderr);

        let result = match self.log_format {
            LogFormat::Pretty => builder
                .with_ansi(std::io::stderr().is_terminal())
                .try_init(),
            LogFormat::Json => builder.json().try_init(),
        };

        if let Err(e) = result {
            eprintln!("tracing already initialized: {e}");
        }
    }
}
