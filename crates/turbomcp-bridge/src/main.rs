//! turbomcp-bridge entry point

#![warn(clippy::all)]

use clap::Parser;

#[tokio::main]
async fn main() {
    let cli = turbomcp_bridge::cli::Cli::parse();

    if let Err(e) = cli.execute().await {
        let exit_code = turbomcp_bridge::cli::error::display_error(&e);
        std::process::exit(exit_code);
    }
}
