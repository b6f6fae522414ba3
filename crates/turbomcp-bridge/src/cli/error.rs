//! Startup error display

use colored::Colorize;

use crate::error::BridgeError;

/// Format an error for CLI display
#[must_use]
pub fn format_error(error: &BridgeError) -> String {
    match error {
        BridgeError::Configuration { message, key } => {
            let setting = key
                .as_deref()
                .map(|key| format!(" ({})", key.replace('_', "-")))
                .unwrap_or_default();
            format!(
                "{} Configuration error{}\n  {}\n\n{}\n  {}",
                "✗".red().bold(),
                setting,
                message,
                "Suggestion:".yellow(),
                "Run with --help to see all options and their BRIDGE_* environment variables"
            )
        }
        BridgeError::KeySource(err) => {
            format!(
                "{} Key source error\n  {}\n\n{}\n  {}",
                "✗".red().bold(),
                err,
                "Suggestion:".yellow(),
                "Check --auth-server-url, --realm and --jwks-url"
            )
        }
        BridgeError::Io(err) => {
            format!(
                "{} I/O error\n  {}\n\n{}\n  {}",
                "✗".red().bold(),
                err,
                "Suggestion:".yellow(),
                "Check that the bind address is free and permitted"
            )
        }
        _ => format!("{} {}", "✗".red().bold(), error),
    }
}

/// Display an error to stderr and return exit code
#[must_use]
pub fn display_error(error: &BridgeError) -> i32 {
    eprintln!("{}", format_error(error));
    1
}
