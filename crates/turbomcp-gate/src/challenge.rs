//! `WWW-Authenticate: Bearer` challenges (RFC 6750 Section 3)
//!
//! ```rust
//! use turbomcp_gate::challenge::BearerChallenge;
//!
//! let bare = BearerChallenge::new("mcp");
//! assert_eq!(bare.to_header_value(), r#"Bearer realm="mcp""#);
//!
//! let failed = BearerChallenge::new("mcp").with_error("invalid_token", "The access token expired");
//! assert_eq!(
//!     failed.to_header_value(),
//!     r#"Bearer realm="mcp", error="invalid_token", error_description="The access token expired""#
//! );
//! ```

use std::fmt;

/// A Bearer challenge naming a realm and, optionally, an error
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BearerChallenge {
    realm: String,
    error: Option<String>,
    error_description: Option<String>,
}

impl BearerChallenge {
    /// Bare challenge naming only the realm
    pub fn new(realm: impl Into<String>) -> Self {
        Self {
            realm: realm.into(),
            error: None,
            error_description: None,
        }
    }

    /// Attach an RFC 6750 error code and description
    pub fn with_error(mut self, error: impl Into<String>, description: impl Into<String>) -> Self {
        self.error = Some(error.into());
        self.error_description = Some(description.into());
        self
    }

    /// Render as a `WWW-Authenticate` header value
    pub fn to_header_value(&self) -> String {
        let mut parts = vec![format!("realm=\"{}\"", escape_param_value(&self.realm))];

        if let Some(ref error) = self.error {
            parts.push(format!("error=\"{}\"", escape_param_value(error)));
        }

        if let Some(ref description) = self.error_description {
            parts.push(format!(
                "error_description=\"{}\"",
                escape_param_value(description)
            ));
        }

        format!("Bearer {}", parts.join(", "))
    }
}

impl fmt::Display for BearerChallenge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header_value())
    }
}

/// Escape a value for use inside a quoted-string
fn escape_param_value(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_control())
        .fold(String::with_capacity(value.len()), |mut out, c| {
            if c == '\\' || c == '"' {
                out.push('\\');
            }
            out.push(c);
            out
        })
}
