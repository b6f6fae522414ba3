//! Shared-secret comparison with constant-time equality
//!
//! Both values are hashed with BLAKE3 first and the fixed-size digests are
//! compared with `subtle::ConstantTimeEq`, so comparison time does not depend
//! on where the values differ or on their lengths.

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;

#[inline]
fn digest(value: &str) -> [u8; 32] {
    blake3::hash(value.as_bytes()).into()
}

/// Compare a presented value against the expected secret
///
/// An empty expected secret never matches.
///
/// ```rust
/// use turbomcp_gate::secret::secrets_match;
///
/// assert!(secrets_match("s3cret-value", "s3cret-value"));
/// assert!(!secrets_match("s3cret-valuX", "s3cret-value"));
/// assert!(!secrets_match("", ""));
/// ```
pub fn secrets_match(provided: &str, expected: &str) -> bool {
    if expected.is_empty() {
        return false;
    }
    digest(provided).ct_eq(&digest(expected)).into()
}

/// Configured shared secret
#[derive(Clone)]
pub struct SharedSecret(SecretString);

impl SharedSecret {
    /// Wrap a configured secret; empty values yield `None`
    pub fn new(secret: SecretString) -> Option<Self> {
        if secret.expose_secret().is_empty() {
            None
        } else {
            Some(Self(secret))
        }
    }

    /// Check a presented value
    pub fn matches(&self, provided: &str) -> bool {
        secrets_match(provided, self.0.expose_secret())
    }
}

impl std::fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SharedSecret([REDACTED])")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_secret_is_not_configured() {
        assert!(SharedSecret::new(SecretString::from(String::new())).is_none());
    }

    #[test]
    fn test_debug_is_redacted() {
        let secret = SharedSecret::new(SecretString::from("hunter2".to_string())).unwrap();
        assert!(!format!("{secret:?}").contains("hunter2"));
    }

    #[test]
    fn test_prefix_does_not_match() {
        let secret = SharedSecret::new(SecretString::from("abcdef".to_string())).unwrap();
        assert!(!secret.matches("abc"));
        assert!(!secret.matches("abcdefg"));
        assert!(secret.matches("abcdef"));
    }

    proptest! {
        #[test]
        fn prop_match_is_equality(a in ".{1,40}", b in ".{1,40}") {
            prop_assert_eq!(secrets_match(&a, &b), a == b);
        }
    }
}
