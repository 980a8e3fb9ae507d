//! Inverse-search capability token with redacted Debug output.

use crate::{ErrorLocation, RedactError};

use std::fmt;
use std::panic::Location;

use serde::ser::Error;
use zeroize::Zeroize;

/// The per-session token a viewer callback must present before it may
/// navigate the editor.
///
/// An empty secret is a valid value (nothing was provisioned) but it never
/// authenticates anything: [`SharedSecret::matches`] is false whenever either
/// side is empty.
#[derive(Clone, Default)]
pub struct SharedSecret {
    inner: String,
}

impl SharedSecret {
    /// Wrap an existing token.
    pub fn new(secret: impl Into<String>) -> Self {
        Self {
            inner: secret.into(),
        }
    }

    /// The "nothing provisioned" token.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Get the actual token value.
    ///
    /// # Security Note
    /// Only call this when embedding the token into the viewer's argument
    /// list or onto the loopback wire.
    #[inline]
    pub fn as_str(&self) -> &str {
        &self.inner
    }

    /// Token length (safe to log).
    #[inline]
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Whether the token survives being embedded as a single unquoted word
    /// in a command line.
    pub fn is_embeddable(&self) -> bool {
        !self
            .inner
            .chars()
            .any(|c| c.is_whitespace() || c == '"' || c == '\'' || c.is_control())
    }

    /// Compare against a presented token in constant time.
    ///
    /// Fails closed: an empty secret on either side never matches.
    pub fn matches(&self, presented: &str) -> bool {
        if self.inner.is_empty() || presented.is_empty() {
            return false;
        }

        let expected = self.inner.as_bytes();
        let presented = presented.as_bytes();
        if expected.len() != presented.len() {
            return false;
        }

        expected
            .iter()
            .zip(presented)
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl fmt::Debug for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.inner.is_empty() {
            write!(f, "SharedSecret(<empty>)")
        } else {
            write!(f, "SharedSecret([REDACTED])")
        }
    }
}

impl fmt::Display for SharedSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED SECRET]")
    }
}

impl Drop for SharedSecret {
    fn drop(&mut self) {
        self.inner.zeroize();
    }
}

// Never persisted: serialization always fails.
impl serde::Serialize for SharedSecret {
    fn serialize<S>(&self, _serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        Err(S::Error::custom(RedactError::Serialization {
            message: String::from("SharedSecret cannot be serialized - use as_str() explicitly"),
            location: ErrorLocation::from(Location::caller()),
        }))
    }
}
