//! Redacting wrapper for credential strings

use std::fmt;
use std::path::Path;
use zeroize::Zeroize;

/// A credential string (client secret, token) that must never appear in
/// logs or debug output. The inner value is wiped from memory on drop.
pub struct Secret(String);

impl Secret {
    /// Wrap a credential value.
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Expose the inner value (use sparingly, at the call site that
    /// actually sends the credential over the wire).
    pub fn expose(&self) -> &str {
        &self.0
    }

    /// Load a credential from an environment variable, falling back to a
    /// file path. The env var wins so deployments can inject the secret
    /// without touching disk. File contents are trimmed of surrounding
    /// whitespace; an empty value in either source is treated as absent.
    pub fn from_env_or_file(var: &str, path: Option<&Path>) -> crate::Result<Option<Self>> {
        if let Ok(value) = std::env::var(var) {
            if !value.is_empty() {
                return Ok(Some(Self::new(value)));
            }
        }
        if let Some(path) = path {
            let value = std::fs::read_to_string(path).map_err(|e| {
                crate::Error::Config(format!("failed to read {}: {e}", path.display()))
            })?;
            let value = value.trim();
            if !value.is_empty() {
                return Ok(Some(Self::new(value)));
            }
        }
        Ok(None)
    }
}

impl fmt::Debug for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl fmt::Display for Secret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[REDACTED]")
    }
}

impl Drop for Secret {
    fn drop(&mut self) {
        self.0.zeroize();
    }
}

impl Clone for Secret {
    fn clone(&self) -> Self {
        Self(self.0.clone())
    }
}
