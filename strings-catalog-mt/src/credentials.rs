//! Provider secrets
//!
//! The chain only asks a [`CredentialSource`] whether a secret is present; a
//! provider with any secret absent is marked unconfigured and never called.

use std::collections::HashMap;

/// Supplies secret values by name
pub trait CredentialSource: Send + Sync {
    /// The secret's value, or `None` when it is absent or empty
    fn secret(&self, name: &str) -> Option<String>;
}

/// Reads secrets from the process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvCredentials;

impl CredentialSource for EnvCredentials {
    fn secret(&self, name: &str) -> Option<String> {
        std::env::var(name)
            .ok()
            .filter(|value| !value.trim().is_empty())
    }
}

/// Fixed secrets, for tests and embedding
#[derive(Debug, Clone, Default)]
pub struct StaticCredentials(HashMap<String, String>);

impl StaticCredentials {
    pub fn new() -> Self {
        Self(HashMap::new())
    }

    pub fn with_secret(mut self, name: &str, value: &str) -> Self {
        self.0.insert(name.to_string(), value.to_string());
        self
    }
}

impl CredentialSource for StaticCredentials {
    fn secret(&self, name: &str) -> Option<String> {
        self.0
            .get(name)
            .filter(|value| !value.trim().is_empty())
            .cloned()
    }
}
