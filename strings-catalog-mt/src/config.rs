//! Engine configuration
//!
//! Every field has a default, so an empty TOML file (or no file at all) is a
//! valid configuration. CLI flags are applied on top of the loaded values.
//!
//! ```toml
//! fuzzy_threshold = 0.9
//! max_retries = 4
//!
//! [providers.youdao]
//! min_interval_ms = 800
//! max_calls = 100
//! window_ms = 60000
//! ```

use crate::chain::RetryPolicy;
use crate::error::{MtError, MtResult};
use crate::providers::ProviderKind;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use std::time::Duration;
use strings_catalog::DictionaryStore;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct EngineConfig {
    /// Overrides the catalog's `sourceLanguage`
    pub source_language: Option<String>,
    /// Minimum similarity for a fuzzy dictionary match, in `(0, 1]`
    pub fuzzy_threshold: f64,
    /// Attempts per provider call, including the first
    pub max_retries: u32,
    /// Backoff before retry `n` is `backoff_base_ms * 2^(n-1)`
    pub backoff_base_ms: u64,
    pub call_timeout_ms: u64,
    /// How long a provider that hit its quota is skipped
    pub quota_cooldown_ms: u64,
    /// Per-provider pacing, keyed by provider name
    pub providers: BTreeMap<String, ProviderOverrides>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            source_language: None,
            fuzzy_threshold: DictionaryStore::DEFAULT_FUZZY_THRESHOLD,
            max_retries: 3,
            backoff_base_ms: 500,
            call_timeout_ms: 15_000,
            quota_cooldown_ms: 60_000,
            providers: BTreeMap::new(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProviderOverrides {
    pub min_interval_ms: Option<u64>,
    pub max_calls: Option<u32>,
    pub window_ms: Option<u64>,
}

impl ProviderOverrides {
    pub fn min_interval(&self) -> Option<Duration> {
        self.min_interval_ms.map(Duration::from_millis)
    }

    /// `(max_calls, window)` when both are set
    pub fn budget(&self) -> Option<(u32, Duration)> {
        match (self.max_calls, self.window_ms) {
            (Some(max_calls), Some(window_ms)) => Some((max_calls, Duration::from_millis(window_ms))),
            _ => None,
        }
    }

    fn validate(&self, provider: &str) -> MtResult<()> {
        if self.max_calls.is_some() != self.window_ms.is_some() {
            return Err(MtError::ConfigError(format!(
                "providers.{}: max_calls and window_ms must be set together",
                provider
            )));
        }
        if self.max_calls == Some(0) || self.window_ms == Some(0) {
            return Err(MtError::ConfigError(format!(
                "providers.{}: max_calls and window_ms must be positive",
                provider
            )));
        }
        Ok(())
    }
}

impl EngineConfig {
    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> MtResult<Self> {
        let config: Self = toml::from_str(content)
            .map_err(|e| MtError::ConfigError(format!("Invalid config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a TOML config file
    pub fn load(path: &Path) -> MtResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            MtError::ConfigError(format!("Failed to read {}: {}", path.display(), e))
        })?;
        Self::from_toml_str(&content)
    }

    /// Check the values for internal consistency
    ///
    /// # Errors
    ///
    /// `MtError::ConfigError` naming the offending field.
    pub fn validate(&self) -> MtResult<()> {
        if !(self.fuzzy_threshold > 0.0 && self.fuzzy_threshold <= 1.0) {
            return Err(MtError::ConfigError(format!(
                "fuzzy_threshold must be in (0, 1], got {}",
                self.fuzzy_threshold
            )));
        }
        if self.max_retries == 0 {
            return Err(MtError::ConfigError(
                "max_retries must be at least 1".to_string(),
            ));
        }
        if self.call_timeout_ms == 0 {
            return Err(MtError::ConfigError(
                "call_timeout_ms must be positive".to_string(),
            ));
        }
        for (name, overrides) in &self.providers {
            if name != "mock" {
                name.parse::<ProviderKind>()?;
            }
            overrides.validate(name)?;
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_attempts: self.max_retries,
            backoff_base: Duration::from_millis(self.backoff_base_ms),
            call_timeout: Duration::from_millis(self.call_timeout_ms),
            quota_cooldown: Duration::from_millis(self.quota_cooldown_ms),
        }
    }

    pub fn overrides_for(&self, provider: &str) -> ProviderOverrides {
        self.providers.get(provider).cloned().unwrap_or_default()
    }
}
