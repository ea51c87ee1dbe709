//! Mock Machine Translator for testing
//!
//! This module provides a deterministic, API-free translator for testing
//! the resolution pipeline without requiring API keys or network access.
//! Clones share their call log, so a test can keep one handle and give the
//! other to a [`ProviderChain`](crate::chain::ProviderChain).
//!
//! # Example
//!
//! ```ignore
//! use strings_catalog_mt::{MachineTranslator, MockTranslator, MockMode};
//!
//! #[tokio::test]
//! async fn test_translation() {
//!     let mock = MockTranslator::new(MockMode::Suffix);
//!     let result = mock.translate("hello", "en", "fr").await.unwrap();
//!     assert_eq!(result, "hello_fr");
//! }
//! ```

use crate::error::{ProviderError, ProviderErrorKind, ProviderResult};
use crate::translator::MachineTranslator;
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock translation modes for testing different scenarios
#[derive(Debug, Clone)]
pub enum MockMode {
    /// Append locale suffix: "hello" → "hello_fr"
    Suffix,

    /// Use predefined mappings for realistic translations
    /// (text, target_locale) → translation; unmapped pairs fall back to `Suffix`
    Mappings(HashMap<(String, String), String>),

    /// Return input unchanged
    Echo,

    /// Every call fails with this kind
    Fail(ProviderErrorKind),

    /// The first `times` calls fail with `kind`, later calls behave like `Suffix`
    FailTimes { kind: ProviderErrorKind, times: usize },
}

/// Mock translator that simulates various translation scenarios
#[derive(Debug, Clone)]
pub struct MockTranslator {
    name: String,
    mode: MockMode,
    /// Optional simulated network delay (in milliseconds)
    delay_ms: u64,
    /// (text, target_locale) of every call, in order
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockTranslator {
    /// Create a new MockTranslator named `mock`
    pub fn new(mode: MockMode) -> Self {
        Self::named("mock", mode)
    }

    /// Create a MockTranslator that reports another provider name
    ///
    /// ```ignore
    /// let primary = MockTranslator::named("a", MockMode::Fail(ProviderErrorKind::Auth));
    /// ```
    pub fn named(name: &str, mode: MockMode) -> Self {
        Self {
            name: name.to_string(),
            mode,
            delay_ms: 0,
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a simulated delay (in milliseconds) to every call
    pub fn with_delay(mut self, delay_ms: u64) -> Self {
        self.delay_ms = delay_ms;
        self
    }

    /// Convenience constructor for `MockMode::Mappings`
    pub fn with_mappings<'a>(
        name: &str,
        mappings: impl IntoIterator<Item = (&'a str, &'a str, &'a str)>,
    ) -> Self {
        let map = mappings
            .into_iter()
            .map(|(text, target, translation)| {
                ((text.to_string(), target.to_string()), translation.to_string())
            })
            .collect();
        Self::named(name, MockMode::Mappings(map))
    }

    /// Number of calls made so far
    pub fn calls(&self) -> usize {
        self.calls.lock().map(|calls| calls.len()).unwrap_or(0)
    }

    /// Number of calls made for one (text, target) pair
    pub fn calls_for(&self, text: &str, target_locale: &str) -> usize {
        self.calls
            .lock()
            .map(|calls| {
                calls
                    .iter()
                    .filter(|(t, l)| t == text && l == target_locale)
                    .count()
            })
            .unwrap_or(0)
    }

    /// Record the call and return how many calls preceded it
    fn record(&self, text: &str, target: &str) -> usize {
        match self.calls.lock() {
            Ok(mut calls) => {
                calls.push((text.to_string(), target.to_string()));
                calls.len() - 1
            }
            Err(_) => 0,
        }
    }

    /// Apply translation logic based on the mode
    fn apply_translation(&self, text: &str, target: &str, previous_calls: usize) -> ProviderResult<String> {
        match &self.mode {
            MockMode::Suffix => Ok(format!("{}_{}", text, target)),
            MockMode::Mappings(map) => {
                let key = (text.to_string(), target.to_string());
                Ok(map
                    .get(&key)
                    .cloned()
                    .unwrap_or_else(|| format!("{}_{}", text, target)))
            }
            MockMode::Echo => Ok(text.to_string()),
            MockMode::Fail(kind) => Err(ProviderError::new(
                *kind,
                format!("{} simulated {} failure", self.name, kind),
            )),
            MockMode::FailTimes { kind, times } => {
                if previous_calls < *times {
                    Err(ProviderError::new(
                        *kind,
                        format!("{} simulated {} failure", self.name, kind),
                    ))
                } else {
                    Ok(format!("{}_{}", text, target))
                }
            }
        }
    }
}

#[async_trait]
impl MachineTranslator for MockTranslator {
    async fn translate(
        &self,
        text: &str,
        _source_locale: &str,
        target_locale: &str,
    ) -> ProviderResult<String> {
        let previous_calls = self.record(text, target_locale);

        if self.delay_ms > 0 {
            tokio::time::sleep(Duration::from_millis(self.delay_ms)).await;
        }

        self.apply_translation(text, target_locale, previous_calls)
    }

    fn provider_name(&self) -> &str {
        &self.name
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ========== Suffix Mode Tests ==========

    #[tokio::test]
    async fn test_suffix_single_translation() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let result = mock.translate("hello", "en", "fr").await.unwrap();
        assert_eq!(result, "hello_fr");
    }

    #[tokio::test]
    async fn test_suffix_different_targets() {
        let mock = MockTranslator::new(MockMode::Suffix);
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "hello_fr");
        assert_eq!(mock.translate("hello", "en", "ru").await.unwrap(), "hello_ru");
        assert_eq!(mock.translate("hello", "en", "de").await.unwrap(), "hello_de");
    }

    // ========== Mapping Mode Tests ==========

    #[tokio::test]
    async fn test_mapping_single_translation() {
        let mock = MockTranslator::with_mappings("mock", [("Save", "de", "Speichern")]);
        assert_eq!(mock.translate("Save", "en", "de").await.unwrap(), "Speichern");
    }

    #[tokio::test]
    async fn test_mapping_fallback_to_suffix() {
        let mock = MockTranslator::new(MockMode::Mappings(HashMap::new()));
        let result = mock.translate("unknown", "en", "fr").await.unwrap();
        assert_eq!(result, "unknown_fr");
    }

    // ========== Echo Mode Tests ==========

    #[tokio::test]
    async fn test_echo_returns_input() {
        let mock = MockTranslator::new(MockMode::Echo);
        assert_eq!(mock.translate("OK", "en", "de").await.unwrap(), "OK");
    }

    // ========== Error Mode Tests ==========

    #[tokio::test]
    async fn test_fail_mode() {
        let mock = MockTranslator::named("a", MockMode::Fail(ProviderErrorKind::Auth));
        let error = mock.translate("hello", "en", "fr").await.unwrap_err();
        assert_eq!(error.kind, ProviderErrorKind::Auth);
        assert!(error.message.contains("a simulated auth failure"));
    }

    #[tokio::test]
    async fn test_fail_times_then_recovers() {
        let mock = MockTranslator::new(MockMode::FailTimes {
            kind: ProviderErrorKind::Transient,
            times: 2,
        });
        assert!(mock.translate("hello", "en", "fr").await.is_err());
        assert!(mock.translate("hello", "en", "fr").await.is_err());
        assert_eq!(mock.translate("hello", "en", "fr").await.unwrap(), "hello_fr");
    }

    // ========== Call Counting Tests ==========

    #[tokio::test]
    async fn test_clones_share_call_log() {
        let mock = MockTranslator::new(MockMode::Suffix);
        let handle = mock.clone();
        mock.translate("Save", "en", "de").await.unwrap();
        mock.translate("Save", "en", "fr").await.unwrap();
        mock.translate("Open", "en", "de").await.unwrap();

        assert_eq!(handle.calls(), 3);
        assert_eq!(handle.calls_for("Save", "de"), 1);
        assert_eq!(handle.calls_for("Close", "de"), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_with_delay() {
        let mock = MockTranslator::new(MockMode::Suffix).with_delay(50);
        let start = tokio::time::Instant::now();
        mock.translate("hello", "en", "fr").await.unwrap();
        assert!(start.elapsed() >= Duration::from_millis(50));
    }

    #[test]
    fn test_provider_name() {
        assert_eq!(MockTranslator::new(MockMode::Suffix).provider_name(), "mock");
        assert_eq!(
            MockTranslator::named("backup", MockMode::Echo).provider_name(),
            "backup"
        );
    }
}
