//! Translation resolution
//!
//! [`ResolutionEngine::resolve`] tries, in order and stopping at the first hit:
//!
//! 1. an exact dictionary match
//! 2. a fuzzy dictionary match
//! 3. the provider chain
//!
//! and otherwise reports the pair as unresolved. The engine keeps no state of
//! its own; rate limits and provider availability live in the
//! [`ProviderChain`].

use crate::chain::{ChainOutcome, ProviderChain};
use serde::{Serialize, Serializer};
use strings_catalog::{DictionaryHit, DictionaryStore, MatchKind};
use tracing::debug;

/// Which step produced a translation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Provenance {
    DictionaryExact,
    DictionaryFuzzy,
    Provider(String),
    Unresolved,
}

impl std::fmt::Display for Provenance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Provenance::DictionaryExact => write!(f, "dictionary-exact"),
            Provenance::DictionaryFuzzy => write!(f, "dictionary-fuzzy"),
            Provenance::Provider(name) => write!(f, "provider:{}", name),
            Provenance::Unresolved => write!(f, "unresolved"),
        }
    }
}

impl Serialize for Provenance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Outcome of resolving one (text, language) pair
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolutionResult {
    /// The translation; `None` only when unresolved
    pub text: Option<String>,
    pub provenance: Provenance,
    /// Where a dictionary hit came from, and the score of a fuzzy one
    pub note: Option<String>,
}

impl ResolutionResult {
    pub fn unresolved() -> Self {
        Self {
            text: None,
            provenance: Provenance::Unresolved,
            note: None,
        }
    }

    pub fn is_resolved(&self) -> bool {
        self.text.is_some()
    }

    fn from_hit(hit: DictionaryHit) -> Self {
        let (provenance, note) = match hit.kind {
            MatchKind::Exact => (Provenance::DictionaryExact, format!("dictionary '{}'", hit.dictionary)),
            MatchKind::Fuzzy { score } => (
                Provenance::DictionaryFuzzy,
                format!(
                    "dictionary '{}', term '{}', similarity {:.2}",
                    hit.dictionary, hit.term, score
                ),
            ),
        };
        Self {
            text: Some(hit.text),
            provenance,
            note: Some(note),
        }
    }
}

/// Resolves pairs against the dictionaries, then the providers
pub struct ResolutionEngine<'a> {
    dictionaries: &'a DictionaryStore,
    chain: &'a mut ProviderChain,
    source_language: String,
}

impl<'a> ResolutionEngine<'a> {
    pub fn new(dictionaries: &'a DictionaryStore, chain: &'a mut ProviderChain, source_language: &str) -> Self {
        Self {
            dictionaries,
            chain,
            source_language: source_language.to_string(),
        }
    }

    pub fn source_language(&self) -> &str {
        &self.source_language
    }

    pub fn dictionaries(&self) -> &DictionaryStore {
        self.dictionaries
    }

    pub fn chain(&self) -> &ProviderChain {
        &*self.chain
    }

    pub async fn resolve(&mut self, text: &str, target_language: &str) -> ResolutionResult {
        if let Some(hit) = self.dictionaries.lookup_exact(text, target_language) {
            debug!(lang = target_language, dictionary = %hit.dictionary, "Exact dictionary match for {:?}", text);
            return ResolutionResult::from_hit(hit);
        }

        if let Some(hit) = self.dictionaries.lookup_fuzzy(text, target_language) {
            debug!(lang = target_language, term = %hit.term, "Fuzzy dictionary match for {:?}", text);
            return ResolutionResult::from_hit(hit);
        }

        match self
            .chain
            .translate(text, &self.source_language, target_language)
            .await
        {
            ChainOutcome::Translated { provider, text } => ResolutionResult {
                text: Some(text),
                provenance: Provenance::Provider(provider),
                note: None,
            },
            ChainOutcome::Exhausted => {
                debug!(lang = target_language, "No translation for {:?}", text);
                ResolutionResult::unresolved()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chain::RetryPolicy;
    use crate::error::ProviderErrorKind;
    use crate::mock::{MockMode, MockTranslator};
    use crate::rate_limit::RateLimiter;
    use std::sync::Arc;
    use std::time::Duration;
    use strings_catalog::{Dictionary, DictionaryTerm};

    fn store() -> DictionaryStore {
        DictionaryStore::new().with_dictionary(Dictionary::new(
            "fitness",
            vec![
                DictionaryTerm::new("Running", [("zh-Hans", "跑步")]),
                DictionaryTerm::new("Save", [("de", "Sichern")]),
            ],
        ))
    }

    fn chain_with(mock: &MockTranslator) -> ProviderChain {
        ProviderChain::new(RetryPolicy::default())
            .with_translator(Arc::new(mock.clone()), RateLimiter::new(Duration::ZERO))
    }

    #[test]
    fn test_provenance_display() {
        assert_eq!(Provenance::DictionaryExact.to_string(), "dictionary-exact");
        assert_eq!(Provenance::DictionaryFuzzy.to_string(), "dictionary-fuzzy");
        assert_eq!(
            Provenance::Provider("google".to_string()).to_string(),
            "provider:google"
        );
        assert_eq!(Provenance::Unresolved.to_string(), "unresolved");
        assert_eq!(
            serde_json::to_string(&Provenance::Provider("baidu".to_string())).unwrap(),
            "\"provider:baidu\""
        );
    }

    #[tokio::test]
    async fn test_exact_match_skips_providers() {
        let store = store();
        let mock = MockTranslator::new(MockMode::Suffix);
        let mut chain = chain_with(&mock);
        let mut engine = ResolutionEngine::new(&store, &mut chain, "en");

        let result = engine.resolve("Save", "de").await;
        assert_eq!(result.text.as_deref(), Some("Sichern"));
        assert_eq!(result.provenance, Provenance::DictionaryExact);
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_fuzzy_match_has_note() {
        let store = store();
        let mock = MockTranslator::new(MockMode::Suffix);
        let mut chain = chain_with(&mock);
        let mut engine = ResolutionEngine::new(&store, &mut chain, "en");

        let result = engine.resolve("  running ", "zh-Hans").await;
        assert_eq!(result.text.as_deref(), Some("跑步"));
        assert_eq!(result.provenance, Provenance::DictionaryFuzzy);
        assert!(result.note.unwrap().contains("Running"));
        assert_eq!(mock.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_through_to_provider() {
        let store = store();
        let mock = MockTranslator::named("google", MockMode::Suffix);
        let mut chain = chain_with(&mock);
        let mut engine = ResolutionEngine::new(&store, &mut chain, "en");

        let result = engine.resolve("Open", "de").await;
        assert_eq!(result.text.as_deref(), Some("Open_de"));
        assert_eq!(result.provenance, Provenance::Provider("google".to_string()));
    }

    #[tokio::test]
    async fn test_unresolved_when_everything_fails() {
        let store = store();
        let mock = MockTranslator::new(MockMode::Fail(ProviderErrorKind::Auth));
        let mut chain = chain_with(&mock);
        let mut engine = ResolutionEngine::new(&store, &mut chain, "en");

        let result = engine.resolve("Zorblax", "fr").await;
        assert_eq!(result, ResolutionResult::unresolved());
        assert!(!result.is_resolved());
    }

    #[tokio::test]
    async fn test_no_dictionaries_no_providers() {
        let store = DictionaryStore::new();
        let mut chain = ProviderChain::new(RetryPolicy::default());
        let mut engine = ResolutionEngine::new(&store, &mut chain, "en");
        assert_eq!(
            engine.resolve("Save", "de").await.provenance,
            Provenance::Unresolved
        );
    }
}
