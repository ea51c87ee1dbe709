//! Catalog merge
//!
//! A run has three phases:
//!
//! 1. [`plan`] picks the (entry, language) pairs to resolve according to the
//!    [`TranslationMode`] and collapses identical (text, language) pairs into
//!    one [`PairRequest`]
//! 2. [`translate_catalog`] resolves each request once and fans the result out
//!    to every entry that shares it, through [`apply`]
//! 3. the [`RunReport`] collects counts, unresolved pairs and failures
//!
//! Unresolved pairs are never written. Entries and languages outside the plan
//! are never touched. A pair that cannot be written is recorded as a
//! [`WriteFailure`] and the run goes on with the next one.

use crate::report::{RunReport, UnresolvedPair, WriteFailure};
use crate::resolution::{ResolutionEngine, ResolutionResult};
use serde::Serialize;
use std::collections::HashMap;
use std::str::FromStr;
use std::sync::atomic::{AtomicBool, Ordering};
use strings_catalog::locale::same_language;
use strings_catalog::{CatalogAccess, CatalogResult, TranslationState};
use tracing::{debug, info, warn};

/// Which pairs a run retranslates
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TranslationMode {
    /// Only pairs not yet translated
    #[default]
    Skip,
    /// Also translated pairs whose source text looks like prose
    Full,
}

impl FromStr for TranslationMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "skip" => Ok(TranslationMode::Skip),
            "full" => Ok(TranslationMode::Full),
            other => Err(format!("Unknown mode '{}' (expected 'skip' or 'full')", other)),
        }
    }
}

impl std::fmt::Display for TranslationMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationMode::Skip => write!(f, "skip"),
            TranslationMode::Full => write!(f, "full"),
        }
    }
}

/// Whether a source text is worth retranslating
///
/// Rejects short strings, format strings (`%@`), paths, numbers and strings
/// made of separators only; requires at least one letter.
pub fn is_translatable_text(text: &str) -> bool {
    text.chars().count() > 2
        && !text.starts_with('%')
        && !text.starts_with('/')
        && !text.chars().all(|c| c.is_ascii_digit())
        && !text.chars().all(|c| matches!(c, '-' | ':' | ' ' | '/'))
        && text.chars().any(char::is_alphabetic)
}

/// One resolution request shared by every entry with the same text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PairRequest {
    pub text: String,
    pub language: String,
    /// Keys of the entries that receive the result, in catalog order
    pub keys: Vec<String>,
}

/// The pairs a run will touch
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MergePlan {
    /// Target languages after dropping duplicates and the source language
    pub languages: Vec<String>,
    /// Requests in target-language order, then catalog order
    pub requests: Vec<PairRequest>,
    /// (key, language) of do-not-translate units to fill with their key
    pub passthroughs: Vec<(String, String)>,
    pub total_pairs: usize,
    pub skipped_translated: usize,
}

impl MergePlan {
    /// Number of (entry, language) pairs sent to resolution
    pub fn pair_count(&self) -> usize {
        self.requests.iter().map(|r| r.keys.len()).sum()
    }
}

/// Select and deduplicate the pairs to resolve
///
/// Target languages equal to the catalog's source language are ignored, and
/// a language listed twice (`fr`, `fr` or `zh-Hans`, `zh_Hans`) is planned
/// once. Localizations made of plural/device variations are left alone.
pub fn plan<C: CatalogAccess + ?Sized>(
    catalog: &C,
    target_languages: &[String],
    mode: TranslationMode,
) -> MergePlan {
    let source_language = catalog.source_language().to_string();
    let entries = catalog.list_translatable_entries();
    let mut plan = MergePlan::default();
    let mut index: HashMap<(String, String), usize> = HashMap::new();

    for language in target_languages {
        if same_language(language, &source_language)
            || plan.languages.iter().any(|seen| same_language(seen, language))
        {
            continue;
        }
        plan.languages.push(language.clone());

        for entry in &entries {
            let translation = entry.translation(language);
            if translation.is_some_and(|t| t.has_variations) {
                debug!(key = %entry.key, lang = %language, "Skipping localization with variations");
                continue;
            }

            if !entry.should_translate {
                if let Some(t) = translation {
                    if t.state == TranslationState::Untranslated || t.value.is_empty() {
                        plan.passthroughs.push((entry.key.clone(), language.clone()));
                    }
                }
                continue;
            }

            let text = entry.source_text.trim();
            if text.is_empty() {
                continue;
            }

            plan.total_pairs += 1;
            let state = entry.state(language);
            let selected = match mode {
                TranslationMode::Skip => state != TranslationState::Translated,
                TranslationMode::Full => {
                    state != TranslationState::Translated || is_translatable_text(text)
                }
            };
            if !selected {
                plan.skipped_translated += 1;
                continue;
            }

            let slot = *index
                .entry((text.to_string(), language.clone()))
                .or_insert_with(|| {
                    plan.requests.push(PairRequest {
                        text: text.to_string(),
                        language: language.clone(),
                        keys: Vec::new(),
                    });
                    plan.requests.len() - 1
                });
            plan.requests[slot].keys.push(entry.key.clone());
        }
    }

    plan
}

/// Write a resolved translation; an unresolved result changes nothing
///
/// Returns whether the catalog was modified.
pub fn apply<C: CatalogAccess + ?Sized>(
    catalog: &mut C,
    key: &str,
    language: &str,
    result: &ResolutionResult,
) -> CatalogResult<bool> {
    match &result.text {
        Some(text) => {
            catalog.set_translation(key, language, text)?;
            Ok(true)
        }
        None => Ok(false),
    }
}

/// Resolve and merge every planned pair
///
/// `cancel` is checked between requests; pairs merged before cancellation
/// stay in the catalog.
///
/// Nothing aborts the run: provider failures, unresolved pairs and pairs the
/// catalog refused to store all end up in the report.
pub async fn translate_catalog<C: CatalogAccess + ?Sized>(
    catalog: &mut C,
    engine: &mut ResolutionEngine<'_>,
    target_languages: &[String],
    mode: TranslationMode,
    cancel: &AtomicBool,
) -> RunReport {
    let plan = plan(catalog, target_languages, mode);
    let mut report = RunReport::new(mode, engine.source_language(), &plan.languages);
    report.dictionaries = engine.dictionaries().summaries();
    report.total_pairs = plan.total_pairs;
    report.skipped_translated = plan.skipped_translated;
    report.unique_requests = plan.requests.len();

    info!(
        mode = %mode,
        pairs = plan.pair_count(),
        requests = plan.requests.len(),
        skipped = plan.skipped_translated,
        "Starting translation"
    );

    for (key, language) in &plan.passthroughs {
        match catalog.set_translation(key, language, key) {
            Ok(()) => report.passthrough += 1,
            Err(e) => report.write_failures.push(WriteFailure::new(key, language, &e)),
        }
    }

    let total = plan.requests.len();
    for (position, request) in plan.requests.iter().enumerate() {
        if cancel.load(Ordering::SeqCst) {
            report.cancelled = true;
            report.not_attempted = plan.requests[position..]
                .iter()
                .map(|r| r.keys.len())
                .sum();
            info!(not_attempted = report.not_attempted, "Run cancelled");
            break;
        }

        let result = engine.resolve(&request.text, &request.language).await;
        debug!(
            lang = %request.language,
            provenance = %result.provenance,
            entries = request.keys.len(),
            "[{}/{}] {:?}",
            position + 1,
            total,
            request.text
        );

        let mut written = 0;
        for key in &request.keys {
            match apply(catalog, key, &request.language, &result) {
                Ok(true) => written += 1,
                Ok(false) => report.unresolved.push(UnresolvedPair {
                    key: key.clone(),
                    language: request.language.clone(),
                    source_text: request.text.clone(),
                }),
                Err(e) => {
                    warn!(key = %key, lang = %request.language, "Failed to write translation: {}", e);
                    report
                        .write_failures
                        .push(WriteFailure::new(key, &request.language, &e));
                }
            }
        }
        report.record(&result.provenance, written);
    }

    report.provider_failures = engine.chain().failures().to_vec();
    report.config_errors = engine
        .chain()
        .config_errors()
        .iter()
        .map(ToString::to_string)
        .collect();
    report
}
