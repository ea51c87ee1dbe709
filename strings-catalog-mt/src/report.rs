//! Run summary and where it goes
//!
//! Counts are per (entry, language) pair: a deduplicated request whose result
//! is fanned out to three entries counts three times.

use crate::chain::ProviderFailure;
use crate::error::{MtError, MtResult};
use crate::merge::TranslationMode;
use crate::resolution::Provenance;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use strings_catalog::{CatalogError, DictionarySummary};
use tracing::{info, warn};

/// A pair left untranslated
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct UnresolvedPair {
    pub key: String,
    pub language: String,
    pub source_text: String,
}

/// A resolved pair the catalog refused to store
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WriteFailure {
    pub key: String,
    pub language: String,
    pub message: String,
}

impl WriteFailure {
    pub fn new(key: &str, language: &str, error: &CatalogError) -> Self {
        Self {
            key: key.to_string(),
            language: language.to_string(),
            message: error.to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunReport {
    pub mode: TranslationMode,
    pub source_language: String,
    pub target_languages: Vec<String>,
    pub dictionaries: Vec<DictionarySummary>,
    /// Pairs considered, excluding do-not-translate entries
    pub total_pairs: usize,
    /// Pairs left alone because they were already translated
    pub skipped_translated: usize,
    /// Do-not-translate units filled with their key
    pub passthrough: usize,
    /// Distinct (text, language) requests after deduplication
    pub unique_requests: usize,
    pub dictionary_exact: usize,
    pub dictionary_fuzzy: usize,
    pub provider_successes: BTreeMap<String, usize>,
    pub unresolved: Vec<UnresolvedPair>,
    /// Pairs not written because their entry is malformed
    pub write_failures: Vec<WriteFailure>,
    /// Pairs never attempted because the run was cancelled
    pub not_attempted: usize,
    pub provider_failures: Vec<ProviderFailure>,
    pub config_errors: Vec<String>,
    pub cancelled: bool,
}

impl RunReport {
    pub fn new(mode: TranslationMode, source_language: &str, target_languages: &[String]) -> Self {
        Self {
            mode,
            source_language: source_language.to_string(),
            target_languages: target_languages.to_vec(),
            dictionaries: Vec::new(),
            total_pairs: 0,
            skipped_translated: 0,
            passthrough: 0,
            unique_requests: 0,
            dictionary_exact: 0,
            dictionary_fuzzy: 0,
            provider_successes: BTreeMap::new(),
            unresolved: Vec::new(),
            write_failures: Vec::new(),
            not_attempted: 0,
            provider_failures: Vec::new(),
            config_errors: Vec::new(),
            cancelled: false,
        }
    }

    /// Count `pairs` pairs resolved by `provenance`
    pub fn record(&mut self, provenance: &Provenance, pairs: usize) {
        match provenance {
            Provenance::DictionaryExact => self.dictionary_exact += pairs,
            Provenance::DictionaryFuzzy => self.dictionary_fuzzy += pairs,
            Provenance::Provider(name) => {
                *self.provider_successes.entry(name.clone()).or_default() += pairs;
            }
            Provenance::Unresolved => {}
        }
    }

    /// Pairs written with a new translation
    pub fn translated(&self) -> usize {
        self.dictionary_exact
            + self.dictionary_fuzzy
            + self.provider_successes.values().sum::<usize>()
    }

    /// Pairs written by dictionaries or providers, as `provenance -> count`
    pub fn counts(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        counts.insert(Provenance::DictionaryExact.to_string(), self.dictionary_exact);
        counts.insert(Provenance::DictionaryFuzzy.to_string(), self.dictionary_fuzzy);
        for (provider, count) in &self.provider_successes {
            counts.insert(Provenance::Provider(provider.clone()).to_string(), *count);
        }
        counts.insert(Provenance::Unresolved.to_string(), self.unresolved.len());
        counts
    }
}

/// Receives the report at the end of a run
pub trait ReportSink {
    fn publish(&mut self, report: &RunReport) -> MtResult<()>;
}

/// Logs the summary through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl ReportSink for TracingSink {
    fn publish(&mut self, report: &RunReport) -> MtResult<()> {
        for dictionary in &report.dictionaries {
            info!(
                dictionary = %dictionary.name,
                entries = dictionary.entries,
                languages = %dictionary.languages.join(", "),
                "Dictionary loaded"
            );
        }
        for error in &report.config_errors {
            warn!("{}", error);
        }

        info!(
            mode = %report.mode,
            targets = %report.target_languages.join(", "),
            total = report.total_pairs,
            skipped = report.skipped_translated,
            passthrough = report.passthrough,
            requests = report.unique_requests,
            "Run finished"
        );
        for (provenance, count) in report.counts() {
            info!("  {}: {}", provenance, count);
        }

        if !report.provider_failures.is_empty() {
            warn!("{} provider call(s) failed", report.provider_failures.len());
        }
        for pair in &report.unresolved {
            warn!(key = %pair.key, lang = %pair.language, "Unresolved");
        }
        for failure in &report.write_failures {
            warn!(key = %failure.key, lang = %failure.language, "Not written: {}", failure.message);
        }
        if report.cancelled {
            warn!(not_attempted = report.not_attempted, "Run was cancelled");
        }
        Ok(())
    }
}

/// Writes the report as pretty JSON
#[derive(Debug, Clone)]
pub struct JsonFileSink {
    path: PathBuf,
}

impl JsonFileSink {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ReportSink for JsonFileSink {
    fn publish(&mut self, report: &RunReport) -> MtResult<()> {
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| MtError::Other(format!("Failed to serialize report: {}", e)))?;
        std::fs::write(&self.path, json + "\n").map_err(|e| {
            MtError::CatalogError(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        info!(path = %self.path.display(), "Report written");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> RunReport {
        let mut report = RunReport::new(TranslationMode::Skip, "en", &["de".to_string()]);
        report.record(&Provenance::DictionaryExact, 2);
        report.record(&Provenance::Provider("google".to_string()), 3);
        report.record(&Provenance::Provider("google".to_string()), 1);
        report.unresolved.push(UnresolvedPair {
            key: "Zorblax".to_string(),
            language: "de".to_string(),
            source_text: "Zorblax".to_string(),
        });
        report
    }

    #[test]
    fn test_counts() {
        let report = report();
        assert_eq!(report.translated(), 6);
        let counts = report.counts();
        assert_eq!(counts["dictionary-exact"], 2);
        assert_eq!(counts["dictionary-fuzzy"], 0);
        assert_eq!(counts["provider:google"], 4);
        assert_eq!(counts["unresolved"], 1);
    }

    #[test]
    fn test_tracing_sink() {
        assert!(TracingSink.publish(&report()).is_ok());
    }

    #[test]
    fn test_json_file_sink() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("report.json");
        JsonFileSink::new(&path).publish(&report()).unwrap();

        let json: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        assert_eq!(json["mode"], "skip");
        assert_eq!(json["provider_successes"]["google"], 4);
        assert_eq!(json["unresolved"][0]["key"], "Zorblax");
        assert_eq!(json["write_failures"], serde_json::json!([]));
    }
}
