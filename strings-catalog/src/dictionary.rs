//! Term dictionaries with exact and fuzzy lookup
//!
//! A [`DictionaryStore`] holds dictionaries in load order. Lookups never
//! touch the network and never mutate the store.
//!
//! Matching happens in two passes:
//!
//! 1. **Exact**: the trimmed query equals a term's source text
//!    (case-sensitive). The first dictionary, in load order, whose term has a
//!    translation for the target language wins.
//! 2. **Fuzzy**: query and terms are normalized (lower-cased, punctuation
//!    stripped, `-`/`_` treated as spaces, whitespace collapsed) and scored
//!    with [`similarity`]. The best candidate at or above the threshold wins;
//!    ties go to the earlier dictionary.

use crate::locale::same_language;
use regex::Regex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::LazyLock;

static SEPARATORS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[-_]").unwrap());
static PUNCTUATION: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\p{P}").unwrap());
static WHITESPACE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());

/// A source text and its translations keyed by language code
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DictionaryTerm {
    pub source: String,
    pub translations: BTreeMap<String, String>,
}

impl DictionaryTerm {
    /// Create a term. Source and targets are trimmed; empty targets are dropped.
    pub fn new<I, L, T>(source: &str, translations: I) -> Self
    where
        I: IntoIterator<Item = (L, T)>,
        L: Into<String>,
        T: AsRef<str>,
    {
        let translations = translations
            .into_iter()
            .filter_map(|(lang, text)| {
                let text = text.as_ref().trim();
                (!text.is_empty()).then(|| (lang.into(), text.to_string()))
            })
            .collect();

        Self {
            source: source.trim().to_string(),
            translations,
        }
    }

    /// Translation for `language`, trying the exact code before a canonical match
    pub fn translation_for(&self, language: &str) -> Option<&str> {
        self.translations
            .get(language)
            .or_else(|| {
                self.translations
                    .iter()
                    .find(|(code, _)| same_language(code, language))
                    .map(|(_, text)| text)
            })
            .map(String::as_str)
    }
}

/// A named, ordered list of terms
#[derive(Debug, Clone)]
pub struct Dictionary {
    name: String,
    terms: Vec<DictionaryTerm>,
    // Normalized source of each term, same index as `terms`
    normalized: Vec<String>,
}

impl Dictionary {
    pub fn new(name: &str, terms: Vec<DictionaryTerm>) -> Self {
        let terms: Vec<DictionaryTerm> = terms
            .into_iter()
            .filter(|term| !term.source.is_empty())
            .collect();
        let normalized = terms
            .iter()
            .map(|term| normalize_for_match(&term.source))
            .collect();

        Self {
            name: name.to_string(),
            terms,
            normalized,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn terms(&self) -> &[DictionaryTerm] {
        &self.terms
    }

    pub fn len(&self) -> usize {
        self.terms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }

    /// Languages with at least one translation, sorted
    pub fn languages(&self) -> Vec<String> {
        let mut languages: Vec<String> = self
            .terms
            .iter()
            .flat_map(|term| term.translations.keys().cloned())
            .collect();
        languages.sort();
        languages.dedup();
        languages
    }
}

/// How a dictionary lookup matched
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MatchKind {
    Exact,
    Fuzzy { score: f64 },
}

/// A successful dictionary lookup
#[derive(Debug, Clone, PartialEq)]
pub struct DictionaryHit {
    /// The translation
    pub text: String,
    /// Name of the dictionary the term came from
    pub dictionary: String,
    /// Source text of the matched term
    pub term: String,
    pub kind: MatchKind,
}

/// Name, size and languages of one loaded dictionary
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DictionarySummary {
    pub name: String,
    pub entries: usize,
    pub languages: Vec<String>,
}

/// Dictionaries in load order
#[derive(Debug, Clone)]
pub struct DictionaryStore {
    dictionaries: Vec<Dictionary>,
    fuzzy_threshold: f64,
}

impl Default for DictionaryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl DictionaryStore {
    /// Minimum similarity for a fuzzy match
    pub const DEFAULT_FUZZY_THRESHOLD: f64 = 0.85;

    pub fn new() -> Self {
        Self {
            dictionaries: Vec::new(),
            fuzzy_threshold: Self::DEFAULT_FUZZY_THRESHOLD,
        }
    }

    /// Set the fuzzy threshold, clamped to `[0, 1]`
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.fuzzy_threshold = threshold.clamp(0.0, 1.0);
        self
    }

    /// Append a dictionary. Earlier dictionaries take priority.
    pub fn push(&mut self, dictionary: Dictionary) {
        self.dictionaries.push(dictionary);
    }

    pub fn with_dictionary(mut self, dictionary: Dictionary) -> Self {
        self.push(dictionary);
        self
    }

    pub fn dictionaries(&self) -> &[Dictionary] {
        &self.dictionaries
    }

    pub fn fuzzy_threshold(&self) -> f64 {
        self.fuzzy_threshold
    }

    pub fn is_empty(&self) -> bool {
        self.dictionaries.iter().all(Dictionary::is_empty)
    }

    pub fn summaries(&self) -> Vec<DictionarySummary> {
        self.dictionaries
            .iter()
            .map(|dictionary| DictionarySummary {
                name: dictionary.name().to_string(),
                entries: dictionary.len(),
                languages: dictionary.languages(),
            })
            .collect()
    }

    /// Exact match, then fuzzy match
    pub fn lookup(&self, text: &str, language: &str) -> Option<DictionaryHit> {
        self.lookup_exact(text, language)
            .or_else(|| self.lookup_fuzzy(text, language))
    }

    /// Case-sensitive match on the trimmed text
    pub fn lookup_exact(&self, text: &str, language: &str) -> Option<DictionaryHit> {
        let query = text.trim();
        if query.is_empty() {
            return None;
        }

        self.dictionaries.iter().find_map(|dictionary| {
            dictionary
                .terms
                .iter()
                .filter(|term| term.source == query)
                .find_map(|term| term.translation_for(language).map(|t| (term, t)))
                .map(|(term, translation)| DictionaryHit {
                    text: translation.to_string(),
                    dictionary: dictionary.name.clone(),
                    term: term.source.clone(),
                    kind: MatchKind::Exact,
                })
        })
    }

    /// Best normalized match scoring at least the threshold
    pub fn lookup_fuzzy(&self, text: &str, language: &str) -> Option<DictionaryHit> {
        let query = normalize_for_match(text);
        if query.is_empty() {
            return None;
        }

        let mut best: Option<(f64, &Dictionary, &DictionaryTerm, &str)> = None;
        for dictionary in &self.dictionaries {
            for (term, normalized) in dictionary.terms.iter().zip(&dictionary.normalized) {
                let Some(translation) = term.translation_for(language) else {
                    continue;
                };
                let score = similarity(&query, normalized);
                if score < self.fuzzy_threshold {
                    continue;
                }
                // Strictly greater keeps the earliest candidate on ties
                if best.is_none_or(|(best_score, ..)| score > best_score) {
                    best = Some((score, dictionary, term, translation));
                }
            }
            if best.is_some_and(|(score, ..)| score >= 1.0) {
                break;
            }
        }

        best.map(|(score, dictionary, term, translation)| DictionaryHit {
            text: translation.to_string(),
            dictionary: dictionary.name.clone(),
            term: term.source.clone(),
            kind: MatchKind::Fuzzy { score },
        })
    }
}

/// Normalize text for fuzzy comparison
///
/// Lower-cases, turns `-` and `_` into spaces, strips punctuation and
/// collapses whitespace:
///
/// ```ignore
/// assert_eq!(normalize_for_match("  Sign-In! "), "sign in");
/// ```
pub fn normalize_for_match(text: &str) -> String {
    let lowered = text.to_lowercase();
    let separated = SEPARATORS.replace_all(&lowered, " ");
    let stripped = PUNCTUATION.replace_all(&separated, "");
    WHITESPACE.replace_all(stripped.trim(), " ").into_owned()
}

/// Similarity of two strings in `[0, 1]`, from the Levenshtein distance over chars
///
/// `1.0` means identical; two empty strings are identical.
pub fn similarity(a: &str, b: &str) -> f64 {
    let a: Vec<char> = a.chars().collect();
    let b: Vec<char> = b.chars().collect();
    let longest = a.len().max(b.len());
    if longest == 0 {
        return 1.0;
    }
    1.0 - levenshtein(&a, &b) as f64 / longest as f64
}

fn levenshtein(a: &[char], b: &[char]) -> usize {
    let mut previous: Vec<usize> = (0..=b.len()).collect();
    let mut current = vec![0; b.len() + 1];

    for (i, ca) in a.iter().enumerate() {
        current[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let substitution = previous[j] + usize::from(ca != cb);
            current[j + 1] = substitution
                .min(previous[j + 1] + 1)
                .min(current[j] + 1);
        }
        std::mem::swap(&mut previous, &mut current);
    }

    previous[b.len()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dictionary(name: &str, terms: &[(&str, &[(&str, &str)])]) -> Dictionary {
        Dictionary::new(
            name,
            terms
                .iter()
                .map(|(source, translations)| {
                    DictionaryTerm::new(source, translations.iter().copied())
                })
                .collect(),
        )
    }

    fn workouts() -> Dictionary {
        dictionary(
            "workouts",
            &[
                ("Running", &[("zh", "跑步"), ("ja", "ランニング")]),
                ("Sign In", &[("zh", "登录")]),
                ("Outdoor Walk", &[("zh", "户外步行"), ("ja", "")]),
            ],
        )
    }

    // ========== Normalization Tests ==========

    #[test]
    fn test_normalize_case_and_whitespace() {
        assert_eq!(normalize_for_match("  Running  "), "running");
        assert_eq!(normalize_for_match("Outdoor \t  Walk"), "outdoor walk");
    }

    #[test]
    fn test_normalize_punctuation_and_separators() {
        assert_eq!(normalize_for_match("Sign-In!"), "sign in");
        assert_eq!(normalize_for_match("sign_in"), "sign in");
        assert_eq!(normalize_for_match("Don't stop..."), "dont stop");
        assert_eq!(normalize_for_match("!!!"), "");
    }

    #[test]
    fn test_similarity_bounds() {
        assert_eq!(similarity("running", "running"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
        assert_eq!(similarity("abc", ""), 0.0);
        assert!(similarity("running", "runnin") > 0.8);
        assert!(similarity("running", "cycling") < 0.6);
    }

    // ========== Term Tests ==========

    #[test]
    fn test_term_trims_and_drops_empty() {
        let term = DictionaryTerm::new("  Walk ", [("zh", " 步行 "), ("ja", "  ")]);
        assert_eq!(term.source, "Walk");
        assert_eq!(term.translation_for("zh"), Some("步行"));
        assert_eq!(term.translation_for("ja"), None);
    }

    #[test]
    fn test_term_canonical_language_match() {
        let term = DictionaryTerm::new("Done", [("zh-Hans", "完成")]);
        assert_eq!(term.translation_for("zh_Hans"), Some("完成"));
        assert_eq!(term.translation_for("zh-Hant"), None);
    }

    // ========== Exact Lookup Tests ==========

    #[test]
    fn test_exact_lookup_trims_query() {
        let store = DictionaryStore::new().with_dictionary(workouts());
        let hit = store.lookup_exact("  Running ", "zh").unwrap();
        assert_eq!(hit.text, "跑步");
        assert_eq!(hit.kind, MatchKind::Exact);
        assert_eq!(hit.dictionary, "workouts");
    }

    #[test]
    fn test_exact_lookup_is_case_sensitive() {
        let store = DictionaryStore::new().with_dictionary(workouts());
        assert!(store.lookup_exact("running", "zh").is_none());
    }

    #[test]
    fn test_exact_lookup_load_order_priority() {
        let first = dictionary("first", &[("Save", &[("de", "Sichern")])]);
        let second = dictionary("second", &[("Save", &[("de", "Speichern")])]);
        let store = DictionaryStore::new()
            .with_dictionary(first)
            .with_dictionary(second);

        let hit = store.lookup("Save", "de").unwrap();
        assert_eq!(hit.text, "Sichern");
        assert_eq!(hit.dictionary, "first");
    }

    #[test]
    fn test_exact_lookup_skips_dictionary_without_language() {
        let first = dictionary("first", &[("Save", &[("fr", "Enregistrer")])]);
        let second = dictionary("second", &[("Save", &[("de", "Speichern")])]);
        let store = DictionaryStore::new()
            .with_dictionary(first)
            .with_dictionary(second);

        let hit = store.lookup_exact("Save", "de").unwrap();
        assert_eq!(hit.dictionary, "second");
    }

    #[test]
    fn test_empty_translation_is_not_a_hit() {
        let store = DictionaryStore::new().with_dictionary(workouts());
        assert!(store.lookup("Outdoor Walk", "ja").is_none());
    }

    // ========== Fuzzy Lookup Tests ==========

    #[test]
    fn test_fuzzy_lookup_case_and_whitespace() {
        let store = DictionaryStore::new().with_dictionary(workouts());
        let hit = store.lookup("  running ", "zh").unwrap();
        assert_eq!(hit.text, "跑步");
        assert!(matches!(hit.kind, MatchKind::Fuzzy { .. }));
    }

    #[test]
    fn test_fuzzy_lookup_punctuation() {
        let store = DictionaryStore::new().with_dictionary(workouts());
        let hit = store.lookup("sign-in", "zh").unwrap();
        assert_eq!(hit.text, "登录");
        assert_eq!(hit.term, "Sign In");
    }

    #[test]
    fn test_fuzzy_lookup_below_threshold() {
        let store = DictionaryStore::new().with_dictionary(workouts());
        assert!(store.lookup("Cycling", "zh").is_none());
        assert!(store.lookup("...", "zh").is_none());
    }

    #[test]
    fn test_fuzzy_lookup_prefers_higher_score() {
        let first = dictionary("first", &[("Outdoor Walks", &[("zh", "户外步行们")])]);
        let second = dictionary("second", &[("outdoor walk", &[("zh", "户外步行")])]);
        let store = DictionaryStore::new()
            .with_dictionary(first)
            .with_dictionary(second);

        let hit = store.lookup_fuzzy("Outdoor Walk", "zh").unwrap();
        assert_eq!(hit.dictionary, "second");
        assert_eq!(hit.kind, MatchKind::Fuzzy { score: 1.0 });
    }

    #[test]
    fn test_fuzzy_lookup_ties_go_to_first_dictionary() {
        let first = dictionary("first", &[("Sign in", &[("zh", "登入")])]);
        let second = dictionary("second", &[("SIGN IN", &[("zh", "登录")])]);
        let store = DictionaryStore::new()
            .with_dictionary(first)
            .with_dictionary(second);

        let hit = store.lookup("sign-in", "zh").unwrap();
        assert_eq!(hit.dictionary, "first");
    }

    #[test]
    fn test_threshold_is_configurable() {
        let strict = DictionaryStore::new()
            .with_threshold(1.0)
            .with_dictionary(workouts());
        assert!(strict.lookup("Runing", "zh").is_none());

        let lenient = DictionaryStore::new()
            .with_threshold(0.8)
            .with_dictionary(workouts());
        assert_eq!(lenient.lookup("Runing", "zh").unwrap().text, "跑步");
    }

    #[test]
    fn test_score_equal_to_threshold_matches() {
        let store = DictionaryStore::new()
            .with_threshold(0.75)
            .with_dictionary(Dictionary::new(
                "codes",
                vec![DictionaryTerm::new("abcd", [("de", "ABCD")])],
            ));
        // One substitution over four chars
        let hit = store.lookup_fuzzy("abce", "de").unwrap();
        assert_eq!(hit.kind, MatchKind::Fuzzy { score: 0.75 });

        let perfect_only = DictionaryStore::new()
            .with_threshold(1.0)
            .with_dictionary(workouts());
        assert_eq!(perfect_only.lookup_fuzzy("RUNNING!", "zh").unwrap().text, "跑步");
    }

    #[test]
    fn test_summaries() {
        let store = DictionaryStore::new().with_dictionary(workouts());
        let summaries = store.summaries();
        assert_eq!(summaries.len(), 1);
        assert_eq!(summaries[0].name, "workouts");
        assert_eq!(summaries[0].entries, 3);
        assert_eq!(summaries[0].languages, vec!["ja", "zh"]);
    }
}
