//! String catalog model
//!
//! A catalog maps string keys to their source text and per-language
//! translations. [`CatalogAccess`] is the small key-value surface the
//! translation engine works against; [`StringsCatalog`] implements it over the
//! JSON document shared by `.xcstrings` and `.json` catalogs.
//!
//! The document is kept as an order-preserving JSON tree. Only
//! `stringUnit.state` and `stringUnit.value` of the languages being written
//! are ever touched, so comments, extraction state, variations and unknown
//! fields survive a load/save round trip.

use crate::error::{CatalogError, CatalogResult};
use crate::locale::{BASE_LANGUAGE, same_language};
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::{BTreeMap, BTreeSet};
use std::fs;
use std::path::Path;

/// Translation state of one entry in one language
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TranslationState {
    Untranslated,
    Translated,
    NeedsReview,
}

impl TranslationState {
    /// Parse the `stringUnit.state` field. `new`, `stale` and a missing
    /// state all count as untranslated.
    pub fn from_catalog(state: Option<&str>) -> Self {
        match state {
            Some("translated") => TranslationState::Translated,
            Some("needs_review") => TranslationState::NeedsReview,
            _ => TranslationState::Untranslated,
        }
    }

    pub fn as_catalog_str(&self) -> &'static str {
        match self {
            TranslationState::Untranslated => "new",
            TranslationState::Translated => "translated",
            TranslationState::NeedsReview => "needs_review",
        }
    }
}

impl std::fmt::Display for TranslationState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TranslationState::Untranslated => write!(f, "untranslated"),
            TranslationState::Translated => write!(f, "translated"),
            TranslationState::NeedsReview => write!(f, "needs-review"),
        }
    }
}

/// The translation of an entry into one language
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Translation {
    pub state: TranslationState,
    pub value: String,
    /// The language uses plural/device variations instead of a single unit.
    /// Such translations are never rewritten.
    pub has_variations: bool,
}

/// One translatable string
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: String,
    /// Text in the catalog's source language (the key when no source unit exists)
    pub source_text: String,
    /// `false` for strings marked do-not-translate
    pub should_translate: bool,
    pub translations: BTreeMap<String, Translation>,
}

impl Entry {
    /// Translation for a language, matching codes loosely (`zh_Hans` ≡ `zh-Hans`)
    pub fn translation(&self, language: &str) -> Option<&Translation> {
        self.translations.get(language).or_else(|| {
            self.translations
                .iter()
                .find(|(code, _)| same_language(code, language))
                .map(|(_, translation)| translation)
        })
    }

    /// State for a language; a missing language is untranslated
    pub fn state(&self, language: &str) -> TranslationState {
        self.translation(language)
            .map(|t| t.state)
            .unwrap_or(TranslationState::Untranslated)
    }
}

/// Record-level access to a localization catalog
///
/// The engine only reads entries and writes translations through this trait,
/// so it stays independent of the file format behind it.
pub trait CatalogAccess {
    /// Language the keys and source texts are written in
    fn source_language(&self) -> &str;

    /// All entries with a non-empty key, in catalog order
    fn list_translatable_entries(&self) -> Vec<Entry>;

    /// State of `key` in `language`; `None` when the key does not exist
    fn translation_state(&self, key: &str, language: &str) -> Option<TranslationState>;

    /// Store `text` for `key` in `language` and mark it translated
    fn set_translation(&mut self, key: &str, language: &str, text: &str) -> CatalogResult<()>;
}

/// A string catalog document (`.xcstrings` or `.json`)
///
/// ```json
/// {
///   "sourceLanguage": "en",
///   "strings": {
///     "Save": {
///       "localizations": {
///         "de": { "stringUnit": { "state": "translated", "value": "Sichern" } }
///       }
///     }
///   },
///   "version": "1.0"
/// }
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct StringsCatalog {
    document: Value,
    source_language: String,
}

impl StringsCatalog {
    /// Fallback when the document has no `sourceLanguage`
    pub const DEFAULT_SOURCE_LANGUAGE: &'static str = "en";

    /// Wrap a parsed JSON document
    ///
    /// # Errors
    ///
    /// `CatalogError::Structure` if the root is not an object or `strings` is
    /// missing or not an object.
    pub fn from_value(document: Value) -> CatalogResult<Self> {
        let root = document
            .as_object()
            .ok_or_else(|| CatalogError::Structure("root must be an object".to_string()))?;

        match root.get("strings") {
            Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(CatalogError::Structure(
                    "'strings' must be an object".to_string(),
                ));
            }
            None => {
                return Err(CatalogError::Structure(
                    "missing 'strings' object".to_string(),
                ));
            }
        }

        let source_language = root
            .get("sourceLanguage")
            .and_then(Value::as_str)
            .filter(|lang| !lang.trim().is_empty())
            .unwrap_or(Self::DEFAULT_SOURCE_LANGUAGE)
            .to_string();

        Ok(Self {
            document,
            source_language,
        })
    }

    /// Parse a catalog from JSON text
    pub fn parse(json: &str) -> CatalogResult<Self> {
        let document: Value = serde_json::from_str(json)?;
        Self::from_value(document)
    }

    /// Read and parse a catalog file
    pub fn load(path: &Path) -> CatalogResult<Self> {
        let content = fs::read_to_string(path).map_err(|source| CatalogError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::parse(&content)
    }

    /// Serialize as pretty-printed JSON (two-space indent, UTF-8 kept verbatim)
    pub fn to_json_string(&self) -> CatalogResult<String> {
        Ok(serde_json::to_string_pretty(&self.document)?)
    }

    /// Write the catalog to `path`
    pub fn save(&self, path: &Path) -> CatalogResult<()> {
        let mut content = self.to_json_string()?;
        content.push('\n');
        fs::write(path, content).map_err(|source| CatalogError::Write {
            path: path.to_path_buf(),
            source,
        })
    }

    /// The underlying JSON document
    pub fn document(&self) -> &Value {
        &self.document
    }

    /// Override the source language read from the document
    pub fn with_source_language(mut self, language: &str) -> Self {
        self.source_language = language.to_string();
        self
    }

    /// Languages that have localizations somewhere in the catalog, excluding
    /// the source language and `Base`
    pub fn detect_target_languages(&self) -> BTreeSet<String> {
        self.strings()
            .into_iter()
            .flat_map(|strings| strings.values())
            .filter_map(|entry| entry.get("localizations").and_then(Value::as_object))
            .flat_map(|localizations| localizations.keys())
            .filter(|code| {
                code.as_str() != BASE_LANGUAGE && !same_language(code, &self.source_language)
            })
            .cloned()
            .collect()
    }

    fn strings(&self) -> Option<&Map<String, Value>> {
        self.document.get("strings").and_then(Value::as_object)
    }

    fn strings_mut(&mut self) -> CatalogResult<&mut Map<String, Value>> {
        self.document
            .get_mut("strings")
            .and_then(Value::as_object_mut)
            .ok_or_else(|| CatalogError::Structure("missing 'strings' object".to_string()))
    }

    fn parse_entry(&self, key: &str, value: &Value) -> Entry {
        let should_translate = value
            .get("shouldTranslate")
            .and_then(Value::as_bool)
            .unwrap_or(true);

        let mut translations = BTreeMap::new();
        if let Some(localizations) = value.get("localizations").and_then(Value::as_object) {
            for (code, localization) in localizations {
                translations.insert(code.clone(), parse_translation(localization));
            }
        }

        let source_text = translations
            .iter()
            .find(|(code, _)| same_language(code, &self.source_language))
            .map(|(_, t)| t.value.clone())
            .filter(|text| !text.is_empty())
            .unwrap_or_else(|| key.to_string());

        Entry {
            key: key.to_string(),
            source_text,
            should_translate,
            translations,
        }
    }
}

fn parse_translation(localization: &Value) -> Translation {
    let unit = localization.get("stringUnit");
    let state = unit
        .and_then(|u| u.get("state"))
        .and_then(Value::as_str);
    let value = unit
        .and_then(|u| u.get("value"))
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string();

    Translation {
        state: TranslationState::from_catalog(state),
        value,
        has_variations: unit.is_none() && localization.get("variations").is_some(),
    }
}

/// Get `map[key]` as an object, inserting an empty one when absent
fn child_object<'a>(
    map: &'a mut Map<String, Value>,
    key: &str,
    context: &str,
) -> CatalogResult<&'a mut Map<String, Value>> {
    map.entry(key.to_string())
        .or_insert_with(|| Value::Object(Map::new()))
        .as_object_mut()
        .ok_or_else(|| CatalogError::Structure(format!("'{}' in {} must be an object", key, context)))
}

impl CatalogAccess for StringsCatalog {
    fn source_language(&self) -> &str {
        &self.source_language
    }

    fn list_translatable_entries(&self) -> Vec<Entry> {
        self.strings()
            .into_iter()
            .flatten()
            .filter(|(key, _)| !key.is_empty())
            .map(|(key, value)| self.parse_entry(key, value))
            .collect()
    }

    fn translation_state(&self, key: &str, language: &str) -> Option<TranslationState> {
        let value = self.strings()?.get(key)?;
        Some(self.parse_entry(key, value).state(language))
    }

    fn set_translation(&mut self, key: &str, language: &str, text: &str) -> CatalogResult<()> {
        let strings = self.strings_mut()?;
        let entry = strings
            .get_mut(key)
            .ok_or_else(|| CatalogError::UnknownKey(key.to_string()))?
            .as_object_mut()
            .ok_or_else(|| CatalogError::Structure(format!("entry '{}' must be an object", key)))?;

        let localizations = child_object(entry, "localizations", key)?;
        // Write into the existing spelling of the language when there is one
        let code = localizations
            .keys()
            .find(|code| same_language(code, language))
            .cloned()
            .unwrap_or_else(|| language.to_string());
        let localization = child_object(localizations, &code, key)?;
        let unit = child_object(localization, "stringUnit", key)?;

        unit.insert(
            "state".to_string(),
            Value::String(TranslationState::Translated.as_catalog_str().to_string()),
        );
        unit.insert("value".to_string(), Value::String(text.to_string()));
        Ok(())
    }
}
