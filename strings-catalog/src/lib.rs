//! String catalogs and term dictionaries for app localization
//!
//! This crate holds the data side of catalog translation:
//!
//! - [`catalog`]: entries, translation states, the [`CatalogAccess`] surface and
//!   the JSON [`StringsCatalog`] document used by `.xcstrings` and `.json` files
//! - [`dictionary`]: ordered term dictionaries with exact and fuzzy lookup
//! - [`loader`]: CSV dictionary loading and output path helpers
//! - [`locale`]: language code canonicalization
//!
//! # Example
//!
//! ```ignore
//! use strings_catalog::{CatalogAccess, DictionaryStore, StringsCatalog, loader};
//!
//! let catalog = StringsCatalog::load(Path::new("Localizable.xcstrings"))?;
//! let (dictionaries, _errors) = loader::load_dictionaries(&[PathBuf::from("terms.csv")]);
//! let mut store = DictionaryStore::new();
//! for dictionary in dictionaries {
//!     store.push(dictionary);
//! }
//!
//! for entry in catalog.list_translatable_entries() {
//!     if let Some(hit) = store.lookup(&entry.source_text, "ja") {
//!         println!("{} -> {}", entry.key, hit.text);
//!     }
//! }
//! ```

pub mod catalog;
pub mod dictionary;
pub mod error;
pub mod loader;
pub mod locale;

pub use catalog::{CatalogAccess, Entry, StringsCatalog, Translation, TranslationState};
pub use dictionary::{
    Dictionary, DictionaryHit, DictionaryStore, DictionarySummary, DictionaryTerm, MatchKind,
    normalize_for_match, similarity,
};
pub use error::{CatalogError, CatalogResult};
