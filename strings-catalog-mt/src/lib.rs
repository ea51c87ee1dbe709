//! Machine translation for string catalogs
//!
//! This crate fills the missing translations of a
//! [`StringsCatalog`](strings_catalog::StringsCatalog) from term dictionaries
//! and a chain of translation providers.
//!
//! # Workflow Example
//!
//! ```ignore
//! use strings_catalog::{CatalogAccess, DictionaryStore, StringsCatalog, loader};
//! use strings_catalog_mt::{
//!     EngineConfig, EnvCredentials, ProviderChain, ResolutionEngine, TranslationMode,
//!     translate_catalog,
//! };
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // 1. Load the catalog and dictionaries
//!     let mut catalog = StringsCatalog::load(Path::new("Localizable.xcstrings"))?;
//!     let (dictionaries, _) = loader::load_dictionaries(&[PathBuf::from("terms.csv")]);
//!     let mut store = DictionaryStore::new();
//!     dictionaries.into_iter().for_each(|d| store.push(d));
//!
//!     // 2. Build the provider chain: primary first, then fallbacks
//!     let config = EngineConfig::default();
//!     let mut chain = ProviderChain::from_names(&["youdao", "google"], &EnvCredentials, &config);
//!
//!     // 3. Resolve and merge
//!     let targets: Vec<String> = catalog.detect_target_languages().into_iter().collect();
//!     let source = catalog.source_language().to_string();
//!     let mut engine = ResolutionEngine::new(&store, &mut chain, &source);
//!     let report = translate_catalog(
//!         &mut catalog, &mut engine, &targets, TranslationMode::Skip, &AtomicBool::new(false),
//!     ).await;
//!
//!     catalog.save(Path::new("Localizable_translated.xcstrings"))?;
//!     println!("{} translated, {} unresolved", report.translated(), report.unresolved.len());
//!     Ok(())
//! }
//! ```

pub mod chain;
pub mod config;
pub mod credentials;
pub mod error;
pub mod merge;
pub mod mock;
pub mod providers;
pub mod rate_limit;
pub mod report;
pub mod resolution;
pub mod translator;


// Re-export main types for convenient access
pub use chain::{ChainOutcome, ProviderChain, ProviderDescriptor, ProviderFailure, ProviderStatus, RetryPolicy};
pub use config::{EngineConfig, ProviderOverrides};
pub use credentials::{CredentialSource, EnvCredentials, StaticCredentials};
pub use error::{MtError, MtResult, ProviderError, ProviderErrorKind, ProviderResult};
pub use merge::{MergePlan, PairRequest, TranslationMode, apply, is_translatable_text, plan, translate_catalog};
pub use mock::{MockMode, MockTranslator};
pub use providers::{
    BaiduProvider, GoogleFreeProvider, GoogleTranslateProvider, ProviderKind, TencentProvider,
    YoudaoProvider,
};
pub use rate_limit::RateLimiter;
pub use report::{JsonFileSink, ReportSink, RunReport, TracingSink, UnresolvedPair, WriteFailure};
pub use resolution::{Provenance, ResolutionEngine, ResolutionResult};
pub use translator::MachineTranslator;
