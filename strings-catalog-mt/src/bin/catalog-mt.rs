use clap::{Arg, ArgAction, Command};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use strings_catalog::{CatalogAccess, DictionaryStore, StringsCatalog, loader};
use strings_catalog_mt::{
    EngineConfig, EnvCredentials, JsonFileSink, MockMode, MockTranslator, ProviderChain,
    RateLimiter, ReportSink, ResolutionEngine, TracingSink, TranslationMode, translate_catalog,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Values of a repeatable, comma-separated option
fn list_values(matches: &clap::ArgMatches, id: &str) -> Vec<String> {
    matches
        .get_many::<String>(id)
        .map(|values| {
            values
                .flat_map(|v| v.split(','))
                .map(str::trim)
                .filter(|v| !v.is_empty())
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

fn mock_chain(config: &EngineConfig) -> ProviderChain {
    let overrides = config.overrides_for("mock");
    let mut limiter = RateLimiter::new(overrides.min_interval().unwrap_or_default());
    if let Some((max_calls, window)) = overrides.budget() {
        limiter = limiter.with_budget(max_calls, window);
    }
    ProviderChain::new(config.retry_policy())
        .with_translator(Arc::new(MockTranslator::new(MockMode::Suffix)), limiter)
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let matches = Command::new("catalog-mt")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Fill missing translations in a string catalog from dictionaries and MT providers")
        .arg(
            Arg::new("input")
                .help("Catalog to translate (.xcstrings)")
                .required(true)
                .index(1),
        )
        .arg(
            Arg::new("output")
                .help("Where to write the result (default: <input>_translated.xcstrings)")
                .index(2),
        )
        .arg(
            Arg::new("lang")
                .long("lang")
                .short('l')
                .help("Target language, repeatable or comma-separated (default: languages found in the catalog)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("provider")
                .long("provider")
                .short('p')
                .help("Provider in fallback order: google, google-cloud, youdao, baidu, tencent")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("dict")
                .long("dict")
                .short('d')
                .help("Dictionary file (.csv), repeatable; earlier files win")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("mode")
                .long("mode")
                .help("skip: only untranslated pairs; full: also retranslate prose")
                .default_value("skip"),
        )
        .arg(
            Arg::new("source")
                .long("source")
                .short('s')
                .help("Override the catalog's source language"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .short('c')
                .help("Engine configuration file (TOML)"),
        )
        .arg(
            Arg::new("report")
                .long("report")
                .short('r')
                .help("Write the run report as JSON to this path"),
        )
        .arg(
            Arg::new("mock")
                .long("mock")
                .short('m')
                .help("Use the mock translator instead of real providers")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("dry-run")
                .long("dry-run")
                .short('n')
                .help("Resolve everything but do not write the catalog")
                .action(ArgAction::SetTrue),
        )
        .arg(
            Arg::new("verbose")
                .long("verbose")
                .short('v')
                .help("Log every resolved pair")
                .action(ArgAction::SetTrue),
        )
        .get_matches();

    let default_level = if matches.get_flag("verbose") { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .init();

    let mode: TranslationMode = matches
        .get_one::<String>("mode")
        .map(|m| m.parse::<TranslationMode>())
        .transpose()?
        .unwrap_or_default();

    let config = match matches.get_one::<String>("config") {
        Some(path) => EngineConfig::load(Path::new(path))?,
        None => EngineConfig::default(),
    };
    config.validate()?;

    // 1. Catalog
    let input = matches
        .get_one::<String>("input")
        .map(PathBuf::from)
        .ok_or("Missing input catalog")?;
    let mut catalog = StringsCatalog::load(&input)?;
    if let Some(source) = matches
        .get_one::<String>("source")
        .or(config.source_language.as_ref())
    {
        catalog = catalog.with_source_language(source);
    }
    let source_language = catalog.source_language().to_string();

    // 2. Dictionaries
    let dictionary_paths: Vec<PathBuf> = list_values(&matches, "dict")
        .into_iter()
        .map(PathBuf::from)
        .collect();
    let (dictionaries, errors) = loader::load_dictionaries(&dictionary_paths);
    for error in &errors {
        warn!("{}", error);
    }
    let mut store = DictionaryStore::new().with_threshold(config.fuzzy_threshold);
    for dictionary in dictionaries {
        store.push(dictionary);
    }

    // 3. Providers
    let mut chain = if matches.get_flag("mock") {
        mock_chain(&config)
    } else {
        let mut names = list_values(&matches, "provider");
        if names.is_empty() {
            names.push("google".to_string());
        }
        ProviderChain::from_names(&names, &EnvCredentials, &config)
    };
    if !chain.has_usable_provider() {
        warn!("No usable provider; only dictionaries will be consulted");
    }

    // 4. Targets
    let mut targets = list_values(&matches, "lang");
    if targets.is_empty() {
        targets = catalog.detect_target_languages().into_iter().collect();
    }
    if targets.is_empty() {
        warn!("No target languages given or found in {}", input.display());
    }

    let cancel = Arc::new(AtomicBool::new(false));
    {
        let cancel = Arc::clone(&cancel);
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupted, finishing the current request");
                cancel.store(true, Ordering::SeqCst);
            }
        });
    }

    // 5. Resolve and merge
    let report = {
        let mut engine = ResolutionEngine::new(&store, &mut chain, &source_language);
        translate_catalog(&mut catalog, &mut engine, &targets, mode, &cancel).await
    };

    TracingSink.publish(&report)?;
    if let Some(path) = matches.get_one::<String>("report") {
        JsonFileSink::new(path).publish(&report)?;
    }

    // 6. Write
    if matches.get_flag("dry-run") {
        info!("Dry run, catalog not written");
        return Ok(());
    }
    let output = matches
        .get_one::<String>("output")
        .map(PathBuf::from)
        .unwrap_or_else(|| loader::default_output_path(&input));
    catalog.save(&output)?;
    info!(path = %output.display(), translated = report.translated(), "Catalog written");

    Ok(())
}
