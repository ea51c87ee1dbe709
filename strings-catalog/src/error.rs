use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while reading, editing or writing catalogs and dictionaries
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The file could not be read
    #[error("Failed to read file '{}': {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The file could not be written
    #[error("Failed to write file '{}': {source}", path.display())]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// The catalog is not valid JSON
    #[error("Failed to parse JSON: {0}")]
    Parse(#[from] serde_json::Error),
    /// The JSON is valid but does not look like a string catalog
    #[error("Invalid catalog structure: {0}")]
    Structure(String),
    /// A dictionary file is missing
    #[error("Dictionary file not found: {}", .0.display())]
    DictionaryNotFound(PathBuf),
    /// A dictionary file is not valid CSV
    #[error("Failed to parse dictionary '{name}': {source}")]
    Dictionary {
        name: String,
        #[source]
        source: csv::Error,
    },
    /// The key does not exist in the catalog
    #[error("Unknown catalog key: {0}")]
    UnknownKey(String),
}

/// Result type for catalog operations
pub type CatalogResult<T> = Result<T, CatalogError>;
