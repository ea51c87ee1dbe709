use serde::Serialize;
use strings_catalog::CatalogError;
use thiserror::Error;

/// Error types for setting up and running catalog translation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MtError {
    /// Invalid configuration or a provider that cannot be used
    #[error("Configuration error: {0}")]
    ConfigError(String),
    /// Error creating the HTTP client or talking to the network
    #[error("Network error: {0}")]
    NetworkError(String),
    /// Locale code that cannot be sent to a provider
    #[error("Invalid locale: {0}")]
    InvalidLocale(String),
    /// Reading or writing the catalog, dictionaries or report failed
    #[error("Catalog error: {0}")]
    CatalogError(String),
    /// General error with context
    #[error("{0}")]
    Other(String),
}

impl From<CatalogError> for MtError {
    fn from(e: CatalogError) -> Self {
        MtError::CatalogError(e.to_string())
    }
}

/// Result type for MT operations
pub type MtResult<T> = Result<T, MtError>;

/// Why a provider call failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ProviderErrorKind {
    /// Credentials rejected
    Auth,
    /// Request quota or rate limit exhausted
    Quota,
    /// Network failure, timeout or server error; worth retrying
    Transient,
    /// The provider cannot translate between these languages
    UnsupportedLanguagePair,
}

impl ProviderErrorKind {
    /// Classify an HTTP error status
    pub fn from_status(status: u16) -> Self {
        match status {
            401 | 403 => ProviderErrorKind::Auth,
            429 => ProviderErrorKind::Quota,
            400 => ProviderErrorKind::UnsupportedLanguagePair,
            402..=499 => ProviderErrorKind::Auth,
            _ => ProviderErrorKind::Transient,
        }
    }

    /// Only transient failures are retried
    pub fn is_retryable(&self) -> bool {
        matches!(self, ProviderErrorKind::Transient)
    }
}

impl std::fmt::Display for ProviderErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderErrorKind::Auth => write!(f, "auth"),
            ProviderErrorKind::Quota => write!(f, "quota"),
            ProviderErrorKind::Transient => write!(f, "transient"),
            ProviderErrorKind::UnsupportedLanguagePair => write!(f, "unsupported-language-pair"),
        }
    }
}

/// A failed provider call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} error: {message}")]
pub struct ProviderError {
    pub kind: ProviderErrorKind,
    pub message: String,
}

impl ProviderError {
    pub fn new(kind: ProviderErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn auth(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Auth, message)
    }

    pub fn quota(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Quota, message)
    }

    pub fn transient(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::Transient, message)
    }

    pub fn unsupported(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorKind::UnsupportedLanguagePair, message)
    }
}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        let kind = match e.status() {
            Some(status) => ProviderErrorKind::from_status(status.as_u16()),
            None => ProviderErrorKind::Transient,
        };
        ProviderError::new(kind, e.to_string())
    }
}

impl From<MtError> for ProviderError {
    fn from(e: MtError) -> Self {
        let kind = match e {
            MtError::InvalidLocale(_) => ProviderErrorKind::UnsupportedLanguagePair,
            MtError::ConfigError(_) => ProviderErrorKind::Auth,
            _ => ProviderErrorKind::Transient,
        };
        ProviderError::new(kind, e.to_string())
    }
}

/// Result type for provider calls
pub type ProviderResult<T> = Result<T, ProviderError>;
