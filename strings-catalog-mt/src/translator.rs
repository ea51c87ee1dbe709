//! The provider call contract
//!
//! Every backend (Google, Youdao, Baidu, Tencent, mock) implements
//! [`MachineTranslator`]; the helpers below are shared by their language-code
//! mapping.
//!
//! # Example
//!
//! ```ignore
//! use strings_catalog_mt::{MachineTranslator, GoogleFreeProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleFreeProvider::new(Duration::from_secs(10))?;
//!
//!     let result = provider.translate("Hello, world!", "en", "fr").await?;
//!     println!("{}", result); // "Bonjour, le monde!"
//!
//!     Ok(())
//! }
//! ```

use crate::error::{MtError, MtResult, ProviderResult};
use async_trait::async_trait;

/// Generic trait for machine translation providers
///
/// Implementations of this trait handle the actual translation work,
/// whether through an API or deterministic logic (Mock).
///
/// Rate limiting, retries and timeouts are not the provider's job; the
/// [`ProviderChain`](crate::chain::ProviderChain) wraps every call.
#[async_trait]
pub trait MachineTranslator: Send + Sync {
    /// Translate a single text string from source to target locale
    ///
    /// # Arguments
    ///
    /// * `text` - The text to translate
    /// * `source_locale` - Source language code as it appears in the catalog (e.g., "en")
    /// * `target_locale` - Target language code as it appears in the catalog (e.g., "zh-Hans")
    ///
    /// # Returns
    ///
    /// * `Ok(String)` - The translated text, never empty
    /// * `Err(ProviderError)` - Classified failure (`auth`, `quota`, `transient`,
    ///   `unsupported-language-pair`)
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> ProviderResult<String>;

    /// Get the name of this translation provider
    ///
    /// The name identifies the provider in the chain and in provenance tags
    /// (`provider:<name>`), so it should be short and stable (e.g., "google").
    fn provider_name(&self) -> &str;
}

/// Primary language subtag of a catalog code, lower-cased
///
/// `zh-Hans` and `zh_Hant` both give `zh`, `pt-BR` gives `pt`. Providers use it
/// as the fallback of their own code tables.
pub fn base_language(code: &str) -> String {
    code.split(['-', '_'])
        .next()
        .unwrap_or(code)
        .to_ascii_lowercase()
}

/// Reject codes no provider could make sense of before spending a request
///
/// A code must be non-empty and made of ASCII letters, digits, `-` and `_`.
pub fn check_language_pair(source: &str, target: &str) -> MtResult<()> {
    for code in [source, target] {
        if code.is_empty() {
            return Err(MtError::InvalidLocale("empty language code".to_string()));
        }
        if let Some(c) = code
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(MtError::InvalidLocale(format!(
                "'{}' contains '{}'",
                code, c
            )));
        }
    }
    if source == target {
        return Err(MtError::InvalidLocale(format!(
            "source and target are both '{}'",
            source
        )));
    }
    Ok(())
}
