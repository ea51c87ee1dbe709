//! Google Cloud Translation API provider
//!
//! This module integrates with Google Translate API v2 to provide keyed
//! machine translation with a documented quota.
//!
//! # Authentication
//!
//! The provider needs an API key (`GOOGLE_TRANSLATE_API_KEY`). Obtain a key from:
//! https://console.cloud.google.com/
//!
//! # Example
//!
//! ```ignore
//! use strings_catalog_mt::{MachineTranslator, GoogleTranslateProvider};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let provider = GoogleTranslateProvider::new(api_key, Duration::from_secs(15))?;
//!     let result = provider.translate("Hello, world!", "en", "fr").await?;
//!     println!("{}", result);
//!     Ok(())
//! }
//! ```

use super::{check_status, http_client, non_empty};
use crate::error::{MtError, MtResult, ProviderError, ProviderResult};
use crate::translator::{MachineTranslator, base_language, check_language_pair};
use async_trait::async_trait;
use serde_json::{Value, json};
use std::time::Duration;
use strings_catalog::locale::canonical_code;

/// Keyed Google Cloud Translation (v2) backend, registered as `google-cloud`
#[derive(Clone)]
pub struct GoogleTranslateProvider {
    api_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl GoogleTranslateProvider {
    /// Environment variable holding the API key
    pub const API_KEY_VAR: &'static str = "GOOGLE_TRANSLATE_API_KEY";

    /// Longest text accepted in one request, in chars
    const MAX_CHARS_PER_STRING: usize = 30_000;

    /// Create a new GoogleTranslateProvider with an explicit API key
    ///
    /// # Arguments
    ///
    /// * `api_key` - Google Translate API key
    /// * `timeout` - Per-request timeout
    ///
    /// # Returns
    ///
    /// * `Ok(Self)` - New provider instance
    /// * `Err(MtError)` - If API key is empty or HTTP client creation fails
    pub fn new(api_key: String, timeout: Duration) -> MtResult<Self> {
        if api_key.trim().is_empty() {
            return Err(MtError::ConfigError("API key cannot be empty".to_string()));
        }

        Ok(Self {
            api_key,
            client: http_client(timeout)?,
            base_url: "https://translation.googleapis.com/language/translate/v2".to_string(),
        })
    }

    /// Google's code for a catalog language
    pub fn map_language(code: &str) -> String {
        match canonical_code(code).as_str() {
            "zh-Hans" | "zh-CN" => "zh-CN".to_string(),
            "zh-Hant" | "zh-TW" | "zh-HK" => "zh-TW".to_string(),
            _ => base_language(code),
        }
    }

    /// Extract `data.translations[0].translatedText` from an API response
    fn parse_response(json: &Value) -> ProviderResult<String> {
        let translations = json["data"]["translations"].as_array().ok_or_else(|| {
            ProviderError::transient("Invalid API response: missing 'data.translations' array")
        })?;

        let text = translations
            .first()
            .and_then(|t| t["translatedText"].as_str())
            .ok_or_else(|| {
                ProviderError::transient("Invalid API response: missing 'translatedText' field")
            })?;

        non_empty(text.to_string(), "google-cloud")
    }
}

impl std::fmt::Debug for GoogleTranslateProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GoogleTranslateProvider")
            .field("api_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for GoogleTranslateProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> ProviderResult<String> {
        check_language_pair(source_locale, target_locale)?;

        if text.chars().count() > Self::MAX_CHARS_PER_STRING {
            return Err(ProviderError::unsupported(format!(
                "Text exceeds maximum length of {} characters",
                Self::MAX_CHARS_PER_STRING
            )));
        }

        let url = format!("{}?key={}", self.base_url, self.api_key);
        let body = json!({
            "q": [text],
            "source": Self::map_language(source_locale),
            "target": Self::map_language(target_locale),
            "format": "text"
        });

        let response = self.client.post(&url).json(&body).send().await?;
        let json: Value = check_status(response).await?.json().await?;
        Self::parse_response(&json)
    }

    fn provider_name(&self) -> &str {
        "google-cloud"
    }
}
