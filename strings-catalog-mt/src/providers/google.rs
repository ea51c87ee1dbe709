//! Google Translate via the free web endpoint
//!
//! Uses `translate_a/single?client=gtx`, which needs no key but is rate
//! limited aggressively (HTTP 429).

use super::{check_status, http_client, non_empty};
use crate::error::{MtResult, ProviderError, ProviderResult};
use crate::translator::{MachineTranslator, base_language, check_language_pair};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;
use strings_catalog::locale::canonical_code;

/// Keyless Google Translate provider
#[derive(Debug, Clone)]
pub struct GoogleFreeProvider {
    client: reqwest::Client,
    base_url: String,
}

impl GoogleFreeProvider {
    pub const DEFAULT_URL: &'static str = "https://translate.googleapis.com/translate_a/single";

    pub fn new(timeout: Duration) -> MtResult<Self> {
        Ok(Self {
            client: http_client(timeout)?,
            base_url: Self::DEFAULT_URL.to_string(),
        })
    }

    /// Google's code for a catalog language
    pub fn map_language(code: &str) -> String {
        match canonical_code(code).as_str() {
            "zh-Hans" | "zh-CN" | "zh-SG" => "zh-CN".to_string(),
            "zh-Hant" | "zh-TW" | "zh-HK" | "zh-MO" => "zh-TW".to_string(),
            _ => base_language(code),
        }
    }

    /// Join the translated segments of a `translate_a/single` response
    ///
    /// The response is a nested array; `[0]` lists sentence segments whose
    /// first element is the translated text.
    pub(crate) fn parse_response(json: &Value) -> ProviderResult<String> {
        let segments = json
            .get(0)
            .and_then(Value::as_array)
            .ok_or_else(|| ProviderError::transient("Unexpected response: missing segments"))?;

        let text: String = segments
            .iter()
            .filter_map(|segment| segment.get(0).and_then(Value::as_str))
            .collect();
        non_empty(text, "google")
    }
}

#[async_trait]
impl MachineTranslator for GoogleFreeProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> ProviderResult<String> {
        check_language_pair(source_locale, target_locale)?;

        let source = Self::map_language(source_locale);
        let target = Self::map_language(target_locale);
        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("client", "gtx"),
                ("sl", source.as_str()),
                ("tl", target.as_str()),
                ("dt", "t"),
                ("q", text),
            ])
            .send()
            .await?;

        let json: Value = check_status(response).await?.json().await?;
        Self::parse_response(&json)
    }

    fn provider_name(&self) -> &str {
        "google"
    }
}
