//! Baidu Fanyi general translation provider

use super::{check_status, http_client, non_empty};
use crate::error::{MtError, MtResult, ProviderError, ProviderErrorKind, ProviderResult};
use crate::translator::{MachineTranslator, base_language, check_language_pair};
use async_trait::async_trait;
use md5::{Digest, Md5};
use rand::Rng;
use serde_json::Value;
use std::time::Duration;
use strings_catalog::locale::canonical_code;

/// Baidu translation provider
#[derive(Clone)]
pub struct BaiduProvider {
    app_id: String,
    app_key: String,
    client: reqwest::Client,
    base_url: String,
}

impl BaiduProvider {
    pub const APP_ID_VAR: &'static str = "BAIDU_APP_ID";
    pub const APP_KEY_VAR: &'static str = "BAIDU_APP_KEY";

    pub fn new(app_id: String, app_key: String, timeout: Duration) -> MtResult<Self> {
        if app_id.trim().is_empty() || app_key.trim().is_empty() {
            return Err(MtError::ConfigError(
                "Baidu app id and key cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            app_id,
            app_key,
            client: http_client(timeout)?,
            base_url: "https://fanyi-api.baidu.com/api/trans/vip/translate".to_string(),
        })
    }

    /// Baidu uses its own three-letter codes for several languages
    pub fn map_language(code: &str) -> String {
        match canonical_code(code).as_str() {
            "zh-Hans" | "zh-CN" => "zh".to_string(),
            "zh-Hant" | "zh-TW" | "zh-HK" => "cht".to_string(),
            _ => match base_language(code).as_str() {
                "ja" => "jp".to_string(),
                "ko" => "kor".to_string(),
                "fr" => "fra".to_string(),
                "es" => "spa".to_string(),
                other => other.to_string(),
            },
        }
    }

    /// `md5(appid + q + salt + key)` as lowercase hex
    pub(crate) fn sign(&self, text: &str, salt: &str) -> String {
        let material = format!("{}{}{}{}", self.app_id, text, salt, self.app_key);
        format!("{:x}", Md5::digest(material.as_bytes()))
    }

    /// Classify an `error_code`
    pub fn classify_error_code(code: &str) -> ProviderErrorKind {
        match code {
            "54003" | "54004" => ProviderErrorKind::Quota,
            "52003" | "54001" => ProviderErrorKind::Auth,
            "58001" => ProviderErrorKind::UnsupportedLanguagePair,
            _ => ProviderErrorKind::Transient,
        }
    }

    pub(crate) fn parse_response(json: &Value) -> ProviderResult<String> {
        if let Some(code) = json.get("error_code") {
            // Baidu sends the code as a string, sometimes as a number
            let code = match code {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            };
            if code != "52000" {
                let message = json["error_msg"].as_str().unwrap_or("unknown error");
                return Err(ProviderError::new(
                    Self::classify_error_code(&code),
                    format!("Baidu API error {}: {}", code, message),
                ));
            }
        }

        let results = json["trans_result"].as_array().ok_or_else(|| {
            ProviderError::transient("Invalid API response: missing 'trans_result'")
        })?;
        let text = results
            .iter()
            .filter_map(|result| result["dst"].as_str())
            .collect::<Vec<_>>()
            .join("\n");
        non_empty(text, "baidu")
    }
}

impl std::fmt::Debug for BaiduProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BaiduProvider")
            .field("app_id", &self.app_id)
            .field("app_key", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for BaiduProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> ProviderResult<String> {
        check_language_pair(source_locale, target_locale)?;

        let salt = rand::thread_rng().gen_range(32768..=65536).to_string();
        let sign = self.sign(text, &salt);

        let params = [
            ("q", text.to_string()),
            ("from", Self::map_language(source_locale)),
            ("to", Self::map_language(target_locale)),
            ("appid", self.app_id.clone()),
            ("salt", salt),
            ("sign", sign),
        ];

        let response = self.client.post(&self.base_url).form(&params).send().await?;
        let json: Value = check_status(response).await?.json().await?;
        Self::parse_response(&json)
    }

    fn provider_name(&self) -> &str {
        "baidu"
    }
}
