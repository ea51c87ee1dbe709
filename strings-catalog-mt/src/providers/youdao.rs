//! Youdao OpenAPI provider (v3 SHA-256 signature)

use super::{check_status, http_client, non_empty};
use crate::error::{MtError, MtResult, ProviderError, ProviderErrorKind, ProviderResult};
use crate::translator::{MachineTranslator, base_language, check_language_pair};
use async_trait::async_trait;
use rand::Rng;
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;
use strings_catalog::locale::canonical_code;

/// Youdao translation provider
#[derive(Clone)]
pub struct YoudaoProvider {
    app_key: String,
    app_secret: String,
    client: reqwest::Client,
    base_url: String,
}

impl YoudaoProvider {
    pub const APP_KEY_VAR: &'static str = "YOUDAO_APP_KEY";
    pub const APP_SECRET_VAR: &'static str = "YOUDAO_APP_SECRET";

    pub fn new(app_key: String, app_secret: String, timeout: Duration) -> MtResult<Self> {
        if app_key.trim().is_empty() || app_secret.trim().is_empty() {
            return Err(MtError::ConfigError(
                "Youdao app key and secret cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            app_key,
            app_secret,
            client: http_client(timeout)?,
            base_url: "https://openapi.youdao.com/api".to_string(),
        })
    }

    /// Youdao's code for a catalog language
    pub fn map_language(code: &str) -> String {
        match canonical_code(code).as_str() {
            "zh-Hans" | "zh-CN" => "zh-CHS".to_string(),
            "zh-Hant" | "zh-TW" | "zh-HK" => "zh-CHT".to_string(),
            _ => base_language(code),
        }
    }

    /// The `input` part of the v3 signature: the text itself when it has at
    /// most 20 chars, otherwise its first 10 chars, its length and its last 10
    fn sign_input(text: &str) -> String {
        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= 20 {
            return text.to_string();
        }
        let head: String = chars[..10].iter().collect();
        let tail: String = chars[chars.len() - 10..].iter().collect();
        format!("{}{}{}", head, chars.len(), tail)
    }

    /// `sha256(appKey + input + salt + curtime + appSecret)` as lowercase hex
    pub(crate) fn sign(&self, text: &str, salt: &str, curtime: &str) -> String {
        let material = format!(
            "{}{}{}{}{}",
            self.app_key,
            Self::sign_input(text),
            salt,
            curtime,
            self.app_secret
        );
        format!("{:x}", Sha256::digest(material.as_bytes()))
    }

    /// Classify a non-zero `errorCode`
    pub fn classify_error_code(code: &str) -> ProviderErrorKind {
        match code {
            "411" | "401" => ProviderErrorKind::Quota,
            "108" | "110" | "111" | "202" => ProviderErrorKind::Auth,
            "102" | "103" => ProviderErrorKind::UnsupportedLanguagePair,
            _ => ProviderErrorKind::Transient,
        }
    }

    pub(crate) fn parse_response(json: &Value) -> ProviderResult<String> {
        let code = json["errorCode"].as_str().unwrap_or("unknown");
        if code != "0" {
            return Err(ProviderError::new(
                Self::classify_error_code(code),
                format!("Youdao API error {}", code),
            ));
        }

        let text = json["translation"]
            .as_array()
            .and_then(|translations| translations.first())
            .and_then(Value::as_str)
            .ok_or_else(|| ProviderError::transient("Invalid API response: missing 'translation'"))?;
        non_empty(text.to_string(), "youdao")
    }
}

impl std::fmt::Debug for YoudaoProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("YoudaoProvider")
            .field("app_key", &self.app_key)
            .field("app_secret", &"***")
            .field("base_url", &self.base_url)
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for YoudaoProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> ProviderResult<String> {
        check_language_pair(source_locale, target_locale)?;

        let salt = rand::thread_rng().gen_range(1..=65536).to_string();
        let curtime = chrono::Utc::now().timestamp().to_string();
        let sign = self.sign(text, &salt, &curtime);

        let params = [
            ("q", text.to_string()),
            ("from", Self::map_language(source_locale)),
            ("to", Self::map_language(target_locale)),
            ("appKey", self.app_key.clone()),
            ("salt", salt),
            ("sign", sign),
            ("signType", "v3".to_string()),
            ("curtime", curtime),
        ];

        let response = self.client.post(&self.base_url).form(&params).send().await?;
        let json: Value = check_status(response).await?.json().await?;
        Self::parse_response(&json)
    }

    fn provider_name(&self) -> &str {
        "youdao"
    }
}
