//! Tencent Cloud Machine Translation (TMT) provider
//!
//! Requests are signed with TC3-HMAC-SHA256: the canonical request is hashed,
//! wrapped in a credential scope of `<date>/tmt/tc3_request`, and signed with a
//! key derived from the secret by chaining HMACs over date, service and
//! `tc3_request`.

use super::{check_status, http_client, non_empty};
use crate::error::{MtError, MtResult, ProviderError, ProviderErrorKind, ProviderResult};
use crate::translator::{MachineTranslator, base_language, check_language_pair};
use async_trait::async_trait;
use hmac::{Hmac, Mac};
use serde_json::{Value, json};
use sha2::{Digest, Sha256};
use std::time::Duration;
use strings_catalog::locale::canonical_code;

type HmacSha256 = Hmac<Sha256>;

const HOST: &str = "tmt.tencentcloudapi.com";
const SERVICE: &str = "tmt";
const ACTION: &str = "TextTranslate";
const VERSION: &str = "2018-03-21";
const REGION: &str = "ap-beijing";
const CONTENT_TYPE: &str = "application/json; charset=utf-8";
const SIGNED_HEADERS: &str = "content-type;host";
const ALGORITHM: &str = "TC3-HMAC-SHA256";

/// Tencent translation provider
#[derive(Clone)]
pub struct TencentProvider {
    secret_id: String,
    secret_key: String,
    client: reqwest::Client,
}

impl TencentProvider {
    pub const SECRET_ID_VAR: &'static str = "TENCENT_SECRET_ID";
    pub const SECRET_KEY_VAR: &'static str = "TENCENT_SECRET_KEY";

    pub fn new(secret_id: String, secret_key: String, timeout: Duration) -> MtResult<Self> {
        if secret_id.trim().is_empty() || secret_key.trim().is_empty() {
            return Err(MtError::ConfigError(
                "Tencent secret id and key cannot be empty".to_string(),
            ));
        }

        Ok(Self {
            secret_id,
            secret_key,
            client: http_client(timeout)?,
        })
    }

    pub fn map_language(code: &str) -> String {
        match canonical_code(code).as_str() {
            "zh-Hans" | "zh-CN" => "zh".to_string(),
            "zh-Hant" | "zh-TW" | "zh-HK" => "zh-TW".to_string(),
            _ => base_language(code),
        }
    }

    /// JSON body of a `TextTranslate` request
    pub(crate) fn payload(text: &str, source: &str, target: &str) -> String {
        json!({
            "SourceText": text,
            "Source": source,
            "Target": target,
            "ProjectId": 0
        })
        .to_string()
    }

    /// `Authorization` header value for `payload` sent at `timestamp`
    pub(crate) fn authorization(&self, payload: &str, timestamp: i64) -> ProviderResult<String> {
        let date = chrono::DateTime::from_timestamp(timestamp, 0)
            .ok_or_else(|| ProviderError::transient(format!("Invalid timestamp {}", timestamp)))?
            .format("%Y-%m-%d")
            .to_string();

        let canonical_headers = format!("content-type:{}\nhost:{}\n", CONTENT_TYPE, HOST);
        let canonical_request = format!(
            "POST\n/\n\n{}\n{}\n{}",
            canonical_headers,
            SIGNED_HEADERS,
            sha256_hex(payload)
        );

        let scope = format!("{}/{}/tc3_request", date, SERVICE);
        let string_to_sign = format!(
            "{}\n{}\n{}\n{}",
            ALGORITHM,
            timestamp,
            scope,
            sha256_hex(&canonical_request)
        );

        let secret_date = hmac_sha256(format!("TC3{}", self.secret_key).as_bytes(), &date)?;
        let secret_service = hmac_sha256(&secret_date, SERVICE)?;
        let secret_signing = hmac_sha256(&secret_service, "tc3_request")?;
        let signature = hmac_sha256_hex(&secret_signing, &string_to_sign)?;

        Ok(format!(
            "{} Credential={}/{}, SignedHeaders={}, Signature={}",
            ALGORITHM, self.secret_id, scope, SIGNED_HEADERS, signature
        ))
    }

    /// Classify a `Response.Error.Code`
    pub fn classify_error_code(code: &str) -> ProviderErrorKind {
        if code.starts_with("AuthFailure") {
            ProviderErrorKind::Auth
        } else if code.starts_with("LimitExceeded") || code == "RequestLimitExceeded" {
            ProviderErrorKind::Quota
        } else if code.starts_with("UnsupportedOperation") && code.contains("Language") {
            ProviderErrorKind::UnsupportedLanguagePair
        } else {
            ProviderErrorKind::Transient
        }
    }

    pub(crate) fn parse_response(json: &Value) -> ProviderResult<String> {
        let response = &json["Response"];
        if let Some(code) = response["Error"]["Code"].as_str() {
            let message = response["Error"]["Message"].as_str().unwrap_or("");
            return Err(ProviderError::new(
                Self::classify_error_code(code),
                format!("Tencent API error {}: {}", code, message),
            ));
        }

        let text = response["TargetText"].as_str().ok_or_else(|| {
            ProviderError::transient("Invalid API response: missing 'Response.TargetText'")
        })?;
        non_empty(text.to_string(), "tencent")
    }
}

fn sha256_hex(data: &str) -> String {
    format!("{:x}", Sha256::digest(data.as_bytes()))
}

fn keyed_mac(key: &[u8], message: &str) -> ProviderResult<HmacSha256> {
    let mut mac = HmacSha256::new_from_slice(key)
        .map_err(|e| ProviderError::auth(format!("Invalid signing key: {}", e)))?;
    mac.update(message.as_bytes());
    Ok(mac)
}

fn hmac_sha256(key: &[u8], message: &str) -> ProviderResult<Vec<u8>> {
    Ok(keyed_mac(key, message)?.finalize().into_bytes().to_vec())
}

fn hmac_sha256_hex(key: &[u8], message: &str) -> ProviderResult<String> {
    Ok(format!("{:x}", keyed_mac(key, message)?.finalize().into_bytes()))
}

impl std::fmt::Debug for TencentProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TencentProvider")
            .field("secret_id", &self.secret_id)
            .field("secret_key", &"***")
            .finish()
    }
}

#[async_trait]
impl MachineTranslator for TencentProvider {
    async fn translate(
        &self,
        text: &str,
        source_locale: &str,
        target_locale: &str,
    ) -> ProviderResult<String> {
        check_language_pair(source_locale, target_locale)?;

        let payload = Self::payload(
            text,
            &Self::map_language(source_locale),
            &Self::map_language(target_locale),
        );
        let timestamp = chrono::Utc::now().timestamp();
        let authorization = self.authorization(&payload, timestamp)?;

        let response = self
            .client
            .post(format!("https://{}", HOST))
            .header("Authorization", authorization)
            .header("Content-Type", CONTENT_TYPE)
            .header("Host", HOST)
            .header("X-TC-Action", ACTION)
            .header("X-TC-Timestamp", timestamp.to_string())
            .header("X-TC-Version", VERSION)
            .header("X-TC-Region", REGION)
            .body(payload)
            .send()
            .await?;

        let json: Value = check_status(response).await?.json().await?;
        Self::parse_response(&json)
    }

    fn provider_name(&self) -> &str {
        "tencent"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider() -> TencentProvider {
        TencentProvider::new(
            "AKIDEXAMPLE".to_string(),
            "secret".to_string(),
            Duration::from_secs(5),
        )
        .unwrap()
    }

    #[test]
    fn test_payload_is_compact() {
        assert_eq!(
            TencentProvider::payload("Save", "en", "de"),
            r#"{"SourceText":"Save","Source":"en","Target":"de","ProjectId":0}"#
        );
    }

    #[test]
    fn test_authorization_signature() {
        let payload = TencentProvider::payload("Save", "en", "de");
        let authorization = provider().authorization(&payload, 1_700_000_000).unwrap();
        assert_eq!(
            authorization,
            "TC3-HMAC-SHA256 Credential=AKIDEXAMPLE/2023-11-14/tmt/tc3_request, \
             SignedHeaders=content-type;host, \
             Signature=4f35dd2742812396e716b7668119765be35dfbfc6926e5f940f19e5550de000b"
        );
    }

    #[test]
    fn test_hmac_hex_is_lowercase_digest() {
        assert_eq!(
            hmac_sha256_hex(b"key", "The quick brown fox jumps over the lazy dog").unwrap(),
            "f7bc83f430538424b13298e6aa6fb143ef4d59a14946175997479dbc2d1a3cd8"
        );
    }

    #[test]
    fn test_map_language() {
        assert_eq!(TencentProvider::map_language("zh-Hans"), "zh");
        assert_eq!(TencentProvider::map_language("zh-Hant"), "zh-TW");
        assert_eq!(TencentProvider::map_language("ja"), "ja");
    }

    #[test]
    fn test_parse_success() {
        let json = json!({ "Response": { "TargetText": "Speichern", "RequestId": "abc" } });
        assert_eq!(TencentProvider::parse_response(&json).unwrap(), "Speichern");
    }

    #[test]
    fn test_error_classification() {
        assert_eq!(
            TencentProvider::classify_error_code("AuthFailure.SignatureFailure"),
            ProviderErrorKind::Auth
        );
        assert_eq!(
            TencentProvider::classify_error_code("RequestLimitExceeded"),
            ProviderErrorKind::Quota
        );
        assert_eq!(
            TencentProvider::classify_error_code("LimitExceeded"),
            ProviderErrorKind::Quota
        );
        assert_eq!(
            TencentProvider::classify_error_code("UnsupportedOperation.UnsupportedLanguage"),
            ProviderErrorKind::UnsupportedLanguagePair
        );
        assert_eq!(
            TencentProvider::classify_error_code("InternalError"),
            ProviderErrorKind::Transient
        );
    }

    #[test]
    fn test_parse_error_response() {
        let json = json!({
            "Response": {
                "Error": { "Code": "AuthFailure.SecretIdNotFound", "Message": "not found" },
                "RequestId": "abc"
            }
        });
        let error = TencentProvider::parse_response(&json).unwrap_err();
        assert_eq!(error.kind, ProviderErrorKind::Auth);
        assert!(error.message.contains("SecretIdNotFound"));
    }
}
