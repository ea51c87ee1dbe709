//! Translation providers
//!
//! Every provider implements [`MachineTranslator`] over one HTTP API and
//! classifies failures into [`ProviderErrorKind`]s. [`ProviderKind`] names the
//! providers a user can request, the secrets each one needs and its documented
//! request pace.
//!
//! | name           | secrets                                      | min interval |
//! |----------------|----------------------------------------------|--------------|
//! | `google`       | none                                         | 300 ms       |
//! | `google-cloud` | `GOOGLE_TRANSLATE_API_KEY`                   | 300 ms       |
//! | `youdao`       | `YOUDAO_APP_KEY`, `YOUDAO_APP_SECRET`        | 500 ms       |
//! | `baidu`        | `BAIDU_APP_ID`, `BAIDU_APP_KEY`              | 300 ms       |
//! | `tencent`      | `TENCENT_SECRET_ID`, `TENCENT_SECRET_KEY`    | 300 ms       |

pub mod baidu;
pub mod google;
pub mod google_translate;
pub mod tencent;
pub mod youdao;

pub use baidu::BaiduProvider;
pub use google::GoogleFreeProvider;
pub use google_translate::GoogleTranslateProvider;
pub use tencent::TencentProvider;
pub use youdao::YoudaoProvider;

use crate::credentials::CredentialSource;
use crate::error::{MtError, MtResult, ProviderError, ProviderErrorKind, ProviderResult};
use crate::translator::MachineTranslator;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

/// The providers that can be requested by name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ProviderKind {
    Google,
    GoogleCloud,
    Youdao,
    Baidu,
    Tencent,
}

impl ProviderKind {
    pub const ALL: [ProviderKind; 5] = [
        ProviderKind::Google,
        ProviderKind::GoogleCloud,
        ProviderKind::Youdao,
        ProviderKind::Baidu,
        ProviderKind::Tencent,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ProviderKind::Google => "google",
            ProviderKind::GoogleCloud => "google-cloud",
            ProviderKind::Youdao => "youdao",
            ProviderKind::Baidu => "baidu",
            ProviderKind::Tencent => "tencent",
        }
    }

    /// Names of the secrets the provider needs
    pub fn required_secrets(&self) -> &'static [&'static str] {
        match self {
            ProviderKind::Google => &[],
            ProviderKind::GoogleCloud => &[GoogleTranslateProvider::API_KEY_VAR],
            ProviderKind::Youdao => &[YoudaoProvider::APP_KEY_VAR, YoudaoProvider::APP_SECRET_VAR],
            ProviderKind::Baidu => &[BaiduProvider::APP_ID_VAR, BaiduProvider::APP_KEY_VAR],
            ProviderKind::Tencent => &[
                TencentProvider::SECRET_ID_VAR,
                TencentProvider::SECRET_KEY_VAR,
            ],
        }
    }

    /// Minimum delay between two requests
    pub fn default_min_interval(&self) -> Duration {
        match self {
            ProviderKind::Youdao => Duration::from_millis(500),
            _ => Duration::from_millis(300),
        }
    }

    /// Required secrets the source does not have
    pub fn missing_secrets(&self, credentials: &dyn CredentialSource) -> Vec<&'static str> {
        self.required_secrets()
            .iter()
            .copied()
            .filter(|name| credentials.secret(name).is_none())
            .collect()
    }

    /// Construct the provider
    ///
    /// # Errors
    ///
    /// `MtError::ConfigError` when a secret is missing, `MtError::NetworkError`
    /// when the HTTP client cannot be created.
    pub fn build(
        &self,
        credentials: &dyn CredentialSource,
        timeout: Duration,
    ) -> MtResult<Arc<dyn MachineTranslator>> {
        let secret = |name: &str| {
            credentials.secret(name).ok_or_else(|| {
                MtError::ConfigError(format!("{} requires {} to be set", self.name(), name))
            })
        };

        let provider: Arc<dyn MachineTranslator> = match self {
            ProviderKind::Google => Arc::new(GoogleFreeProvider::new(timeout)?),
            ProviderKind::GoogleCloud => Arc::new(GoogleTranslateProvider::new(
                secret(GoogleTranslateProvider::API_KEY_VAR)?,
                timeout,
            )?),
            ProviderKind::Youdao => Arc::new(YoudaoProvider::new(
                secret(YoudaoProvider::APP_KEY_VAR)?,
                secret(YoudaoProvider::APP_SECRET_VAR)?,
                timeout,
            )?),
            ProviderKind::Baidu => Arc::new(BaiduProvider::new(
                secret(BaiduProvider::APP_ID_VAR)?,
                secret(BaiduProvider::APP_KEY_VAR)?,
                timeout,
            )?),
            ProviderKind::Tencent => Arc::new(TencentProvider::new(
                secret(TencentProvider::SECRET_ID_VAR)?,
                secret(TencentProvider::SECRET_KEY_VAR)?,
                timeout,
            )?),
        };
        Ok(provider)
    }
}

impl FromStr for ProviderKind {
    type Err = MtError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim().to_lowercase();
        ProviderKind::ALL
            .into_iter()
            .find(|kind| kind.name() == name)
            .ok_or_else(|| {
                MtError::ConfigError(format!(
                    "Unknown provider '{}' (expected one of: google, google-cloud, youdao, baidu, tencent)",
                    s
                ))
            })
    }
}

impl std::fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// HTTP client shared by the providers
pub(crate) fn http_client(timeout: Duration) -> MtResult<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(concat!("strings-catalog-mt/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| MtError::NetworkError(format!("Failed to create HTTP client: {}", e)))
}

/// Turn a non-success HTTP response into a classified error
pub(crate) async fn check_status(response: reqwest::Response) -> ProviderResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|_| "Unknown error".to_string());
    Err(ProviderError::new(
        ProviderErrorKind::from_status(status.as_u16()),
        format!("HTTP {}: {}", status, body),
    ))
}

/// An empty translation is never a success
pub(crate) fn non_empty(text: String, provider: &str) -> ProviderResult<String> {
    if text.trim().is_empty() {
        Err(ProviderError::transient(format!(
            "{} returned an empty translation",
            provider
        )))
    } else {
        Ok(text)
    }
}
