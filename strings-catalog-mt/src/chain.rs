//! Ordered provider fallback
//!
//! A [`ProviderChain`] owns one [`ProviderDescriptor`] per requested provider,
//! in the order the user gave them. Each descriptor carries the provider's
//! availability and its [`RateLimiter`], so two chains never share state.
//!
//! For every request the chain walks the providers in order and returns the
//! first success. Per provider:
//!
//! - the call waits for the rate limiter, then runs under `call_timeout`
//! - `transient` failures (timeouts included) are retried with exponential
//!   backoff up to `max_attempts`; exhausting them puts the provider on cooldown
//! - `quota` puts the provider on cooldown without retrying
//! - `auth` and `unsupported-language-pair` mark the provider failed for the
//!   rest of the run
//!
//! When every provider has been tried the outcome is
//! [`ChainOutcome::Exhausted`], never an error.

use crate::credentials::CredentialSource;
use crate::error::{MtError, ProviderError, ProviderErrorKind, ProviderResult};
use crate::providers::ProviderKind;
use crate::rate_limit::{RateLimiter, RequestBudget};
use crate::translator::MachineTranslator;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{Instant, sleep, timeout};
use tracing::{debug, info, warn};

/// Availability of one provider
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderStatus {
    Ready,
    /// Required secrets are absent; never called
    Unconfigured,
    /// Skipped until the cooldown ends
    RateLimited { until: Instant },
    /// Skipped for the rest of the run
    Failed,
}

impl std::fmt::Display for ProviderStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderStatus::Ready => write!(f, "ready"),
            ProviderStatus::Unconfigured => write!(f, "unconfigured"),
            ProviderStatus::RateLimited { .. } => write!(f, "rate-limited"),
            ProviderStatus::Failed => write!(f, "failed"),
        }
    }
}

/// Retry, timeout and cooldown settings shared by all providers of a chain
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Attempts per call, including the first
    pub max_attempts: u32,
    pub backoff_base: Duration,
    pub call_timeout: Duration,
    pub quota_cooldown: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            backoff_base: Duration::from_millis(500),
            call_timeout: Duration::from_secs(15),
            quota_cooldown: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Delay after failed attempt `attempt` (1-based)
    pub fn backoff(&self, attempt: u32) -> Duration {
        self.backoff_base
            .saturating_mul(2u32.saturating_pow(attempt.saturating_sub(1)))
    }
}

/// One provider in the chain
pub struct ProviderDescriptor {
    name: String,
    required_secrets: Vec<String>,
    status: ProviderStatus,
    limiter: RateLimiter,
    translator: Option<Arc<dyn MachineTranslator>>,
    calls: usize,
}

impl ProviderDescriptor {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn required_secrets(&self) -> &[String] {
        &self.required_secrets
    }

    pub fn status(&self) -> ProviderStatus {
        self.status
    }

    pub fn min_interval(&self) -> Duration {
        self.limiter.min_interval()
    }

    pub fn budget(&self) -> Option<RequestBudget> {
        self.limiter.budget()
    }

    /// Requests sent to the provider so far, retries included
    pub fn calls(&self) -> usize {
        self.calls
    }

    /// Return to `Ready` once a cooldown has passed
    fn refresh(&mut self) {
        if let ProviderStatus::RateLimited { until } = self.status {
            if Instant::now() >= until {
                info!(provider = %self.name, "Cooldown over, provider ready again");
                self.status = ProviderStatus::Ready;
            }
        }
    }
}

impl std::fmt::Debug for ProviderDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderDescriptor")
            .field("name", &self.name)
            .field("status", &self.status)
            .field("min_interval", &self.limiter.min_interval())
            .field("calls", &self.calls)
            .finish()
    }
}

/// A provider failure kept for the run report
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProviderFailure {
    pub provider: String,
    pub kind: ProviderErrorKind,
    pub message: String,
    pub text: String,
    pub language: String,
}

/// Result of one chain request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChainOutcome {
    Translated { provider: String, text: String },
    /// Every provider was skipped or failed for this request
    Exhausted,
}

/// Ordered providers with their run state
///
/// # Example
///
/// ```ignore
/// let mut chain = ProviderChain::new(RetryPolicy::default())
///     .with_provider(ProviderKind::Youdao, &EnvCredentials, &ProviderOverrides::default())
///     .with_provider(ProviderKind::Google, &EnvCredentials, &ProviderOverrides::default());
///
/// match chain.translate("Save", "en", "de").await {
///     ChainOutcome::Translated { provider, text } => println!("{}: {}", provider, text),
///     ChainOutcome::Exhausted => println!("unresolved"),
/// }
/// ```
#[derive(Debug, Default)]
pub struct ProviderChain {
    providers: Vec<ProviderDescriptor>,
    policy: RetryPolicy,
    failures: Vec<ProviderFailure>,
    config_errors: Vec<MtError>,
}

impl ProviderChain {
    pub fn new(policy: RetryPolicy) -> Self {
        Self {
            providers: Vec::new(),
            policy,
            failures: Vec::new(),
            config_errors: Vec::new(),
        }
    }

    /// Build a chain from provider names, in order
    ///
    /// Unknown and duplicate names are recorded as configuration errors and
    /// left out; providers with missing secrets are kept as `Unconfigured`.
    pub fn from_names<S: AsRef<str>>(
        names: &[S],
        credentials: &dyn CredentialSource,
        config: &crate::config::EngineConfig,
    ) -> Self {
        let mut chain = Self::new(config.retry_policy());
        for name in names {
            match name.as_ref().parse::<ProviderKind>() {
                Ok(kind) => {
                    let overrides = config.overrides_for(kind.name());
                    chain = chain.with_provider(kind, credentials, &overrides);
                }
                Err(e) => chain.config_errors.push(e),
            }
        }
        chain
    }

    /// Append a built-in provider
    pub fn with_provider(
        mut self,
        kind: ProviderKind,
        credentials: &dyn CredentialSource,
        overrides: &crate::config::ProviderOverrides,
    ) -> Self {
        if self.reject_duplicate(kind.name()) {
            return self;
        }

        let mut limiter =
            RateLimiter::new(overrides.min_interval().unwrap_or(kind.default_min_interval()));
        if let Some((max_calls, window)) = overrides.budget() {
            limiter = limiter.with_budget(max_calls, window);
        }

        let missing = kind.missing_secrets(credentials);
        let (status, translator) = if !missing.is_empty() {
            let error = MtError::ConfigError(format!(
                "Provider '{}' is unconfigured: missing {}",
                kind,
                missing.join(", ")
            ));
            warn!(provider = %kind, "{}", error);
            self.config_errors.push(error);
            (ProviderStatus::Unconfigured, None)
        } else {
            match kind.build(credentials, self.policy.call_timeout) {
                Ok(translator) => (ProviderStatus::Ready, Some(translator)),
                Err(e) => {
                    warn!(provider = %kind, "Failed to create provider: {}", e);
                    self.config_errors.push(e);
                    (ProviderStatus::Failed, None)
                }
            }
        };

        self.providers.push(ProviderDescriptor {
            name: kind.name().to_string(),
            required_secrets: kind.required_secrets().iter().map(|s| s.to_string()).collect(),
            status,
            limiter,
            translator,
            calls: 0,
        });
        self
    }

    /// Append an already constructed translator (mocks, custom backends)
    pub fn with_translator(mut self, translator: Arc<dyn MachineTranslator>, limiter: RateLimiter) -> Self {
        let name = translator.provider_name().to_string();
        if self.reject_duplicate(&name) {
            return self;
        }

        self.providers.push(ProviderDescriptor {
            name,
            required_secrets: Vec::new(),
            status: ProviderStatus::Ready,
            limiter,
            translator: Some(translator),
            calls: 0,
        });
        self
    }

    fn reject_duplicate(&mut self, name: &str) -> bool {
        if self.providers.iter().any(|p| p.name == name) {
            self.config_errors.push(MtError::ConfigError(format!(
                "Provider '{}' is listed more than once",
                name
            )));
            true
        } else {
            false
        }
    }

    pub fn providers(&self) -> &[ProviderDescriptor] {
        &self.providers
    }

    pub fn provider(&self, name: &str) -> Option<&ProviderDescriptor> {
        self.providers.iter().find(|p| p.name == name)
    }

    pub fn status(&self, name: &str) -> Option<ProviderStatus> {
        self.provider(name).map(|p| p.status)
    }

    pub fn failures(&self) -> &[ProviderFailure] {
        &self.failures
    }

    pub fn config_errors(&self) -> &[MtError] {
        &self.config_errors
    }

    /// True when at least one provider is ready or cooling down
    pub fn has_usable_provider(&self) -> bool {
        self.providers.iter().any(|p| {
            matches!(
                p.status,
                ProviderStatus::Ready | ProviderStatus::RateLimited { .. }
            )
        })
    }

    /// Translate through the providers in order; the first success wins
    pub async fn translate(&mut self, text: &str, source: &str, target: &str) -> ChainOutcome {
        for index in 0..self.providers.len() {
            self.providers[index].refresh();
            if self.providers[index].status != ProviderStatus::Ready {
                debug!(
                    provider = %self.providers[index].name,
                    status = %self.providers[index].status,
                    "Skipping provider"
                );
                continue;
            }

            match self.call_with_retries(index, text, source, target).await {
                Ok(translation) => {
                    return ChainOutcome::Translated {
                        provider: self.providers[index].name.clone(),
                        text: translation,
                    };
                }
                Err(error) => self.record_failure(index, error, text, target),
            }
        }

        ChainOutcome::Exhausted
    }

    async fn call_with_retries(
        &mut self,
        index: usize,
        text: &str,
        source: &str,
        target: &str,
    ) -> ProviderResult<String> {
        let policy = self.policy;
        let provider = &mut self.providers[index];
        let Some(translator) = provider.translator.clone() else {
            return Err(ProviderError::auth(format!(
                "Provider '{}' has no translator",
                provider.name
            )));
        };

        let mut attempt = 1;
        loop {
            provider.limiter.acquire().await;
            provider.calls += 1;

            let result = match timeout(policy.call_timeout, translator.translate(text, source, target)).await {
                Ok(result) => result,
                Err(_) => Err(ProviderError::transient(format!(
                    "Call timed out after {} ms",
                    policy.call_timeout.as_millis()
                ))),
            };

            let error = match result {
                Ok(translation) if !translation.trim().is_empty() => return Ok(translation),
                Ok(_) => ProviderError::transient("Provider returned an empty translation"),
                Err(error) => error,
            };

            if !error.kind.is_retryable() || attempt >= policy.max_attempts {
                return Err(error);
            }

            let delay = policy.backoff(attempt);
            warn!(
                provider = %provider.name,
                lang = target,
                attempt,
                max_attempts = policy.max_attempts,
                "Translation failed, retrying in {} ms: {}",
                delay.as_millis(),
                error
            );
            sleep(delay).await;
            attempt += 1;
        }
    }

    fn record_failure(&mut self, index: usize, error: ProviderError, text: &str, target: &str) {
        let cooldown = self.policy.quota_cooldown;
        let provider = &mut self.providers[index];
        provider.status = match error.kind {
            ProviderErrorKind::Auth | ProviderErrorKind::UnsupportedLanguagePair => {
                ProviderStatus::Failed
            }
            ProviderErrorKind::Quota | ProviderErrorKind::Transient => ProviderStatus::RateLimited {
                until: Instant::now() + cooldown,
            },
        };
        warn!(
            provider = %provider.name,
            kind = %error.kind,
            lang = target,
            status = %provider.status,
            "Provider failed: {}",
            error.message
        );

        self.failures.push(ProviderFailure {
            provider: provider.name.clone(),
            kind: error.kind,
            message: error.message,
            text: text.to_string(),
            language: target.to_string(),
        });
    }
}
