//! Anthropic Claude oracle.
//!
//! The API key lives in a [`SecretString`]: it never appears in `Debug`
//! output or logs and is exposed only at the request header. Transient
//! failures (429, 5xx) retry with exponential backoff inside the
//! director's per-call deadline.

use async_trait::async_trait;
use backon::{ExponentialBuilder, Retryable};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;
use std::time::Duration;

use gavel_core::{Judgment, VerdictJudgment};

use super::{CourtroomOracle, JudgmentRequest, OracleError, VerdictRequest};
use crate::config::RuntimeConfig;
use crate::prompts;

/// Environment variable holding the API key.
pub const ANTHROPIC_API_KEY_ENV: &str = "ANTHROPIC_API_KEY";

const DEFAULT_BASE_URL: &str = "https://api.anthropic.com/v1";

pub struct AnthropicOracle {
    api_key: SecretString,
    base_url: String,
    config: RuntimeConfig,
}

impl std::fmt::Debug for AnthropicOracle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AnthropicOracle")
            .field("api_key", &"[REDACTED]")
            .field("base_url", &self.base_url)
            .field("model", &self.config.model)
            .finish()
    }
}

impl AnthropicOracle {
    pub fn new(api_key: impl Into<String>, config: RuntimeConfig) -> Self {
        Self {
            api_key: SecretString::from(api_key.into()),
            base_url: DEFAULT_BASE_URL.to_string(),
            config,
        }
    }

    /// Read the key from `ANTHROPIC_API_KEY`. The value is never logged.
    pub fn from_env(config: RuntimeConfig) -> Result<Self, OracleError> {
        let key = std::env::var(ANTHROPIC_API_KEY_ENV).map_err(|_| {
            OracleError::NotConfigured(format!("{} is not set", ANTHROPIC_API_KEY_ENV))
        })?;
        Ok(Self::new(key, config))
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }

    fn client() -> &'static reqwest::Client {
        static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
        CLIENT.get_or_init(|| {
            reqwest::Client::builder()
                .timeout(Duration::from_secs(60))
                .build()
                .unwrap_or_default()
        })
    }

    async fn complete_once(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let request = ApiRequest {
            model: self.config.model.clone(),
            max_tokens: self.config.max_tokens,
            system,
            temperature: self.config.temperature,
            messages: vec![ApiMessage {
                role: "user",
                content: user,
            }],
        };

        let response = Self::client()
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", self.api_key.expose_secret())
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .timeout(self.config.timeout)
            .json(&request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout(self.config.timeout)
                } else {
                    OracleError::Call(e.to_string())
                }
            })?;

        let status = response.status();
        if status == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse::<u64>().ok())
                .map(Duration::from_secs);
            return Err(OracleError::RateLimited { retry_after });
        }
        if !status.is_success() {
            let message = response.text().await.unwrap_or_default();
            return Err(OracleError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| OracleError::Parse(e.to_string()))?;

        Ok(body
            .content
            .into_iter()
            .filter_map(|block| block.text)
            .collect::<Vec<_>>()
            .join(""))
    }

    async fn complete(&self, system: &str, user: &str) -> Result<String, OracleError> {
        let call = || self.complete_once(system, user);
        call.retry(
            ExponentialBuilder::default()
                .with_max_times(self.config.max_retries)
                .with_jitter(),
        )
        .when(OracleError::is_transient)
        .notify(|err, delay| {
            tracing::warn!(error = %err, delay = ?delay, "Retrying oracle call");
        })
        .await
    }
}

#[derive(Serialize)]
struct ApiRequest<'a> {
    model: String,
    max_tokens: u32,
    system: &'a str,
    temperature: f32,
    messages: Vec<ApiMessage<'a>>,
}

#[derive(Serialize)]
struct ApiMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ApiContentBlock>,
}

#[derive(Deserialize)]
struct ApiContentBlock {
    text: Option<String>,
}

/// Trim a model response down to the JSON object it should contain.
/// Tolerates a leading/trailing code fence; anything else must parse as
/// given.
fn extract_json(raw: &str) -> &str {
    let trimmed = raw.trim();
    let without_open = trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .unwrap_or(trimmed);
    without_open
        .strip_suffix("```")
        .unwrap_or(without_open)
        .trim()
}

#[async_trait]
impl CourtroomOracle for AnthropicOracle {
    async fn judge(&self, request: &JudgmentRequest) -> Result<Judgment, OracleError> {
        let user = prompts::judgment_user_prompt(request);
        let raw = self.complete(prompts::JUDGMENT_SYSTEM_PROMPT, &user).await?;
        serde_json::from_str(extract_json(&raw)).map_err(|e| {
            tracing::warn!(error = %e, "Judgment response failed to parse");
            OracleError::Parse(e.to_string())
        })
    }

    async fn decide_verdict(
        &self,
        request: &VerdictRequest,
    ) -> Result<VerdictJudgment, OracleError> {
        let user = prompts::verdict_user_prompt(request);
        let raw = self.complete(prompts::VERDICT_SYSTEM_PROMPT, &user).await?;
        serde_json::from_str(extract_json(&raw)).map_err(|e| {
            tracing::warn!(error = %e, "Verdict response failed to parse");
            OracleError::Parse(e.to_string())
        })
    }

    fn name(&self) -> &str {
        "anthropic"
    }
}
