//! Runtime configuration.
//!
//! Defaults are sensible for interactive play; every knob can be
//! overridden from the environment:
//!
//! | Variable                  | Meaning                            |
//! |---------------------------|------------------------------------|
//! | `GAVEL_ORACLE_MODEL`      | Model name for the live oracle     |
//! | `GAVEL_ORACLE_TIMEOUT`    | Per-call deadline (e.g. `20s`)     |
//! | `GAVEL_ORACLE_RETRIES`    | Transient-error retry budget       |
//! | `GAVEL_TRANSCRIPT_WINDOW` | Transcript lines sent per request  |

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidValue { var: String, reason: String },
}

/// Tunables for the oracle runtime.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Model name passed to the live oracle
    pub model: String,

    /// Per-call deadline; on expiry the operation fails cleanly
    #[serde(with = "humantime_serde")]
    pub timeout: Duration,

    /// Retry budget for transient oracle errors
    pub max_retries: usize,

    /// Sampling temperature for the live oracle
    pub temperature: f32,

    /// Token ceiling per oracle response
    pub max_tokens: u32,

    /// How many recent transcript lines each request carries
    pub transcript_window: usize,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            model: "claude-sonnet-4-5-20250514".to_string(),
            timeout: Duration::from_secs(30),
            max_retries: 2,
            temperature: 0.7,
            max_tokens: 1024,
            transcript_window: 12,
        }
    }
}

impl RuntimeConfig {
    /// Defaults overridden by whatever `GAVEL_*` variables are set.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Self::default();

        if let Ok(model) = std::env::var("GAVEL_ORACLE_MODEL") {
            config.model = model;
        }
        if let Ok(raw) = std::env::var("GAVEL_ORACLE_TIMEOUT") {
            config.timeout =
                humantime::parse_duration(&raw).map_err(|e| ConfigError::InvalidValue {
                    var: "GAVEL_ORACLE_TIMEOUT".to_string(),
                    reason: e.to_string(),
                })?;
        }
        if let Ok(raw) = std::env::var("GAVEL_ORACLE_RETRIES") {
            config.max_retries = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "GAVEL_ORACLE_RETRIES".to_string(),
                reason: format!("not an integer: {}", raw),
            })?;
        }
        if let Ok(raw) = std::env::var("GAVEL_TRANSCRIPT_WINDOW") {
            config.transcript_window = raw.parse().map_err(|_| ConfigError::InvalidValue {
                var: "GAVEL_TRANSCRIPT_WINDOW".to_string(),
                reason: format!("not an integer: {}", raw),
            })?;
        }

        Ok(config)
    }
}

mod humantime_serde {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        humantime::parse_duration(&raw).map_err(serde::de::Error::custom)
    }
}
