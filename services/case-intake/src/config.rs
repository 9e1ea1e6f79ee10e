// SPDX-FileCopyrightText: 2025 Hyperpolymath
// SPDX-License-Identifier: PMPL-1.0-or-later

//! Configuration for the case intake gateway.
//!
//! Values come from environment variables (optionally seeded from a `.env`
//! file). Anything that is present but malformed is a startup error.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Configuration errors. All of them are fatal at startup.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("invalid {name}: {value:?}")]
    Invalid { name: &'static str, value: String },

    #[error("{0} is required")]
    Missing(&'static str),

    #[error("rate limit tokens per second must be a positive number, got {0}")]
    NonPositiveRate(f64),

    #[error("rate limit burst must be positive")]
    NonPositiveBurst,
}

/// Configuration for the intake service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Server bind address (default: 0.0.0.0:8080)
    #[serde(default = "default_bind_addr")]
    pub bind_addr: String,

    #[serde(default)]
    pub rate_limit: RateLimitConfig,

    #[serde(default)]
    pub intake: IntakeConfig,

    #[serde(default)]
    pub geoip: GeoIpConfig,

    pub telegram: TelegramConfig,

    #[serde(default)]
    pub metrics: MetricsConfig,
}

/// Per-address admission control.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RateLimitConfig {
    /// Token refill rate per second (default: 1.0)
    #[serde(default = "default_tokens_per_sec")]
    pub tokens_per_sec: f64,

    /// Bucket capacity (default: 5)
    #[serde(default = "default_burst")]
    pub burst: u32,

    /// How often idle clients are swept (default: 120s)
    #[serde(default = "default_sweep_interval_secs")]
    pub sweep_interval_secs: u64,

    /// Idle time after which a client entry is evicted (default: 600s)
    #[serde(default = "default_client_ttl_secs")]
    pub client_ttl_secs: u64,
}

/// Submission parsing and validation limits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntakeConfig {
    /// Bodies are truncated to this many bytes (default: 256 KiB)
    #[serde(default = "default_max_body_bytes")]
    pub max_body_bytes: usize,

    /// Maximum summary length in bytes (default: 500)
    #[serde(default = "default_max_summary_len")]
    pub max_summary_len: usize,

    /// Time allowed for reading a request body (default: 10s)
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
}

/// Optional MaxMind City database.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeoIpConfig {
    #[serde(default)]
    pub db_path: Option<String>,
}

/// Telegram Bot API settings, used for both delivery and recipient discovery.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TelegramConfig {
    pub bot_token: String,

    /// Recipients, in delivery order
    pub chat_ids: Vec<String>,

    #[serde(default)]
    pub webhook_url: Option<String>,

    #[serde(default)]
    pub webhook_secret: Option<String>,

    #[serde(default = "default_telegram_api_base")]
    pub api_base: String,
}

/// Metrics configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MetricsConfig {
    /// Enable Prometheus metrics endpoint (default: true)
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Metrics endpoint path (default: /metrics)
    #[serde(default = "default_metrics_path")]
    pub path: String,
}

fn default_bind_addr() -> String {
    "0.0.0.0:8080".to_string()
}

fn default_tokens_per_sec() -> f64 {
    1.0
}

fn default_burst() -> u32 {
    5
}

fn default_sweep_interval_secs() -> u64 {
    120
}

fn default_client_ttl_secs() -> u64 {
    600
}

fn default_max_body_bytes() -> usize {
    256 * 1024
}

fn default_max_summary_len() -> usize {
    500
}

fn default_request_timeout_secs() -> u64 {
    10
}

fn default_telegram_api_base() -> String {
    "https://api.telegram.org".to_string()
}

fn default_true() -> bool {
    true
}

fn default_metrics_path() -> String {
    "/metrics".to_string()
}

impl Default for RateLimitConfig {
    fn default() -> Self {
        Self {
            tokens_per_sec: default_tokens_per_sec(),
            burst: default_burst(),
            sweep_interval_secs: default_sweep_interval_secs(),
            client_ttl_secs: default_client_ttl_secs(),
        }
    }
}

impl Default for IntakeConfig {
    fn default() -> Self {
        Self {
            max_body_bytes: default_max_body_bytes(),
            max_summary_len: default_max_summary_len(),
            request_timeout_secs: default_request_timeout_secs(),
        }
    }
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_true(),
            path: default_metrics_path(),
        }
    }
}

impl RateLimitConfig {
    /// Reject non-positive (or non-finite) rate and zero burst.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.tokens_per_sec.is_finite() || self.tokens_per_sec <= 0.0 {
            return Err(ConfigError::NonPositiveRate(self.tokens_per_sec));
        }
        if self.burst == 0 {
            return Err(ConfigError::NonPositiveBurst);
        }
        Ok(())
    }

    pub fn sweep_interval(&self) -> Duration {
        Duration::from_secs(self.sweep_interval_secs)
    }

    pub fn client_ttl(&self) -> Duration {
        Duration::from_secs(self.client_ttl_secs)
    }
}

impl IntakeConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

impl Config {
    /// Load configuration from the process environment, reading `.env` first
    /// if one exists.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    ///
    /// Values are trimmed; empty values are treated as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        let bind_addr = get("BIND_ADDR")
            .or_else(|| get("SERVER_ADDR"))
            .unwrap_or_else(default_bind_addr);

        let mut rate_limit = RateLimitConfig::default();
        if let Some(v) = get("RATE_LIMIT_RPS") {
            rate_limit.tokens_per_sec = v.parse().map_err(|_| ConfigError::Invalid {
                name: "RATE_LIMIT_RPS",
                value: v.clone(),
            })?;
        }
        if let Some(v) = get("RATE_LIMIT_BURST") {
            rate_limit.burst = v.parse().map_err(|_| ConfigError::Invalid {
                name: "RATE_LIMIT_BURST",
                value: v.clone(),
            })?;
        }
        rate_limit.validate()?;

        let mut intake = IntakeConfig::default();
        if let Some(v) = get("MAX_BODY_BYTES") {
            intake.max_body_bytes = match v.parse::<usize>() {
                Ok(n) if n > 0 => n,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "MAX_BODY_BYTES",
                        value: v,
                    })
                }
            };
        }

        let mut metrics = MetricsConfig::default();
        if let Some(v) = get("METRICS_ENABLED") {
            metrics.enabled = match v.to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(ConfigError::Invalid {
                        name: "METRICS_ENABLED",
                        value: v,
                    })
                }
            };
        }

        let bot_token = get("TELEGRAM_BOT_TOKEN").ok_or(ConfigError::Missing("TELEGRAM_BOT_TOKEN"))?;
        let chat_ids: Vec<String> = get("TELEGRAM_CHAT_IDS")
            .map(|v| {
                v.split(',')
                    .map(str::trim)
                    .filter(|id| !id.is_empty())
                    .map(String::from)
                    .collect()
            })
            .unwrap_or_default();
        if chat_ids.is_empty() {
            return Err(ConfigError::Missing("TELEGRAM_CHAT_IDS"));
        }

        Ok(Self {
            bind_addr,
            rate_limit,
            intake,
            geoip: GeoIpConfig {
                db_path: get("GEOIP_DB_PATH"),
            },
            telegram: TelegramConfig {
                bot_token,
                chat_ids,
                webhook_url: get("TELEGRAM_WEBHOOK_URL"),
                webhook_secret: get("TELEGRAM_WEBHOOK_SECRET"),
                api_base: get("TELEGRAM_API_BASE").unwrap_or_else(default_telegram_api_base),
            },
            metrics,
        })
    }
}
