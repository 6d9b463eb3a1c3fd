use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::RemoteLlmSettings;

const DEFAULT_MODEL: &str = "gemini-2.0-flash";
const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com";

/// Which `LlmClient` backs the LLM evaluator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiProvider {
    Gemini,
    Static,
}

impl AiProvider {
    pub fn as_str(&self) -> &'static str {
        match self {
            AiProvider::Gemini => "gemini",
            AiProvider::Static => "static",
        }
    }
}

impl FromStr for AiProvider {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(AiProvider::Gemini),
            "static" | "mock" => Ok(AiProvider::Static),
            other => bail!("unsupported AI provider '{other}' (expected 'gemini' or 'static')"),
        }
    }
}

/// LLM integration settings.
#[derive(Clone)]
pub struct AiConfig {
    pub enabled: bool,
    pub provider: AiProvider,
    pub api_keys: Vec<String>,
    pub model: String,
    pub temperature: f32,
    pub base_url: String,
    pub retry_base_delay: Duration,
}

impl AiConfig {
    pub fn remote_settings(&self) -> RemoteLlmSettings {
        RemoteLlmSettings {
            api_keys: self.api_keys.clone(),
            model: self.model.clone(),
            temperature: self.temperature,
            base_url: self.base_url.clone(),
            retry_base_delay: self.retry_base_delay,
        }
    }
}

impl fmt::Debug for AiConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AiConfig")
            .field("enabled", &self.enabled)
            .field("provider", &self.provider)
            .field("api_keys", &format_args!("[{} redacted]", self.api_keys.len()))
            .field("model", &self.model)
            .field("temperature", &self.temperature)
            .field("base_url", &self.base_url)
            .field("retry_base_delay", &self.retry_base_delay)
            .finish()
    }
}

/// Application configuration loaded from environment variables.
/// Every variable has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub ai: AiConfig,
    /// End-to-end bound on one evaluation, retries and backoff included.
    pub evaluation_timeout: Duration,
    /// Minimum spacing between accepted evaluation requests. Zero disables.
    pub rate_limit_interval: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ai = AiConfig {
            enabled: parse_or(&lookup, "AI_ENABLED", false)?,
            provider: parse_or(&lookup, "AI_PROVIDER", AiProvider::Gemini)?,
            api_keys: lookup("AI_API_KEYS")
                .map(|raw| split_keys(&raw))
                .unwrap_or_default(),
            model: lookup("AI_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            temperature: parse_or(&lookup, "AI_TEMPERATURE", 0.0)?,
            base_url: lookup("AI_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            retry_base_delay: Duration::from_millis(parse_or(
                &lookup,
                "AI_RETRY_BASE_DELAY_MS",
                2000,
            )?),
        };

        if !(0.0..=2.0).contains(&ai.temperature) {
            bail!("AI_TEMPERATURE must be between 0.0 and 2.0");
        }

        Ok(Config {
            port: parse_or(&lookup, "PORT", 8080)?,
            rust_log: lookup("RUST_LOG").unwrap_or_else(|| "info".to_string()),
            ai,
            evaluation_timeout: Duration::from_secs(parse_or(
                &lookup,
                "EVALUATION_TIMEOUT_SECS",
                300,
            )?),
            rate_limit_interval: Duration::from_millis(parse_or(
                &lookup,
                "RATE_LIMIT_INTERVAL_MS",
                5000,
            )?),
        })
    }
}

fn parse_or<T, F>(lookup: &F, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(raw) if !raw.trim().is_empty() => raw
            .trim()
            .parse::<T>()
            .map_err(|e| anyhow::anyhow!("{e}"))
            .with_context(|| format!("Environment variable '{key}' has an invalid value")),
        _ => Ok(default),
    }
}

/// Comma-separated key list; blank entries are dropped.
fn split_keys(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}
