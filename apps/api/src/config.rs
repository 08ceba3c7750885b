use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result};

use crate::llm_client::{DEFAULT_BASE_URL, DEFAULT_MODEL};
use crate::notifier::PUSHOVER_API_URL;

/// Upper bound on tool-dispatch rounds within a single turn.
const DEFAULT_MAX_TOOL_ROUNDS: u32 = 8;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub groq_api_key: String,
    pub completion_base_url: String,
    pub completion_model: String,
    pub completion_timeout_secs: u64,
    pub pushover_user: Option<String>,
    pub pushover_token: Option<String>,
    pub pushover_url: String,
    pub notify_timeout_secs: u64,
    /// Name the assistant speaks as.
    pub profile_name: String,
    pub profile_pdf_path: PathBuf,
    pub summary_path: PathBuf,
    pub max_tool_rounds: u32,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            groq_api_key: require_env("GROQ_API_KEY")?,
            completion_base_url: env_or("COMPLETION_BASE_URL", DEFAULT_BASE_URL),
            completion_model: env_or("COMPLETION_MODEL", DEFAULT_MODEL),
            completion_timeout_secs: parse_env("COMPLETION_TIMEOUT_SECS", 120)?,
            pushover_user: optional_env("PUSHOVER_USER"),
            pushover_token: optional_env("PUSHOVER_TOKEN"),
            pushover_url: env_or("PUSHOVER_URL", PUSHOVER_API_URL),
            notify_timeout_secs: parse_env("NOTIFY_TIMEOUT_SECS", 10)?,
            profile_name: require_env("PROFILE_NAME")?,
            profile_pdf_path: env_or("PROFILE_PDF_PATH", "me/linkedin.pdf").into(),
            summary_path: env_or("SUMMARY_PATH", "me/summary.txt").into(),
            max_tool_rounds: parse_env("MAX_TOOL_ROUNDS", DEFAULT_MAX_TOOL_ROUNDS)?,
            port: parse_env("PORT", 8080)?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Empty values count as unset, so `PUSHOVER_TOKEN=` in a .env disables notifications.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match optional_env(key) {
        Some(raw) => raw
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
