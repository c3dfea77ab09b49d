use std::str::FromStr;

use anyhow::{Context, Result};

use crate::job_ad::field_mapper::DEFAULT_BULLET_MARKER;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing or malformed.
#[derive(Debug, Clone)]
pub struct Config {
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub llm_timeout_secs: u64,
    pub llm_temperature: Option<f32>,
    pub normalize_html_lists: bool,
    pub bullet_marker: String,
    pub session_idle_timeout_secs: u64,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            anthropic_api_key: require_env("ANTHROPIC_API_KEY")?,
            port: optional_env("PORT")?.unwrap_or(8080),
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            llm_timeout_secs: optional_env("LLM_TIMEOUT_SECS")?.unwrap_or(120),
            llm_temperature: optional_env("LLM_TEMPERATURE")?,
            normalize_html_lists: optional_env("NORMALIZE_HTML_LISTS")?.unwrap_or(false),
            bullet_marker: std::env::var("BULLET_MARKER")
                .unwrap_or_else(|_| DEFAULT_BULLET_MARKER.to_string()),
            session_idle_timeout_secs: optional_env("SESSION_IDLE_TIMEOUT_SECS")?
                .unwrap_or(3600),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional_env<T>(key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => parse_value(key, &raw).map(Some),
        Err(_) => Ok(None),
    }
}

fn parse_value<T>(key: &str, raw: &str) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    raw.trim()
        .parse::<T>()
        .with_context(|| format!("{key} has an invalid value: '{raw}'"))
}
