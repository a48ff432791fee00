use std::time::Duration;

use anyhow::{Context, Result};

use crate::webhook::DEFAULT_WEBHOOK_TIMEOUT;

/// Application configuration loaded from environment variables.
/// Fails at startup if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub ai_query_url: String,
    /// No database means records live in memory for the life of the process.
    pub database_url: Option<String>,
    pub tts_webhook_url: Option<String>,
    pub cv_webhook_url: Option<String>,
    pub webhook_timeout: Duration,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let webhook_timeout = match optional_env("WEBHOOK_TIMEOUT_SECS") {
            Some(secs) => Duration::from_secs(
                secs.parse::<u64>()
                    .context("WEBHOOK_TIMEOUT_SECS must be a whole number of seconds")?,
            ),
            None => DEFAULT_WEBHOOK_TIMEOUT,
        };

        Ok(Config {
            ai_query_url: require_env("AI_QUERY_URL")?,
            database_url: optional_env("DATABASE_URL"),
            tts_webhook_url: optional_env("TTS_WEBHOOK_URL"),
            cv_webhook_url: optional_env("CV_WEBHOOK_URL"),
            webhook_timeout,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

fn require_env(key: &str) -> Result<String> {
    std::env::var(key).with_context(|| format!("Required environment variable '{key}' is not set"))
}

/// Unset and blank values are both treated as absent.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}
