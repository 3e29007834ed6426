use std::time::Duration;

use anyhow::{Context, Result};

use crate::analysis::analyzer::DEFAULT_ANALYSIS_DELAY;

/// Application configuration loaded from environment variables.
/// Every setting has a default; malformed values fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    pub analysis_delay: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            analysis_delay: match std::env::var("ANALYSIS_DELAY_MS") {
                Ok(raw) => Duration::from_millis(
                    raw.parse::<u64>()
                        .context("ANALYSIS_DELAY_MS must be a whole number of milliseconds")?,
                ),
                Err(_) => DEFAULT_ANALYSIS_DELAY,
            },
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 8080,
            rust_log: "info".to_string(),
            analysis_delay: DEFAULT_ANALYSIS_DELAY,
        }
    }
}
