//! Typed configuration from environment variables.
//!
//! Loads once at startup, fails fast on malformed values.
//! The Slack token is wrapped in secrecy::SecretString to prevent log leaks.
//! It is optional here because `merge` never talks to Slack; commands that do
//! call [`Config::require_token`].

pub mod secrets;

use crate::error::{Error, Result};
use secrecy::SecretString;
use std::path::PathBuf;
use std::time::Duration;

pub const DEFAULT_API_BASE: &str = "https://slack.com/api";
pub const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug)]
pub struct Config {
    pub slack_token: Option<SecretString>,
    pub api_base: String,
    pub page_size: u32,
    pub cache_dir: PathBuf,
    pub output: PathBuf,
    /// Overall bound on a workspace run. `None` runs until done.
    pub deadline: Option<Duration>,
    pub otel_endpoint: Option<String>,
    pub log_level: String,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// In local dev, call `dotenvy::dotenv().ok()` before this.
    pub fn from_env() -> Result<Self> {
        Ok(Self {
            slack_token: std::env::var("SLACK_TOKEN").ok().map(SecretString::from),
            api_base: std::env::var("SLACK_API_BASE")
                .unwrap_or_else(|_| DEFAULT_API_BASE.to_string()),
            page_size: parsed_var("REACTJI_PAGE_SIZE")?.unwrap_or(DEFAULT_PAGE_SIZE),
            cache_dir: std::env::var("REACTJI_CACHE_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("reactions")),
            output: std::env::var("REACTJI_OUTPUT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from("all_reactions.csv")),
            deadline: parsed_var::<u64>("REACTJI_DEADLINE_SECS")?.map(Duration::from_secs),
            otel_endpoint: std::env::var("OTEL_ENDPOINT").ok(),
            log_level: std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string()),
        })
    }

    /// The Slack token, for commands that call the API.
    pub fn require_token(&self) -> Result<&SecretString> {
        self.slack_token.as_ref().ok_or_else(|| {
            Error::Config("required environment variable SLACK_TOKEN is not set".to_string())
        })
    }
}

fn parsed_var<T: std::str::FromStr>(name: &str) -> Result<Option<T>> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse()
            .map(Some)
            .map_err(|_| Error::Config(format!("{name} has an invalid value: {raw:?}"))),
        Err(_) => Ok(None),
    }
}
