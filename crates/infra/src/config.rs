//! Configuration loading and representation.

use std::time::Duration;

use thiserror::Error;
use tracing::warn;

use salesadvisor_core::{SalesWindow, DEFAULT_SALES_WINDOW_DAYS};

use crate::external::OpenAiConfig;

pub const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8000";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4.1-mini";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_NARRATION_TIMEOUT_SECS: u64 = 30;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?} ({reason})")]
    Invalid {
        key: &'static str,
        value: String,
        reason: String,
    },
}

/// Process settings.
#[derive(Debug, Clone)]
pub struct Settings {
    pub bind_addr: String,
    /// `None` runs against an empty in-memory catalog.
    pub database_url: Option<String>,
    pub openai: OpenAiConfig,
    pub narration_timeout: Duration,
    pub sales_window: SalesWindow,
}

impl Settings {
    /// Load settings from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load settings from an arbitrary key lookup (tests pass a map).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let database_url = non_empty("DATABASE_URL");
        if database_url.is_none() {
            warn!("DATABASE_URL not set; serving an empty in-memory catalog");
        }

        let api_key = non_empty("OPENAI_API_KEY");
        if api_key.is_none() {
            warn!("OPENAI_API_KEY not set; narration will use the fallback summary");
        }

        let timeout_secs = at_least_one(
            "NARRATION_TIMEOUT_SECS",
            parse_or(
                "NARRATION_TIMEOUT_SECS",
                non_empty("NARRATION_TIMEOUT_SECS"),
                DEFAULT_NARRATION_TIMEOUT_SECS,
            )?,
        )?;
        let window_days = at_least_one(
            "SALES_WINDOW_DAYS",
            parse_or(
                "SALES_WINDOW_DAYS",
                non_empty("SALES_WINDOW_DAYS"),
                DEFAULT_SALES_WINDOW_DAYS,
            )?,
        )?;

        Ok(Self {
            bind_addr: non_empty("BIND_ADDR").unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string()),
            database_url,
            openai: OpenAiConfig {
                api_key,
                model: non_empty("OPENAI_MODEL").unwrap_or_else(|| DEFAULT_OPENAI_MODEL.to_string()),
                base_url: non_empty("OPENAI_BASE_URL")
                    .unwrap_or_else(|| DEFAULT_OPENAI_BASE_URL.to_string()),
            },
            narration_timeout: Duration::from_secs(timeout_secs),
            sales_window: SalesWindow::new(window_days),
        })
    }
}

fn at_least_one<T>(key: &'static str, value: T) -> Result<T, ConfigError>
where
    T: Default + PartialEq,
{
    if value == T::default() {
        return Err(ConfigError::Invalid {
            key,
            value: "0".to_string(),
            reason: "must be at least 1".to_string(),
        });
    }
    Ok(value)
}

fn parse_or<T>(key: &'static str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    match raw {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
            key,
            reason: e.to_string(),
            value,
        }),
    }
}
