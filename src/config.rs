//! Environment configuration.
//!
//! Every setting has a default so both programs run against a local emulator
//! with nothing exported. Empty variables count as unset.

use std::{env, str::FromStr, time::Duration};

use crate::error::{PubsubError, Result};

pub const DEFAULT_PROJECT_ID: &str = "users-project";
pub const DEFAULT_TOPIC_ID: &str = "users";
pub const DEFAULT_SUBSCRIPTION_ID: &str = "my-subscription";
pub const DEFAULT_EMULATOR_HOST: &str = "localhost:8085";
pub const DEFAULT_LOG_LEVEL: &str = "info";
const DEFAULT_CONN_ATTEMPTS: u32 = 10;
const DEFAULT_CONN_TIMEOUT_MS: u64 = 1000;
const DEFAULT_MAX_MESSAGES: u32 = 10;
const DEFAULT_PUBSUB_ENABLED: bool = true;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub project_id: String,
    /// `host:port` of the emulator, or a full base URL.
    pub emulator_host: String,
    /// Topic the publisher writes to.
    pub topic_id: String,
    /// Subscription the echo service reads from.
    pub subscription_id: String,
    pub log_level: String,
    /// When false, `notify` only logs events and never touches the emulator.
    pub pubsub_enabled: bool,
    /// How many pings `Client::connect` tries before giving up.
    pub conn_attempts: u32,
    /// Pause between failed pings.
    pub conn_timeout: Duration,
    /// Upper bound on messages returned by one pull.
    pub max_messages: u32,
}

impl Config {
    /// Reads the process environment.
    pub fn from_env() -> Result<Config> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Config>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str, default: &str| -> String {
            lookup(key)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .unwrap_or_else(|| default.to_string())
        };

        let conn_attempts: u32 = parse(&lookup, "PUBSUB_CONN_ATTEMPTS", DEFAULT_CONN_ATTEMPTS)?;
        if conn_attempts == 0 {
            return Err(PubsubError::Config(
                "PUBSUB_CONN_ATTEMPTS must be at least 1".into(),
            ));
        }

        let max_messages: u32 = parse(&lookup, "ECHO_MAX_MESSAGES", DEFAULT_MAX_MESSAGES)?;
        if max_messages == 0 {
            return Err(PubsubError::Config(
                "ECHO_MAX_MESSAGES must be at least 1".into(),
            ));
        }

        let timeout_ms: u64 = parse(&lookup, "PUBSUB_CONN_TIMEOUT_MS", DEFAULT_CONN_TIMEOUT_MS)?;
        let pubsub_enabled: bool = parse(&lookup, "PUBSUB_ENABLED", DEFAULT_PUBSUB_ENABLED)?;

        Ok(Config {
            project_id: get("PUBSUB_PROJECT_ID", DEFAULT_PROJECT_ID),
            emulator_host: get("PUBSUB_EMULATOR_HOST", DEFAULT_EMULATOR_HOST),
            topic_id: get("PUBLISH_TOPIC_ID", DEFAULT_TOPIC_ID),
            subscription_id: get("ECHO_SUBSCRIPTION", DEFAULT_SUBSCRIPTION_ID),
            log_level: get("LOG_LEVEL", DEFAULT_LOG_LEVEL),
            pubsub_enabled,
            conn_attempts,
            conn_timeout: Duration::from_millis(timeout_ms),
            max_messages,
        })
    }

    /// Base URL of the emulator's REST surface, without a trailing slash.
    pub fn emulator_url(&self) -> String {
        let host = self.emulator_host.trim().trim_end_matches('/');
        if host.contains("://") {
            host.to_string()
        } else {
            format!("http://{host}")
        }
    }
}

fn parse<F, T>(lookup: &F, key: &str, default: T) -> Result<T>
where
    F: Fn(&str) -> Option<String>,
    T: FromStr,
{
    match lookup(key).filter(|v| !v.trim().is_empty()) {
        None => Ok(default),
        Some(raw) => raw
            .trim()
            .parse()
            .map_err(|_| PubsubError::Config(format!("{key}: invalid value {raw:?}"))),
    }
}
