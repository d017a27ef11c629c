//! Server configuration parsed from environment variables.
//!
//! Every knob has a typed default; a missing or unparsable variable falls
//! back to it. Parsing goes through a lookup function so tests never touch
//! the process environment.

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;

use std::str::FromStr;
use std::time::Duration;

use crate::billing::flow::PollPolicy;
use crate::services::payments::GatewayConfig;

pub const DEFAULT_PORT: u16 = 3000;
pub const DEFAULT_COMPLETION_PROBABILITY: f64 = 0.7;
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
pub const DEFAULT_POLL_MAX_ATTEMPTS: u32 = 30;
pub const DEFAULT_AI_MAX_TOKENS: u32 = 200;

#[derive(Debug, Clone, PartialEq)]
pub struct ServerConfig {
    pub port: u16,
    pub gateway: GatewayConfig,
    pub poll: PollPolicy,
    pub ai_max_tokens: u32,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::from_lookup(|_| None)
    }
}

impl ServerConfig {
    /// Read the configuration from the process environment.
    ///
    /// - `PORT` (3000)
    /// - `PAYMENT_COMPLETION_PROBABILITY` (0.7, clamped to 0..=1)
    /// - `PAYMENT_POLL_INTERVAL_SECS` (10)
    /// - `PAYMENT_POLL_MAX_ATTEMPTS` (30)
    /// - `AI_MAX_TOKENS` (200)
    #[must_use]
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    #[must_use]
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let probability = env_parse(&lookup, "PAYMENT_COMPLETION_PROBABILITY", DEFAULT_COMPLETION_PROBABILITY);
        Self {
            port: env_parse(&lookup, "PORT", DEFAULT_PORT),
            gateway: GatewayConfig::new(probability),
            poll: PollPolicy {
                interval: Duration::from_secs(env_parse(&lookup, "PAYMENT_POLL_INTERVAL_SECS", DEFAULT_POLL_INTERVAL_SECS)),
                max_retries: env_parse(&lookup, "PAYMENT_POLL_MAX_ATTEMPTS", DEFAULT_POLL_MAX_ATTEMPTS),
            },
            ai_max_tokens: env_parse(&lookup, "AI_MAX_TOKENS", DEFAULT_AI_MAX_TOKENS),
        }
    }
}

/// Parse `key` through `lookup`, falling back to `default` when the value is
/// absent or does not parse.
pub fn env_parse<T, F>(lookup: &F, key: &str, default: T) -> T
where
    T: FromStr,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .and_then(|v| v.trim().parse::<T>().ok())
        .unwrap_or(default)
}
