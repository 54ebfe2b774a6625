//! Runtime configuration read from environment variables.
//!
//! Every setting has a default. A value that does not parse is logged with
//! `warn!` and replaced by its default, so a typo never keeps the server from
//! starting.

pub mod identity;

use std::env;
use std::str::FromStr;
use std::time::Duration;

use tracing::warn;

/// Table engine settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EngineConfig {
    /// Any seated player idle longer than this wipes the table.
    pub inactivity_timeout: Duration,
    pub long_poll_timeout: Duration,
    pub long_poll_max_waiters: usize,
    /// Minimum time a played card stays visible before the next card or
    /// collection is accepted.
    pub reveal_pacing: Duration,
    pub reservation_horizon_days: i64,
    /// Seed for computer tie-breaks; random when unset.
    pub ai_seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(900),
            long_poll_timeout: Duration::from_secs(45),
            long_poll_max_waiters: 100,
            reveal_pacing: Duration::from_millis(3000),
            reservation_horizon_days: 61,
            ai_seed: None,
        }
    }
}

impl EngineConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build from any key lookup; unset keys keep their defaults.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let d = Self::default();
        Self {
            inactivity_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SKAT_INACTIVITY_TIMEOUT_SECS",
                d.inactivity_timeout.as_secs(),
            )),
            long_poll_timeout: Duration::from_secs(parse_or(
                &lookup,
                "SKAT_LONG_POLL_TIMEOUT_SECS",
                d.long_poll_timeout.as_secs(),
            )),
            long_poll_max_waiters: parse_or(
                &lookup,
                "SKAT_LONG_POLL_MAX_WAITERS",
                d.long_poll_max_waiters,
            ),
            reveal_pacing: Duration::from_millis(parse_or(
                &lookup,
                "SKAT_REVEAL_PACING_MILLIS",
                d.reveal_pacing.as_millis() as u64,
            )),
            reservation_horizon_days: parse_or(
                &lookup,
                "SKAT_RESERVATION_HORIZON_DAYS",
                d.reservation_horizon_days,
            ),
            ai_seed: lookup("SKAT_AI_SEED").and_then(|raw| parse_value("SKAT_AI_SEED", &raw)),
        }
    }

    /// No pacing and short timeouts.
    pub fn for_tests() -> Self {
        Self {
            inactivity_timeout: Duration::from_secs(900),
            long_poll_timeout: Duration::from_millis(200),
            long_poll_max_waiters: 4,
            reveal_pacing: Duration::ZERO,
            reservation_horizon_days: 61,
            ai_seed: Some(7),
        }
    }
}

/// HTTP listener settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub cors_allowed_origins: Vec<String>,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let cors_allowed_origins = lookup("CORS_ALLOWED_ORIGINS")
            .unwrap_or_default()
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty() && *s != "null")
            .filter(|s| s.starts_with("http://") || s.starts_with("https://"))
            .map(str::to_string)
            .collect();
        Self {
            host: lookup("SKAT_HOST").unwrap_or_else(|| "0.0.0.0".to_string()),
            port: parse_or(&lookup, "SKAT_PORT", 3001),
            cors_allowed_origins,
        }
    }
}

fn parse_or<T: FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str, default: T) -> T {
    lookup(key)
        .and_then(|raw| parse_value(key, &raw))
        .unwrap_or(default)
}

fn parse_value<T: FromStr>(key: &str, raw: &str) -> Option<T> {
    let parsed = raw.trim().parse().ok();
    if parsed.is_none() {
        warn!(key, value = raw, "invalid configuration value, using default");
    }
    parsed
}
