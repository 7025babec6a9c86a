use std::net::SocketAddr;
use std::time::Duration;

use crate::infrastructure::broadcaster::DEFAULT_QUEUE_DEPTH;

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("invalid value for {key}: {value:?}")]
    Invalid { key: &'static str, value: String },
}

/// Server settings. Keepalive defaults match a 15s ping / 15s timeout;
/// `queue_depth` caps the broadcasts a connection may have pending.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub addr: SocketAddr,
    pub ping_period: Duration,
    pub idle_timeout: Duration,
    pub queue_depth: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            addr: SocketAddr::from(([127, 0, 0, 1], 3000)),
            ping_period: Duration::from_secs(15),
            idle_timeout: Duration::from_secs(15),
            queue_depth: DEFAULT_QUEUE_DEPTH,
        }
    }
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        Ok(Self {
            addr: parse_or(&lookup, "TODO_SYNC_ADDR", defaults.addr)?,
            ping_period: parse_or(&lookup, "TODO_SYNC_PING_SECS", defaults.ping_period.as_secs()).map(Duration::from_secs)?,
            idle_timeout: parse_or(&lookup, "TODO_SYNC_TIMEOUT_SECS", defaults.idle_timeout.as_secs()).map(Duration::from_secs)?,
            queue_depth: parse_or(&lookup, "TODO_SYNC_QUEUE_DEPTH", defaults.queue_depth)?,
        })
    }

    /// How long a connection may stay silent, or leave an outgoing frame
    /// unflushed, before it is dropped.
    pub fn silence_limit(&self) -> Duration { self.ping_period + self.idle_timeout }
}

fn parse_or<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &'static str, default: T) -> Result<T, ConfigError> {
    match lookup(key) {
        None => Ok(default),
        Some(value) => value.trim().parse().map_err(|_| ConfigError::Invalid { key, value }),
    }
}
