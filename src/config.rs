//! Cache configuration module
//! Handles the TTL, credential and backend parameters for the chat room cache

use crate::constants::{
    DEFAULT_CACHE_NAME, DEFAULT_PURGE_INTERVAL_SECS, ENV_AUTH_TOKEN, ENV_CACHE_NAME, ENV_ENDPOINT,
    ENV_MAX_HISTORY, ENV_MAX_ROOMS, ENV_PURGE_INTERVAL, ENV_TTL, ENV_TTL_SECONDS,
    MAX_PURGE_INTERVAL_SECS, MAX_TTL_SECS,
};
use crate::error::{ChatCacheError, Result};
use std::env;
use std::fmt;
use std::time::Duration;

/// Configuration for the room message cache
#[derive(Clone)]
pub struct CacheConfig {
    /// Sliding time-to-live applied to a room on every write
    pub ttl: Duration,
    /// Credential for the cache backend. Never logged.
    pub auth_token: String,
    /// Cache namespace that holds the room lists
    pub cache_name: String,
    /// Optional backend endpoint override
    pub endpoint: Option<String>,
    /// Keep only the newest N messages per room (None for unbounded until TTL)
    pub max_history: Option<usize>,
    /// Maximum number of rooms tracked in memory (None for unbounded)
    pub max_rooms: Option<usize>,
    /// How often expired rooms are purged from the memory backend
    pub purge_interval: Duration,
}

impl fmt::Debug for CacheConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CacheConfig")
            .field("ttl", &self.ttl)
            .field("auth_token", &"<redacted>")
            .field("cache_name", &self.cache_name)
            .field("endpoint", &self.endpoint)
            .field("max_history", &self.max_history)
            .field("max_rooms", &self.max_rooms)
            .field("purge_interval", &self.purge_interval)
            .finish()
    }
}

impl CacheConfig {
    /// Create a test configuration with the given TTL
    #[cfg(test)]
    pub fn for_testing(ttl: Duration) -> Self {
        Self {
            ttl,
            auth_token: "unit-test-token-0123456789".to_string(),
            cache_name: DEFAULT_CACHE_NAME.to_string(),
            endpoint: None,
            max_history: None,
            max_rooms: None,
            purge_interval: Duration::from_secs(DEFAULT_PURGE_INTERVAL_SECS),
        }
    }

    /// Validate that the credential looks usable
    fn validate_auth_token(token: &str) -> Result<()> {
        if token.trim().is_empty() {
            return Err(ChatCacheError::ConfigError(format!(
                "{} must not be empty",
                ENV_AUTH_TOKEN
            )));
        }

        if token.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(ChatCacheError::ConfigError(format!(
                "{} contains whitespace or control characters",
                ENV_AUTH_TOKEN
            )));
        }

        // Reject values copied verbatim from sample .env files
        let placeholder_patterns = ["your-auth-token", "change-this", "<token>", "changeme"];
        for pattern in &placeholder_patterns {
            if token.to_lowercase().contains(pattern) {
                return Err(ChatCacheError::ConfigError(format!(
                    "{} contains placeholder value '{}'",
                    ENV_AUTH_TOKEN, pattern
                )));
            }
        }

        Ok(())
    }

    /// Parse a strictly positive integer setting
    fn parse_positive(name: &str, raw: &str) -> Result<u64> {
        match raw.trim().parse::<u64>() {
            Ok(0) => Err(ChatCacheError::ConfigError(format!(
                "{} must be greater than zero",
                name
            ))),
            Ok(value) => Ok(value),
            Err(_) => Err(ChatCacheError::ConfigError(format!(
                "{} must be a positive integer, got '{}'",
                name, raw
            ))),
        }
    }

    /// Parse a strictly positive integer setting no larger than `max`
    fn parse_bounded(name: &str, raw: &str, max: u64) -> Result<u64> {
        let value = Self::parse_positive(name, raw)?;
        if value > max {
            return Err(ChatCacheError::ConfigError(format!(
                "{} must be at most {}, got {}",
                name, max, value
            )));
        }
        Ok(value)
    }

    fn optional_positive<F>(lookup: &F, name: &str) -> Result<Option<u64>>
    where
        F: Fn(&str) -> Option<String>,
    {
        lookup(name)
            .map(|raw| Self::parse_positive(name, &raw))
            .transpose()
    }

    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Load configuration from an arbitrary variable source
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let ttl_raw = lookup(ENV_TTL)
            .or_else(|| lookup(ENV_TTL_SECONDS))
            .ok_or_else(|| {
                ChatCacheError::ConfigError(format!(
                    "{} environment variable is required (room TTL in seconds)",
                    ENV_TTL
                ))
            })?;
        let ttl_secs = Self::parse_bounded(ENV_TTL, &ttl_raw, MAX_TTL_SECS)?;

        let auth_token = lookup(ENV_AUTH_TOKEN).ok_or_else(|| {
            ChatCacheError::ConfigError(format!(
                "{} environment variable is required for the cache backend",
                ENV_AUTH_TOKEN
            ))
        })?;
        Self::validate_auth_token(&auth_token)?;

        let cache_name = lookup(ENV_CACHE_NAME)
            .map(|name| name.trim().to_string())
            .filter(|name| !name.is_empty())
            .unwrap_or_else(|| DEFAULT_CACHE_NAME.to_string());

        let endpoint = lookup(ENV_ENDPOINT)
            .map(|e| e.trim().to_string())
            .filter(|e| !e.is_empty());

        let max_history = Self::optional_positive(&lookup, ENV_MAX_HISTORY)?.map(|v| v as usize);
        let max_rooms = Self::optional_positive(&lookup, ENV_MAX_ROOMS)?.map(|v| v as usize);

        let purge_secs = match lookup(ENV_PURGE_INTERVAL) {
            Some(raw) => Self::parse_bounded(ENV_PURGE_INTERVAL, &raw, MAX_PURGE_INTERVAL_SECS)?,
            None => DEFAULT_PURGE_INTERVAL_SECS,
        };

        Ok(Self {
            ttl: Duration::from_secs(ttl_secs),
            auth_token,
            cache_name,
            endpoint,
            max_history,
            max_rooms,
            purge_interval: Duration::from_secs(purge_secs),
        })
    }
}
