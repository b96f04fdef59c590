//! Abstract storage interface for pluggable list backends
//!
//! A backend keeps, per key, an ordered list of text values with a sliding
//! expiry. The room store is written against this trait only, so the hosted
//! cache and the in-memory implementation are interchangeable.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Outcome of reading a list
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ListFetch {
    /// The list exists and has not expired
    Hit(Vec<String>),
    /// No live list under this key
    Miss,
}

impl ListFetch {
    pub fn is_miss(&self) -> bool {
        matches!(self, ListFetch::Miss)
    }

    /// Values in list order, empty on a miss
    pub fn into_values(self) -> Vec<String> {
        match self {
            ListFetch::Hit(values) => values,
            ListFetch::Miss => Vec::new(),
        }
    }
}

/// List storage interface
#[async_trait]
pub trait ListBackend: Send + Sync {
    /// Read the whole list stored under `key`
    async fn list_fetch(&self, key: &str) -> Result<ListFetch>;

    /// Append `value` to the back of the list, creating it if needed.
    ///
    /// The list deadline is reset to now + `ttl`. With `truncate_front_to_size`
    /// the oldest values are dropped until the list is at most that long.
    /// The append is atomic with respect to other appends on the same key.
    async fn list_push_back(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
        truncate_front_to_size: Option<usize>,
    ) -> Result<()>;

    /// Number of lists physically held, including expired ones not yet purged
    async fn list_count(&self) -> Result<usize>;

    /// Health check for the backend
    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }
}

/// Configuration handed to a backend when it is first connected
#[derive(Clone)]
pub struct BackendConfig {
    pub cache_name: String,
    pub endpoint: Option<String>,
    pub auth_token: String,
    pub max_rooms: Option<usize>,
    pub purge_interval: Option<Duration>,
}

impl std::fmt::Debug for BackendConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BackendConfig")
            .field("cache_name", &self.cache_name)
            .field("endpoint", &self.endpoint)
            .field("auth_token", &"<redacted>")
            .field("max_rooms", &self.max_rooms)
            .field("purge_interval", &self.purge_interval)
            .finish()
    }
}

impl From<&crate::config::CacheConfig> for BackendConfig {
    fn from(config: &crate::config::CacheConfig) -> Self {
        Self {
            cache_name: config.cache_name.clone(),
            endpoint: config.endpoint.clone(),
            auth_token: config.auth_token.clone(),
            max_rooms: config.max_rooms,
            purge_interval: Some(config.purge_interval),
        }
    }
}
