//! Room-scoped message history with sliding expiry
//!
//! Each room is one backend list of serialized messages, oldest first. Every
//! append resets the room deadline; reads never do, so an idle room lapses
//! even while clients keep polling it.

use log::{debug, warn};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;

use crate::config::CacheConfig;
use crate::core::message::{decode, encode};
use crate::error::Result;
use crate::storage::ListBackend;

/// Message store keyed by room
#[derive(Clone)]
pub struct RoomMessageStore {
    backend: Arc<dyn ListBackend>,
    ttl: Duration,
    max_history: Option<usize>,
}

impl RoomMessageStore {
    /// Create a store with unbounded history per room
    pub fn new(backend: Arc<dyn ListBackend>, ttl: Duration) -> Self {
        Self {
            backend,
            ttl,
            max_history: None,
        }
    }

    /// Create a store from the loaded cache configuration
    pub fn from_config(backend: Arc<dyn ListBackend>, config: &CacheConfig) -> Self {
        let mut store = Self::new(backend, config.ttl);
        store.max_history = config.max_history.filter(|&max| max > 0);
        store
    }

    /// Keep only the newest `max_history` messages in each room
    pub fn with_max_history(mut self, max_history: NonZeroUsize) -> Self {
        self.max_history = Some(max_history.get());
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn max_history(&self) -> Option<usize> {
        self.max_history
    }

    /// Get all live messages of a room in write order.
    ///
    /// A room that was never written and a room whose TTL lapsed both yield
    /// an empty vector.
    pub async fn fetch<M: DeserializeOwned>(&self, room_key: &str) -> Result<Vec<M>> {
        let response = self.backend.list_fetch(room_key).await?;
        if response.is_miss() {
            debug!("Cache miss for room {}", room_key);
            return Ok(Vec::new());
        }

        response
            .into_values()
            .iter()
            .map(|raw| {
                decode(raw).map_err(|e| {
                    warn!("Undecodable entry in room {}: {}", room_key, e);
                    e
                })
            })
            .collect()
    }

    /// Get the newest `limit` live messages of a room, still oldest first
    pub async fn fetch_recent<M: DeserializeOwned>(
        &self,
        room_key: &str,
        limit: usize,
    ) -> Result<Vec<M>> {
        let values = self.backend.list_fetch(room_key).await?.into_values();
        let skip = values.len().saturating_sub(limit);

        values[skip..].iter().map(|raw| decode(raw)).collect()
    }

    /// Append a message to a room and reset the room's TTL.
    ///
    /// The payload is encoded before the backend is touched, so a payload
    /// that cannot be encoded leaves the room unchanged.
    pub async fn append<M: Serialize + ?Sized>(&self, room_key: &str, message: &M) -> Result<()> {
        let raw = encode(message)?;

        self.backend
            .list_push_back(room_key, raw, self.ttl, self.max_history)
            .await?;

        debug!("Appended message to room {} (ttl {:?})", room_key, self.ttl);
        Ok(())
    }

    /// Number of rooms held by the backend, including expired ones not yet purged
    pub async fn room_count(&self) -> Result<usize> {
        self.backend.list_count().await
    }

    /// Health check for the underlying backend
    pub async fn health_check(&self) -> Result<bool> {
        self.backend.health_check().await
    }
}
