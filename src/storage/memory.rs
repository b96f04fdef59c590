//! In-memory list backend for development, testing and single-process use
//!
//! Lists live in an LRU map guarded by a single async lock. Each list is held
//! behind an `Arc`, so readers clone a pointer under the lock and copy the
//! values after releasing it; a writer only copies a list that a reader still
//! holds. Expired lists are hidden from reads immediately and physically
//! removed either on the next write to the same key or by the periodic purge
//! task.

use async_trait::async_trait;
use log::{debug, error, info};
use lru::LruCache;
use std::collections::VecDeque;
use std::num::NonZeroUsize;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::Instant;

use super::traits::{ListBackend, ListFetch};
use crate::error::{ChatCacheError, Result};

/// A stored list with its sliding deadline
#[derive(Debug)]
struct ListEntry {
    values: Arc<VecDeque<String>>,
    expires_at: Instant,
}

impl ListEntry {
    fn is_live(&self, now: Instant) -> bool {
        now < self.expires_at
    }
}

/// In-memory list storage
pub struct MemoryListBackend {
    lists: Arc<RwLock<LruCache<String, ListEntry>>>,
}

impl MemoryListBackend {
    /// Create a backend with no limit on the number of lists
    pub fn new() -> Self {
        Self {
            lists: Arc::new(RwLock::new(LruCache::unbounded())),
        }
    }

    /// Create a backend that keeps at most `max_lists` lists, evicting the
    /// least recently written one when full
    pub fn with_max_lists(max_lists: NonZeroUsize) -> Self {
        Self {
            lists: Arc::new(RwLock::new(LruCache::new(max_lists))),
        }
    }

    /// Number of lists that are currently live
    pub async fn live_count(&self) -> usize {
        let now = Instant::now();
        let lists = self.lists.read().await;
        lists.iter().filter(|(_, entry)| entry.is_live(now)).count()
    }

    /// Remove every expired list, returning how many were dropped
    pub async fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let mut lists = self.lists.write().await;

        let expired: Vec<String> = lists
            .iter()
            .filter(|(_, entry)| !entry.is_live(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            lists.pop(key);
        }

        expired.len()
    }

    /// Start background purge task.
    ///
    /// The task only keeps a weak reference and stops on the first tick after
    /// the last handle to the backend is dropped.
    pub fn start_purge_task(self: Arc<Self>, interval: Duration) -> JoinHandle<()> {
        let backend = Arc::downgrade(&self);
        drop(self);

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                ticker.tick().await;
                let Some(backend) = backend.upgrade() else {
                    debug!("List backend dropped, stopping purge task");
                    break;
                };
                let purged = backend.purge_expired().await;
                if purged > 0 {
                    debug!("Purged {} expired room lists", purged);
                }
            }
        })
    }
}

impl Default for MemoryListBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ListBackend for MemoryListBackend {
    async fn list_fetch(&self, key: &str) -> Result<ListFetch> {
        let now = Instant::now();
        let snapshot = {
            // peek leaves LRU order untouched so polling readers never keep a list alive
            let lists = self.lists.read().await;
            match lists.peek(key) {
                Some(entry) if entry.is_live(now) => Some(Arc::clone(&entry.values)),
                _ => None,
            }
        };

        Ok(match snapshot {
            Some(values) => ListFetch::Hit(values.iter().cloned().collect()),
            None => ListFetch::Miss,
        })
    }

    async fn list_push_back(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
        truncate_front_to_size: Option<usize>,
    ) -> Result<()> {
        let now = Instant::now();
        let expires_at = now.checked_add(ttl).ok_or_else(|| {
            error!("TTL {:?} for list {} overflows the clock", ttl, key);
            ChatCacheError::ConfigError(format!("ttl {:?} is out of range", ttl))
        })?;

        let mut lists = self.lists.write().await;

        let live = matches!(lists.peek(key), Some(entry) if entry.is_live(now));
        if !live {
            // Expired history is never resurrected
            lists.pop(key);
            let fresh = ListEntry {
                values: Arc::new(VecDeque::new()),
                expires_at,
            };
            if let Some((evicted, _)) = lists.push(key.to_string(), fresh) {
                debug!("Evicted list {} to make room for {}", evicted, key);
            }
        }

        match lists.get_mut(key) {
            Some(entry) => {
                let values = Arc::make_mut(&mut entry.values);
                values.push_back(value);
                if let Some(max) = truncate_front_to_size {
                    while values.len() > max {
                        values.pop_front();
                    }
                }
                entry.expires_at = expires_at;
                Ok(())
            }
            None => {
                // Only reachable if the LRU capacity were zero, which NonZeroUsize rules out
                error!("List {} missing immediately after insert", key);
                Err(ChatCacheError::StoreUnavailable(format!(
                    "list {} could not be created",
                    key
                )))
            }
        }
    }

    async fn list_count(&self) -> Result<usize> {
        Ok(self.lists.read().await.len())
    }

    async fn health_check(&self) -> Result<bool> {
        // Memory storage is always healthy
        Ok(true)
    }
}

/// Build the memory backend described by a backend configuration
pub fn connect_memory(max_lists: Option<usize>) -> MemoryListBackend {
    match max_lists.and_then(NonZeroUsize::new) {
        Some(limit) => {
            info!("Memory list backend initialized (max {} lists)", limit);
            MemoryListBackend::with_max_lists(limit)
        }
        None => {
            info!("Memory list backend initialized (unbounded)");
            MemoryListBackend::new()
        }
    }
}
