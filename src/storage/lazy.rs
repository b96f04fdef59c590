//! Shared, lazily connected backend handle
//!
//! The handle is created once at startup and injected into the room store.
//! The underlying client is only built on first use; concurrent first callers
//! all wait on the same initialization and exactly one connect happens. A
//! failed connect is not cached, so the next call tries again.

use async_trait::async_trait;
use log::{error, info};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::OnceCell;

use super::memory::connect_memory;
use super::traits::{BackendConfig, ListBackend, ListFetch};
use crate::error::Result;

/// Builds a backend client from its configuration
pub type Connector = Box<dyn Fn(&BackendConfig) -> Result<Arc<dyn ListBackend>> + Send + Sync>;

pub struct LazyBackend {
    config: BackendConfig,
    connector: Connector,
    client: OnceCell<Arc<dyn ListBackend>>,
    connect_attempts: AtomicUsize,
}

impl LazyBackend {
    /// Lazily connect the in-memory backend
    pub fn new(config: BackendConfig) -> Self {
        Self::with_connector(config, Box::new(default_connector))
    }

    pub fn with_connector(config: BackendConfig, connector: Connector) -> Self {
        Self {
            config,
            connector,
            client: OnceCell::new(),
            connect_attempts: AtomicUsize::new(0),
        }
    }

    async fn client(&self) -> Result<&Arc<dyn ListBackend>> {
        self.client
            .get_or_try_init(|| async {
                self.connect_attempts.fetch_add(1, Ordering::SeqCst);
                info!(
                    "Connecting list backend for cache '{}' (endpoint: {})",
                    self.config.cache_name,
                    self.config.endpoint.as_deref().unwrap_or("in-process")
                );
                (self.connector)(&self.config).map_err(|e| {
                    error!("Failed to connect list backend: {}", e);
                    e
                })
            })
            .await
    }

    /// Whether the client has been built
    pub fn is_connected(&self) -> bool {
        self.client.initialized()
    }

    /// How many times a connect was attempted
    pub fn connect_attempts(&self) -> usize {
        self.connect_attempts.load(Ordering::SeqCst)
    }
}

fn default_connector(config: &BackendConfig) -> Result<Arc<dyn ListBackend>> {
    let memory = Arc::new(connect_memory(config.max_rooms));
    if let Some(interval) = config.purge_interval.filter(|i| !i.is_zero()) {
        // Detached: the task exits on its own once the backend is dropped
        Arc::clone(&memory).start_purge_task(interval);
    }
    let backend: Arc<dyn ListBackend> = memory;
    Ok(backend)
}

#[async_trait]
impl ListBackend for LazyBackend {
    async fn list_fetch(&self, key: &str) -> Result<ListFetch> {
        self.client().await?.list_fetch(key).await
    }

    async fn list_push_back(
        &self,
        key: &str,
        value: String,
        ttl: Duration,
        truncate_front_to_size: Option<usize>,
    ) -> Result<()> {
        self.client()
            .await?
            .list_push_back(key, value, ttl, truncate_front_to_size)
            .await
    }

    async fn list_count(&self) -> Result<usize> {
        self.client().await?.list_count().await
    }

    async fn health_check(&self) -> Result<bool> {
        self.client().await?.health_check().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatCacheError;
    use crate::storage::MemoryListBackend;

    fn test_config() -> BackendConfig {
        BackendConfig {
            cache_name: "chat".to_string(),
            endpoint: None,
            auth_token: "unit-test-token".to_string(),
            max_rooms: None,
            purge_interval: None,
        }
    }

    #[tokio::test]
    async fn test_connects_on_first_use() {
        let backend = LazyBackend::new(test_config());
        assert!(!backend.is_connected());

        assert!(backend.list_fetch("room").await.unwrap().is_miss());
        assert!(backend.is_connected());
        assert_eq!(backend.connect_attempts(), 1);

        backend
            .list_push_back("room", "a".to_string(), Duration::from_secs(5), None)
            .await
            .unwrap();
        assert_eq!(backend.connect_attempts(), 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_first_use_connects_once() {
        let backend = Arc::new(LazyBackend::new(test_config()));

        let mut handles = Vec::new();
        for i in 0..32 {
            let backend = Arc::clone(&backend);
            handles.push(tokio::spawn(async move {
                backend
                    .list_push_back("room", i.to_string(), Duration::from_secs(60), None)
                    .await
            }));
        }
        for handle in handles {
            handle.await.unwrap().unwrap();
        }

        assert_eq!(backend.connect_attempts(), 1);
        let values = backend.list_fetch("room").await.unwrap().into_values();
        assert_eq!(values.len(), 32);
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropping_handle_releases_purged_backend() {
        let mut config = test_config();
        config.purge_interval = Some(Duration::from_secs(60));
        let backend = LazyBackend::new(config);

        backend
            .list_push_back("room", "a".to_string(), Duration::from_secs(5), None)
            .await
            .unwrap();
        let client = Arc::downgrade(backend.client.get().unwrap());

        // Let the purge task run its first tick
        tokio::task::yield_now().await;
        drop(backend);
        tokio::time::sleep(Duration::from_secs(61)).await;

        assert!(client.upgrade().is_none());
    }

    #[tokio::test]
    async fn test_failed_connect_is_retried() {
        let attempts = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&attempts);
        let backend = LazyBackend::with_connector(
            test_config(),
            Box::new(move |_config: &BackendConfig| -> Result<Arc<dyn ListBackend>> {
                if counter.fetch_add(1, Ordering::SeqCst) == 0 {
                    Err(ChatCacheError::StoreUnavailable("endpoint unreachable".to_string()))
                } else {
                    Ok(Arc::new(MemoryListBackend::new()))
                }
            }),
        );

        let err = backend.list_fetch("room").await.unwrap_err();
        assert!(err.is_retryable());
        assert!(!backend.is_connected());

        assert!(backend.list_fetch("room").await.unwrap().is_miss());
        assert!(backend.is_connected());
        assert_eq!(backend.connect_attempts(), 2);
        assert_eq!(attempts.load(Ordering::SeqCst), 2);
    }
}
