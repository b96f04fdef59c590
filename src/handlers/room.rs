//! Join-room and send-message handlers
//!
//! Both handlers are stateless between invocations; everything they share
//! lives in the injected `RoomMessageStore`.

use chrono::{DateTime, Utc};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use uuid::Uuid;

use crate::config::CacheConfig;
use crate::constants::{MAX_MESSAGE_LENGTH, MAX_ROOM_KEY_LENGTH, MAX_SENDER_LENGTH};
use crate::core::message::ChatMessage;
use crate::core::room_store::RoomMessageStore;
use crate::error::{ChatCacheError, Result};
use crate::storage::{BackendConfig, LazyBackend};

/// Response to a room join: the room's live history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JoinRoomResponse {
    pub messages: Vec<ChatMessage>,
}

/// Body of a send-message request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    pub sender: String,
    pub text: String,
}

/// Acknowledgement of a stored message
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageAck {
    pub id: Uuid,
    pub sent_at: DateTime<Utc>,
}

/// Entry point for both chat room handlers
#[derive(Clone)]
pub struct ChatRoomService {
    store: RoomMessageStore,
}

impl ChatRoomService {
    pub fn new(store: RoomMessageStore) -> Self {
        Self { store }
    }

    /// Build the service with a lazily connected backend
    pub fn from_config(config: &CacheConfig) -> Self {
        let backend = Arc::new(LazyBackend::new(BackendConfig::from(config)));
        Self::new(RoomMessageStore::from_config(backend, config))
    }

    /// Load .env, initialise logging and configuration.
    ///
    /// Fails before any request is served when the TTL or credential is
    /// missing. Safe to call more than once per process.
    pub fn bootstrap() -> Result<Self> {
        let dotenv_result = dotenvy::dotenv();

        // try_init: a warm process may bootstrap again
        let _ = env_logger::try_init();

        match dotenv_result {
            Ok(path) => info!("Environment variables loaded from {}", path.display()),
            Err(e) => debug!("No .env file loaded: {}", e),
        }

        let config = CacheConfig::from_env()?;
        info!("Configuration: {:?}", config);

        Ok(Self::from_config(&config))
    }

    pub fn store(&self) -> &RoomMessageStore {
        &self.store
    }

    /// Return the live history of a room. An empty or expired room is not an error.
    pub async fn join_room(&self, room_key: &str) -> Result<JoinRoomResponse> {
        validate_room_key(room_key)?;

        let messages: Vec<ChatMessage> = self.store.fetch(room_key).await?;
        debug!("Room {} joined with {} messages", room_key, messages.len());

        Ok(JoinRoomResponse { messages })
    }

    /// Store a message in a room, refreshing the room's TTL
    pub async fn send_message(
        &self,
        room_key: &str,
        request: SendMessageRequest,
    ) -> Result<SendMessageAck> {
        validate_room_key(room_key)?;
        validate_sender(&request.sender)?;
        let text = validate_message_text(&request.text)?;

        let message = ChatMessage::new(request.sender.trim().to_string(), text);
        self.store.append(room_key, &message).await.map_err(|e| {
            warn!("Failed to store message in room {}: {}", room_key, e);
            e
        })?;

        Ok(SendMessageAck {
            id: message.id,
            sent_at: message.sent_at,
        })
    }
}

fn validate_room_key(room_key: &str) -> Result<()> {
    if room_key.trim().is_empty() {
        return Err(ChatCacheError::ValidationError(
            "Room key cannot be empty".to_string(),
        ));
    }

    if room_key.len() > MAX_ROOM_KEY_LENGTH {
        return Err(ChatCacheError::ValidationError(format!(
            "Room key too long. Maximum {} bytes allowed",
            MAX_ROOM_KEY_LENGTH
        )));
    }

    if room_key.chars().any(|c| c.is_control()) {
        return Err(ChatCacheError::ValidationError(
            "Room key contains control characters".to_string(),
        ));
    }

    Ok(())
}

fn validate_sender(sender: &str) -> Result<()> {
    let sender = sender.trim();
    if sender.is_empty() {
        return Err(ChatCacheError::ValidationError(
            "Sender cannot be empty".to_string(),
        ));
    }

    if sender.chars().count() > MAX_SENDER_LENGTH {
        return Err(ChatCacheError::ValidationError(format!(
            "Sender too long. Maximum {} characters allowed",
            MAX_SENDER_LENGTH
        )));
    }

    Ok(())
}

/// Returns the trimmed text to store
fn validate_message_text(text: &str) -> Result<String> {
    let text = text.trim();
    if text.is_empty() {
        return Err(ChatCacheError::ValidationError(
            "Message cannot be empty".to_string(),
        ));
    }

    if text.chars().count() > MAX_MESSAGE_LENGTH {
        return Err(ChatCacheError::ValidationError(format!(
            "Message too long. Maximum {} characters allowed",
            MAX_MESSAGE_LENGTH
        )));
    }

    // Newlines and tabs are fine in chat text, other control characters are not
    if text
        .chars()
        .any(|c| c.is_control() && c != '\n' && c != '\t')
    {
        return Err(ChatCacheError::ValidationError(
            "Message contains control characters".to_string(),
        ));
    }

    Ok(text.to_string())
}
