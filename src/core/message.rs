use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::{ChatCacheError, Result};

/// A chat message as stored in a room's history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub id: Uuid,
    pub sender: String,
    pub text: String,
    pub sent_at: DateTime<Utc>,
}

impl ChatMessage {
    pub fn new(sender: String, text: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            sender,
            text,
            sent_at: Utc::now(),
        }
    }
}

/// Encode a payload into the text form kept by the backend
pub fn encode<M: Serialize + ?Sized>(message: &M) -> Result<String> {
    serde_json::to_string(message).map_err(|e| ChatCacheError::SerializationError(e.to_string()))
}

/// Decode a stored entry back into a typed payload
pub fn decode<M: DeserializeOwned>(raw: &str) -> Result<M> {
    serde_json::from_str(raw).map_err(|e| ChatCacheError::DeserializationError(e.to_string()))
}
