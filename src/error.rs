use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum ChatCacheError {
    // Payload errors
    SerializationError(String),
    DeserializationError(String),

    // Backend errors
    StoreUnavailable(String),

    // Request errors
    ValidationError(String),

    // Configuration errors
    ConfigError(String),
}

impl ChatCacheError {
    /// Whether the caller may retry the same operation with backoff
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::StoreUnavailable(_))
    }

    /// Whether the failure was caused by the caller's input
    pub fn is_client_error(&self) -> bool {
        matches!(self, Self::SerializationError(_) | Self::ValidationError(_))
    }
}

impl fmt::Display for ChatCacheError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SerializationError(msg) => write!(f, "Serialization error: {}", msg),
            Self::DeserializationError(msg) => write!(f, "Deserialization error: {}", msg),
            Self::StoreUnavailable(msg) => write!(f, "Store unavailable: {}", msg),
            Self::ValidationError(msg) => write!(f, "Validation error: {}", msg),
            Self::ConfigError(msg) => write!(f, "Configuration error: {}", msg),
        }
    }
}

impl Error for ChatCacheError {}

// Generic result type for the chat cache
pub type Result<T> = std::result::Result<T, ChatCacheError>;
