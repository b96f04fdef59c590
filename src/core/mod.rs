//! Core functionality for the chat room cache

pub mod message;
pub mod room_store;

// Re-export main components for convenience
pub use message::ChatMessage;
pub use room_store::RoomMessageStore;
