//! Request handlers for the chat room operations

pub mod room;

// Re-export the room handlers
pub use room::{ChatRoomService, JoinRoomResponse, SendMessageAck, SendMessageRequest};
