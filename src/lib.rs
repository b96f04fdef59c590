//! Chatroom Cache - room-scoped chat history with sliding TTL expiry
//!
//! This library provides the message store behind the join-room and
//! send-message handlers, plus the list backends it persists to.

pub mod config;
pub mod constants;
pub mod core;
pub mod error;
pub mod handlers;
pub mod storage;

// Re-export main components
pub use config::*;
pub use constants::*;
