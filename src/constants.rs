// Cache namespace used when CHATROOM_CACHE_NAME is not set
pub const DEFAULT_CACHE_NAME: &str = "chat";

// Upper bound for a room TTL (30 days)
pub const MAX_TTL_SECS: u64 = 30 * 24 * 60 * 60;

// Background purge configuration constants
pub const DEFAULT_PURGE_INTERVAL_SECS: u64 = 60;
pub const MAX_PURGE_INTERVAL_SECS: u64 = 24 * 60 * 60;

// Request validation limits
pub const MAX_ROOM_KEY_LENGTH: usize = 128;
pub const MAX_SENDER_LENGTH: usize = 64;
pub const MAX_MESSAGE_LENGTH: usize = 2000;

// Environment variable names
pub const ENV_TTL: &str = "CHATROOM_TTL";
pub const ENV_TTL_SECONDS: &str = "CHATROOM_TTL_SECONDS";
pub const ENV_AUTH_TOKEN: &str = "AUTH_TOKEN";
pub const ENV_CACHE_NAME: &str = "CHATROOM_CACHE_NAME";
pub const ENV_ENDPOINT: &str = "CHATROOM_ENDPOINT";
pub const ENV_MAX_HISTORY: &str = "CHATROOM_MAX_HISTORY";
pub const ENV_MAX_ROOMS: &str = "CHATROOM_MAX_ROOMS";
pub const ENV_PURGE_INTERVAL: &str = "CHATROOM_PURGE_INTERVAL";
