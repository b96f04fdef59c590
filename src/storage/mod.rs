//! Storage backends holding each room's message list

pub mod lazy;
pub mod memory;
pub mod traits;

pub use lazy::{Connector, LazyBackend};
pub use memory::MemoryListBackend;
pub use traits::{BackendConfig, ListBackend, ListFetch};
