//! Tab-scoped storage and the session store built on it.

pub mod session_store;
pub mod tab_storage;

pub use session_store::{TabSessionStore, UnloadGuard};
pub use tab_storage::MemoryTabStorage;
