//! Platform abstraction layer
//!
//! - Storage (LocalStorage on web, in-memory on native)
//! - Browser entry points (wasm32 only)

pub mod storage;
#[cfg(target_arch = "wasm32")]
pub mod web;

pub use storage::{KeyValueStore, MemoryStore};
#[cfg(target_arch = "wasm32")]
pub use storage::LocalStore;
