//! Host key-value storage
//!
//! LocalStorage in the browser, an in-memory map everywhere else.

use std::collections::HashMap;

use crate::error::CacheResult;
#[cfg(target_arch = "wasm32")]
use crate::error::CacheError;

pub trait KeyValueStore {
    fn get_item(&self, key: &str) -> CacheResult<Option<String>>;
    fn set_item(&mut self, key: &str, value: &str) -> CacheResult<()>;
    fn remove_item(&mut self, key: &str) -> CacheResult<()>;
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    items: HashMap<String, String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_item(mut self, key: &str, value: &str) -> Self {
        self.items.insert(key.to_string(), value.to_string());
        self
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> CacheResult<Option<String>> {
        Ok(self.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> CacheResult<()> {
        self.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> CacheResult<()> {
        self.items.remove(key);
        Ok(())
    }
}

/// `window.localStorage`
#[cfg(target_arch = "wasm32")]
pub struct LocalStore {
    storage: web_sys::Storage,
}

#[cfg(target_arch = "wasm32")]
impl LocalStore {
    pub fn open() -> CacheResult<Self> {
        let storage = web_sys::window()
            .and_then(|w| w.local_storage().ok())
            .flatten()
            .ok_or_else(|| CacheError::Storage("LocalStorage unavailable".to_string()))?;
        Ok(Self { storage })
    }
}

#[cfg(target_arch = "wasm32")]
fn js_error(err: wasm_bindgen::JsValue) -> CacheError {
    CacheError::Storage(format!("{:?}", err))
}

#[cfg(target_arch = "wasm32")]
impl KeyValueStore for LocalStore {
    fn get_item(&self, key: &str) -> CacheResult<Option<String>> {
        self.storage.get_item(key).map_err(js_error)
    }

    fn set_item(&mut self, key: &str, value: &str) -> CacheResult<()> {
        self.storage.set_item(key, value).map_err(js_error)
    }

    fn remove_item(&mut self, key: &str) -> CacheResult<()> {
        self.storage.remove_item(key).map_err(js_error)
    }
}
