//! Cache loading configuration
//!
//! Every field has a default, so a partial JSON document is a valid config.

use serde::{Deserialize, Serialize};

use crate::error::CacheResult;
use crate::migration::Lookup;

/// Key the application cache is stored under
pub const DEFAULT_STORAGE_KEY: &str = "elm-cache";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Key in the local key-value store
    pub storage_key: String,
    /// Step lookup strategy
    pub lookup: Lookup,
    /// Start fresh instead of restoring a cache that stalled behind the
    /// newest known version
    pub discard_behind: bool,
    /// Panic when a migration step itself is broken
    pub panic_on_defect: bool,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            lookup: Lookup::Exact,
            discard_behind: false,
            panic_on_defect: cfg!(debug_assertions),
        }
    }
}

impl CacheConfig {
    pub fn from_json(json: &str) -> CacheResult<Self> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_discard_behind(mut self, discard: bool) -> Self {
        self.discard_behind = discard;
        self
    }

    pub fn with_panic_on_defect(mut self, panic: bool) -> Self {
        self.panic_on_defect = panic;
        self
    }
}
