//! Browser entry points called from the page's startup script

use wasm_bindgen::prelude::*;

use crate::migration::builtin;
use crate::persistence::{self, Flags};
use crate::platform::storage::LocalStore;
use crate::settings::CacheConfig;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen(start)]
pub fn start() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        // a logger is already installed
        return;
    }
    log::info!("Blog cache ready (latest {})", builtin::LATEST);
}

/// Startup flags as JSON: `{ mode, cache }` with the migrated cache or `null`
#[wasm_bindgen(js_name = cacheFlags)]
pub fn cache_flags(mode: Option<String>) -> Result<String, JsValue> {
    let config = CacheConfig::default();
    let startup = match LocalStore::open() {
        Ok(store) => persistence::load(&store, builtin::table(), &config),
        Err(e) => {
            log::warn!("{}", e);
            persistence::Startup::Fresh(e)
        }
    };
    serde_json::to_string(&Flags::new(mode, startup)).map_err(to_js)
}

/// Persist the cache the application emitted
#[wasm_bindgen(js_name = onCacheChange)]
pub fn on_cache_change(json: &str) -> Result<(), JsValue> {
    let cache: serde_json::Value = serde_json::from_str(json).map_err(to_js)?;
    let mut store = LocalStore::open().map_err(to_js)?;
    persistence::save(&mut store, &CacheConfig::default(), &cache).map_err(to_js)
}
