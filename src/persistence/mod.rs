//! Load-at-startup and save-on-change for the application cache
//!
//! Loading never aborts startup: anything short of a broken migration table
//! degrades to a fresh start with default state.

use serde::Serialize;
use serde_json::Value;

use crate::blob::Blob;
use crate::error::{CacheError, CacheResult};
use crate::migration::{MigrationReport, MigrationTable, Migrator};
use crate::platform::storage::KeyValueStore;
use crate::settings::CacheConfig;

/// What the application starts from
#[derive(Debug)]
pub enum Startup {
    /// Cache migrated (possibly partially) and handed to the application
    Restored(MigrationReport),
    /// Cache stalled behind the newest version and the config asked to drop it
    Discarded(MigrationReport),
    /// No usable cache
    Fresh(CacheError),
}

impl Startup {
    pub fn cache(&self) -> Option<&Blob> {
        match self {
            Startup::Restored(report) => Some(&report.blob),
            Startup::Discarded(_) | Startup::Fresh(_) => None,
        }
    }

    pub fn into_cache(self) -> Option<Value> {
        match self {
            Startup::Restored(report) => Some(report.blob.into_value()),
            Startup::Discarded(_) | Startup::Fresh(_) => None,
        }
    }
}

/// Read the stored cache and migrate it
///
/// # Panics
///
/// When `config.panic_on_defect` is set and a migration step fails.
pub fn load(store: &impl KeyValueStore, table: &MigrationTable, config: &CacheConfig) -> Startup {
    let raw = match store.get_item(&config.storage_key) {
        Ok(raw) => raw,
        Err(e) => {
            log::warn!("Could not read cache: {}", e);
            return Startup::Fresh(e);
        }
    };

    let migrator = Migrator::new(table).with_lookup(config.lookup);
    match migrator.migrate_raw(raw.as_deref()) {
        Ok(report) if config.discard_behind && report.is_behind() => {
            log::info!("Discarding cache stalled at {}", report.version);
            Startup::Discarded(report)
        }
        Ok(report) => {
            log::info!("Loaded cache at {}", report.version);
            Startup::Restored(report)
        }
        Err(e) if e.is_defect() && config.panic_on_defect => {
            panic!("Broken cache migration table: {e}");
        }
        Err(e) => {
            if e.is_defect() {
                log::error!("Broken cache migration table, starting fresh: {}", e);
            } else {
                log::info!("Starting without cache: {}", e);
            }
            Startup::Fresh(e)
        }
    }
}

/// Persist the cache the application reports on change
pub fn save(store: &mut impl KeyValueStore, config: &CacheConfig, cache: &Value) -> CacheResult<()> {
    let json = serde_json::to_string(cache)?;
    store.set_item(&config.storage_key, &json)?;
    log::debug!("Cache saved ({} bytes)", json.len());
    Ok(())
}

pub fn clear(store: &mut impl KeyValueStore, config: &CacheConfig) -> CacheResult<()> {
    store.remove_item(&config.storage_key)?;
    log::info!("Cache cleared");
    Ok(())
}

/// Startup flags handed to the application
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Flags {
    pub mode: Option<String>,
    pub cache: Option<Value>,
}

impl Flags {
    pub fn new(mode: Option<String>, startup: Startup) -> Self {
        Self {
            mode,
            cache: startup.into_cache(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::migration::builtin::{self, LATEST};
    use crate::migration::Lookup;
    use crate::platform::storage::MemoryStore;
    use serde_json::json;

    fn config() -> CacheConfig {
        CacheConfig::default().with_panic_on_defect(false)
    }

    #[test]
    fn test_load_migrates_stored_cache() {
        let store = MemoryStore::new().with_item("elm-cache", r#"{"version":"0.0.30","theme":"Dark"}"#);
        let startup = load(&store, builtin::table(), &config());
        let cache = startup.cache().unwrap();
        assert_eq!(cache.version().unwrap(), LATEST);
        assert_eq!(cache.get("theme"), Some(&json!("Dark")));
    }

    #[test]
    fn test_load_without_cache_starts_fresh() {
        let startup = load(&MemoryStore::new(), builtin::table(), &config());
        assert!(matches!(startup, Startup::Fresh(CacheError::NoCache)));
    }

    #[test]
    fn test_load_garbage_starts_fresh() {
        for raw in ["", "{", "null", "[]", r#"{"theme":"Dark"}"#] {
            let store = MemoryStore::new().with_item("elm-cache", raw);
            let startup = load(&store, builtin::table(), &config());
            assert!(matches!(startup, Startup::Fresh(CacheError::NoCache)), "{raw:?}");
        }

        let store = MemoryStore::new().with_item("elm-cache", r#"{"version":"0.0"}"#);
        let startup = load(&store, builtin::table(), &config());
        assert!(matches!(startup, Startup::Fresh(CacheError::Version(_))));
    }

    #[test]
    fn test_discard_behind_policy() {
        let store = MemoryStore::new().with_item("elm-cache", r#"{"version":"0.0.31"}"#);

        let kept = load(&store, builtin::table(), &config());
        assert!(matches!(kept, Startup::Restored(_)));

        let dropped = load(&store, builtin::table(), &config().with_discard_behind(true));
        assert!(matches!(dropped, Startup::Discarded(_)));
        assert!(dropped.cache().is_none());
    }

    #[test]
    fn test_successor_lookup_from_config() {
        let table = MigrationTable::builder().step("1.0.1", "1.1.0").build().unwrap();
        let store = MemoryStore::new().with_item("elm-cache", r#"{"version":"1.0.0"}"#);

        let exact = load(&store, &table, &config());
        assert_eq!(exact.cache().unwrap().version().unwrap().to_string(), "1.0.0");

        let loose = load(&store, &table, &config().with_lookup(Lookup::Successors));
        assert_eq!(loose.cache().unwrap().version().unwrap().to_string(), "1.1.0");
    }

    #[test]
    fn test_defect_starts_fresh_when_not_fatal() {
        let table = MigrationTable::builder()
            .step_with("0.0.1", "0.0.2", |_| Err("boom".to_string()))
            .build()
            .unwrap();
        let store = MemoryStore::new().with_item("elm-cache", r#"{"version":"0.0.1"}"#);
        let startup = load(&store, &table, &config());
        assert!(matches!(startup, Startup::Fresh(ref e) if e.is_defect()));
    }

    #[test]
    #[should_panic(expected = "Broken cache migration table")]
    fn test_defect_is_fatal_when_configured() {
        let table = MigrationTable::builder()
            .step_with("0.0.1", "0.0.2", |_| Err("boom".to_string()))
            .build()
            .unwrap();
        let store = MemoryStore::new().with_item("elm-cache", r#"{"version":"0.0.1"}"#);
        load(&store, &table, &config().with_panic_on_defect(true));
    }

    #[test]
    fn test_save_then_load() {
        let mut store = MemoryStore::new();
        let cache = json!({ "version": "0.0.36", "theme": "Light", "user": null });
        save(&mut store, &config(), &cache).unwrap();

        let flags = Flags::new(Some("production".into()), load(&store, builtin::table(), &config()));
        assert_eq!(flags.cache, Some(cache));

        clear(&mut store, &config()).unwrap();
        let flags = Flags::new(None, load(&store, builtin::table(), &config()));
        assert_eq!(
            serde_json::to_value(&flags).unwrap(),
            json!({ "mode": null, "cache": null })
        );
    }
}
