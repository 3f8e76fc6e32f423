//! Blog Cache entry point
//!
//! Native: migrates a cache file (or stdin) and prints the startup flags.
//! Usage: `blog-cache [CACHE_FILE|-] [CONFIG_FILE]`

#[cfg(not(target_arch = "wasm32"))]
fn main() -> std::process::ExitCode {
    use std::io::Read;
    use std::process::ExitCode;

    use blog_cache::migration::builtin;
    use blog_cache::persistence::{self, Flags, Startup};
    use blog_cache::platform::MemoryStore;
    use blog_cache::schema::{CacheSnapshot, SNAPSHOT_SINCE};
    use blog_cache::{CacheConfig, CacheResult};

    fn read_input(path: Option<&str>) -> CacheResult<Option<String>> {
        let text = match path {
            None | Some("-") => {
                let mut buf = String::new();
                std::io::stdin()
                    .read_to_string(&mut buf)
                    .map_err(|e| blog_cache::CacheError::Storage(e.to_string()))?;
                buf
            }
            Some(path) => std::fs::read_to_string(path)
                .map_err(|e| blog_cache::CacheError::Storage(format!("{path}: {e}")))?,
        };
        Ok(Some(text).filter(|t| !t.trim().is_empty()))
    }

    env_logger::init();

    let args: Vec<String> = std::env::args().skip(1).collect();
    let config = match args.get(1) {
        Some(path) => match std::fs::read_to_string(path)
            .map_err(|e| blog_cache::CacheError::Storage(format!("{path}: {e}")))
            .and_then(|json| CacheConfig::from_json(&json))
        {
            Ok(config) => config,
            Err(e) => {
                log::error!("Invalid config: {}", e);
                return ExitCode::FAILURE;
            }
        },
        None => CacheConfig::default(),
    };

    let startup = match read_input(args.first().map(String::as_str)) {
        Ok(raw) => {
            let mut store = MemoryStore::new();
            if let Some(raw) = raw {
                store = store.with_item(&config.storage_key, &raw);
            }
            persistence::load(&store, builtin::table(), &config)
        }
        Err(e) => {
            log::warn!("{}", e);
            Startup::Fresh(e)
        }
    };

    if let Startup::Restored(report) = &startup {
        if CacheSnapshot::applies_to(&report.version) {
            match CacheSnapshot::from_blob(&report.blob) {
                Ok(snapshot) => log::info!(
                    "Cache holds {} tags, {} authors, {} post previews",
                    snapshot.tags.len(),
                    snapshot.authors.len(),
                    snapshot.post_previews.len()
                ),
                Err(e) => log::warn!("Cache does not match the {} shape: {}", SNAPSHOT_SINCE, e),
            }
        }
        log::info!(
            "Cache {} -> {} via {} steps{}",
            report.started_at,
            report.version,
            report.applied.len(),
            if report.is_behind() { " (behind)" } else { "" }
        );
    }

    match serde_json::to_string_pretty(&Flags::new(None, startup)) {
        Ok(json) => {
            println!("{json}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            log::error!("{}", e);
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is platform::web::start, this is just to satisfy the compiler
}
