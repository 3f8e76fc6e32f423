//! Blog Cache - versioned migration of the persisted application cache
//!
//! Core modules:
//! - `version`: Semantic version tags and their successors
//! - `error`: Error taxonomy and outcome helpers
//! - `blob`: The persisted snapshot, opaque apart from `version`
//! - `migration`: Step table and the migration driver
//! - `schema`: Typed view of the 0.0.28+ cache shape
//! - `persistence`: Load at startup, save on change
//! - `platform`: Browser/native storage abstraction
//! - `settings`: Loading configuration

pub mod blob;
pub mod error;
pub mod migration;
pub mod persistence;
pub mod platform;
pub mod schema;
pub mod settings;
pub mod version;

pub use blob::Blob;
pub use error::{CacheError, CacheResult, Fold, ParseError};
pub use migration::{Lookup, MigrationReport, MigrationTable, Migrator, RunState};
pub use settings::CacheConfig;
pub use version::Version;

/// Migrate stored cache text with the builtin table
///
/// ```
/// let report = blog_cache::migrate_raw(Some(r#"{"version":"0.0.26"}"#)).unwrap();
/// assert_eq!(report.version.to_string(), "0.0.36");
/// assert!(blog_cache::migrate_raw(None).is_err());
/// ```
pub fn migrate_raw(raw: Option<&str>) -> CacheResult<MigrationReport> {
    Migrator::new(migration::builtin::table()).migrate_raw(raw)
}
