//! The production migration chain
//!
//! Every step so far is the identity plus a version stamp. `0.0.31` was
//! never released, so `0.0.30` migrates straight to `0.0.32`.

use std::sync::OnceLock;

use super::table::{MigrationTable, MigrationTableBuilder};
use crate::version::Version;

/// Newest cache version the application writes
pub const LATEST: Version = Version::new(0, 0, 36);

/// Releases before the documented schema shape
const LEGACY_CHAIN: [&str; 27] = [
    "0.0.1", "0.0.2", "0.0.3", "0.0.4", "0.0.5", "0.0.6", "0.0.7", "0.0.8", "0.0.9", "0.0.10",
    "0.0.11", "0.0.12", "0.0.13", "0.0.14", "0.0.15", "0.0.16", "0.0.17", "0.0.18", "0.0.19",
    "0.0.20", "0.0.21", "0.0.22", "0.0.23", "0.0.24", "0.0.25", "0.0.26", "0.0.27",
];

/// Releases from 0.0.28 on, when the cache holds a [`crate::schema::CacheSnapshot`]
const SNAPSHOT_CHAIN: [&str; 8] = [
    "0.0.28", "0.0.29", "0.0.30", "0.0.32", "0.0.33", "0.0.34", "0.0.35", "0.0.36",
];

fn chain(builder: MigrationTableBuilder, versions: &[&str]) -> MigrationTableBuilder {
    versions
        .windows(2)
        .fold(builder, |b, pair| b.step(pair[0], pair[1]))
}

fn build() -> MigrationTable {
    let builder = chain(MigrationTable::builder(), &LEGACY_CHAIN).step("0.0.27", "0.0.28");
    // Both chains are constants, covered by test_builtin_chain_builds
    chain(builder, &SNAPSHOT_CHAIN)
        .build()
        .expect("Builtin migration chain has a malformed version")
}

/// The process-wide, read-only production table
pub fn table() -> &'static MigrationTable {
    static TABLE: OnceLock<MigrationTable> = OnceLock::new();
    TABLE.get_or_init(build)
}
