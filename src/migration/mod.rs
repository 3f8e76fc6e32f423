//! Versioned cache migration
//!
//! - `table`: immutable registry of `from -> to` steps
//! - `engine`: per-run driver with the cycle guard
//! - `builtin`: the chain shipped with the application

pub mod builtin;
pub mod engine;
pub mod table;

pub use engine::{Lookup, MigrationReport, Migrator, RunState};
pub use table::{MigrationStep, MigrationTable, MigrationTableBuilder, StepKey, TransformFn};
