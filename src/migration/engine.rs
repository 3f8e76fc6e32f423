//! The migration driver
//!
//! A run walks a blob from its stored version toward the newest version the
//! table knows about, one step at a time. Each run keeps its own set of
//! remaining steps, so a step is applied at most once per run and runs
//! never interfere with each other.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use super::table::{MigrationStep, MigrationTable, StepKey};
use crate::blob::Blob;
use crate::error::{CacheError, CacheResult};
use crate::version::Version;

/// How the next step is found for the current version
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Lookup {
    /// Only steps registered for exactly the current version
    #[default]
    Exact,
    /// Exact match first, then steps registered for the patch, minor and
    /// major successors of the current version, in that order
    Successors,
}

/// Where a blob stands relative to the table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    /// A step applies to the current version
    Running,
    /// No step applies; the blob is returned as-is
    Stalled,
    /// No usable blob or version
    Failed,
}

/// The outcome of a run that did not fail
#[derive(Debug, Clone, PartialEq)]
pub struct MigrationReport {
    pub blob: Blob,
    /// Version the blob was stored at
    pub started_at: Version,
    /// Version the run stalled at
    pub version: Version,
    /// Steps applied, in order
    pub applied: Vec<StepKey>,
    /// Newest version the table migrates to
    pub latest: Option<Version>,
}

impl MigrationReport {
    /// A run that did not fail always ends stalled: no remaining step
    /// applies to `version`.
    pub fn state(&self) -> RunState {
        RunState::Stalled
    }

    /// At or beyond the newest known version
    pub fn is_up_to_date(&self) -> bool {
        self.latest.is_none_or(|latest| self.version >= latest)
    }

    /// Stalled before reaching the newest known version
    pub fn is_behind(&self) -> bool {
        !self.is_up_to_date()
    }

    pub fn is_unchanged(&self) -> bool {
        self.applied.is_empty()
    }
}

/// Remaining-steps bookkeeping scoped to one run
struct MigrationRun {
    remaining: BTreeSet<StepKey>,
}

impl MigrationRun {
    fn new(table: &MigrationTable) -> Self {
        Self {
            remaining: table.steps().map(MigrationStep::key).collect(),
        }
    }

    fn is_remaining(&self, step: &MigrationStep) -> bool {
        self.remaining.contains(&step.key())
    }

    fn consume(&mut self, step: &MigrationStep) {
        self.remaining.remove(&step.key());
    }
}

#[derive(Debug, Clone, Copy)]
pub struct Migrator<'t> {
    table: &'t MigrationTable,
    lookup: Lookup,
}

impl<'t> Migrator<'t> {
    pub fn new(table: &'t MigrationTable) -> Self {
        Self {
            table,
            lookup: Lookup::default(),
        }
    }

    pub fn with_lookup(mut self, lookup: Lookup) -> Self {
        self.lookup = lookup;
        self
    }

    /// Classify a parsed blob before running anything
    pub fn initial_state(&self, value: &Value) -> RunState {
        let version = match Blob::from_value(value.clone()).and_then(|b| b.version()) {
            Ok(version) => version,
            Err(_) => return RunState::Failed,
        };
        let run = MigrationRun::new(self.table);
        match self.next_step(&version, &run) {
            Some(_) => RunState::Running,
            None => RunState::Stalled,
        }
    }

    /// Migrate the raw stored text
    ///
    /// Absent text and text that is not JSON both mean there is no cache.
    pub fn migrate_raw(&self, raw: Option<&str>) -> CacheResult<MigrationReport> {
        let raw = raw.ok_or(CacheError::NoCache)?;
        let value: Value = serde_json::from_str(raw).map_err(|e| {
            log::debug!("Stored cache is not valid JSON: {}", e);
            CacheError::NoCache
        })?;
        self.migrate(value)
    }

    pub fn migrate(&self, value: Value) -> CacheResult<MigrationReport> {
        self.migrate_blob(Blob::from_value(value)?)
    }

    pub fn migrate_blob(&self, mut blob: Blob) -> CacheResult<MigrationReport> {
        let started_at = blob.version()?;
        let mut version = started_at;
        let mut applied = Vec::new();
        let mut run = MigrationRun::new(self.table);

        while let Some(step) = self.next_step(&version, &run) {
            run.consume(step);
            blob = step.apply(blob).inspect_err(|e| log::error!("{}", e))?;
            log::debug!("Applied cache migration {} (blob at {})", step.key(), version);
            applied.push(step.key());
            version = step.to();
        }

        let report = MigrationReport {
            blob,
            started_at,
            version,
            applied,
            latest: self.table.latest(),
        };

        if !report.is_unchanged() {
            log::info!(
                "Migrated cache {} -> {} ({} steps)",
                started_at,
                version,
                report.applied.len()
            );
        }
        if let (true, Some(latest)) = (report.is_behind(), report.latest) {
            log::warn!("Cache migration stalled at {} (latest is {})", version, latest);
        }

        Ok(report)
    }

    fn next_step(&self, version: &Version, run: &MigrationRun) -> Option<&'t MigrationStep> {
        let exact = self.table.candidates(version);
        if let Some(step) = exact.iter().find(|s| run.is_remaining(s)) {
            return Some(step);
        }
        if !exact.is_empty() {
            log::warn!("Cycle guard: steps from {} already applied in this run", version);
        }

        match self.lookup {
            Lookup::Exact => None,
            Lookup::Successors => version.successors().iter().find_map(|next| {
                self.table
                    .candidates(next)
                    .iter()
                    .find(|s| run.is_remaining(s))
            }),
        }
    }
}
