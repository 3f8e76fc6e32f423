//! The immutable registry of migration steps
//!
//! Built once at process start and only read afterwards. Steps are keyed by
//! the exact source version they apply to; when several steps share a
//! source, the one with the smallest target comes first regardless of the
//! order they were registered in.

use std::collections::BTreeMap;
use std::fmt;

use crate::blob::Blob;
use crate::error::{CacheError, CacheResult};
use crate::version::Version;

/// A transform over a blob. `Err` carries the reason the step failed.
pub type TransformFn = dyn Fn(Blob) -> Result<Blob, String> + Send + Sync;

/// Identifies a step within a table
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct StepKey {
    pub from: Version,
    pub to: Version,
}

impl fmt::Display for StepKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {}", self.from, self.to)
    }
}

/// One registered `from -> to` transform
pub struct MigrationStep {
    key: StepKey,
    /// `None` is the identity transform
    transform: Option<Box<TransformFn>>,
}

impl MigrationStep {
    pub fn key(&self) -> StepKey {
        self.key
    }

    pub fn to(&self) -> Version {
        self.key.to
    }

    /// Run the transform and stamp the output with the target version
    pub fn apply(&self, blob: Blob) -> CacheResult<Blob> {
        let mut out = match &self.transform {
            Some(transform) => transform(blob).map_err(|reason| CacheError::Transform {
                from: self.key.from,
                to: self.key.to,
                reason,
            })?,
            None => blob,
        };
        out.set_version(&self.key.to);
        Ok(out)
    }
}

impl fmt::Debug for MigrationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MigrationStep")
            .field("from", &self.key.from)
            .field("to", &self.key.to)
            .field("identity", &self.transform.is_none())
            .finish()
    }
}

#[derive(Debug, Default)]
pub struct MigrationTable {
    by_source: BTreeMap<Version, Vec<MigrationStep>>,
}

impl MigrationTable {
    pub fn builder() -> MigrationTableBuilder {
        MigrationTableBuilder::default()
    }

    /// Steps registered exactly for `from`, smallest target first
    pub fn candidates(&self, from: &Version) -> &[MigrationStep] {
        self.by_source.get(from).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn steps(&self) -> impl Iterator<Item = &MigrationStep> {
        self.by_source.values().flatten()
    }

    pub fn len(&self) -> usize {
        self.by_source.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.by_source.is_empty()
    }

    /// Newest version any step migrates to
    pub fn latest(&self) -> Option<Version> {
        self.steps().map(MigrationStep::to).max()
    }
}

/// Collects steps as version strings and validates them on [`build`](Self::build)
#[derive(Default)]
pub struct MigrationTableBuilder {
    pending: Vec<(String, String, Option<Box<TransformFn>>)>,
}

impl MigrationTableBuilder {
    /// Register an identity step that only restamps the version
    pub fn step(mut self, from: &str, to: &str) -> Self {
        self.pending.push((from.to_string(), to.to_string(), None));
        self
    }

    /// Register a step that rewrites the blob before it is restamped
    pub fn step_with<F>(mut self, from: &str, to: &str, transform: F) -> Self
    where
        F: Fn(Blob) -> Result<Blob, String> + Send + Sync + 'static,
    {
        self.pending
            .push((from.to_string(), to.to_string(), Some(Box::new(transform))));
        self
    }

    pub fn build(self) -> CacheResult<MigrationTable> {
        let mut by_source: BTreeMap<Version, Vec<MigrationStep>> = BTreeMap::new();

        for (from, to, transform) in self.pending {
            let key = StepKey {
                from: Version::parse(&from)?,
                to: Version::parse(&to)?,
            };
            if key.to <= key.from {
                log::warn!("Migration step {} does not move forward", key);
            }

            let steps = by_source.entry(key.from).or_default();
            if steps.iter().any(|s| s.key == key) {
                return Err(CacheError::DuplicateStep {
                    from: key.from,
                    to: key.to,
                });
            }
            steps.push(MigrationStep { key, transform });
        }

        for steps in by_source.values_mut() {
            steps.sort_by_key(|s| s.key.to);
        }

        Ok(MigrationTable { by_source })
    }
}
