//! The persisted application-state snapshot
//!
//! Only the `version` field is inspected. Every other field passes through
//! untouched unless a migration step rewrites it.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{CacheError, CacheResult};
use crate::version::Version;

pub const VERSION_FIELD: &str = "version";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Blob(Map<String, Value>);

impl Blob {
    /// Wrap a parsed JSON value. Anything but an object is not a cache.
    pub fn from_value(value: Value) -> CacheResult<Self> {
        match value {
            Value::Object(fields) => Ok(Self(fields)),
            _ => Err(CacheError::NoCache),
        }
    }

    /// Read and parse the version tag
    ///
    /// A missing or `null` field means there is no cache; an empty string is
    /// present but malformed.
    pub fn version(&self) -> CacheResult<Version> {
        match self.0.get(VERSION_FIELD) {
            None | Some(Value::Null) => Err(CacheError::NoCache),
            Some(Value::String(s)) => Ok(Version::parse(s)?),
            Some(_) => Err(CacheError::VersionNotString),
        }
    }

    pub fn set_version(&mut self, version: &Version) {
        self.0
            .insert(VERSION_FIELD.to_string(), Value::String(version.to_string()));
    }

    pub fn get(&self, field: &str) -> Option<&Value> {
        self.0.get(field)
    }

    pub fn insert(&mut self, field: impl Into<String>, value: Value) -> Option<Value> {
        self.0.insert(field.into(), value)
    }

    pub fn remove(&mut self, field: &str) -> Option<Value> {
        self.0.remove(field)
    }

    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl From<Blob> for Value {
    fn from(blob: Blob) -> Self {
        blob.into_value()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ParseError;
    use serde_json::json;

    #[test]
    fn test_non_objects_are_not_caches() {
        for value in [json!(null), json!([1, 2]), json!("0.0.1"), json!(0), json!(false)] {
            assert!(matches!(Blob::from_value(value), Err(CacheError::NoCache)));
        }
    }

    #[test]
    fn test_version_absent_vs_empty() {
        let missing = Blob::from_value(json!({ "theme": "dark" })).unwrap();
        assert!(matches!(missing.version(), Err(CacheError::NoCache)));

        let null = Blob::from_value(json!({ "version": null })).unwrap();
        assert!(matches!(null.version(), Err(CacheError::NoCache)));

        let empty = Blob::from_value(json!({ "version": "" })).unwrap();
        assert!(matches!(
            empty.version(),
            Err(CacheError::Version(ParseError::Malformed(_)))
        ));

        let number = Blob::from_value(json!({ "version": 28 })).unwrap();
        assert!(matches!(number.version(), Err(CacheError::VersionNotString)));
    }

    #[test]
    fn test_set_version_keeps_other_fields() {
        let mut blob = Blob::from_value(json!({ "version": "0.0.1", "tags": ["rust"] })).unwrap();
        blob.set_version(&Version::new(0, 0, 2));
        assert_eq!(
            blob.into_value(),
            json!({ "version": "0.0.2", "tags": ["rust"] })
        );
    }
}
