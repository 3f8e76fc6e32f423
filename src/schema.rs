//! Typed view of the cache shape introduced in 0.0.28
//!
//! Element shapes inside the lists belong to the application and are kept
//! as opaque JSON.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::blob::Blob;
use crate::error::CacheResult;
use crate::version::Version;

/// First cache version with this shape
pub const SNAPSHOT_SINCE: Version = Version::new(0, 0, 28);

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheSnapshot {
    pub version: Version,
    pub theme: Value,
    pub tags: Vec<Value>,
    pub authors: Vec<Value>,
    pub post_previews: Vec<Value>,
    /// UUID of the signed-in user
    #[serde(default)]
    pub user: Option<String>,
}

impl CacheSnapshot {
    /// Whether a blob at `version` is expected to have this shape
    pub fn applies_to(version: &Version) -> bool {
        *version >= SNAPSHOT_SINCE
    }

    pub fn from_blob(blob: &Blob) -> CacheResult<Self> {
        Ok(serde_json::from_value(blob.clone().into_value())?)
    }

    pub fn into_blob(self) -> CacheResult<Blob> {
        Blob::from_value(serde_json::to_value(self)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CacheError;
    use serde_json::json;

    #[test]
    fn test_decode_documented_shape() {
        let blob = Blob::from_value(json!({
            "version": "0.0.36",
            "theme": "Dark",
            "tags": [{ "id": "t1", "name": "rust" }],
            "authors": [],
            "postPreviews": [{ "id": "p1", "title": "Hello" }],
            "user": null
        }))
        .unwrap();
        let snapshot = CacheSnapshot::from_blob(&blob).unwrap();
        assert_eq!(snapshot.version, Version::new(0, 0, 36));
        assert_eq!(snapshot.tags.len(), 1);
        assert_eq!(snapshot.post_previews.len(), 1);
        assert_eq!(snapshot.user, None);
        assert_eq!(snapshot.into_blob().unwrap(), blob);
    }

    #[test]
    fn test_applies_from_0_0_28() {
        assert!(!CacheSnapshot::applies_to(&Version::new(0, 0, 27)));
        assert!(CacheSnapshot::applies_to(&SNAPSHOT_SINCE));
        assert!(CacheSnapshot::applies_to(&Version::new(0, 0, 36)));
    }

    #[test]
    fn test_user_optional() {
        let blob = Blob::from_value(json!({
            "version": "0.0.28",
            "theme": "Light",
            "tags": [],
            "authors": [],
            "postPreviews": []
        }))
        .unwrap();
        assert_eq!(CacheSnapshot::from_blob(&blob).unwrap().user, None);
    }

    #[test]
    fn test_legacy_shape_rejected() {
        let blob = Blob::from_value(json!({ "version": "0.0.12", "posts": [] })).unwrap();
        assert!(matches!(
            CacheSnapshot::from_blob(&blob),
            Err(CacheError::Json(_))
        ));
    }
}
