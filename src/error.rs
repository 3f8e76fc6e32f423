//! Error taxonomy and the two-arm outcome helpers
//!
//! Parse and migration failures are returned, never thrown. The only
//! failures that indicate a bug rather than bad input are defects in the
//! migration table itself (see [`CacheError::is_defect`]).

use thiserror::Error;

use crate::version::Version;

pub type CacheResult<T> = Result<T, CacheError>;

/// A version string that is not `major.minor.patch`
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ParseError {
    #[error("malformed version {0:?}")]
    Malformed(String),
    #[error("version component out of range in {0:?}")]
    Overflow(String),
}

#[derive(Error, Debug)]
pub enum CacheError {
    /// Absent, unparsable, null, or version-less cache
    #[error("no cache")]
    NoCache,
    #[error(transparent)]
    Version(#[from] ParseError),
    #[error("cache version field is not a string")]
    VersionNotString,
    #[error("migration {from} -> {to} failed: {reason}")]
    Transform {
        from: Version,
        to: Version,
        reason: String,
    },
    #[error("migration step {from} -> {to} registered twice")]
    DuplicateStep { from: Version, to: Version },
    #[error("storage error: {0}")]
    Storage(String),
    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

impl CacheError {
    /// True when the error points at a broken migration table rather than
    /// bad stored data.
    pub fn is_defect(&self) -> bool {
        matches!(
            self,
            CacheError::Transform { .. } | CacheError::DuplicateStep { .. }
        )
    }
}

/// Uniform handling of both outcome arms
///
/// ```
/// use blog_cache::error::Fold;
///
/// let ok: Result<u32, String> = Ok(0);
/// assert_eq!(ok.fold(|v| format!("value {v}"), |e| e), "value 0");
/// ```
pub trait Fold<T, E> {
    fn fold<R>(self, on_ok: impl FnOnce(T) -> R, on_err: impl FnOnce(E) -> R) -> R;
}

impl<T, E> Fold<T, E> for Result<T, E> {
    fn fold<R>(self, on_ok: impl FnOnce(T) -> R, on_err: impl FnOnce(E) -> R) -> R {
        match self {
            Ok(value) => on_ok(value),
            Err(reason) => on_err(reason),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fold_falsy_value_is_still_ok() {
        let empty: CacheResult<String> = Ok(String::new());
        assert!(empty.fold(|_| true, |_| false));

        let zero: CacheResult<u64> = Ok(0);
        assert_eq!(zero.fold(Some, |_| None), Some(0));
    }

    #[test]
    fn test_fold_err_arm() {
        let err: CacheResult<u64> = Err(CacheError::NoCache);
        assert_eq!(err.fold(|v| v.to_string(), |e| e.to_string()), "no cache");
    }

    #[test]
    fn test_defects() {
        let v = Version::new(0, 0, 1);
        assert!(
            CacheError::Transform {
                from: v,
                to: v,
                reason: "boom".into()
            }
            .is_defect()
        );
        assert!(CacheError::DuplicateStep { from: v, to: v }.is_defect());
        assert!(!CacheError::NoCache.is_defect());
        assert!(!CacheError::from(ParseError::Malformed("x".into())).is_defect());
    }
}
