//! Semantic version tags embedded in persisted caches
//!
//! Versions are compared structurally on their integer triple, never as
//! raw strings ("0.0.9" < "0.0.10").

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ParseError;

/// An immutable `major.minor.patch` triple
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Version {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl Version {
    pub const fn new(major: u64, minor: u64, patch: u64) -> Self {
        Self {
            major,
            minor,
            patch,
        }
    }

    /// Parse a string of the exact form `\d+\.\d+\.\d+`
    pub fn parse(s: &str) -> Result<Self, ParseError> {
        let mut parts = s.split('.');
        let major = parse_component(s, parts.next())?;
        let minor = parse_component(s, parts.next())?;
        let patch = parse_component(s, parts.next())?;
        if parts.next().is_some() {
            return Err(ParseError::Malformed(s.to_string()));
        }
        Ok(Self::new(major, minor, patch))
    }

    /// Candidate next versions, smallest upgrade first:
    /// patch bump, minor bump (patch reset), major bump (minor and patch reset).
    ///
    /// A component already at `u64::MAX` has no successor for that bump.
    pub fn successors(&self) -> Vec<Version> {
        [
            self.patch
                .checked_add(1)
                .map(|patch| Version::new(self.major, self.minor, patch)),
            self.minor
                .checked_add(1)
                .map(|minor| Version::new(self.major, minor, 0)),
            self.major.checked_add(1).map(|major| Version::new(major, 0, 0)),
        ]
        .into_iter()
        .flatten()
        .collect()
    }
}

fn parse_component(input: &str, part: Option<&str>) -> Result<u64, ParseError> {
    let part = part.ok_or_else(|| ParseError::Malformed(input.to_string()))?;
    // u64::from_str accepts a leading '+', the version grammar does not
    if part.is_empty() || !part.bytes().all(|b| b.is_ascii_digit()) {
        return Err(ParseError::Malformed(input.to_string()));
    }
    part.parse()
        .map_err(|_| ParseError::Overflow(input.to_string()))
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for Version {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Version::parse(s)
    }
}

impl Serialize for Version {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Version {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Version::parse(&s).map_err(serde::de::Error::custom)
    }
}
