//! Opaque package version strings
//!
//! Upstream release tags come in many shapes (`1.4.2`, `v1.4.2`,
//! `2024.01`); tinybrew never interprets them structurally. The version is
//! injected into the binary at link time and asserted verbatim by the
//! smoke test, so the only requirement is a non-empty value.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use tinybrew_errors::VersionError;

/// Version string as released upstream, or a rolling pseudo-version
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Version(String);

impl Version {
    /// Create a version from a raw string, trimming surrounding whitespace.
    ///
    /// # Errors
    ///
    /// Returns `VersionError::EmptyVersion` when the trimmed value is empty.
    pub fn new(raw: impl Into<String>) -> Result<Self, VersionError> {
        let raw = raw.into();
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VersionError::EmptyVersion);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// The version as a string slice
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for Version {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

impl TryFrom<String> for Version {
    type Error = VersionError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Version> for String {
    fn from(version: Version) -> Self {
        version.0
    }
}

impl AsRef<str> for Version {
    fn as_ref(&self) -> &str {
        &self.0
    }
}
