//! Recipe data structures

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tinybrew_errors::RecipeError;

/// Complete recipe structure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Recipe {
    /// Package metadata (required)
    pub metadata: Metadata,

    /// Source acquisition (required; exactly one method)
    pub source: SourceSpec,

    /// Build stage (required)
    pub build: BuildSpec,

    /// Post-build smoke test (optional)
    #[serde(default)]
    pub verify: Verify,
}

/// Package metadata
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Metadata {
    pub name: String,
    pub description: String,
    pub license: String,

    #[serde(default)]
    pub homepage: Option<String>,

    #[serde(default)]
    pub dependencies: Dependencies,
}

/// Phase-tagged dependency sets
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Dependencies {
    /// Tools required only during build (e.g. the Go toolchain)
    #[serde(default)]
    pub build: Vec<String>,

    #[serde(default)]
    pub runtime: Vec<String>,

    #[serde(default)]
    pub test: Vec<String>,
}

/// Source acquisition specification
///
/// Exactly one of the methods must be present per recipe; `method()`
/// enforces the invariant.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SourceSpec {
    /// Rolling git source (no pinned version)
    #[serde(default)]
    pub git: Option<GitSource>,

    /// Pinned release archive (version + checksum)
    #[serde(default)]
    pub archive: Option<ArchiveSource>,

    /// Local directory (dev and test builds; counts as rolling)
    #[serde(default)]
    pub local: Option<LocalSource>,
}

/// Resolved source method, with the exactly-one invariant already applied
#[derive(Debug, Clone)]
pub enum SourceMethod<'a> {
    Git(&'a GitSource),
    Archive(&'a ArchiveSource),
    Local(&'a LocalSource),
}

impl SourceSpec {
    /// Resolve the active source method.
    ///
    /// # Errors
    ///
    /// Returns `RecipeError::AmbiguousSource` when more than one method is
    /// declared and `RecipeError::MissingSource` when none is.
    pub fn method(&self) -> Result<SourceMethod<'_>, RecipeError> {
        let declared = usize::from(self.git.is_some())
            + usize::from(self.archive.is_some())
            + usize::from(self.local.is_some());
        if declared > 1 {
            return Err(RecipeError::AmbiguousSource);
        }
        if let Some(git) = &self.git {
            Ok(SourceMethod::Git(git))
        } else if let Some(archive) = &self.archive {
            Ok(SourceMethod::Archive(archive))
        } else if let Some(local) = &self.local {
            Ok(SourceMethod::Local(local))
        } else {
            Err(RecipeError::MissingSource)
        }
    }

    /// Whether the recipe pins a released version (archive method)
    #[must_use]
    pub fn is_pinned(&self) -> bool {
        self.archive.is_some()
    }
}

/// Rolling git source specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GitSource {
    pub url: String,
    #[serde(rename = "ref")]
    pub git_ref: String,
}

/// Pinned release archive specification
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ArchiveSource {
    pub url: String,
    pub sha256: String,
    pub version: String,
}

/// Local directory source
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocalSource {
    pub path: PathBuf,
}

/// Build stage; currently the Go toolchain is the only backend
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildSpec {
    pub go: GoBuild,
}

/// Go build description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GoBuild {
    /// Entry-point package path within the source tree (e.g. `./cmd/tinyclaw`)
    pub entrypoint: String,

    /// Build tags passed via `-tags` (compile-time feature selectors)
    #[serde(default)]
    pub tags: Vec<String>,

    /// Fully-qualified symbol that receives the version string at link time
    pub version_symbol: String,
}

/// Post-build smoke test description
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Verify {
    /// Arguments passed to the built binary
    #[serde(default = "default_verify_args")]
    pub args: Vec<String>,

    /// Substring expected in stdout; defaults to the resolved version
    #[serde(default)]
    pub expect: Option<String>,
}

fn default_verify_args() -> Vec<String> {
    vec!["version".to_string()]
}

impl Default for Verify {
    fn default() -> Self {
        Self {
            args: default_verify_args(),
            expect: None,
        }
    }
}
