//! Report type definitions for operations

use crate::{BuildPhase, Version};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Build report returned by a successful pipeline run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct BuildReport {
    /// Package that was built
    pub package: String,
    /// Version embedded into and reported by the binary
    pub version: Version,
    /// Path of the produced binary
    pub binary_path: PathBuf,
    /// Final phase (Verified, or Built when verification was skipped)
    pub phase: BuildPhase,
    /// Build duration
    pub build_ms: u64,
    /// Verification duration, when verification ran
    pub verify_ms: Option<u64>,
}

/// Result of a standalone verification run
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct VerifyReport {
    /// Binary that was executed
    pub binary_path: PathBuf,
    /// Version string that was expected
    pub expected: String,
    /// Captured standard output
    pub output: String,
}
