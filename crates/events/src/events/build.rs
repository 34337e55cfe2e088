use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;
use tinybrew_types::{BuildPhase, Version};

use crate::FailureContext;

/// Build pipeline events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum BuildEvent {
    /// Recipe execution started
    Started { package: String },

    /// Source fetch started (git clone, archive download, or local copy)
    FetchStarted { package: String, source: String },

    /// Source fetch completed
    FetchCompleted { package: String, path: PathBuf },

    /// Version resolved and about to be threaded through build and verify
    VersionResolved { package: String, version: Version },

    /// Pipeline phase transition
    PhaseChanged { package: String, phase: BuildPhase },

    /// Toolchain command started
    CommandStarted {
        package: String,
        command: String,
        working_dir: PathBuf,
    },

    /// Toolchain command completed
    CommandCompleted {
        package: String,
        command: String,
        exit_code: Option<i32>,
        duration: Duration,
    },

    /// Smoke test started against the built binary
    VerifyStarted {
        package: String,
        binary_path: PathBuf,
        expected: String,
    },

    /// Smoke test passed
    VerifyCompleted { package: String, output: String },

    /// Recipe execution finished successfully
    Completed {
        package: String,
        version: Version,
        binary_path: PathBuf,
        duration: Duration,
    },

    /// Recipe execution failed
    Failed {
        package: String,
        phase: BuildPhase,
        failure: FailureContext,
    },
}
