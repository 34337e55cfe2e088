//! Build pipeline phase state machine
//!
//! A recipe execution moves through these phases strictly in order:
//!
//! `Pending → Building → {BuildFailed | Built} → Verifying →
//! {VerificationFailed | Verified}`
//!
//! Failure phases and `Verified` are terminal. There are no retries; any
//! failure halts the pipeline immediately.

use serde::{Deserialize, Serialize};

/// Phase of a single recipe execution
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BuildPhase {
    /// Recipe parsed, nothing executed yet
    Pending,
    /// Producing the artifact: source fetch, version resolution, and the
    /// toolchain invocation
    Building,
    /// Toolchain exited non-zero or could not be located (terminal)
    BuildFailed,
    /// Binary artifact exists at the output path
    Built,
    /// Smoke test in progress
    Verifying,
    /// Binary output did not contain the expected version (terminal)
    VerificationFailed,
    /// Binary built and correctly versioned (terminal, success)
    Verified,
}

impl BuildPhase {
    /// Whether the pipeline may move from this phase to `next`
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Pending, Self::Building)
                | (Self::Building, Self::BuildFailed | Self::Built)
                | (Self::Built, Self::Verifying)
                | (Self::Verifying, Self::VerificationFailed | Self::Verified)
        )
    }

    /// Whether this phase ends the pipeline
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::BuildFailed | Self::VerificationFailed | Self::Verified
        )
    }

    /// Whether this phase represents a failure
    #[must_use]
    pub fn is_failure(self) -> bool {
        matches!(self, Self::BuildFailed | Self::VerificationFailed)
    }
}

impl std::fmt::Display for BuildPhase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Self::Pending => "pending",
            Self::Building => "building",
            Self::BuildFailed => "build failed",
            Self::Built => "built",
            Self::Verifying => "verifying",
            Self::VerificationFailed => "verification failed",
            Self::Verified => "verified",
        };
        write!(f, "{s}")
    }
}
