//! Build and verification error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum BuildError {
    #[error("missing build dependency: {name}")]
    MissingBuildDep { name: String },

    #[error("fetch failed for {url}: {message}")]
    FetchFailed { url: String, message: String },

    #[error("checksum mismatch for {file}: expected {expected}, got {actual}")]
    HashMismatch {
        file: String,
        expected: String,
        actual: String,
    },

    #[error("extraction failed: {message}")]
    ExtractionFailed { message: String },

    #[error("compile failed: {message}")]
    CompileFailed { message: String },

    #[error("no binary produced at {path}")]
    MissingArtifact { path: String },

    #[error("verification failed: expected version {expected} in output: {output}")]
    VerifyFailed { expected: String, output: String },

    #[error("build workspace error: {message}")]
    WorkspaceFailed { message: String },
}

impl UserFacingError for BuildError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::MissingBuildDep { .. } => {
                Some("Install the missing toolchain and make sure it is on PATH.")
            }
            Self::FetchFailed { .. } => {
                Some("Check the source URL and your network connection, then retry.")
            }
            Self::HashMismatch { .. } => {
                Some("The pinned checksum no longer matches the upstream artifact; update the recipe or verify the download source.")
            }
            Self::CompileFailed { .. } => {
                Some("The toolchain diagnostics above come from the compiler itself.")
            }
            Self::VerifyFailed { .. } => {
                Some("The built binary does not report the expected version; the version symbol in the recipe may be stale.")
            }
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        matches!(self, Self::FetchFailed { .. })
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::MissingBuildDep { .. } => "build.missing_build_dep",
            Self::FetchFailed { .. } => "build.fetch_failed",
            Self::HashMismatch { .. } => "build.hash_mismatch",
            Self::ExtractionFailed { .. } => "build.extraction_failed",
            Self::CompileFailed { .. } => "build.compile_failed",
            Self::MissingArtifact { .. } => "build.missing_artifact",
            Self::VerifyFailed { .. } => "build.verify_failed",
            Self::WorkspaceFailed { .. } => "build.workspace_failed",
        };
        Some(code)
    }
}
