//! Post-build smoke test
//!
//! Runs the freshly built binary once and asserts that the expected version
//! string occurs as a substring of its standard output. This is the only
//! automated correctness check a recipe performs: it proves the binary is
//! executable and that the link-time version injection round-tripped.

use std::path::Path;

use tinybrew_errors::{BuildError, Error};
use tinybrew_events::{AppEvent, BuildEvent, EventEmitter};

/// Run the smoke test and return the captured standard output.
///
/// # Errors
///
/// Returns `BuildError::VerifyFailed` when the binary cannot be executed,
/// exits non-zero, or its output does not contain `expected`.
pub async fn run_smoke_test(
    binary: &Path,
    args: &[String],
    expected: &str,
    emitter: &(impl EventEmitter + Sync),
    package: &str,
) -> Result<String, Error> {
    emitter.emit(AppEvent::Build(BuildEvent::VerifyStarted {
        package: package.to_string(),
        binary_path: binary.to_path_buf(),
        expected: expected.to_string(),
    }));

    let output = tokio::process::Command::new(binary)
        .args(args)
        .output()
        .await
        .map_err(|e| BuildError::VerifyFailed {
            expected: expected.to_string(),
            output: format!("failed to execute {}: {e}", binary.display()),
        })?;

    let stdout = String::from_utf8_lossy(&output.stdout).to_string();

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(BuildError::VerifyFailed {
            expected: expected.to_string(),
            output: format!(
                "exit code {:?}: {}{}",
                output.status.code(),
                stdout,
                stderr
            ),
        }
        .into());
    }

    if !stdout.contains(expected) {
        return Err(BuildError::VerifyFailed {
            expected: expected.to_string(),
            output: stdout,
        }
        .into());
    }

    emitter.emit(AppEvent::Build(BuildEvent::VerifyCompleted {
        package: package.to_string(),
        output: stdout.clone(),
    }));

    Ok(stdout)
}
