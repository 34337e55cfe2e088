//! Version resolution
//!
//! The recipe version is resolved externally to the build itself: a pinned
//! archive carries it, a release process supplies it via override, and a
//! rolling checkout gets a deterministic pseudo-version derived from the
//! commit. The resolved value is threaded explicitly into both the build
//! step (link-time injection) and the verification step (substring
//! assertion); the two must see the identical string.

use std::path::Path;

use tinybrew_errors::Error;
use tinybrew_recipe::SourceSpec;
use tinybrew_types::Version;

use crate::environment::BuildEnvironment;

/// Resolve the version for one recipe execution.
///
/// Precedence: explicit override, then the pinned archive version, then a
/// `0.0.0+git.<short-sha>` pseudo-version from the checkout (falling back
/// to `0.0.0+dev` when the checkout is not a git repository).
///
/// # Errors
///
/// Returns a `VersionError` when the override or pinned version is empty.
pub async fn resolve_version(
    env: &BuildEnvironment,
    spec: &SourceSpec,
    override_version: Option<&str>,
    checkout: &Path,
) -> Result<Version, Error> {
    if let Some(raw) = override_version {
        return Version::new(raw).map_err(Error::from);
    }

    if let Some(archive) = &spec.archive {
        return Version::new(&archive.version).map_err(Error::from);
    }

    let result = env
        .execute_command("git", &["rev-parse", "--short", "HEAD"], Some(checkout))
        .await;

    let pseudo = match result {
        Ok(r) if r.success => format!("0.0.0+git.{}", r.stdout.trim()),
        _ => "0.0.0+dev".to_string(),
    };
    Version::new(pseudo).map_err(Error::from)
}
