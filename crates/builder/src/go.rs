//! Go toolchain invocation
//!
//! Builds the recipe's entry point with a fixed flag set: `-s -w` to strip
//! the binary, plus exactly one `-X` flag that injects the resolved version
//! into the recipe's fully-qualified version symbol at link time. The binary
//! can then report its own version without reading anything at runtime.

use std::path::{Path, PathBuf};

use tinybrew_errors::{BuildError, Error};
use tinybrew_recipe::GoBuild;
use tinybrew_types::Version;

use crate::environment::BuildEnvironment;

/// Name of the toolchain executable, matching the recipe's declared
/// build-phase dependency
pub const TOOLCHAIN: &str = "go";

/// Linker flags for the build: strip flags plus the version injection
#[must_use]
pub fn ldflags(version_symbol: &str, version: &Version) -> Vec<String> {
    vec![
        "-s".to_string(),
        "-w".to_string(),
        format!("-X {version_symbol}={version}"),
    ]
}

/// Full argument list for the `go build` invocation
#[must_use]
pub fn build_args(build: &GoBuild, version: &Version, output: &Path) -> Vec<String> {
    let mut args = vec![
        "build".to_string(),
        "-trimpath".to_string(),
        "-ldflags".to_string(),
        ldflags(&build.version_symbol, version).join(" "),
    ];

    if !build.tags.is_empty() {
        args.push("-tags".to_string());
        args.push(build.tags.join(","));
    }

    args.push("-o".to_string());
    args.push(output.display().to_string());
    args.push(build.entrypoint.clone());

    args
}

/// Handle to a resolved Go toolchain
#[derive(Debug, Clone)]
pub struct GoToolchain {
    program: PathBuf,
}

impl GoToolchain {
    /// Locate the toolchain on PATH.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::MissingBuildDep` when the toolchain cannot be
    /// found.
    pub fn discover() -> Result<Self, Error> {
        let program = which::which(TOOLCHAIN).map_err(|_| BuildError::MissingBuildDep {
            name: TOOLCHAIN.to_string(),
        })?;
        Ok(Self { program })
    }

    /// Use an explicit toolchain executable instead of PATH discovery
    pub fn at(program: impl Into<PathBuf>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Path of the toolchain executable
    #[must_use]
    pub fn program(&self) -> &Path {
        &self.program
    }

    /// Compile the entry point, producing `<prefix>/bin/<binary_name>`.
    ///
    /// # Errors
    ///
    /// Returns `BuildError::CompileFailed` (with the toolchain's own stderr)
    /// when the invocation exits non-zero, and `BuildError::MissingArtifact`
    /// when the toolchain reports success but no binary exists at the
    /// output path.
    pub async fn compile(
        &self,
        env: &BuildEnvironment,
        build: &GoBuild,
        version: &Version,
        binary_name: &str,
        source_dir: &Path,
    ) -> Result<PathBuf, Error> {
        let output = env.bin_dir().join(binary_name);
        let args = build_args(build, version, &output);
        let arg_refs: Vec<&str> = args.iter().map(String::as_str).collect();

        let program = self.program.display().to_string();
        let result = env
            .execute_command(&program, &arg_refs, Some(source_dir))
            .await
            .map_err(|e| BuildError::CompileFailed {
                message: format!("{TOOLCHAIN}: {e}"),
            })?;

        if !result.success {
            return Err(BuildError::CompileFailed {
                message: format!(
                    "{TOOLCHAIN} build failed with exit code {:?}: {}",
                    result.exit_code, result.stderr
                ),
            }
            .into());
        }

        if !output.is_file() {
            return Err(BuildError::MissingArtifact {
                path: output.display().to_string(),
            }
            .into());
        }

        Ok(output)
    }
}
