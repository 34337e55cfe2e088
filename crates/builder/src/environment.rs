//! Build workspace directories and command execution

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Instant;

use tempfile::TempDir;
use tinybrew_config::Config;
use tinybrew_errors::{BuildError, Error};
use tinybrew_events::{AppEvent, BuildEvent, EventEmitter, EventSender};

/// Captured result of a child-process invocation
#[derive(Debug, Clone)]
pub struct CommandResult {
    pub success: bool,
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

/// Per-recipe build workspace
///
/// Owns the scratch directory for the source checkout and the install
/// prefix the binary lands in. The scratch directory is a temp dir unless
/// configuration pins a work path; temp dirs are removed on drop unless
/// `keep_work_dir` is set.
pub struct BuildEnvironment {
    package: String,
    work_dir: PathBuf,
    prefix: PathBuf,
    env_vars: HashMap<String, String>,
    network_allowed: bool,
    event_sender: Option<EventSender>,
    // Keeps the temp dir alive for the lifetime of the environment
    scratch: Option<TempDir>,
}

impl BuildEnvironment {
    /// Create a build environment for one recipe execution.
    ///
    /// # Errors
    ///
    /// Returns an error if the work or prefix directories cannot be created.
    pub fn new(
        package: &str,
        config: &Config,
        event_sender: Option<EventSender>,
    ) -> Result<Self, Error> {
        let (work_dir, scratch) = match config.work_path() {
            Some(base) => {
                let dir = base.join(package);
                std::fs::create_dir_all(&dir).map_err(|e| Error::io_with_path(&e, &dir))?;
                (dir, None)
            }
            None => {
                let tmp = tempfile::Builder::new()
                    .prefix(&format!("tinybrew-{package}-"))
                    .tempdir()
                    .map_err(|e| BuildError::WorkspaceFailed {
                        message: e.to_string(),
                    })?;
                let keep = config.build.keep_work_dir;
                if keep {
                    // Leak the handle so the directory survives for inspection
                    let path = tmp.keep();
                    (path, None)
                } else {
                    (tmp.path().to_path_buf(), Some(tmp))
                }
            }
        };

        let prefix = config.prefix_path();
        std::fs::create_dir_all(prefix.join("bin"))
            .map_err(|e| Error::io_with_path(&e, prefix.join("bin")))?;

        let mut env_vars = HashMap::new();
        // Static binaries; the recipe format has no cgo story
        env_vars.insert("CGO_ENABLED".to_string(), "0".to_string());

        Ok(Self {
            package: package.to_string(),
            work_dir,
            prefix,
            env_vars,
            network_allowed: config.build.network_access,
            event_sender,
            scratch,
        })
    }

    /// Name of the package this environment belongs to
    #[must_use]
    pub fn package(&self) -> &str {
        &self.package
    }

    /// Scratch directory for source checkouts
    #[must_use]
    pub fn work_dir(&self) -> &Path {
        &self.work_dir
    }

    /// Install prefix; binaries land in `<prefix>/bin`
    #[must_use]
    pub fn prefix(&self) -> &Path {
        &self.prefix
    }

    /// Binary output directory
    #[must_use]
    pub fn bin_dir(&self) -> PathBuf {
        self.prefix.join("bin")
    }

    /// Whether network access is allowed for source fetch
    #[must_use]
    pub fn network_allowed(&self) -> bool {
        self.network_allowed
    }

    /// Execute a command in the build environment, capturing output.
    ///
    /// A non-zero exit is reported through `CommandResult::success`, not as
    /// an error; callers map failures into their own domain. Only a spawn
    /// failure is an `Err`.
    ///
    /// # Errors
    ///
    /// Returns an error if the process cannot be spawned at all.
    pub async fn execute_command(
        &self,
        program: &str,
        args: &[&str],
        working_dir: Option<&Path>,
    ) -> Result<CommandResult, Error> {
        let mut cmd = tokio::process::Command::new(program);
        cmd.args(args);
        cmd.envs(&self.env_vars);

        let cwd = working_dir.unwrap_or(&self.work_dir);
        cmd.current_dir(cwd);

        let rendered = format!("{program} {}", args.join(" "));
        self.emit(AppEvent::Build(BuildEvent::CommandStarted {
            package: self.package.clone(),
            command: rendered.clone(),
            working_dir: cwd.to_path_buf(),
        }));

        let started = Instant::now();
        let output = cmd
            .output()
            .await
            .map_err(|e| Error::io_with_path(&e, program))?;

        let result = CommandResult {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        };

        self.emit(AppEvent::Build(BuildEvent::CommandCompleted {
            package: self.package.clone(),
            command: rendered,
            exit_code: result.exit_code,
            duration: started.elapsed(),
        }));

        Ok(result)
    }
}

impl EventEmitter for BuildEnvironment {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
