//! Sequential recipe execution pipeline
//!
//! Drives one recipe through the phase state machine: fetch and version
//! resolution, the toolchain invocation, then the smoke test. Each step
//! consumes the previous step's output; there are no retries and no
//! timeouts here (timeout policy belongs to the invoking runtime).

use std::time::Instant;

use tinybrew_config::Config;
use tinybrew_errors::Error;
use tinybrew_events::{AppEvent, BuildEvent, EventEmitter, EventSender, FailureContext};
use tinybrew_recipe::Recipe;
use tinybrew_types::{BuildPhase, BuildReport};

use crate::environment::BuildEnvironment;
use crate::go::GoToolchain;
use crate::source::fetch_source;
use crate::verify::run_smoke_test;
use crate::version::resolve_version;

/// Per-invocation options layered over the recipe
#[derive(Debug, Clone, Default)]
pub struct BuildOptions {
    /// Version supplied by an external release process; overrides both the
    /// pinned version and the rolling pseudo-version
    pub build_version: Option<String>,
    /// Stop after the build step, skipping the smoke test
    pub skip_verify: bool,
}

/// Recipe executor
pub struct Builder {
    config: Config,
    event_sender: Option<EventSender>,
    toolchain: Option<GoToolchain>,
}

impl Builder {
    /// Create a builder from configuration
    #[must_use]
    pub fn new(config: Config) -> Self {
        Self {
            config,
            event_sender: None,
            toolchain: None,
        }
    }

    /// Attach an event sender for progress reporting
    #[must_use]
    pub fn with_events(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Use an explicit toolchain instead of PATH discovery
    #[must_use]
    pub fn with_toolchain(mut self, toolchain: GoToolchain) -> Self {
        self.toolchain = Some(toolchain);
        self
    }

    /// Execute a recipe end to end.
    ///
    /// # Errors
    ///
    /// Returns a `BuildError` for any failure in fetch, compile, or
    /// verification; the first error halts the pipeline.
    pub async fn build(&self, recipe: &Recipe, options: &BuildOptions) -> Result<BuildReport, Error> {
        let package = recipe.metadata.name.clone();
        let env = BuildEnvironment::new(&package, &self.config, self.event_sender.clone())?;

        env.emit(AppEvent::Build(BuildEvent::Started {
            package: package.clone(),
        }));

        let mut phase = BuildPhase::Pending;

        // Building covers everything needed to produce the artifact:
        // source fetch, version resolution, and the toolchain invocation.
        self.advance(&env, &package, &mut phase, BuildPhase::Building)?;
        let build_started = Instant::now();

        let outcome = self.run_build_step(recipe, options, &env).await;
        let (version, binary_path) = match outcome {
            Ok(ok) => ok,
            Err(e) => {
                self.advance(&env, &package, &mut phase, BuildPhase::BuildFailed)?;
                env.emit(AppEvent::Build(BuildEvent::Failed {
                    package,
                    phase,
                    failure: FailureContext::from_error(&e),
                }));
                return Err(e);
            }
        };
        let build_ms = u64::try_from(build_started.elapsed().as_millis()).unwrap_or(u64::MAX);

        self.advance(&env, &package, &mut phase, BuildPhase::Built)?;

        if options.skip_verify {
            env.emit_warning("verification skipped; the binary's version was not checked");
            return Ok(BuildReport {
                package,
                version,
                binary_path,
                phase,
                build_ms,
                verify_ms: None,
            });
        }

        self.advance(&env, &package, &mut phase, BuildPhase::Verifying)?;
        let verify_started = Instant::now();

        let expected = recipe
            .verify
            .expect
            .clone()
            .unwrap_or_else(|| version.to_string());

        if let Err(e) =
            run_smoke_test(&binary_path, &recipe.verify.args, &expected, &env, &package).await
        {
            self.advance(&env, &package, &mut phase, BuildPhase::VerificationFailed)?;
            env.emit(AppEvent::Build(BuildEvent::Failed {
                package,
                phase,
                failure: FailureContext::from_error(&e),
            }));
            return Err(e);
        }
        let verify_ms = u64::try_from(verify_started.elapsed().as_millis()).unwrap_or(u64::MAX);

        self.advance(&env, &package, &mut phase, BuildPhase::Verified)?;
        env.emit(AppEvent::Build(BuildEvent::Completed {
            package: package.clone(),
            version: version.clone(),
            binary_path: binary_path.clone(),
            duration: build_started.elapsed(),
        }));

        Ok(BuildReport {
            package,
            version,
            binary_path,
            phase,
            build_ms,
            verify_ms: Some(verify_ms),
        })
    }

    /// Fetch, resolve the version, and compile. The same resolved version
    /// is returned for the verification step; it must be byte-identical to
    /// the one injected at link time.
    async fn run_build_step(
        &self,
        recipe: &Recipe,
        options: &BuildOptions,
        env: &BuildEnvironment,
    ) -> Result<(tinybrew_types::Version, std::path::PathBuf), Error> {
        let checkout = fetch_source(env, &recipe.source).await?;

        let version = resolve_version(
            env,
            &recipe.source,
            options.build_version.as_deref(),
            &checkout,
        )
        .await?;
        env.emit(AppEvent::Build(BuildEvent::VersionResolved {
            package: env.package().to_string(),
            version: version.clone(),
        }));

        let toolchain = match &self.toolchain {
            Some(toolchain) => toolchain.clone(),
            None => GoToolchain::discover()?,
        };

        let binary_path = toolchain
            .compile(
                env,
                &recipe.build.go,
                &version,
                &recipe.metadata.name,
                &checkout,
            )
            .await?;

        Ok((version, binary_path))
    }

    fn advance(
        &self,
        env: &BuildEnvironment,
        package: &str,
        phase: &mut BuildPhase,
        next: BuildPhase,
    ) -> Result<(), Error> {
        if !phase.can_transition_to(next) {
            return Err(Error::internal(format!(
                "illegal phase transition: {phase} -> {next}"
            )));
        }
        *phase = next;
        env.emit(AppEvent::Build(BuildEvent::PhaseChanged {
            package: package.to_string(),
            phase: next,
        }));
        Ok(())
    }
}
