//! tinybrew - minimal recipe runner
//!
//! Fetches a package's source, builds its single Go binary with the
//! version injected at link time, and smoke-tests the result.

mod cli;
mod display;
mod error;
mod events;
mod logging;

use crate::cli::{Cli, Commands};
use crate::display::{OperationResult, OutputRenderer, RecipeSummary};
use crate::error::CliError;
use crate::events::EventHandler;
use crate::logging::init_tracing;
use clap::Parser;
use tinybrew_builder::{run_smoke_test, BuildOptions, Builder};
use tinybrew_config::Config;
use tinybrew_events::{EventReceiver, EventSender};
use tinybrew_recipe::{parse_recipe, SourceMethod};
use tinybrew_types::{ColorChoice, OutputFormat};
use std::process;
use tokio::select;
use tracing::{error, info};

#[tokio::main]
async fn main() {
    // Parse command line arguments first to check for JSON mode
    let cli = Cli::parse();
    let json_mode = cli.global.json;

    init_tracing(json_mode, cli.global.debug);

    if let Err(e) = run(cli).await {
        error!("Application error: {}", e);
        if !json_mode {
            eprintln!("Error: {e}");
        }
        process::exit(1);
    }
}

/// Main application logic
async fn run(cli: Cli) -> Result<(), CliError> {
    info!("Starting tinybrew v{}", env!("CARGO_PKG_VERSION"));

    // Load configuration with proper precedence:
    // 1. Start with file config (or defaults)
    let mut config = Config::load_or_default(&cli.global.config).await?;

    // 2. Merge environment variables
    config.merge_env()?;

    // 3. Apply CLI flags (highest precedence)
    apply_cli_config(&mut config, &cli.global, &cli.command);

    let output_format = resolve_output_format(cli.global.json, &config);
    let json_mode = output_format == OutputFormat::Json;

    let color_choice = cli.global.color.unwrap_or(config.general.color);
    // Plain and JSON output are never styled, whatever the color choice
    let colors_enabled = output_format == OutputFormat::Tty
        && match color_choice {
            ColorChoice::Always => true,
            ColorChoice::Never => false,
            ColorChoice::Auto => console::Term::stdout().features().colors_supported(),
        };

    let (event_sender, event_receiver) = tinybrew_events::channel();
    let mut event_handler = EventHandler::new(colors_enabled && !json_mode, cli.global.debug);
    let renderer = OutputRenderer::new(json_mode, colors_enabled);

    let result = execute_command_with_events(
        cli.command,
        config,
        event_sender,
        event_receiver,
        &mut event_handler,
    )
    .await?;

    renderer.render_result(&result)?;

    info!("Command completed successfully");
    Ok(())
}

/// Execute command with concurrent event handling
async fn execute_command_with_events(
    command: Commands,
    config: Config,
    event_sender: EventSender,
    mut event_receiver: EventReceiver,
    event_handler: &mut EventHandler,
) -> Result<OperationResult, CliError> {
    let mut command_future = Box::pin(execute_command(command, config, event_sender));

    // Handle events concurrently with command execution
    loop {
        select! {
            // Command completed
            result = &mut command_future => {
                // Drain any remaining events
                while let Ok(event) = event_receiver.try_recv() {
                    event_handler.handle_event(event);
                }
                return result;
            }

            // Event received
            event = event_receiver.recv() => {
                match event {
                    Some(event) => event_handler.handle_event(event),
                    None => { /* Channel closed: keep waiting for command to finish */ }
                }
            }
        }
    }
}

/// Execute the specified command
async fn execute_command(
    command: Commands,
    mut config: Config,
    event_sender: EventSender,
) -> Result<OperationResult, CliError> {
    match command {
        Commands::Build {
            recipe,
            build_version,
            prefix,
            skip_verify,
        } => {
            if let Some(prefix) = prefix {
                config.paths.prefix_path = Some(prefix);
            }
            let recipe = parse_recipe(&recipe).await?;
            let builder = Builder::new(config).with_events(event_sender);
            let options = BuildOptions {
                build_version,
                skip_verify,
            };
            let report = builder.build(&recipe, &options).await?;
            Ok(OperationResult::Build(report))
        }

        Commands::Validate { recipe } => {
            let recipe = parse_recipe(&recipe).await?;
            let source = match recipe.source.method().map_err(tinybrew_errors::Error::from)? {
                SourceMethod::Git(git) => format!("git {} @ {}", git.url, git.git_ref),
                SourceMethod::Archive(archive) => format!("archive {}", archive.url),
                SourceMethod::Local(local) => format!("local {}", local.path.display()),
            };
            Ok(OperationResult::RecipeValid(RecipeSummary {
                name: recipe.metadata.name.clone(),
                description: recipe.metadata.description.clone(),
                license: recipe.metadata.license.clone(),
                source,
                pinned_version: recipe.source.archive.as_ref().map(|a| a.version.clone()),
                entrypoint: recipe.build.go.entrypoint.clone(),
            }))
        }

        Commands::Verify {
            binary,
            expect,
            args,
        } => {
            if expect.trim().is_empty() {
                return Err(CliError::InvalidArguments(
                    "--expect must not be empty".to_string(),
                ));
            }
            let args = if args.is_empty() {
                vec!["version".to_string()]
            } else {
                args
            };
            let package = binary
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "binary".to_string());
            let output = run_smoke_test(&binary, &args, &expect, &event_sender, &package).await?;
            Ok(OperationResult::Verify(tinybrew_types::VerifyReport {
                binary_path: binary,
                expected: expect,
                output,
            }))
        }
    }
}

/// Apply CLI configuration overrides (highest precedence)
fn apply_cli_config(config: &mut Config, global: &cli::GlobalArgs, _command: &Commands) {
    if let Some(color) = &global.color {
        config.general.color = *color;
    }
}

/// The `--json` flag wins; otherwise the configured default applies.
fn resolve_output_format(json_flag: bool, config: &Config) -> OutputFormat {
    if json_flag {
        OutputFormat::Json
    } else {
        config.general.default_output
    }
}
