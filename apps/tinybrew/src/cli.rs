//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tinybrew_types::ColorChoice;

/// tinybrew - fetch, build, and smoke-test one CLI binary from a recipe
#[derive(Parser)]
#[command(name = "tinybrew")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Minimal recipe runner for single-binary packages")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Color output control
    #[arg(long, global = true, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Build a package from a recipe and smoke-test the result
    #[command(alias = "b")]
    Build {
        /// Path to recipe file (.yaml)
        recipe: PathBuf,

        /// Version to embed and verify (release builds); overrides the
        /// recipe's pinned version and the rolling pseudo-version
        #[arg(long, value_name = "VERSION")]
        build_version: Option<String>,

        /// Install prefix; the binary lands in <PREFIX>/bin
        #[arg(long, value_name = "DIR")]
        prefix: Option<PathBuf>,

        /// Skip the post-build smoke test
        #[arg(long)]
        skip_verify: bool,
    },

    /// Parse a recipe and check its invariants without building
    Validate {
        /// Path to recipe file (.yaml)
        recipe: PathBuf,
    },

    /// Run the smoke test against an existing binary
    Verify {
        /// Path to the binary to test
        binary: PathBuf,

        /// Version string expected in the binary's output
        #[arg(long, value_name = "VERSION")]
        expect: String,

        /// Arguments passed to the binary (default: "version")
        #[arg(long = "arg", value_name = "ARG")]
        args: Vec<String>,
    },
}
