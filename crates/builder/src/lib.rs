#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Recipe execution for tinybrew
//!
//! This crate owns the whole build pipeline for a single recipe: source
//! fetch, version resolution, Go toolchain invocation with the version
//! injected at link time, and the post-build smoke test. Execution is
//! strictly sequential; the verification step consumes the artifact the
//! build step produced, and any failure halts the pipeline immediately.

mod environment;
mod go;
mod pipeline;
mod source;
mod verify;
mod version;

pub use environment::{BuildEnvironment, CommandResult};
pub use go::GoToolchain;
pub use pipeline::{BuildOptions, Builder};
pub use verify::run_smoke_test;
pub use version::resolve_version;
