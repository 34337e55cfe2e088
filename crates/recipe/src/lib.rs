#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Declarative YAML recipe format for tinybrew
//!
//! A recipe describes how to obtain, build, and minimally verify one
//! command-line program. Parsing happens once per invocation; the parsed
//! recipe is never mutated afterwards.

mod model;
mod parser;

pub use model::{
    ArchiveSource, BuildSpec, Dependencies, GitSource, GoBuild, LocalSource, Metadata, Recipe,
    SourceMethod, SourceSpec, Verify,
};
pub use parser::{parse_recipe, parse_recipe_from_string};
