//! YAML recipe parser with validation

use crate::model::{Recipe, SourceMethod};
use std::path::Path;
use tinybrew_errors::{Error, RecipeError};

/// Parse a recipe from a file
///
/// # Errors
///
/// Returns an error if:
/// - The file cannot be read
/// - The YAML is invalid
/// - Required fields are missing
/// - Validation fails
pub async fn parse_recipe(path: &Path) -> Result<Recipe, Error> {
    let content = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| RecipeError::NotFound {
            path: path.display().to_string(),
        })?;

    parse_recipe_from_string(&content)
}

/// Parse a recipe from a string
///
/// # Errors
///
/// Returns an error if the YAML is invalid or validation fails.
pub fn parse_recipe_from_string(content: &str) -> Result<Recipe, Error> {
    let recipe: Recipe = serde_yml::from_str(content).map_err(|e| RecipeError::ParseError {
        message: e.to_string(),
    })?;

    validate_recipe(&recipe)?;

    Ok(recipe)
}

/// Validate a parsed recipe
fn validate_recipe(recipe: &Recipe) -> Result<(), Error> {
    if recipe.metadata.name.is_empty() {
        return Err(RecipeError::MissingField {
            field: "metadata.name".to_string(),
        }
        .into());
    }

    if recipe.metadata.license.is_empty() {
        return Err(RecipeError::MissingField {
            field: "metadata.license".to_string(),
        }
        .into());
    }

    // Source invariant: exactly one of pinned archive / rolling ref
    let method = recipe.source.method()?;

    if let SourceMethod::Archive(archive) = &method {
        // The pinned version is an opaque upstream tag; only emptiness is
        // invalid since the string must round-trip through the smoke test
        if archive.version.trim().is_empty() {
            return Err(RecipeError::MissingField {
                field: "source.archive.version".to_string(),
            }
            .into());
        }
        if archive.sha256.len() != 64 || !archive.sha256.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(RecipeError::InvalidValue {
                field: "source.archive.sha256".to_string(),
                value: archive.sha256.clone(),
            }
            .into());
        }
    }

    if recipe.build.go.entrypoint.is_empty() {
        return Err(RecipeError::MissingField {
            field: "build.go.entrypoint".to_string(),
        }
        .into());
    }

    // The version symbol must be fully qualified (module path + identifier)
    if !recipe.build.go.version_symbol.contains('.') {
        return Err(RecipeError::InvalidValue {
            field: "build.go.version_symbol".to_string(),
            value: recipe.build.go.version_symbol.clone(),
        }
        .into());
    }

    if recipe.verify.args.is_empty() {
        return Err(RecipeError::MissingField {
            field: "verify.args".to_string(),
        }
        .into());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    const TINYCLAW_RECIPE: &str = r#"
metadata:
  name: tinyclaw
  description: Ultra-lightweight personal AI agent
  homepage: https://github.com/tinyland-inc/tinyclaw
  license: MIT
  dependencies:
    build: [go]
source:
  git:
    url: https://github.com/tinyland-inc/tinyclaw.git
    ref: main
build:
  go:
    entrypoint: ./cmd/tinyclaw
    tags: [stdjson]
    version_symbol: github.com/tinyland-inc/tinyclaw/cmd/tinyclaw/internal.version
verify:
  args: [version]
"#;

    #[test]
    fn test_parse_tinyclaw_recipe() {
        let recipe = parse_recipe_from_string(TINYCLAW_RECIPE).unwrap();
        assert_eq!(recipe.metadata.name, "tinyclaw");
        assert_eq!(recipe.metadata.license, "MIT");
        assert_eq!(recipe.metadata.dependencies.build, vec!["go"]);
        assert!(recipe.metadata.dependencies.runtime.is_empty());
        assert_eq!(recipe.build.go.entrypoint, "./cmd/tinyclaw");
        assert_eq!(recipe.build.go.tags, vec!["stdjson"]);
        assert_eq!(recipe.verify.args, vec!["version"]);
        assert!(!recipe.source.is_pinned());

        match recipe.source.method().unwrap() {
            crate::model::SourceMethod::Git(git) => {
                assert_eq!(git.git_ref, "main");
            }
            other => panic!("unexpected source method: {other:?}"),
        }
    }

    #[test]
    fn test_verify_defaults_when_section_absent() {
        let without_verify = TINYCLAW_RECIPE
            .split("verify:")
            .next()
            .expect("recipe prefix");
        let recipe = parse_recipe_from_string(without_verify).unwrap();
        assert_eq!(recipe.verify.args, vec!["version"]);
        assert!(recipe.verify.expect.is_none());
    }

    #[test]
    fn test_pinned_recipe() {
        let recipe = parse_recipe_from_string(
            r#"
metadata:
  name: tinyclaw
  description: Ultra-lightweight personal AI agent
  license: MIT
source:
  archive:
    url: https://github.com/tinyland-inc/tinyclaw/archive/v1.4.2.tar.gz
    sha256: 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
    version: 1.4.2
build:
  go:
    entrypoint: ./cmd/tinyclaw
    tags: [stdjson]
    version_symbol: github.com/tinyland-inc/tinyclaw/cmd/tinyclaw/internal.version
"#,
        )
        .unwrap();
        assert!(recipe.source.is_pinned());
    }

    #[test]
    fn test_both_sources_rejected() {
        let err = parse_recipe_from_string(
            r#"
metadata:
  name: tinyclaw
  description: agent
  license: MIT
source:
  git:
    url: https://example.com/tinyclaw.git
    ref: main
  archive:
    url: https://example.com/v1.4.2.tar.gz
    sha256: 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
    version: 1.4.2
build:
  go:
    entrypoint: ./cmd/tinyclaw
    version_symbol: example.com/tinyclaw/internal.version
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("exactly one"));
    }

    #[test]
    fn test_missing_source_rejected() {
        let err = parse_recipe_from_string(
            r#"
metadata:
  name: tinyclaw
  description: agent
  license: MIT
source: {}
build:
  go:
    entrypoint: ./cmd/tinyclaw
    version_symbol: example.com/tinyclaw/internal.version
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("no source"));
    }

    #[test]
    fn test_unqualified_version_symbol_rejected() {
        let err = parse_recipe_from_string(
            r#"
metadata:
  name: tinyclaw
  description: agent
  license: MIT
source:
  git:
    url: https://example.com/tinyclaw.git
    ref: main
build:
  go:
    entrypoint: ./cmd/tinyclaw
    version_symbol: version
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("version_symbol"));
    }

    #[test]
    fn test_tag_style_pinned_versions_accepted() {
        // Upstream tags are opaque; v-prefixed and calendar tags are valid
        for version in ["v1.4.2", "2024.01"] {
            let recipe = parse_recipe_from_string(&format!(
                r#"
metadata:
  name: tinyclaw
  description: agent
  license: MIT
source:
  archive:
    url: https://example.com/{version}.tar.gz
    sha256: 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
    version: "{version}"
build:
  go:
    entrypoint: ./cmd/tinyclaw
    version_symbol: example.com/tinyclaw/internal.version
"#
            ))
            .unwrap();
            assert!(recipe.source.is_pinned());
        }
    }

    #[test]
    fn test_blank_pinned_version_rejected() {
        let err = parse_recipe_from_string(
            r#"
metadata:
  name: tinyclaw
  description: agent
  license: MIT
source:
  archive:
    url: https://example.com/v1.tar.gz
    sha256: 9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08
    version: " "
build:
  go:
    entrypoint: ./cmd/tinyclaw
    version_symbol: example.com/tinyclaw/internal.version
"#,
        )
        .unwrap_err();
        assert!(err.to_string().contains("source.archive.version"));
    }

    #[tokio::test]
    async fn test_parse_missing_file() {
        let err = parse_recipe(Path::new("/nonexistent/recipe.yaml"))
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
