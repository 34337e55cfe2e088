//! Recipe parsing and validation error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum RecipeError {
    #[error("recipe file not found: {path}")]
    NotFound { path: String },

    #[error("recipe parse error: {message}")]
    ParseError { message: String },

    #[error("missing required field: {field}")]
    MissingField { field: String },

    #[error("invalid value for {field}: {value}")]
    InvalidValue { field: String, value: String },

    #[error("recipe declares both a pinned archive and a rolling source; exactly one is allowed")]
    AmbiguousSource,

    #[error("recipe declares no source")]
    MissingSource,
}

impl UserFacingError for RecipeError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => Some("Check the recipe path passed on the command line."),
            Self::ParseError { .. } => Some("Fix the YAML syntax error noted in the message."),
            Self::MissingField { .. } | Self::InvalidValue { .. } => {
                Some("Fix the recipe field noted in the error message.")
            }
            Self::AmbiguousSource => {
                Some("Keep either the pinned archive (version + sha256) or the rolling git source, not both.")
            }
            Self::MissingSource => {
                Some("Add a source section with either a pinned archive or a git url + ref.")
            }
        }
    }

    fn is_retryable(&self) -> bool {
        false
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "recipe.not_found",
            Self::ParseError { .. } => "recipe.parse_error",
            Self::MissingField { .. } => "recipe.missing_field",
            Self::InvalidValue { .. } => "recipe.invalid_value",
            Self::AmbiguousSource => "recipe.ambiguous_source",
            Self::MissingSource => "recipe.missing_source",
        };
        Some(code)
    }
}
