#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Configuration management for tinybrew
//!
//! This crate handles loading and merging configuration from:
//! - Default values (hard-coded)
//! - Configuration file (~/.config/tinybrew/config.toml)
//! - Environment variables (`TINYBREW_*`)
//! - CLI flags (applied by the CLI, highest precedence)

use serde::{Deserialize, Serialize};
use tinybrew_errors::{ConfigError, Error};
use tinybrew_types::{ColorChoice, OutputFormat};
use std::path::{Path, PathBuf};
use tokio::fs;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,

    #[serde(default)]
    pub build: BuildConfig,

    #[serde(default)]
    pub paths: PathConfig,
}

/// General configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default = "default_output_format")]
    pub default_output: OutputFormat,
    #[serde(default = "default_color_choice")]
    pub color: ColorChoice,
}

/// Build configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuildConfig {
    /// Allow network access during source fetch
    #[serde(default = "default_network_access")]
    pub network_access: bool,
    /// Keep the scratch work directory after the build for inspection
    #[serde(default)]
    pub keep_work_dir: bool,
}

/// Path configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Scratch space for source checkouts (default: a temp directory)
    pub work_path: Option<PathBuf>,
    /// Install prefix; binaries land in `<prefix>/bin` (default: ~/.local)
    pub prefix_path: Option<PathBuf>,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            default_output: OutputFormat::Tty,
            color: ColorChoice::Auto,
        }
    }
}

impl Default for BuildConfig {
    fn default() -> Self {
        Self {
            network_access: true,
            keep_work_dir: false,
        }
    }
}

// Default value functions for serde

fn default_output_format() -> OutputFormat {
    OutputFormat::Tty
}

fn default_color_choice() -> ColorChoice {
    ColorChoice::Auto
}

fn default_network_access() -> bool {
    true
}

impl Config {
    /// Get the default config file path
    ///
    /// # Errors
    ///
    /// Returns an error if the system config directory cannot be determined.
    pub fn default_path() -> Result<PathBuf, Error> {
        let config_dir = dirs::config_dir().ok_or_else(|| ConfigError::NotFound {
            path: "config directory".to_string(),
        })?;
        Ok(config_dir.join("tinybrew").join("config.toml"))
    }

    /// Load configuration from file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or contains invalid TOML.
    pub async fn load_from_file(path: &Path) -> Result<Self, Error> {
        let contents = fs::read_to_string(path)
            .await
            .map_err(|_| ConfigError::NotFound {
                path: path.display().to_string(),
            })?;

        toml::from_str(&contents)
            .map_err(|e| ConfigError::ParseError {
                message: e.to_string(),
            })
            .map_err(Into::into)
    }

    /// Load configuration with fallback to defaults
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration file exists but cannot be read
    /// or contains invalid TOML syntax.
    pub async fn load() -> Result<Self, Error> {
        let config_path = Self::default_path()?;

        if config_path.exists() {
            Self::load_from_file(&config_path).await
        } else {
            Ok(Self::default())
        }
    }

    /// Load configuration from an optional path or use default
    ///
    /// # Errors
    ///
    /// Returns an error if the config file cannot be read or parsed
    pub async fn load_or_default(path: &Option<PathBuf>) -> Result<Self, Error> {
        match path {
            Some(config_path) => Self::load_from_file(config_path).await,
            None => Self::load().await,
        }
    }

    /// Merge with environment variables
    ///
    /// # Errors
    ///
    /// Returns an error if environment variables contain invalid values
    /// that cannot be parsed into the expected types.
    pub fn merge_env(&mut self) -> Result<(), Error> {
        // TINYBREW_OUTPUT
        if let Ok(output) = std::env::var("TINYBREW_OUTPUT") {
            self.general.default_output = match output.as_str() {
                "plain" => OutputFormat::Plain,
                "tty" => OutputFormat::Tty,
                "json" => OutputFormat::Json,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TINYBREW_OUTPUT".to_string(),
                        value: output,
                    }
                    .into())
                }
            };
        }

        // TINYBREW_COLOR
        if let Ok(color) = std::env::var("TINYBREW_COLOR") {
            self.general.color = match color.as_str() {
                "always" => ColorChoice::Always,
                "auto" => ColorChoice::Auto,
                "never" => ColorChoice::Never,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TINYBREW_COLOR".to_string(),
                        value: color,
                    }
                    .into())
                }
            };
        }

        // TINYBREW_PREFIX
        if let Ok(prefix) = std::env::var("TINYBREW_PREFIX") {
            self.paths.prefix_path = Some(PathBuf::from(prefix));
        }

        // TINYBREW_WORK_DIR
        if let Ok(work) = std::env::var("TINYBREW_WORK_DIR") {
            self.paths.work_path = Some(PathBuf::from(work));
        }

        // TINYBREW_NETWORK_ACCESS
        if let Ok(network) = std::env::var("TINYBREW_NETWORK_ACCESS") {
            self.build.network_access = match network.as_str() {
                "true" | "1" | "yes" => true,
                "false" | "0" | "no" => false,
                _ => {
                    return Err(ConfigError::InvalidValue {
                        field: "TINYBREW_NETWORK_ACCESS".to_string(),
                        value: network,
                    }
                    .into())
                }
            };
        }

        Ok(())
    }

    /// Get the install prefix (with default)
    #[must_use]
    pub fn prefix_path(&self) -> PathBuf {
        self.paths.prefix_path.clone().unwrap_or_else(|| {
            dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".local")
        })
    }

    /// Get the work path, when one is pinned in configuration
    #[must_use]
    pub fn work_path(&self) -> Option<PathBuf> {
        self.paths.work_path.clone()
    }
}
