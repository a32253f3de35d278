//! Multiplexer configuration loading from config.toml
//!
//! The file picks the prefix, tunes the filters and error texts, and can
//! declare simple commands so static replies don't need any code.

use crate::{
    config::{ErrorTexts, Options},
    core::{dispatcher::MuxBuilder, registry::SimpleCommand},
    errors::{Error, Result},
};
use serde::Deserialize;
use std::path::Path;

/// Environment variable naming the config file used by [`load_default_config`].
pub const CONFIG_PATH_VAR: &str = "COMMAND_MUX_CONFIG";

/// Config file used when [`CONFIG_PATH_VAR`] is unset.
pub const DEFAULT_CONFIG_PATH: &str = "config.toml";

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct MuxConfig {
    /// Single-character command prefix
    pub prefix: String,
    /// Whether unknown commands get fuzzy suggestions
    pub fuzzy: bool,
    /// Message filters
    pub options: Options,
    /// User-facing error texts
    pub errors: ErrorTexts,
    /// Static replies
    pub simple_commands: Vec<SimpleCommand>,
}

impl Default for MuxConfig {
    fn default() -> Self {
        Self {
            prefix: "!".to_string(),
            fuzzy: false,
            options: Options::default(),
            errors: ErrorTexts::default(),
            simple_commands: Vec::new(),
        }
    }
}

impl MuxConfig {
    /// Starts a setup-phase multiplexer from this configuration.
    ///
    /// Fuzzy matching is left to the caller: it snapshots the registered
    /// commands, so it has to be enabled after they are registered.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPrefix`] if the configured prefix is not a
    /// single character.
    pub fn into_builder(self) -> Result<MuxBuilder> {
        Ok(MuxBuilder::new(&self.prefix)?
            .options(self.options)
            .set_errors(self.errors)
            .register_simple(self.simple_commands))
    }
}

/// Loads multiplexer configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<MuxConfig> {
    let path = path.as_ref();
    tracing::debug!("Attempting to load configuration from: {:?}", path);
    let contents = std::fs::read_to_string(path).map_err(|e| Error::Config {
        message: format!("Failed to read config file {}: {e}", path.display()),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse {}: {e}", path.display()),
    })
}

/// Loads configuration from `$COMMAND_MUX_CONFIG`, or `./config.toml`.
///
/// A missing file is not an error: the defaults are used instead.
///
/// # Errors
/// Returns an error if the file exists but cannot be read or parsed.
pub fn load_default_config() -> Result<MuxConfig> {
    let path =
        std::env::var(CONFIG_PATH_VAR).unwrap_or_else(|_| DEFAULT_CONFIG_PATH.to_string());
    if !Path::new(&path).exists() {
        tracing::info!("No config file at {}, using defaults", path);
        return Ok(MuxConfig::default());
    }
    load_config(path)
}
