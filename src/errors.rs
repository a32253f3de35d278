//! Unified error types and result handling.
//!
//! Only [`Error::InvalidPrefix`] is fatal to the multiplexer itself; every other
//! failure during dispatch is turned into a reply in the originating channel.

use crate::core::client::ClientError;
use thiserror::Error;

/// Errors produced by the multiplexer, its configuration, and command handlers.
#[derive(Debug, Error)]
pub enum Error {
    /// The command prefix was not exactly one character long.
    #[error("Prefix `{prefix}` must be exactly one character")]
    InvalidPrefix {
        /// The rejected prefix
        prefix: String,
    },

    /// Configuration file could not be read or parsed.
    #[error("Configuration error: {message}")]
    Config {
        /// Human-readable description
        message: String,
    },

    /// The chat platform collaborator failed.
    #[error("Chat client error: {0}")]
    Client(#[from] ClientError),

    /// A command handler failed while executing.
    #[error("Command execution error: {message}")]
    Command {
        /// Human-readable description
        message: String,
    },

    /// A required environment variable was missing or invalid.
    #[error("Environment variable error: {0}")]
    EnvVar(#[from] std::env::VarError),

    /// Serenity framework failure.
    #[error("Serenity framework error: {0}")]
    #[allow(clippy::enum_variant_names)]
    FrameworkError(Box<poise::serenity_prelude::Error>),
}

impl From<poise::serenity_prelude::Error> for Error {
    fn from(value: poise::serenity_prelude::Error) -> Self {
        Self::FrameworkError(Box::new(value))
    }
}

/// Convenience `Result` type
pub type Result<T> = std::result::Result<T, Error>;
