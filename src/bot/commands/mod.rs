//! Built-in rich commands shipped with the bot binary.

/// General utility commands
pub mod general;

pub use general::{EchoCommand, HelpCommand};

use crate::core::registry::Command;
use std::sync::Arc;

/// All built-in commands, ready to register.
#[must_use]
pub fn builtin_commands() -> Vec<Arc<dyn Command>> {
    vec![Arc::new(HelpCommand::new()), Arc::new(EchoCommand::new())]
}
