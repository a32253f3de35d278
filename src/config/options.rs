//! Message filters and user-facing error texts.

use serde::Deserialize;

/// Filters applied to every inbound message before it is tokenized. All of
/// them default to `true`. Messages from the bot's own account are ignored
/// regardless of these settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
#[allow(clippy::struct_excessive_bools)] // One switch per filter
pub struct Options {
    /// Ignore messages authored by bot accounts
    pub ignore_bots: bool,
    /// Ignore messages sent outside of a guild
    pub ignore_dms: bool,
    /// Ignore messages without content
    pub ignore_empty: bool,
    /// Ignore system notices and anything else that isn't a regular message
    pub ignore_non_default: bool,
}

impl Default for Options {
    fn default() -> Self {
        Self {
            ignore_bots: true,
            ignore_dms: true,
            ignore_empty: true,
            ignore_non_default: true,
        }
    }
}

/// Replies sent when a dispatch ends without running a handler.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ErrorTexts {
    /// Sent when no command matches
    pub command_not_found: String,
    /// Sent when the actor fails the permission check
    pub no_permissions: String,
    /// Sent when the platform could not tell us the actor's roles
    pub platform_error: String,
}

impl Default for ErrorTexts {
    fn default() -> Self {
        Self {
            command_not_found: "Command not found.".to_string(),
            no_permissions: "You do not have permission to use that command.".to_string(),
            platform_error: "Something went wrong while checking your permissions. Please let the bot operator know.".to_string(),
        }
    }
}
