//! General commands - help and echo.
//! These commands don't need any state beyond the registry and provide basic
//! bot functionality and user assistance.

use crate::{
    channel_sendf,
    core::{
        context::Context,
        registry::{Command, CommandSettings, Registry, Setup},
    },
    errors::Result,
};
use async_trait::async_trait;
use std::{fmt::Write, sync::OnceLock};

/// Lists every command, or shows help for one command.
///
/// `help` with no arguments lists all commands with their help text.
/// `help <command>` delegates to that command's own help.
pub struct HelpCommand {
    settings: CommandSettings,
    listing: OnceLock<String>,
}

impl HelpCommand {
    /// Creates the help command.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: CommandSettings::new("help", "Lists commands, or explains one command"),
            listing: OnceLock::new(),
        }
    }
}

impl Default for HelpCommand {
    fn default() -> Self {
        Self::new()
    }
}

/// Renders every command with its help text, simple commands first.
fn render_listing(prefix: char, registry: &Registry) -> String {
    let mut listing = String::from("**Commands**\n");

    for name in registry.simple_names() {
        let help_text = registry
            .simple(&name)
            .map(|simple| simple.help_text.as_str())
            .unwrap_or_default();
        let _ = writeln!(listing, "• `{prefix}{name}` {help_text}");
    }

    for name in registry.names() {
        let help_text = registry
            .command(&name)
            .map(|command| command.settings().help_text.as_str())
            .unwrap_or_default();
        let _ = writeln!(listing, "• `{prefix}{name}` {help_text}");
    }

    listing
}

#[async_trait]
impl Command for HelpCommand {
    fn init(&self, setup: &Setup<'_>) -> Result<()> {
        // Registration is over by the time commands are initialized.
        let _ = self
            .listing
            .set(render_listing(setup.prefix, setup.registry));
        Ok(())
    }

    async fn handle(&self, ctx: Context) -> Result<()> {
        let Some(topic) = ctx.arguments.iter().find(|argument| !argument.is_empty()) else {
            let listing = match self.listing.get() {
                Some(listing) => listing.clone(),
                None => render_listing(ctx.prefix, &ctx.registry),
            };
            ctx.channel_send(&listing).await?;
            return Ok(());
        };

        let topic = topic.to_lowercase();
        if let Some(simple) = ctx.registry.simple(&topic) {
            channel_sendf!(ctx, "`{}{}` {}", ctx.prefix, simple.command, simple.help_text).await?;
            return Ok(());
        }

        if let Some(command) = ctx.registry.command(&topic).cloned() {
            if !command.handle_help(&ctx).await? {
                channel_sendf!(ctx, "`{}{topic}` has no help text.", ctx.prefix).await?;
            }
            return Ok(());
        }

        channel_sendf!(ctx, "There is no `{}{topic}` command.", ctx.prefix).await?;
        Ok(())
    }

    fn settings(&self) -> &CommandSettings {
        &self.settings
    }
}

/// Repeats its arguments back into the channel.
pub struct EchoCommand {
    settings: CommandSettings,
}

impl EchoCommand {
    /// Creates the echo command.
    #[must_use]
    pub fn new() -> Self {
        Self {
            settings: CommandSettings::new("echo", "Repeats what you say"),
        }
    }
}

impl Default for EchoCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Command for EchoCommand {
    async fn handle(&self, ctx: Context) -> Result<()> {
        let text = ctx.rest();
        if text.trim().is_empty() {
            channel_sendf!(ctx, "Usage: `{}echo <text>`", ctx.prefix).await?;
        } else {
            ctx.channel_send(&text).await?;
        }
        Ok(())
    }

    fn settings(&self) -> &CommandSettings {
        &self.settings
    }
}
