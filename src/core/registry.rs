//! Command registry - rich commands with handler logic and static simple commands.
//!
//! The registry is filled during the setup phase through
//! [`MuxBuilder`](crate::core::dispatcher::MuxBuilder) and frozen behind an `Arc`
//! once the multiplexer starts serving. Names are case-folded on insertion so
//! they line up with the case-insensitive lookup done during dispatch.

use crate::{
    core::{context::Context, permissions::CommandPermissions},
    errors::Result,
};
use async_trait::async_trait;
use serde::Deserialize;
use std::{collections::HashMap, sync::Arc};
use tracing::{debug, warn};

/// Settings the multiplexer needs to know about a rich command.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CommandSettings {
    /// Name the command is invoked by
    pub command: String,
    /// One-line description shown by help listings
    pub help_text: String,
}

impl CommandSettings {
    /// Creates settings for a command name and help text.
    #[must_use]
    pub fn new(command: impl Into<String>, help_text: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            help_text: help_text.into(),
        }
    }
}

/// What a command sees while being initialized.
#[derive(Debug, Clone, Copy)]
pub struct Setup<'a> {
    /// Prefix the multiplexer listens for
    pub prefix: char,
    /// Commands registered so far
    pub registry: &'a Registry,
}

/// A command backed by executable handler logic.
///
/// Handlers run on their own tokio task, possibly concurrently with other
/// invocations of the same command, so any state shared across invocations
/// needs its own synchronization.
#[async_trait]
pub trait Command: Send + Sync {
    /// Called once during the initialization phase, before any dispatch.
    fn init(&self, _setup: &Setup<'_>) -> Result<()> {
        Ok(())
    }

    /// Runs the command. Errors are logged by the dispatching task.
    async fn handle(&self, ctx: Context) -> Result<()>;

    /// Explains the command in the invoking channel. Returns whether any help
    /// was shown.
    async fn handle_help(&self, ctx: &Context) -> Result<bool> {
        let help_text = &self.settings().help_text;
        if help_text.is_empty() {
            return Ok(false);
        }
        crate::channel_sendf!(ctx, "`{}{}` - {help_text}", ctx.prefix, self.settings().command)
            .await?;
        Ok(true)
    }

    /// Name and help text.
    fn settings(&self) -> &CommandSettings;

    /// Who may invoke the command. Public unless overridden.
    fn permissions(&self) -> &CommandPermissions {
        &crate::core::permissions::PUBLIC
    }
}

/// A logic-less command that always replies with the same text. Simple
/// commands carry no permissions and are never initialized.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SimpleCommand {
    /// Name the command is invoked by
    pub command: String,
    /// Reply sent to the invoking channel
    pub content: String,
    /// One-line description shown by help listings
    #[serde(default)]
    pub help_text: String,
}

impl SimpleCommand {
    /// Creates a simple command.
    #[must_use]
    pub fn new(
        command: impl Into<String>,
        content: impl Into<String>,
        help_text: impl Into<String>,
    ) -> Self {
        Self {
            command: command.into(),
            content: content.into(),
            help_text: help_text.into(),
        }
    }
}

/// Rich and simple commands keyed by their case-folded name.
#[derive(Default, Clone)]
pub struct Registry {
    commands: HashMap<String, Arc<dyn Command>>,
    simple_commands: HashMap<String, SimpleCommand>,
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("commands", &self.names())
            .field("simple_commands", &self.simple_names())
            .finish()
    }
}

impl Registry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts rich commands, overwriting any earlier command with the same
    /// name. Commands with an empty name are skipped.
    pub fn register<I>(&mut self, commands: I)
    where
        I: IntoIterator<Item = Arc<dyn Command>>,
    {
        for command in commands {
            let name = command.settings().command.to_lowercase();
            if name.is_empty() {
                debug!("Skipping rich command with an empty name");
                continue;
            }
            if self.simple_commands.contains_key(&name) {
                warn!("Rich command `{}` is shadowed by a simple command", name);
            }
            debug!("Registered rich command `{}`", name);
            self.commands.insert(name, command);
        }
    }

    /// Inserts simple commands, overwriting any earlier simple command with the
    /// same name. Commands with an empty name are skipped.
    pub fn register_simple<I>(&mut self, simple_commands: I)
    where
        I: IntoIterator<Item = SimpleCommand>,
    {
        for mut simple in simple_commands {
            let name = simple.command.to_lowercase();
            if name.is_empty() {
                debug!("Skipping simple command with an empty name");
                continue;
            }
            if self.commands.contains_key(&name) {
                warn!("Simple command `{}` shadows a rich command", name);
            }
            debug!("Registered simple command `{}`", name);
            simple.command.clone_from(&name);
            self.simple_commands.insert(name, simple);
        }
    }

    /// Looks up a rich command by its case-folded name.
    #[must_use]
    pub fn command(&self, name: &str) -> Option<&Arc<dyn Command>> {
        self.commands.get(name)
    }

    /// Looks up a simple command by its case-folded name.
    #[must_use]
    pub fn simple(&self, name: &str) -> Option<&SimpleCommand> {
        self.simple_commands.get(name)
    }

    /// Iterates over all rich commands in no particular order.
    pub fn commands(&self) -> impl Iterator<Item = &Arc<dyn Command>> {
        self.commands.values()
    }

    /// Iterates over all simple commands in no particular order.
    pub fn simple_commands(&self) -> impl Iterator<Item = &SimpleCommand> {
        self.simple_commands.values()
    }

    /// Sorted rich command names.
    #[must_use]
    pub fn names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Sorted simple command names.
    #[must_use]
    pub fn simple_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.simple_commands.keys().cloned().collect();
        names.sort();
        names
    }

    /// Number of rich commands.
    #[must_use]
    pub fn len(&self) -> usize {
        self.commands.len()
    }

    /// Returns `true` when neither table holds a command.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.commands.is_empty() && self.simple_commands.is_empty()
    }
}
