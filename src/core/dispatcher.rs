//! Dispatcher - filters, resolves and schedules commands for inbound messages.
//!
//! Setup happens on a [`MuxBuilder`]: register commands, add middleware, tune
//! options, initialize. [`MuxBuilder::build`] then freezes everything into a
//! [`Mux`] that only reads its registry. Per message, [`Mux::handle`] walks a
//! fixed pipeline and stops at the first terminal state:
//!
//! 1. filters (own messages, empty, non-default, bots, DMs, missing prefix)
//! 2. simple command lookup, replied to inline
//! 3. rich command lookup, falling back to fuzzy suggestions or "not found"
//! 4. middleware chain
//! 5. permission check, with a role lookup when the command has role grants
//! 6. handler spawned on its own task and never awaited

use crate::{
    config::{ErrorTexts, Options},
    core::{
        client::{ChatClient, InboundMessage, MessageKind},
        context::Context,
        fuzzy,
        middleware::MiddlewareChain,
        permissions::{self, Decision},
        registry::{Command, Registry, Setup, SimpleCommand},
    },
    errors::{Error, Result},
};
use std::{fmt::Write, sync::Arc};
use tracing::{debug, error, info, warn};

/// Why an inbound message was dropped without any reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DropReason {
    /// Authored by the account the client is logged in as
    OwnMessage,
    /// No content
    Empty,
    /// Not a regular user message
    NonDefault,
    /// Authored by another bot
    Bot,
    /// Sent outside of a guild
    DirectMessage,
    /// Does not start with the prefix
    NoPrefix,
}

/// Terminal state reached while dispatching one message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Filtered out before tokenization
    Dropped(DropReason),
    /// A simple command replied with its static content
    SimpleReply {
        /// Resolved command name
        command: String,
    },
    /// No command matched and nothing similar was found
    NotFound {
        /// The unresolved name
        command: String,
    },
    /// No command matched; similar names were suggested
    Suggested {
        /// The unresolved name
        command: String,
        /// Suggested names, most similar first
        suggestions: Vec<String>,
    },
    /// The actor's roles could not be looked up
    PlatformError {
        /// Resolved command name
        command: String,
    },
    /// The actor is not allowed to run the command
    Denied {
        /// Resolved command name
        command: String,
    },
    /// The handler was spawned
    Dispatched {
        /// Resolved command name
        command: String,
    },
}

/// Setup-phase multiplexer. All mutation happens here.
pub struct MuxBuilder {
    prefix: char,
    registry: Registry,
    middleware: MiddlewareChain,
    options: Options,
    error_texts: ErrorTexts,
    fuzzy_names: Option<Vec<String>>,
}

impl std::fmt::Debug for MuxBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MuxBuilder")
            .field("prefix", &self.prefix)
            .field("registry", &self.registry)
            .field("middleware", &self.middleware)
            .field("options", &self.options)
            .field("fuzzy", &self.fuzzy_names.is_some())
            .finish_non_exhaustive()
    }
}

impl MuxBuilder {
    /// Starts a new multiplexer listening for `prefix`.
    ///
    /// # Errors
    /// Returns [`Error::InvalidPrefix`] unless `prefix` is exactly one character.
    pub fn new(prefix: &str) -> Result<Self> {
        let mut chars = prefix.chars();
        let (Some(prefix_char), None) = (chars.next(), chars.next()) else {
            return Err(Error::InvalidPrefix {
                prefix: prefix.to_string(),
            });
        };

        Ok(Self {
            prefix: prefix_char,
            registry: Registry::new(),
            middleware: MiddlewareChain::default(),
            options: Options::default(),
            error_texts: ErrorTexts::default(),
            fuzzy_names: None,
        })
    }

    /// Replaces the message filters.
    #[must_use]
    pub fn options(mut self, options: Options) -> Self {
        self.options = options;
        self
    }

    /// Replaces the user-facing error texts.
    #[must_use]
    pub fn set_errors(mut self, error_texts: ErrorTexts) -> Self {
        self.error_texts = error_texts;
        self
    }

    /// Appends a middleware to the chain.
    #[must_use]
    pub fn use_middleware<F>(mut self, middleware: F) -> Self
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.middleware.push(middleware);
        self
    }

    /// Registers rich commands. See [`Registry::register`].
    #[must_use]
    pub fn register<I>(mut self, commands: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn Command>>,
    {
        self.registry.register(commands);
        self
    }

    /// Registers simple commands. See [`Registry::register_simple`].
    #[must_use]
    pub fn register_simple<I>(mut self, simple_commands: I) -> Self
    where
        I: IntoIterator<Item = SimpleCommand>,
    {
        self.registry.register_simple(simple_commands);
        self
    }

    /// Turns on fuzzy suggestions for unknown command names.
    ///
    /// The candidate list is a snapshot of the rich commands registered at this
    /// point; commands registered afterwards are never suggested. Every
    /// unresolved dispatch pays for a similarity scan over the snapshot.
    #[must_use]
    pub fn enable_fuzzy(mut self) -> Self {
        let names = self.registry.names();
        info!("Fuzzy matching enabled over {} commands", names.len());
        self.fuzzy_names = Some(names);
        self
    }

    /// Calls `init` on commands before serving.
    ///
    /// With an empty `only`, every registered rich command is initialized.
    /// Otherwise only the given commands are, whether or not they are
    /// registered. Simple commands are never initialized. Calling this twice
    /// runs the hooks twice.
    ///
    /// # Errors
    /// Returns the first error raised by an `init` hook.
    pub fn initialize(&self, only: &[Arc<dyn Command>]) -> Result<()> {
        if only.is_empty() && self.registry.len() == 0 {
            debug!("No commands to initialize");
            return Ok(());
        }

        let setup = Setup {
            prefix: self.prefix,
            registry: &self.registry,
        };

        if only.is_empty() {
            for command in self.registry.commands() {
                command.init(&setup)?;
            }
            info!("Initialized {} registered commands", self.registry.len());
        } else {
            for command in only {
                command.init(&setup)?;
            }
            info!("Initialized {} explicitly listed commands", only.len());
        }
        Ok(())
    }

    /// Ends the setup phase.
    #[must_use]
    pub fn build(self) -> Mux {
        info!(
            "Serving {} rich and {} simple commands with prefix `{}`",
            self.registry.len(),
            self.registry.simple_names().len(),
            self.prefix
        );
        Mux {
            prefix: self.prefix,
            registry: Arc::new(self.registry),
            middleware: self.middleware,
            options: self.options,
            error_texts: self.error_texts,
            fuzzy_names: self.fuzzy_names,
        }
    }
}

/// Serving-phase multiplexer. Read-only; share it behind an `Arc`.
pub struct Mux {
    prefix: char,
    registry: Arc<Registry>,
    middleware: MiddlewareChain,
    options: Options,
    error_texts: ErrorTexts,
    fuzzy_names: Option<Vec<String>>,
}

impl std::fmt::Debug for Mux {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mux")
            .field("prefix", &self.prefix)
            .field("registry", &self.registry)
            .field("options", &self.options)
            .field("fuzzy", &self.fuzzy_names.is_some())
            .finish_non_exhaustive()
    }
}

impl Mux {
    /// Prefix commands must start with.
    #[must_use]
    pub const fn prefix(&self) -> char {
        self.prefix
    }

    /// Registered commands.
    #[must_use]
    pub const fn registry(&self) -> &Arc<Registry> {
        &self.registry
    }

    /// Whether fuzzy suggestions are enabled.
    #[must_use]
    pub const fn fuzzy_enabled(&self) -> bool {
        self.fuzzy_names.is_some()
    }

    /// Handles one inbound message. Wire this to the chat client's
    /// message-received event.
    ///
    /// Everything up to and including the permission check runs on the calling
    /// task. The command handler itself is spawned and not awaited, so this
    /// returns before the handler completes and handler side effects may land
    /// in any order. User-facing failures become replies; nothing is returned
    /// as an error.
    pub async fn handle(&self, client: Arc<dyn ChatClient>, message: &InboundMessage) -> Outcome {
        if let Some(reason) = self.drop_reason(client.current_user_id(), message) {
            debug!(message_id = %message.id, ?reason, "Dropping message");
            return Outcome::Dropped(reason);
        }

        let mut words = message.content.split(' ');
        let first = words.next().unwrap_or_default();
        let command: String = first.chars().skip(1).collect::<String>().to_lowercase();
        let arguments: Vec<String> = words.map(str::to_string).collect();

        if let Some(simple) = self.registry.simple(&command) {
            debug!("Replying to simple command `{}`", command);
            self.reply(client.as_ref(), message, &simple.content).await;
            return Outcome::SimpleReply { command };
        }

        let Some(handler) = self.registry.command(&command).cloned() else {
            return self.unresolved(client.as_ref(), message, command).await;
        };

        let mut ctx = Context {
            prefix: self.prefix,
            command,
            arguments,
            message: message.clone(),
            client,
            registry: Arc::clone(&self.registry),
        };

        self.middleware.run(&mut ctx);

        let permissions = handler.permissions();
        if !permissions.is_public() {
            let roles = if permissions.needs_roles() {
                match self.lookup_roles(&ctx).await {
                    Ok(roles) => roles,
                    Err(e) => {
                        error!(
                            command = %ctx.command,
                            author = %ctx.message.author_id,
                            "Failed to look up member roles: {}",
                            e
                        );
                        let text = &self.error_texts.platform_error;
                        self.reply(ctx.client.as_ref(), &ctx.message, text).await;
                        return Outcome::PlatformError {
                            command: ctx.command,
                        };
                    }
                }
            } else {
                Vec::new()
            };

            let decision = permissions::evaluate(
                permissions,
                &ctx.message.author_id,
                &roles,
                &ctx.message.channel_id,
            );
            if decision == Decision::Deny {
                debug!(
                    command = %ctx.command,
                    author = %ctx.message.author_id,
                    "Permission denied"
                );
                let text = &self.error_texts.no_permissions;
                self.reply(ctx.client.as_ref(), &ctx.message, text).await;
                return Outcome::Denied {
                    command: ctx.command,
                };
            }
        }

        let command = ctx.command.clone();
        spawn_handler(handler, ctx);
        Outcome::Dispatched { command }
    }

    /// Checks the filters cheapest first. Own messages are always dropped.
    fn drop_reason(&self, self_id: &str, message: &InboundMessage) -> Option<DropReason> {
        let options = &self.options;
        if message.author_id == self_id {
            Some(DropReason::OwnMessage)
        } else if options.ignore_empty && message.content.is_empty() {
            Some(DropReason::Empty)
        } else if options.ignore_non_default && message.kind != MessageKind::Default {
            Some(DropReason::NonDefault)
        } else if options.ignore_bots && message.author_is_bot {
            Some(DropReason::Bot)
        } else if options.ignore_dms && message.is_direct() {
            Some(DropReason::DirectMessage)
        } else if !message.content.starts_with(self.prefix) {
            Some(DropReason::NoPrefix)
        } else {
            None
        }
    }

    async fn unresolved(
        &self,
        client: &dyn ChatClient,
        message: &InboundMessage,
        command: String,
    ) -> Outcome {
        if let Some(names) = &self.fuzzy_names {
            let suggestions: Vec<String> = fuzzy::suggest(&command, names)
                .into_iter()
                .map(|suggestion| suggestion.name)
                .collect();

            if !suggestions.is_empty() {
                let mut text = format!("{} Did you mean:\n", self.error_texts.command_not_found);
                for name in &suggestions {
                    let _ = writeln!(text, "- `{}{}`", self.prefix, name);
                }
                debug!("Suggesting {:?} for `{}`", suggestions, command);
                self.reply(client, message, &text).await;
                return Outcome::Suggested {
                    command,
                    suggestions,
                };
            }
        }

        debug!("Command `{}` not found", command);
        self.reply(client, message, &self.error_texts.command_not_found)
            .await;
        Outcome::NotFound { command }
    }

    async fn lookup_roles(&self, ctx: &Context) -> Result<Vec<String>> {
        let Some(guild_id) = ctx.message.guild_id.as_deref() else {
            // Direct messages carry no guild membership to check.
            return Ok(Vec::new());
        };
        let roles = ctx
            .client
            .member_roles(guild_id, &ctx.message.author_id)
            .await?;
        Ok(roles)
    }

    async fn reply(&self, client: &dyn ChatClient, message: &InboundMessage, text: &str) {
        if let Err(e) = client.send_text(&message.channel_id, text).await {
            warn!(channel = %message.channel_id, "Failed to send reply: {}", e);
        }
    }
}

/// Runs a handler on its own task. The join handle is dropped: a panicking or
/// failing handler only takes its own task down.
fn spawn_handler(handler: Arc<dyn Command>, ctx: Context) {
    tokio::spawn(async move {
        let command = ctx.command.clone();
        if let Err(e) = handler.handle(ctx).await {
            error!("Error in command `{}`: {}", command, e);
        }
    });
}
