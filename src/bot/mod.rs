//! Bot layer - Discord-specific adapter around the multiplexer.
//!
//! This module wires a [`Mux`] into serenity: [`SerenityClient`] provides the
//! outbound capabilities the dispatcher consumes, and [`MuxHandler`] feeds
//! every received message into [`Mux::handle`].

/// Built-in commands (help, echo)
pub mod commands;

use crate::core::{
    client::{ChatClient, ClientError, InboundMessage, MessageKind, SentMessage},
    dispatcher::Mux,
};
use async_trait::async_trait;
use poise::serenity_prelude as serenity;
use std::{num::NonZeroU64, sync::Arc};
use tracing::{debug, info, instrument};

/// [`ChatClient`] backed by serenity's HTTP client.
pub struct SerenityClient {
    http: Arc<serenity::Http>,
    self_id: String,
}

impl SerenityClient {
    /// Creates a client for the account identified by `self_id`.
    #[must_use]
    pub const fn new(http: Arc<serenity::Http>, self_id: String) -> Self {
        Self { http, self_id }
    }
}

/// Parses a snowflake, rejecting zero and anything non-numeric.
fn parse_snowflake(kind: &'static str, id: &str) -> Result<u64, ClientError> {
    id.parse::<NonZeroU64>()
        .map(NonZeroU64::get)
        .map_err(|_| ClientError::InvalidId {
            kind,
            id: id.to_string(),
        })
}

fn platform_error(error: &serenity::Error) -> ClientError {
    ClientError::Platform {
        message: error.to_string(),
    }
}

#[async_trait]
impl ChatClient for SerenityClient {
    fn current_user_id(&self) -> &str {
        &self.self_id
    }

    async fn send_text(&self, channel_id: &str, text: &str) -> Result<SentMessage, ClientError> {
        let channel = serenity::ChannelId::new(parse_snowflake("channel", channel_id)?);
        let sent = channel
            .say(&self.http, text)
            .await
            .map_err(|e| platform_error(&e))?;
        Ok(SentMessage {
            id: sent.id.to_string(),
            channel_id: channel_id.to_string(),
        })
    }

    async fn member_roles(
        &self,
        guild_id: &str,
        user_id: &str,
    ) -> Result<Vec<String>, ClientError> {
        let guild = serenity::GuildId::new(parse_snowflake("guild", guild_id)?);
        let user = serenity::UserId::new(parse_snowflake("user", user_id)?);
        let member = guild
            .member(&self.http, user)
            .await
            .map_err(|e| platform_error(&e))?;
        Ok(member.roles.iter().map(ToString::to_string).collect())
    }
}

/// Converts a serenity message into the record the dispatcher works on.
#[must_use]
pub fn inbound_message(message: &serenity::Message) -> InboundMessage {
    let kind = match message.kind {
        serenity::MessageType::Regular => MessageKind::Default,
        serenity::MessageType::InlineReply => MessageKind::Reply,
        _ => MessageKind::System,
    };
    InboundMessage {
        id: message.id.to_string(),
        kind,
        content: message.content.clone(),
        author_id: message.author.id.to_string(),
        author_is_bot: message.author.bot,
        guild_id: message.guild_id.map(|id| id.to_string()),
        channel_id: message.channel_id.to_string(),
    }
}

/// Serenity event handler that routes messages through a [`Mux`].
///
/// Serenity runs every event on its own task, so messages are only dispatched
/// in arrival order as far as serenity's event delivery preserves it.
pub struct MuxHandler {
    mux: Arc<Mux>,
}

impl MuxHandler {
    /// Wraps a serving multiplexer.
    #[must_use]
    pub const fn new(mux: Arc<Mux>) -> Self {
        Self { mux }
    }
}

#[async_trait]
impl serenity::EventHandler for MuxHandler {
    async fn ready(&self, _ctx: serenity::Context, ready: serenity::Ready) {
        info!("Logged in as {}", ready.user.name);
    }

    async fn message(&self, ctx: serenity::Context, new_message: serenity::Message) {
        let self_id = ctx.cache.current_user().id.to_string();
        let client: Arc<dyn ChatClient> =
            Arc::new(SerenityClient::new(Arc::clone(&ctx.http), self_id));
        let message = inbound_message(&new_message);
        let outcome = self.mux.handle(client, &message).await;
        debug!(message_id = %message.id, ?outcome, "Message handled");
    }
}

/// Connects to Discord and serves `mux` until the client shuts down.
#[instrument(skip(token, mux))]
pub async fn run_bot(token: String, mux: Arc<Mux>) -> Result<(), serenity::Error> {
    // Prefix commands need the message content intent.
    let intents = serenity::GatewayIntents::GUILD_MESSAGES
        | serenity::GatewayIntents::DIRECT_MESSAGES
        | serenity::GatewayIntents::MESSAGE_CONTENT;

    info!("Setting up Serenity client...");
    let client = serenity::Client::builder(&token, intents)
        .event_handler(MuxHandler::new(mux))
        .await;

    match client {
        Ok(mut c) => {
            info!("Starting bot client...");
            if let Err(why) = c.start().await {
                tracing::error!("Client error: {:?}", why);
                return Err(why);
            }
        }
        Err(e) => {
            tracing::error!("Error creating client: {:?}", e);
            return Err(e);
        }
    }
    Ok(())
}
