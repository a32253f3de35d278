//! Chat platform collaborator - the capabilities the multiplexer consumes.
//!
//! The multiplexer never talks to a chat platform directly. It sends text into a
//! channel and looks up a guild member's roles through [`ChatClient`], and it
//! receives messages already parsed into an [`InboundMessage`].

use async_trait::async_trait;
use thiserror::Error;

/// Failures reported by a [`ChatClient`] implementation.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ClientError {
    /// An identifier could not be interpreted by the platform.
    #[error("Invalid {kind} id: {id}")]
    InvalidId {
        /// What kind of id it was (channel, guild, user)
        kind: &'static str,
        /// The offending id
        id: String,
    },

    /// The requested entity does not exist on the platform.
    #[error("{what} not found")]
    NotFound {
        /// Description of the missing entity
        what: String,
    },

    /// Any other platform-side failure (transport, rate limit, permissions).
    #[error("Platform error: {message}")]
    Platform {
        /// Platform-supplied description
        message: String,
    },
}

/// Kind of an inbound message. Only [`MessageKind::Default`] is a user-authored
/// chat message; everything else is a platform notice.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum MessageKind {
    /// Regular user message
    #[default]
    Default,
    /// Reply to another message
    Reply,
    /// System notice (joins, pins, boosts, ...)
    System,
}

/// An inbound chat message, already parsed by the platform collaborator.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundMessage {
    /// Platform id of the message
    pub id: String,
    /// Message kind
    pub kind: MessageKind,
    /// Raw text content
    pub content: String,
    /// Id of the authoring user
    pub author_id: String,
    /// Whether the author is a bot account
    pub author_is_bot: bool,
    /// Guild the message was posted in; `None` for direct messages
    pub guild_id: Option<String>,
    /// Channel the message was posted in
    pub channel_id: String,
}

impl InboundMessage {
    /// Returns `true` when the message was sent outside of any guild.
    #[must_use]
    pub const fn is_direct(&self) -> bool {
        self.guild_id.is_none()
    }
}

/// Handle to a message the client sent on our behalf.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SentMessage {
    /// Platform id of the sent message
    pub id: String,
    /// Channel it was sent to
    pub channel_id: String,
}

/// Capabilities the multiplexer consumes from the chat platform.
#[async_trait]
pub trait ChatClient: Send + Sync {
    /// Id of the account this client is logged in as. Messages authored by this
    /// id are always ignored.
    fn current_user_id(&self) -> &str;

    /// Sends plain text to a channel.
    async fn send_text(&self, channel_id: &str, text: &str) -> Result<SentMessage, ClientError>;

    /// Looks up the role ids of a guild member.
    async fn member_roles(&self, guild_id: &str, user_id: &str)
    -> Result<Vec<String>, ClientError>;
}
