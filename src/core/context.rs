//! Per-dispatch context handed to middleware and command handlers.

use crate::core::{
    client::{ChatClient, ClientError, InboundMessage, SentMessage},
    registry::Registry,
};
use std::{fmt, sync::Arc};

/// Everything a handler knows about the invocation it is serving.
///
/// A context is built fresh for every resolved rich command, threaded by
/// mutable reference through the middleware chain, and then moved into the
/// handler task.
#[derive(Clone)]
pub struct Context {
    /// Prefix the message was invoked with
    pub prefix: char,
    /// Case-folded command name
    pub command: String,
    /// Remaining words of the message, split on single spaces
    pub arguments: Vec<String>,
    /// The message that triggered the command
    pub message: InboundMessage,
    /// Outbound capability of the chat platform
    pub client: Arc<dyn ChatClient>,
    /// Read-only view of the registered commands
    pub registry: Arc<Registry>,
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("prefix", &self.prefix)
            .field("command", &self.command)
            .field("arguments", &self.arguments)
            .field("message", &self.message)
            .finish_non_exhaustive()
    }
}

/// Sends formatted text to the channel a `Context` was invoked in.
///
/// ```ignore
/// channel_sendf!(ctx, "{} arguments", ctx.arguments.len()).await?;
/// ```
#[macro_export]
macro_rules! channel_sendf {
    ($ctx:expr, $($arg:tt)*) => {
        $ctx.channel_send(&::std::format!($($arg)*))
    };
}

impl Context {
    /// Sends plain text to the channel the command was invoked in.
    pub async fn channel_send(&self, text: &str) -> Result<SentMessage, ClientError> {
        self.client.send_text(&self.message.channel_id, text).await
    }

    /// All arguments joined back together with single spaces.
    #[must_use]
    pub fn rest(&self) -> String {
        self.arguments.join(" ")
    }
}
