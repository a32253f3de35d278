//! Shared test utilities for the multiplexer.
//!
//! A recording chat client, message constructors with sensible defaults, and
//! probe commands that report what the dispatcher did to them.

#![allow(clippy::unwrap_used)]

use crate::{
    core::{
        client::{ChatClient, ClientError, InboundMessage, MessageKind, SentMessage},
        context::Context,
        permissions::CommandPermissions,
        registry::{Command, CommandSettings, Registry, Setup},
    },
    errors::{Error, Result},
};
use async_trait::async_trait;
use std::{
    collections::HashMap,
    sync::{
        Arc, Mutex,
        atomic::{AtomicUsize, Ordering},
    },
};
use tokio::sync::{Mutex as TokioMutex, mpsc};
use tracing_subscriber::EnvFilter;

/// Installs a tracing subscriber that writes through the test harness.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")),
        )
        .with_test_writer()
        .try_init();
}

/// In-memory chat client that records every send.
#[derive(Debug, Default)]
pub struct MockClient {
    self_id: String,
    sent: Mutex<Vec<(String, String)>>,
    roles: HashMap<String, Vec<String>>,
    fail_lookups: bool,
    lookups: AtomicUsize,
}

impl MockClient {
    /// Creates a client logged in as `bot-self`.
    #[must_use]
    pub fn new() -> Arc<Self> {
        Arc::new(Self::unshared())
    }

    fn unshared() -> Self {
        Self {
            self_id: "bot-self".to_string(),
            ..Self::default()
        }
    }

    /// Gives `user_id` the listed roles in every guild.
    #[must_use]
    pub fn with_roles(self: Arc<Self>, user_id: &str, roles: &[&str]) -> Arc<Self> {
        let mut client = Arc::try_unwrap(self).unwrap_or_else(|_| Self::unshared());
        client.roles.insert(
            user_id.to_string(),
            roles.iter().map(ToString::to_string).collect(),
        );
        Arc::new(client)
    }

    /// Makes every role lookup fail.
    #[must_use]
    pub fn failing_lookups(self: Arc<Self>) -> Arc<Self> {
        let mut client = Arc::try_unwrap(self).unwrap_or_else(|_| Self::unshared());
        client.fail_lookups = true;
        Arc::new(client)
    }

    /// Texts sent so far, oldest first.
    pub fn sent_texts(&self) -> Vec<String> {
        self.sent
            .lock()
            .unwrap()
            .iter()
            .map(|(_, text)| text.clone())
            .collect()
    }

    /// `(channel_id, text)` pairs sent so far, oldest first.
    pub fn sent(&self) -> Vec<(String, String)> {
        self.sent.lock().unwrap().clone()
    }

    /// Number of role lookups performed.
    pub fn lookups(&self) -> usize {
        self.lookups.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatClient for MockClient {
    fn current_user_id(&self) -> &str {
        &self.self_id
    }

    async fn send_text(
        &self,
        channel_id: &str,
        text: &str,
    ) -> std::result::Result<SentMessage, ClientError> {
        let mut sent = self.sent.lock().unwrap();
        sent.push((channel_id.to_string(), text.to_string()));
        Ok(SentMessage {
            id: format!("sent-{}", sent.len()),
            channel_id: channel_id.to_string(),
        })
    }

    async fn member_roles(
        &self,
        _guild_id: &str,
        user_id: &str,
    ) -> std::result::Result<Vec<String>, ClientError> {
        self.lookups.fetch_add(1, Ordering::SeqCst);
        if self.fail_lookups {
            return Err(ClientError::NotFound {
                what: format!("member {user_id}"),
            });
        }
        Ok(self.roles.get(user_id).cloned().unwrap_or_default())
    }
}

/// A regular guild message from `user-1` in `channel-1` of `guild-1`.
#[must_use]
pub fn guild_message(content: &str) -> InboundMessage {
    InboundMessage {
        id: "message-1".to_string(),
        kind: MessageKind::Default,
        content: content.to_string(),
        author_id: "user-1".to_string(),
        author_is_bot: false,
        guild_id: Some("guild-1".to_string()),
        channel_id: "channel-1".to_string(),
    }
}

/// A context as the dispatcher would build it for `!command args...`.
#[must_use]
pub fn context_for(client: Arc<MockClient>, command: &str, arguments: &[&str]) -> Context {
    context_with_registry(client, Registry::new(), command, arguments)
}

/// Like [`context_for`], with a populated registry.
#[must_use]
pub fn context_with_registry(
    client: Arc<MockClient>,
    registry: Registry,
    command: &str,
    arguments: &[&str],
) -> Context {
    let mut content = format!("!{command}");
    for argument in arguments {
        content.push(' ');
        content.push_str(argument);
    }
    Context {
        prefix: '!',
        command: command.to_string(),
        arguments: arguments.iter().map(ToString::to_string).collect(),
        message: guild_message(&content),
        client,
        registry: Arc::new(registry),
    }
}

/// Command that hands every context it receives back to the test.
pub struct ProbeCommand {
    settings: CommandSettings,
    permissions: CommandPermissions,
    fail: bool,
    inits: AtomicUsize,
    calls: AtomicUsize,
    tx: mpsc::UnboundedSender<Context>,
    rx: TokioMutex<mpsc::UnboundedReceiver<Context>>,
}

impl ProbeCommand {
    /// Creates a public probe named `name`.
    #[must_use]
    pub fn new(name: &str) -> Arc<Self> {
        Arc::new(Self::unshared(name))
    }

    fn unshared(name: &str) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            settings: CommandSettings::new(name, format!("Probe {name}")),
            permissions: CommandPermissions::public(),
            fail: false,
            inits: AtomicUsize::new(0),
            calls: AtomicUsize::new(0),
            tx,
            rx: TokioMutex::new(rx),
        }
    }

    fn rebuild(self: Arc<Self>) -> Self {
        let name = self.settings.command.clone();
        Arc::try_unwrap(self).unwrap_or_else(|_| Self::unshared(&name))
    }

    /// Guards the probe with `permissions`.
    #[must_use]
    pub fn with_permissions(self: Arc<Self>, permissions: CommandPermissions) -> Arc<Self> {
        let mut probe = self.rebuild();
        probe.permissions = permissions;
        Arc::new(probe)
    }

    /// Makes both `init` and `handle` fail.
    #[must_use]
    pub fn failing(self: Arc<Self>) -> Arc<Self> {
        let mut probe = self.rebuild();
        probe.fail = true;
        Arc::new(probe)
    }

    /// Number of times `init` ran.
    pub fn inits(&self) -> usize {
        self.inits.load(Ordering::SeqCst)
    }

    /// Number of times `handle` ran.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Waits for the next context handed to `handle`.
    pub async fn next_context(&self) -> Option<Context> {
        self.rx.lock().await.recv().await
    }
}

#[async_trait]
impl Command for ProbeCommand {
    fn init(&self, _setup: &Setup<'_>) -> Result<()> {
        self.inits.fetch_add(1, Ordering::SeqCst);
        if self.fail {
            return Err(Error::Command {
                message: format!("{} refused to initialize", self.settings.command),
            });
        }
        Ok(())
    }

    async fn handle(&self, ctx: Context) -> Result<()> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let _ = self.tx.send(ctx);
        if self.fail {
            return Err(Error::Command {
                message: format!("{} failed on purpose", self.settings.command),
            });
        }
        Ok(())
    }

    fn settings(&self) -> &CommandSettings {
        &self.settings
    }

    fn permissions(&self) -> &CommandPermissions {
        &self.permissions
    }
}

/// Command whose handler panics after announcing that it started.
pub struct PanickingCommand {
    settings: CommandSettings,
    tx: mpsc::UnboundedSender<()>,
    rx: TokioMutex<mpsc::UnboundedReceiver<()>>,
}

impl PanickingCommand {
    /// Creates a panicking command named `name`.
    #[must_use]
    pub fn new(name: &str) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            settings: CommandSettings::new(name, "Always panics"),
            tx,
            rx: TokioMutex::new(rx),
        })
    }

    /// Waits until `count` handlers have started.
    pub async fn wait_for_started(&self, count: usize) {
        let mut rx = self.rx.lock().await;
        for _ in 0..count {
            rx.recv().await;
        }
    }
}

#[async_trait]
impl Command for PanickingCommand {
    #[allow(clippy::panic)]
    async fn handle(&self, ctx: Context) -> Result<()> {
        let _ = self.tx.send(());
        panic!("`{}` handler blew up", ctx.command);
    }

    fn settings(&self) -> &CommandSettings {
        &self.settings
    }
}

/// Command whose handler never returns.
pub struct BlockingCommand {
    settings: CommandSettings,
    tx: mpsc::UnboundedSender<()>,
    rx: TokioMutex<mpsc::UnboundedReceiver<()>>,
}

impl BlockingCommand {
    /// Creates a blocking command named `name`.
    #[must_use]
    pub fn new(name: &str) -> Arc<Self> {
        let (tx, rx) = mpsc::unbounded_channel();
        Arc::new(Self {
            settings: CommandSettings::new(name, "Never finishes"),
            tx,
            rx: TokioMutex::new(rx),
        })
    }

    /// Waits until `count` handlers have started.
    pub async fn wait_for_started(&self, count: usize) {
        let mut rx = self.rx.lock().await;
        for _ in 0..count {
            rx.recv().await;
        }
    }
}

#[async_trait]
impl Command for BlockingCommand {
    async fn handle(&self, _ctx: Context) -> Result<()> {
        let _ = self.tx.send(());
        std::future::pending::<()>().await;
        Ok(())
    }

    fn settings(&self) -> &CommandSettings {
        &self.settings
    }
}

mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_client_records_sends_and_lookups() {
        let client = MockClient::new().with_roles("user-1", &["mods"]);
        let chat: Arc<dyn ChatClient> = client.clone();

        let sent = chat.send_text("channel-9", "hello").await.unwrap();
        assert_eq!(sent.id, "sent-1");
        assert_eq!(sent.channel_id, "channel-9");
        assert_eq!(
            client.sent(),
            vec![("channel-9".to_string(), "hello".to_string())]
        );

        assert_eq!(chat.member_roles("guild-1", "user-1").await.unwrap(), vec!["mods"]);
        assert!(chat.member_roles("guild-1", "user-2").await.unwrap().is_empty());
        assert_eq!(client.lookups(), 2);
    }

    #[tokio::test]
    async fn test_mock_client_failing_lookups() {
        let chat: Arc<dyn ChatClient> = MockClient::new().failing_lookups();
        let err = chat.member_roles("guild-1", "user-1").await.unwrap_err();
        assert!(matches!(err, ClientError::NotFound { .. }));
    }
}
