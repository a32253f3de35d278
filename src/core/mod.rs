//! Core dispatch logic - framework-agnostic registry, resolution, middleware,
//! permissions and the dispatcher that ties them together.

/// Chat platform capabilities consumed by the dispatcher
pub mod client;
/// Per-dispatch context
pub mod context;
/// Message filtering, command resolution and handler scheduling
pub mod dispatcher;
/// Similarity search over command names
pub mod fuzzy;
/// Middleware chain
pub mod middleware;
/// Three-tier permission evaluation
pub mod permissions;
/// Rich and simple command storage
pub mod registry;

pub use client::{ChatClient, ClientError, InboundMessage, MessageKind, SentMessage};
pub use context::Context;
pub use dispatcher::{DropReason, Mux, MuxBuilder, Outcome};
pub use permissions::{CommandPermissions, Decision};
pub use registry::{Command, CommandSettings, Registry, Setup, SimpleCommand};
