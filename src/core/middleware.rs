//! Middleware chain - observers run before the permission check.
//!
//! Middleware can read and annotate a [`Context`] but has no say over whether
//! the command runs. It only sees resolved rich commands; simple replies and
//! unresolved names never reach the chain.

use crate::core::context::Context;
use std::{fmt, sync::Arc};
use tracing::info;

/// A middleware function. It may be called from many dispatches at once, so any
/// external state it touches must be thread-safe.
pub type Middleware = Arc<dyn Fn(&mut Context) + Send + Sync>;

/// Ordered list of middleware, run in registration order.
#[derive(Default, Clone)]
pub struct MiddlewareChain {
    layers: Vec<Middleware>,
}

impl fmt::Debug for MiddlewareChain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MiddlewareChain")
            .field("layers", &self.layers.len())
            .finish()
    }
}

impl MiddlewareChain {
    /// Appends a middleware to the end of the chain.
    pub fn push<F>(&mut self, middleware: F)
    where
        F: Fn(&mut Context) + Send + Sync + 'static,
    {
        self.layers.push(Arc::new(middleware));
    }

    /// Runs every middleware against `ctx`, first registered first.
    pub fn run(&self, ctx: &mut Context) {
        for layer in &self.layers {
            layer(ctx);
        }
    }

    /// Number of middleware in the chain.
    #[must_use]
    pub fn len(&self) -> usize {
        self.layers.len()
    }

    /// Returns `true` if the chain is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.layers.is_empty()
    }
}

/// Logs every resolved rich command invocation at `info`.
pub fn trace_invocations() -> impl Fn(&mut Context) + Send + Sync + 'static {
    |ctx: &mut Context| {
        info!(
            command = %ctx.command,
            author = %ctx.message.author_id,
            channel = %ctx.message.channel_id,
            "Invoking `{}{}` with {:?}",
            ctx.prefix,
            ctx.command,
            ctx.arguments
        );
    }
}
