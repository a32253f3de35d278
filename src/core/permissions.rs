//! Permission evaluation - the three-tier whitelist check for rich commands.
//!
//! Tiers are independent "or" gates tried most-specific first: an explicit user
//! grant wins over a role grant, which wins over a channel grant. A permission
//! set with every tier empty is public.

use serde::Deserialize;
use std::collections::BTreeSet;

/// Whitelist of users, roles and channels allowed to invoke a command.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CommandPermissions {
    /// Users that may always invoke the command
    pub user_ids: BTreeSet<String>,
    /// Roles whose members may invoke the command
    pub role_ids: BTreeSet<String>,
    /// Channels in which anyone may invoke the command
    pub chan_ids: BTreeSet<String>,
}

/// Result of a permission evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The actor may run the command.
    Allow,
    /// The actor may not run the command.
    Deny,
}

/// Shared public permission set, returned by commands that don't restrict access.
pub static PUBLIC: CommandPermissions = CommandPermissions::public();

impl CommandPermissions {
    /// Permission set with no restrictions.
    #[must_use]
    pub const fn public() -> Self {
        Self {
            user_ids: BTreeSet::new(),
            role_ids: BTreeSet::new(),
            chan_ids: BTreeSet::new(),
        }
    }

    /// Adds users to the whitelist.
    #[must_use]
    pub fn with_users<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.user_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds roles to the whitelist.
    #[must_use]
    pub fn with_roles<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.role_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Adds channels to the whitelist.
    #[must_use]
    pub fn with_channels<I, S>(mut self, ids: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.chan_ids.extend(ids.into_iter().map(Into::into));
        self
    }

    /// Returns `true` when no tier restricts access.
    #[must_use]
    pub fn is_public(&self) -> bool {
        self.user_ids.is_empty() && self.role_ids.is_empty() && self.chan_ids.is_empty()
    }

    /// Returns `true` when evaluating this set needs the actor's guild roles.
    #[must_use]
    pub fn needs_roles(&self) -> bool {
        !self.role_ids.is_empty()
    }
}

/// Decides whether an actor may invoke a command guarded by `permissions`.
///
/// `actor_roles` only matters when the set has role grants; callers may pass an
/// empty slice otherwise.
#[must_use]
pub fn evaluate<S: AsRef<str>>(
    permissions: &CommandPermissions,
    actor_id: &str,
    actor_roles: &[S],
    channel_id: &str,
) -> Decision {
    if permissions.is_public() {
        return Decision::Allow;
    }

    if permissions.user_ids.contains(actor_id) {
        return Decision::Allow;
    }

    if actor_roles
        .iter()
        .any(|role| permissions.role_ids.contains(role.as_ref()))
    {
        return Decision::Allow;
    }

    if permissions.chan_ids.contains(channel_id) {
        return Decision::Allow;
    }

    Decision::Deny
}
