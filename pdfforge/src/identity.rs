//! Who is driving the session.
//!
//! Every persistence-touching operation matches on [`Identity`] instead of
//! checking an optional owner id. Sign-in state changes are published through
//! [`IdentityWatch`]; a subscriber stops listening by dropping its receiver.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::watch;

/// Opaque identifier of an authenticated user.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OwnerId(String);

impl OwnerId {
    /// Wrap a user id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The raw id.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OwnerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// The acting user.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", content = "owner_id", rename_all = "lowercase")]
pub enum Identity {
    /// Guest use, subject to the usage quota and never persisted remotely.
    #[default]
    Anonymous,
    /// A signed-in user.
    Authenticated(OwnerId),
}

impl Identity {
    /// Shorthand for `Identity::Authenticated(OwnerId::new(id))`.
    pub fn authenticated(id: impl Into<String>) -> Self {
        Self::Authenticated(OwnerId::new(id))
    }

    /// The owner id, if signed in.
    pub fn owner(&self) -> Option<&OwnerId> {
        match self {
            Self::Anonymous => None,
            Self::Authenticated(owner) => Some(owner),
        }
    }
}

impl fmt::Display for Identity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Anonymous => f.write_str("guest"),
            Self::Authenticated(owner) => write!(f, "user {owner}"),
        }
    }
}

/// Publishes identity changes to any number of subscribers.
#[derive(Debug)]
pub struct IdentityWatch {
    sender: watch::Sender<Identity>,
}

impl IdentityWatch {
    /// Start with the given identity.
    pub fn new(initial: Identity) -> Self {
        let (sender, _) = watch::channel(initial);
        Self { sender }
    }

    /// The identity right now.
    pub fn current(&self) -> Identity {
        self.sender.borrow().clone()
    }

    /// Switch to an authenticated user.
    pub fn sign_in(&self, owner: OwnerId) {
        self.set(Identity::Authenticated(owner));
    }

    /// Fall back to anonymous use.
    pub fn sign_out(&self) {
        self.set(Identity::Anonymous);
    }

    /// Replace the identity. Subscribers are only woken on an actual change.
    pub fn set(&self, identity: Identity) {
        self.sender.send_if_modified(|current| {
            if *current == identity {
                false
            } else {
                tracing::debug!(from = %current, to = %identity, "identity changed");
                *current = identity;
                true
            }
        });
    }

    /// Receive future changes. Drop the receiver to unsubscribe.
    pub fn subscribe(&self) -> watch::Receiver<Identity> {
        self.sender.subscribe()
    }

    /// Number of live subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for IdentityWatch {
    fn default() -> Self {
        Self::new(Identity::Anonymous)
    }
}
