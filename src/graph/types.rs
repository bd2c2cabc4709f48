//! Relationship state types.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::directory::UserId;

/// A user's relationship snapshot.
///
/// Profiles materialise on a user's first profile-affecting action; a
/// user nobody has interacted with simply has an empty snapshot. The
/// friend set is modelled as a set so duplicate prevention is structural
/// rather than a remembered check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Profile {
    /// The user this snapshot belongs to.
    pub owner: UserId,
    /// Mutual friends. Symmetric with every listed user's own snapshot.
    pub friends: BTreeSet<UserId>,
    /// Incoming friend requests, most recent first.
    pub pending_requests: Vec<UserId>,
}

impl Profile {
    /// An empty snapshot for a user with no relationships yet.
    #[must_use]
    pub const fn empty(owner: UserId) -> Self {
        Self {
            owner,
            friends: BTreeSet::new(),
            pending_requests: Vec::new(),
        }
    }

    /// Whether `user` is a friend of the owner.
    #[must_use]
    pub fn is_friend(&self, user: UserId) -> bool {
        self.friends.contains(&user)
    }
}
