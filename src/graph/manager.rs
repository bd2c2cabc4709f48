//! High-level friend graph API.
//!
//! This module provides the [`FriendGraph`] which combines identity
//! lookups (via [`UserDirectory`]) with relationship storage
//! ([`ProfileStore`]) to implement the request/accept lifecycle:
//!
//! ```text
//! strangers --send--> pending (on the target) --accept--> friends
//! ```
//!
//! Friendship is only ever established by acceptance, never unilaterally,
//! and the two sides are committed together so the graph stays symmetric.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::{debug, info};

use super::error::{GraphError, Result};
use super::storage::ProfileStore;
use super::types::Profile;
use crate::directory::{User, UserDirectory, UserId};

/// High-level API for the friend graph.
///
/// # Example
///
/// ```ignore
/// use trellis_core::graph::FriendGraph;
///
/// let graph = FriendGraph::new(directory, store);
/// graph.send_request(alice, "bob@example.com")?;
/// graph.accept_request(bob, "alice@example.com")?;
/// assert!(graph.is_friend(alice, bob)?);
/// ```
pub struct FriendGraph {
    directory: Arc<UserDirectory>,
    store: ProfileStore,
}

impl FriendGraph {
    /// Creates a new friend graph over the given directory and store.
    #[must_use]
    pub const fn new(directory: Arc<UserDirectory>, store: ProfileStore) -> Self {
        Self { directory, store }
    }

    /// Sends a friend request from `sender` to the user behind
    /// `target_email`.
    ///
    /// The request lands on the target's pending queue; the sender's own
    /// profile is untouched. Preconditions are checked in order and the
    /// first failure wins.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownUser`] if the email resolves to nobody.
    /// - [`GraphError::SelfRequest`] if the target is the sender.
    /// - [`GraphError::AlreadyFriends`] if the two are already friends.
    /// - [`GraphError::RequestAlreadyPending`] if an identical request is
    ///   already waiting.
    pub fn send_request(&self, sender: UserId, target_email: &str) -> Result<()> {
        let target = self
            .directory
            .user_by_email(target_email)?
            .ok_or_else(|| GraphError::UnknownUser(target_email.to_string()))?;

        if target.id == sender {
            return Err(GraphError::SelfRequest);
        }
        if self.store.is_friend(sender, target.id)? {
            return Err(GraphError::AlreadyFriends(target.id));
        }
        if !self.store.push_request(target.id, sender)? {
            return Err(GraphError::RequestAlreadyPending(target.id));
        }

        debug!(sender, target = target.id, "friend request sent");
        Ok(())
    }

    /// Accepts the pending request from the user behind `requester_email`.
    ///
    /// Consumes the request and links both users as friends in one atomic
    /// unit; both profiles reflect the change or neither does.
    ///
    /// # Errors
    ///
    /// - [`GraphError::UnknownUser`] if the email resolves to nobody.
    /// - [`GraphError::NoSuchRequest`] if no request from that user is
    ///   waiting on `accepter`.
    pub fn accept_request(&self, accepter: UserId, requester_email: &str) -> Result<()> {
        let requester = self
            .directory
            .user_by_email(requester_email)?
            .ok_or_else(|| GraphError::UnknownUser(requester_email.to_string()))?;

        if !self.store.accept_request(accepter, requester.id)? {
            return Err(GraphError::NoSuchRequest(requester.id));
        }

        info!(accepter, requester = requester.id, "friendship established");
        Ok(())
    }

    /// Whether `a` and `b` are friends.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub fn is_friend(&self, a: UserId, b: UserId) -> Result<bool> {
        self.store.is_friend(a, b)
    }

    /// Returns a user's friend set.
    ///
    /// Visibility filtering fetches this once per feed scan and reuses it
    /// for every post.
    ///
    /// # Errors
    ///
    /// Returns an error if the store lookup fails.
    pub fn friends_of(&self, user: UserId) -> Result<BTreeSet<UserId>> {
        self.store.friends_of(user)
    }

    /// Returns a user's friends resolved to directory records.
    ///
    /// Ids whose directory record has vanished are skipped.
    ///
    /// # Errors
    ///
    /// Returns an error if a store or directory lookup fails.
    pub fn friends(&self, user: UserId) -> Result<Vec<User>> {
        self.resolve_ids(self.store.friends_of(user)?)
    }

    /// Returns the users waiting on `user`'s answer, most recent first,
    /// resolved to directory records.
    ///
    /// # Errors
    ///
    /// Returns an error if a store or directory lookup fails.
    pub fn pending_requests(&self, user: UserId) -> Result<Vec<User>> {
        self.resolve_ids(self.store.pending_requests(user)?)
    }

    /// Returns every user `requester` could send a request to: everyone in
    /// the directory except the requester and their existing friends, in
    /// directory order.
    ///
    /// # Errors
    ///
    /// Returns an error if a store or directory lookup fails.
    pub fn available_users(&self, requester: UserId) -> Result<Vec<User>> {
        let friends = self.store.friends_of(requester)?;
        let users = self.directory.all_users()?;

        Ok(users
            .into_iter()
            .filter(|u| u.id != requester && !friends.contains(&u.id))
            .collect())
    }

    /// Returns a snapshot of a user's relationship state.
    ///
    /// # Errors
    ///
    /// Returns an error if a store lookup fails.
    pub fn profile_of(&self, user: UserId) -> Result<Profile> {
        Ok(Profile {
            owner: user,
            friends: self.store.friends_of(user)?,
            pending_requests: self.store.pending_requests(user)?,
        })
    }

    fn resolve_ids(&self, ids: impl IntoIterator<Item = UserId>) -> Result<Vec<User>> {
        let mut users = Vec::new();
        for id in ids {
            if let Some(user) = self.directory.user_by_id(id)? {
                users.push(user);
            }
        }
        Ok(users)
    }
}
