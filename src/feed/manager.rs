//! Visibility-scoped feed API.
//!
//! This module provides the [`FeedService`], which combines the friend
//! graph with post storage to answer "what may this caller read" and to
//! own the post lifecycle (create, delete).
//!
//! Reads never distinguish "does not exist" from "exists but is hidden
//! from you": both are the same failure, so probing for private posts
//! reveals nothing.

use std::sync::Arc;

use tracing::debug;

use super::error::{FeedError, Result};
use super::storage::PostStore;
use super::types::{Post, PostId, PostPrivacy};
use super::visibility::can_view;
use crate::directory::UserId;
use crate::graph::FriendGraph;

/// High-level API for reading and writing posts.
pub struct FeedService {
    graph: Arc<FriendGraph>,
    store: Arc<PostStore>,
}

impl FeedService {
    /// Creates a new feed service over the given graph and store.
    #[must_use]
    pub const fn new(graph: Arc<FriendGraph>, store: Arc<PostStore>) -> Self {
        Self { graph, store }
    }

    /// Creates a post.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::EmptyText`] if `text` is empty or whitespace,
    /// or an error if the store operation fails.
    pub fn create_post(&self, author: UserId, text: &str, privacy: PostPrivacy) -> Result<Post> {
        if text.trim().is_empty() {
            return Err(FeedError::EmptyText);
        }

        let post = self.store.insert_post(author, text, privacy)?;
        debug!(author, post = post.id, privacy = privacy.as_str(), "post created");
        Ok(post)
    }

    /// Deletes a post the caller owns, along with its likes and comments.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post does not exist,
    /// [`FeedError::NotAuthorized`] if the caller is not its author, or
    /// an error if the store operation fails.
    pub fn delete_post(&self, caller: UserId, post_id: PostId) -> Result<()> {
        let post = self.store.post_by_id(post_id)?.ok_or(FeedError::NotFound)?;
        if post.author != caller {
            return Err(FeedError::NotAuthorized);
        }

        self.store.delete_post(post_id)?;
        debug!(caller, post = post_id, "post deleted");
        Ok(())
    }

    /// Returns every post the requester may read, most recent first.
    ///
    /// The requester's friend set is fetched once and reused across the
    /// whole scan; the posts keep their original ordering.
    ///
    /// # Errors
    ///
    /// Returns an error if a store or graph lookup fails.
    pub fn visible_posts(&self, requester: UserId) -> Result<Vec<Post>> {
        let friends = self.graph.friends_of(requester)?;
        let posts = self.store.all_posts()?;

        Ok(posts
            .into_iter()
            .filter(|post| can_view(requester, post, &friends))
            .collect())
    }

    /// Returns a single post if the requester may read it.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post does not exist, and
    /// also if it exists but the requester may not read it. The two cases
    /// are indistinguishable from the outside.
    pub fn post_for(&self, requester: UserId, post_id: PostId) -> Result<Post> {
        let post = self.store.post_by_id(post_id)?.ok_or(FeedError::NotFound)?;

        let friends = self.graph.friends_of(requester)?;
        if !can_view(requester, &post, &friends) {
            return Err(FeedError::NotFound);
        }

        Ok(post)
    }
}
