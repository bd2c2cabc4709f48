//! Likes and comments.
//!
//! This module provides the [`EngagementTracker`], which owns the
//! mutation rules for a post's like set and comment thread. It performs
//! no visibility checks: the caller establishes that the acting user may
//! read the post before invoking anything here.
//!
//! Likes follow set semantics with observable rejection: liking twice
//! fails the second time rather than silently succeeding, and unliking
//! something you never liked fails the same way.

use std::sync::Arc;

use tracing::debug;

use super::error::{FeedError, Result};
use super::storage::PostStore;
use super::types::{Comment, CommentId, PostId};
use crate::directory::UserId;

/// High-level API for per-post engagement.
pub struct EngagementTracker {
    store: Arc<PostStore>,
}

impl EngagementTracker {
    /// Creates a new tracker over the given post store.
    #[must_use]
    pub const fn new(store: Arc<PostStore>) -> Self {
        Self { store }
    }

    /// Records that `user` likes the post.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post does not exist, or
    /// [`FeedError::AlreadyLiked`] if the user already liked it.
    pub fn like(&self, user: UserId, post_id: PostId) -> Result<()> {
        if !self.store.post_exists(post_id)? {
            return Err(FeedError::NotFound);
        }
        if !self.store.add_like(post_id, user)? {
            return Err(FeedError::AlreadyLiked);
        }

        debug!(user, post = post_id, "post liked");
        Ok(())
    }

    /// Removes `user`'s like from the post.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post does not exist, or
    /// [`FeedError::NotLiked`] if the user had not liked it.
    pub fn unlike(&self, user: UserId, post_id: PostId) -> Result<()> {
        if !self.store.post_exists(post_id)? {
            return Err(FeedError::NotFound);
        }
        if !self.store.remove_like(post_id, user)? {
            return Err(FeedError::NotLiked);
        }

        debug!(user, post = post_id, "post unliked");
        Ok(())
    }

    /// Returns who liked the post, in the order they liked it.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post does not exist.
    pub fn likes(&self, post_id: PostId) -> Result<Vec<UserId>> {
        if !self.store.post_exists(post_id)? {
            return Err(FeedError::NotFound);
        }
        self.store.likes_of(post_id)
    }

    /// Adds a comment by `user` to the post.
    ///
    /// Any user who can read the post may comment; the visibility check
    /// happens in the caller.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::EmptyText`] if `text` is empty or whitespace,
    /// or [`FeedError::NotFound`] if the post does not exist.
    pub fn add_comment(&self, user: UserId, post_id: PostId, text: &str) -> Result<Comment> {
        if text.trim().is_empty() {
            return Err(FeedError::EmptyText);
        }
        if !self.store.post_exists(post_id)? {
            return Err(FeedError::NotFound);
        }

        let comment = self.store.add_comment(post_id, user, text)?;
        debug!(user, post = post_id, comment = comment.id, "comment added");
        Ok(comment)
    }

    /// Deletes a comment the caller wrote.
    ///
    /// Removal targets the comment id, so deleting one of several
    /// comments by the same author never removes a different one.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post or the comment does
    /// not exist, or [`FeedError::NotAuthorized`] if the comment belongs
    /// to someone else.
    pub fn delete_comment(
        &self,
        user: UserId,
        post_id: PostId,
        comment_id: CommentId,
    ) -> Result<()> {
        let comment = self
            .store
            .comment(post_id, comment_id)?
            .ok_or(FeedError::NotFound)?;
        if comment.author != user {
            return Err(FeedError::NotAuthorized);
        }

        self.store.delete_comment(post_id, comment_id)?;
        debug!(user, post = post_id, comment = comment_id, "comment deleted");
        Ok(())
    }

    /// Returns the post's comments, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`FeedError::NotFound`] if the post does not exist.
    pub fn comments(&self, post_id: PostId) -> Result<Vec<Comment>> {
        if !self.store.post_exists(post_id)? {
            return Err(FeedError::NotFound);
        }
        self.store.comments_of(post_id)
    }
}
