//! Post and engagement types.

use serde::{Deserialize, Serialize};

use crate::directory::UserId;

/// Stable identifier for a post.
pub type PostId = i64;

/// Stable identifier for a comment.
pub type CommentId = i64;

/// Who may read a post.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostPrivacy {
    /// Readable by everyone.
    #[default]
    Public,
    /// Readable by the author and the author's friends.
    FriendsOnly,
}

impl PostPrivacy {
    /// Converts to string representation for storage.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::FriendsOnly => "friends_only",
        }
    }

    /// Parses from string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "public" => Some(Self::Public),
            "friends_only" => Some(Self::FriendsOnly),
            _ => None,
        }
    }
}

/// A comment on a post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
    /// Store-assigned identifier; deletion targets this, never a position.
    pub id: CommentId,
    /// Who wrote the comment. Only they may delete it.
    pub author: UserId,
    /// Comment body, non-empty.
    pub text: String,
    /// When the comment was written (Unix timestamp).
    pub created_at: i64,
}

/// An authored post with its engagement state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Post {
    /// Store-assigned identifier.
    pub id: PostId,
    /// Who wrote the post. Immutable.
    pub author: UserId,
    /// Post body, non-empty.
    pub text: String,
    /// Who may read the post.
    pub privacy: PostPrivacy,
    /// When the post was written (Unix timestamp).
    pub created_at: i64,
    /// Users who liked the post, in the order they liked it. Never
    /// contains duplicates.
    pub likes: Vec<UserId>,
    /// Comments, newest first.
    pub comments: Vec<Comment>,
}
