//! Error types for feed and engagement operations.

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::graph::GraphError;

/// Error type for feed and engagement operations.
#[derive(Error, Debug)]
pub enum FeedError {
    /// The post or comment does not exist, or the caller is not allowed
    /// to know that it does. A private post hidden from a non-friend
    /// reports this kind, never an authorization failure.
    #[error("Post or comment not found")]
    NotFound,

    /// The user already liked this post.
    #[error("Post already liked")]
    AlreadyLiked,

    /// The user has not liked this post.
    #[error("Post not liked yet")]
    NotLiked,

    /// A required text field was empty.
    #[error("Text is required")]
    EmptyText,

    /// The caller does not own the resource they tried to modify.
    #[error("Not authorized")]
    NotAuthorized,

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// The store did not respond within its bounded timeout.
    #[error("Feed store unavailable: {0}")]
    Unavailable(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Friend graph lookup failed.
    #[error("Graph error: {0}")]
    Graph(#[from] GraphError),
}

impl FeedError {
    /// Stable machine-readable kind for the service layer.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::NotFound => "not_found",
            Self::AlreadyLiked => "already_liked",
            Self::NotLiked => "not_liked",
            Self::EmptyText => "empty_text",
            Self::NotAuthorized => "not_authorized",
            Self::Database(_) => "database",
            Self::Unavailable(_) => "store_unavailable",
            Self::Storage(_) => "storage",
            Self::Graph(inner) => inner.kind(),
        }
    }

    /// Whether the caller may retry the operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Graph(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for FeedError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
                Self::Unavailable(err.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Result type alias for feed and engagement operations.
pub type Result<T> = std::result::Result<T, FeedError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_found_display() {
        assert_eq!(FeedError::NotFound.to_string(), "Post or comment not found");
    }

    #[test]
    fn already_liked_display() {
        assert_eq!(FeedError::AlreadyLiked.to_string(), "Post already liked");
    }

    #[test]
    fn not_liked_display() {
        assert_eq!(FeedError::NotLiked.to_string(), "Post not liked yet");
    }

    #[test]
    fn empty_text_display() {
        assert_eq!(FeedError::EmptyText.to_string(), "Text is required");
    }

    #[test]
    fn not_authorized_display() {
        assert_eq!(FeedError::NotAuthorized.to_string(), "Not authorized");
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(FeedError::NotFound.kind(), "not_found");
        assert_eq!(FeedError::AlreadyLiked.kind(), "already_liked");
        assert_eq!(FeedError::NotLiked.kind(), "not_liked");
        assert_eq!(FeedError::EmptyText.kind(), "empty_text");
        assert_eq!(FeedError::NotAuthorized.kind(), "not_authorized");
        assert_eq!(
            FeedError::Unavailable(String::new()).kind(),
            "store_unavailable"
        );
    }

    #[test]
    fn graph_kind_passes_through() {
        let err = FeedError::Graph(GraphError::Unavailable(String::new()));
        assert_eq!(err.kind(), "store_unavailable");
        assert!(err.is_retryable());
    }

    #[test]
    fn precondition_failures_are_not_retryable() {
        assert!(!FeedError::AlreadyLiked.is_retryable());
        assert!(!FeedError::NotFound.is_retryable());
        assert!(FeedError::Unavailable(String::new()).is_retryable());
    }
}
