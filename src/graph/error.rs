//! Error types for friend graph operations.

use rusqlite::ErrorCode;
use thiserror::Error;

use crate::directory::{DirectoryError, UserId};

/// Error type for friend graph operations.
#[derive(Error, Debug)]
pub enum GraphError {
    /// The email did not resolve to a registered user.
    #[error("No user registered for email: {0}")]
    UnknownUser(String),

    /// A user tried to send a friend request to themselves.
    #[error("Cannot send a friend request to yourself")]
    SelfRequest,

    /// The two users are already friends.
    #[error("Already friends with user {0}")]
    AlreadyFriends(UserId),

    /// A request in the same direction is already waiting.
    #[error("Friend request to user {0} is already pending")]
    RequestAlreadyPending(UserId),

    /// No pending request from that user exists.
    #[error("No friend request from user {0}")]
    NoSuchRequest(UserId),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// The store did not respond within its bounded timeout.
    #[error("Graph store unavailable: {0}")]
    Unavailable(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),

    /// Directory lookup failed.
    #[error("Directory error: {0}")]
    Directory(#[from] DirectoryError),
}

impl GraphError {
    /// Stable machine-readable kind for the service layer.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownUser(_) => "unknown_user",
            Self::SelfRequest => "self_request",
            Self::AlreadyFriends(_) => "already_friends",
            Self::RequestAlreadyPending(_) => "request_already_pending",
            Self::NoSuchRequest(_) => "no_such_request",
            Self::Database(_) => "database",
            Self::Unavailable(_) => "store_unavailable",
            Self::Storage(_) => "storage",
            Self::Directory(inner) => inner.kind(),
        }
    }

    /// Whether the caller may retry the operation.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::Unavailable(_) => true,
            Self::Directory(inner) => inner.is_retryable(),
            _ => false,
        }
    }
}

impl From<rusqlite::Error> for GraphError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
                Self::Unavailable(err.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Result type alias for friend graph operations.
pub type Result<T> = std::result::Result<T, GraphError>;
