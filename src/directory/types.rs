//! User identity types.

use serde::{Deserialize, Serialize};

/// Stable identifier for a user.
pub type UserId = i64;

/// A user identity record.
///
/// Immutable once created. The rest of the core refers to users by
/// [`UserId`] and resolves records through the directory when a
/// human-facing representation is needed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    /// Directory-assigned identifier.
    pub id: UserId,
    /// Display name.
    pub name: String,
    /// Email address, unique within the directory.
    pub email: String,
    /// Avatar URL, if one was supplied at registration.
    pub avatar: Option<String>,
    /// When the record was created (Unix timestamp).
    pub created_at: i64,
}
