//! User directory.
//!
//! The directory is the system of record for user identity: a stable
//! `{id, name, email, avatar}` record per user, looked up by id or by
//! email. The friend graph consumes it read-only; the only mutation is
//! registering a new user, which rejects duplicate emails.
//!
//! Credentials never appear here. The surrounding service authenticates
//! callers and hands the core a resolved user id.

mod error;
mod storage;
pub mod types;

pub use error::{DirectoryError, Result};
pub use storage::UserDirectory;
pub use types::{User, UserId};
