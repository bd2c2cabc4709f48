//! Friend graph management.
//!
//! This module owns the relationship state between users: who is friends
//! with whom, and which friend requests are waiting for an answer.
//!
//! # Architecture
//!
//! ```text
//! FriendGraph (high-level API)
//!     ├── UserDirectory (identity lookups, read-only)
//!     └── ProfileStore (SQLite for relationship state)
//! ```
//!
//! # Invariants
//!
//! - Friendship is symmetric: if B is in A's friend set, A is in B's.
//!   Acceptance commits both sides in one transaction, so the invariant
//!   holds at every point observable between operations.
//! - A pending request queue never contains duplicates, never contains
//!   the owner, and never contains an existing friend.
//! - Requests are consumed exactly once: accepting removes the entry, and
//!   a second acceptance for the same pair fails.
//!
//! # Types
//!
//! - [`Profile`]: a user's relationship snapshot (friends + pending queue)
//! - [`FriendGraph`]: send/accept transitions and graph queries
//! - [`ProfileStore`]: persistent relationship state

mod error;
mod manager;
mod storage;
pub mod types;

pub use error::{GraphError, Result};
pub use manager::FriendGraph;
pub use storage::ProfileStore;
pub use types::Profile;
