//! `SQLite` storage for relationship state.
//!
//! Friendships are stored as one row per direction so that "who are X's
//! friends" is a single indexed scan for either endpoint; acceptance
//! writes both rows inside one transaction, which is what keeps the
//! symmetry invariant true under partial failure. Pending requests live
//! on the target's side with a uniqueness constraint per (target, sender)
//! pair, so a duplicate request is structurally impossible rather than a
//! remembered check.

// SQLite operations need to hold the lock for the duration of the operation.
// Dropping the guard earlier would require restructuring all methods.
#![allow(clippy::significant_drop_tightening)]

use std::collections::BTreeSet;
use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection};

use super::error::{GraphError, Result};
use crate::directory::UserId;

/// Bounded wait before a contended store call gives up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// `SQLite`-based store for friendships and pending requests.
pub struct ProfileStore {
    conn: Mutex<Connection>,
}

impl ProfileStore {
    /// Creates a store instance at the given path.
    ///
    /// Creates the database file and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or initialized.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Creates an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let store = Self {
            conn: Mutex::new(conn),
        };
        store.initialize_schema()?;
        Ok(store)
    }

    /// Initializes the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        conn.execute_batch(
            r"
            -- One row per direction; acceptance writes both in one transaction.
            CREATE TABLE IF NOT EXISTS friendships (
                user_id INTEGER NOT NULL,
                friend_id INTEGER NOT NULL,
                created_at INTEGER NOT NULL,
                PRIMARY KEY (user_id, friend_id)
            );

            -- Incoming requests, stored on the target's side.
            CREATE TABLE IF NOT EXISTS friend_requests (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                target_id INTEGER NOT NULL,
                sender_id INTEGER NOT NULL,
                requested_at INTEGER NOT NULL,
                UNIQUE (target_id, sender_id)
            );
            ",
        )?;

        Ok(())
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| GraphError::Storage(format!("Failed to acquire database lock: {e}")))
    }

    /// Returns the friend set of a user.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn friends_of(&self, user: UserId) -> Result<BTreeSet<UserId>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r"
            SELECT friend_id FROM friendships WHERE user_id = ?1
            ",
        )?;

        let friends = stmt
            .query_map(params![user], |row| row.get(0))?
            .collect::<std::result::Result<BTreeSet<_>, _>>()?;

        Ok(friends)
    }

    /// Whether `a` and `b` are friends.
    ///
    /// A single indexed point lookup; symmetry means either direction
    /// answers the question.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn is_friend(&self, a: UserId, b: UserId) -> Result<bool> {
        let conn = self.lock_conn()?;

        let found = conn.query_row(
            r"
            SELECT EXISTS(
                SELECT 1 FROM friendships WHERE user_id = ?1 AND friend_id = ?2
            )
            ",
            params![a, b],
            |row| row.get(0),
        )?;

        Ok(found)
    }

    /// Returns a user's incoming requests, most recent first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn pending_requests(&self, target: UserId) -> Result<Vec<UserId>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r"
            SELECT sender_id FROM friend_requests
            WHERE target_id = ?1
            ORDER BY id DESC
            ",
        )?;

        let senders = stmt
            .query_map(params![target], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(senders)
    }

    /// Whether a request from `sender` is waiting on `target`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn has_request(&self, target: UserId, sender: UserId) -> Result<bool> {
        let conn = self.lock_conn()?;

        let found = conn.query_row(
            r"
            SELECT EXISTS(
                SELECT 1 FROM friend_requests WHERE target_id = ?1 AND sender_id = ?2
            )
            ",
            params![target, sender],
            |row| row.get(0),
        )?;

        Ok(found)
    }

    /// Records an incoming request on the target's queue.
    ///
    /// Returns `false` if an identical request was already waiting. The
    /// uniqueness constraint makes the insert an atomic add-if-absent, so
    /// two concurrent sends of the same request cannot both succeed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn push_request(&self, target: UserId, sender: UserId) -> Result<bool> {
        let conn = self.lock_conn()?;
        let now = chrono::Utc::now().timestamp();

        let inserted = conn.execute(
            r"
            INSERT OR IGNORE INTO friend_requests (target_id, sender_id, requested_at)
            VALUES (?1, ?2, ?3)
            ",
            params![target, sender, now],
        )?;

        Ok(inserted > 0)
    }

    /// Consumes a pending request and links both users as friends.
    ///
    /// Runs as one transaction: the request row is removed and both
    /// friendship directions are written, or nothing changes at all. A
    /// reverse-direction request between the same pair is consumed too,
    /// keeping the pending queue disjoint from the friend set.
    ///
    /// Returns `false` (and changes nothing) if no request from
    /// `requester` is waiting on `accepter`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn accept_request(&self, accepter: UserId, requester: UserId) -> Result<bool> {
        let mut conn = self.lock_conn()?;
        let now = chrono::Utc::now().timestamp();

        let tx = conn.transaction()?;

        let removed = tx.execute(
            r"
            DELETE FROM friend_requests WHERE target_id = ?1 AND sender_id = ?2
            ",
            params![accepter, requester],
        )?;
        if removed == 0 {
            return Ok(false);
        }

        tx.execute(
            r"
            DELETE FROM friend_requests WHERE target_id = ?1 AND sender_id = ?2
            ",
            params![requester, accepter],
        )?;

        tx.execute(
            r"
            INSERT OR IGNORE INTO friendships (user_id, friend_id, created_at)
            VALUES (?1, ?2, ?3)
            ",
            params![accepter, requester, now],
        )?;
        tx.execute(
            r"
            INSERT OR IGNORE INTO friendships (user_id, friend_id, created_at)
            VALUES (?1, ?2, ?3)
            ",
            params![requester, accepter, now],
        )?;

        tx.commit()?;
        Ok(true)
    }
}
