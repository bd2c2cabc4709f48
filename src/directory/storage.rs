//! `SQLite` storage for the user directory.

// SQLite operations need to hold the lock for the duration of the operation.
// Dropping the guard earlier would require restructuring all methods.
#![allow(clippy::significant_drop_tightening)]

use std::path::Path;
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection, ErrorCode, OptionalExtension};

use super::error::{DirectoryError, Result};
use super::types::{User, UserId};

/// Bounded wait before a contended store call gives up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// `SQLite`-based user directory.
///
/// Thread-safe wrapper around a `SQLite` connection holding one identity
/// record per user. Lookups are read-only from the graph's perspective;
/// [`UserDirectory::add_user`] is the only mutation.
pub struct UserDirectory {
    conn: Mutex<Connection>,
}

impl UserDirectory {
    /// Creates a directory instance at the given path.
    ///
    /// Creates the database file and tables if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be created or initialized.
    pub fn new(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;
        let directory = Self {
            conn: Mutex::new(conn),
        };
        directory.initialize_schema()?;
        Ok(directory)
    }

    /// Creates an in-memory directory for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be initialized.
    #[cfg(any(test, feature = "test-utils"))]
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let directory = Self {
            conn: Mutex::new(conn),
        };
        directory.initialize_schema()?;
        Ok(directory)
    }

    /// Initializes the database schema.
    fn initialize_schema(&self) -> Result<()> {
        let conn = self.lock_conn()?;

        conn.execute_batch(
            r"
            CREATE TABLE IF NOT EXISTS users (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                name TEXT NOT NULL,
                email TEXT NOT NULL UNIQUE,
                avatar TEXT,
                created_at INTEGER NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    fn lock_conn(&self) -> Result<std::sync::MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| DirectoryError::Storage(format!("Failed to acquire database lock: {e}")))
    }

    /// Registers a new user.
    ///
    /// # Errors
    ///
    /// Returns [`DirectoryError::EmailInUse`] if the email is already
    /// registered, or an error if the database operation fails.
    pub fn add_user(&self, name: &str, email: &str, avatar: Option<&str>) -> Result<User> {
        let conn = self.lock_conn()?;
        let now = chrono::Utc::now().timestamp();

        let inserted = conn.execute(
            r"
            INSERT INTO users (name, email, avatar, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![name, email, avatar, now],
        );

        match inserted {
            Ok(_) => Ok(User {
                id: conn.last_insert_rowid(),
                name: name.to_string(),
                email: email.to_string(),
                avatar: avatar.map(ToString::to_string),
                created_at: now,
            }),
            Err(err) if err.sqlite_error_code() == Some(ErrorCode::ConstraintViolation) => {
                Err(DirectoryError::EmailInUse(email.to_string()))
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Resolves a user by email.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_by_email(&self, email: &str) -> Result<Option<User>> {
        let conn = self.lock_conn()?;

        let user = conn
            .query_row(
                r"
                SELECT id, name, email, avatar, created_at
                FROM users
                WHERE email = ?1
                ",
                params![email],
                Self::row_to_user,
            )
            .optional()?;

        Ok(user)
    }

    /// Resolves a user by id.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn user_by_id(&self, id: UserId) -> Result<Option<User>> {
        let conn = self.lock_conn()?;

        let user = conn
            .query_row(
                r"
                SELECT id, name, email, avatar, created_at
                FROM users
                WHERE id = ?1
                ",
                params![id],
                Self::row_to_user,
            )
            .optional()?;

        Ok(user)
    }

    /// Retrieves all users in directory order (ascending id).
    ///
    /// This is the stable snapshot order the graph uses when listing
    /// candidate friends.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn all_users(&self) -> Result<Vec<User>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r"
            SELECT id, name, email, avatar, created_at
            FROM users
            ORDER BY id
            ",
        )?;

        let users = stmt
            .query_map([], Self::row_to_user)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(users)
    }

    fn row_to_user(row: &rusqlite::Row<'_>) -> rusqlite::Result<User> {
        Ok(User {
            id: row.get(0)?,
            name: row.get(1)?,
            email: row.get(2)?,
            avatar: row.get(3)?,
            created_at: row.get(4)?,
        })
    }
}
