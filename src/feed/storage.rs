//! `SQLite` storage for posts, likes, and comments.
//!
//! The like set's uniqueness is a primary-key constraint per
//! (post, user) pair: inserting a like is an atomic add-if-absent, so a
//! raced double-like cannot produce duplicate entries. Comments and
//! likes are removed by identity (comment id, liker id), never by a
//! recomputed position.

// SQLite operations need to hold the lock for the duration of the operation.
// Dropping the guard earlier would require restructuring all methods.
#![allow(clippy::significant_drop_tightening)]

use std::path::Path;
use std::sync::{Mutex, MutexGuard};
use std::time::Duration;

use rusqlite::{params, Connection, OptionalExtension};

use super::error::{FeedError, Result};
use super::types::{Comment, CommentId, Post, PostId, PostPrivacy};
use crate::directory::UserId;

/// Bounded wait before a contended store call gives up.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// `SQLite`-based store for posts and their engagement state.
pub struct PostStore {
    conn: Mutex<Connection>,
}

impl PostStore {
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
            CREATE TABLE IF NOT EXISTS posts (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                author_id INTEGER NOT NULL,
                body TEXT NOT NULL,
                privacy TEXT NOT NULL DEFAULT 'public',
                created_at INTEGER NOT NULL
            );

            -- Like set; the primary key makes duplicates impossible.
            CREATE TABLE IF NOT EXISTS post_likes (
                post_id INTEGER NOT NULL,
                user_id INTEGER NOT NULL,
                liked_at INTEGER NOT NULL,
                PRIMARY KEY (post_id, user_id)
            );

            CREATE TABLE IF NOT EXISTS post_comments (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                post_id INTEGER NOT NULL,
                author_id INTEGER NOT NULL,
                body TEXT NOT NULL,
                created_at INTEGER NOT NULL
            );
            ",
        )?;

        Ok(())
    }

    fn lock_conn(&self) -> Result<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|e| FeedError::Storage(format!("Failed to acquire database lock: {e}")))
    }

    // ==================== Post Operations ====================

    /// Inserts a new post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn insert_post(&self, author: UserId, text: &str, privacy: PostPrivacy) -> Result<Post> {
        let conn = self.lock_conn()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            r"
            INSERT INTO posts (author_id, body, privacy, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![author, text, privacy.as_str(), now],
        )?;

        Ok(Post {
            id: conn.last_insert_rowid(),
            author,
            text: text.to_string(),
            privacy,
            created_at: now,
            likes: Vec::new(),
            comments: Vec::new(),
        })
    }

    /// Retrieves a post with its likes and comments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn post_by_id(&self, id: PostId) -> Result<Option<Post>> {
        let conn = self.lock_conn()?;

        let row = conn
            .query_row(
                r"
                SELECT id, author_id, body, privacy, created_at
                FROM posts
                WHERE id = ?1
                ",
                params![id],
                Self::row_to_post_shell,
            )
            .optional()?;

        match row {
            Some(mut post) => {
                post.likes = Self::likes_for(&conn, post.id)?;
                post.comments = Self::comments_for(&conn, post.id)?;
                Ok(Some(post))
            }
            None => Ok(None),
        }
    }

    /// Retrieves all posts, most recent first, each with its likes and
    /// comments.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn all_posts(&self) -> Result<Vec<Post>> {
        let conn = self.lock_conn()?;

        let mut stmt = conn.prepare(
            r"
            SELECT id, author_id, body, privacy, created_at
            FROM posts
            ORDER BY id DESC
            ",
        )?;

        let shells = stmt
            .query_map([], Self::row_to_post_shell)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        let mut posts = Vec::with_capacity(shells.len());
        for mut post in shells {
            post.likes = Self::likes_for(&conn, post.id)?;
            post.comments = Self::comments_for(&conn, post.id)?;
            posts.push(post);
        }

        Ok(posts)
    }

    /// Whether a post with this id exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn post_exists(&self, id: PostId) -> Result<bool> {
        let conn = self.lock_conn()?;

        let found = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM posts WHERE id = ?1)",
            params![id],
            |row| row.get(0),
        )?;

        Ok(found)
    }

    /// Deletes a post along with its likes and comments.
    ///
    /// Returns `false` if no post with that id existed.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_post(&self, id: PostId) -> Result<bool> {
        let mut conn = self.lock_conn()?;

        let tx = conn.transaction()?;
        tx.execute("DELETE FROM post_likes WHERE post_id = ?1", params![id])?;
        tx.execute("DELETE FROM post_comments WHERE post_id = ?1", params![id])?;
        let removed = tx.execute("DELETE FROM posts WHERE id = ?1", params![id])?;
        tx.commit()?;

        Ok(removed > 0)
    }

    // ==================== Like Operations ====================

    /// Adds a like if the user has not liked the post yet.
    ///
    /// Returns `false` if the like was already present.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_like(&self, post_id: PostId, user: UserId) -> Result<bool> {
        let conn = self.lock_conn()?;
        let now = chrono::Utc::now().timestamp();

        let inserted = conn.execute(
            r"
            INSERT OR IGNORE INTO post_likes (post_id, user_id, liked_at)
            VALUES (?1, ?2, ?3)
            ",
            params![post_id, user, now],
        )?;

        Ok(inserted > 0)
    }

    /// Removes a user's like from a post.
    ///
    /// Returns `false` if the user had not liked the post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn remove_like(&self, post_id: PostId, user: UserId) -> Result<bool> {
        let conn = self.lock_conn()?;

        let removed = conn.execute(
            "DELETE FROM post_likes WHERE post_id = ?1 AND user_id = ?2",
            params![post_id, user],
        )?;

        Ok(removed > 0)
    }

    /// Returns who liked a post, in the order they liked it.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn likes_of(&self, post_id: PostId) -> Result<Vec<UserId>> {
        let conn = self.lock_conn()?;
        Self::likes_for(&conn, post_id)
    }

    // ==================== Comment Operations ====================

    /// Appends a comment to a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn add_comment(&self, post_id: PostId, author: UserId, text: &str) -> Result<Comment> {
        let conn = self.lock_conn()?;
        let now = chrono::Utc::now().timestamp();

        conn.execute(
            r"
            INSERT INTO post_comments (post_id, author_id, body, created_at)
            VALUES (?1, ?2, ?3, ?4)
            ",
            params![post_id, author, text, now],
        )?;

        Ok(Comment {
            id: conn.last_insert_rowid(),
            author,
            text: text.to_string(),
            created_at: now,
        })
    }

    /// Retrieves a single comment on a post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn comment(&self, post_id: PostId, comment_id: CommentId) -> Result<Option<Comment>> {
        let conn = self.lock_conn()?;

        let comment = conn
            .query_row(
                r"
                SELECT id, author_id, body, created_at
                FROM post_comments
                WHERE id = ?1 AND post_id = ?2
                ",
                params![comment_id, post_id],
                Self::row_to_comment,
            )
            .optional()?;

        Ok(comment)
    }

    /// Deletes a comment by its id.
    ///
    /// Removal targets the comment entity itself: two comments by the
    /// same author on the same post are distinct rows, and deleting one
    /// never touches the other.
    ///
    /// Returns `false` if no such comment existed on that post.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn delete_comment(&self, post_id: PostId, comment_id: CommentId) -> Result<bool> {
        let conn = self.lock_conn()?;

        let removed = conn.execute(
            "DELETE FROM post_comments WHERE id = ?1 AND post_id = ?2",
            params![comment_id, post_id],
        )?;

        Ok(removed > 0)
    }

    /// Returns a post's comments, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn comments_of(&self, post_id: PostId) -> Result<Vec<Comment>> {
        let conn = self.lock_conn()?;
        Self::comments_for(&conn, post_id)
    }

    // ==================== Row Helpers ====================

    fn row_to_post_shell(row: &rusqlite::Row<'_>) -> rusqlite::Result<Post> {
        let privacy_str: String = row.get(3)?;
        let privacy = PostPrivacy::parse(&privacy_str).ok_or_else(|| {
            rusqlite::Error::FromSqlConversionFailure(
                3,
                rusqlite::types::Type::Text,
                format!("invalid privacy value: {privacy_str}").into(),
            )
        })?;

        Ok(Post {
            id: row.get(0)?,
            author: row.get(1)?,
            text: row.get(2)?,
            privacy,
            created_at: row.get(4)?,
            likes: Vec::new(),
            comments: Vec::new(),
        })
    }

    fn likes_for(conn: &Connection, post_id: PostId) -> Result<Vec<UserId>> {
        let mut stmt = conn.prepare(
            r"
            SELECT user_id FROM post_likes
            WHERE post_id = ?1
            ORDER BY rowid
            ",
        )?;

        let likes = stmt
            .query_map(params![post_id], |row| row.get(0))?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(likes)
    }

    fn comments_for(conn: &Connection, post_id: PostId) -> Result<Vec<Comment>> {
        let mut stmt = conn.prepare(
            r"
            SELECT id, author_id, body, created_at
            FROM post_comments
            WHERE post_id = ?1
            ORDER BY id DESC
            ",
        )?;

        let comments = stmt
            .query_map(params![post_id], Self::row_to_comment)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        Ok(comments)
    }

    fn row_to_comment(row: &rusqlite::Row<'_>) -> rusqlite::Result<Comment> {
        Ok(Comment {
            id: row.get(0)?,
            author: row.get(1)?,
            text: row.get(2)?,
            created_at: row.get(3)?,
        })
    }
}
