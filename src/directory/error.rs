//! Error types for directory operations.

use rusqlite::ErrorCode;
use thiserror::Error;

/// Error type for directory operations.
#[derive(Error, Debug)]
pub enum DirectoryError {
    /// Email address is already registered.
    #[error("Email already registered: {0}")]
    EmailInUse(String),

    /// Database error from `SQLite`.
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// The store did not respond within its bounded timeout.
    #[error("Directory store unavailable: {0}")]
    Unavailable(String),

    /// Storage operation failed.
    #[error("Storage error: {0}")]
    Storage(String),
}

impl DirectoryError {
    /// Stable machine-readable kind for the service layer.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::EmailInUse(_) => "email_in_use",
            Self::Database(_) => "database",
            Self::Unavailable(_) => "store_unavailable",
            Self::Storage(_) => "storage",
        }
    }

    /// Whether the caller may retry the operation.
    ///
    /// Only transient store failures are retryable; every precondition
    /// failure reports the same outcome on retry.
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::Unavailable(_))
    }
}

// Busy and locked are the bounded-timeout expiry cases and surface as
// Unavailable so the caller can distinguish transient store trouble from
// precondition failures.
impl From<rusqlite::Error> for DirectoryError {
    fn from(err: rusqlite::Error) -> Self {
        match err.sqlite_error_code() {
            Some(ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked) => {
                Self::Unavailable(err.to_string())
            }
            _ => Self::Database(err),
        }
    }
}

/// Result type alias for directory operations.
pub type Result<T> = std::result::Result<T, DirectoryError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn email_in_use_display() {
        let err = DirectoryError::EmailInUse("bob@example.com".to_string());
        assert_eq!(
            err.to_string(),
            "Email already registered: bob@example.com"
        );
    }

    #[test]
    fn unavailable_display() {
        let err = DirectoryError::Unavailable("database is locked".to_string());
        assert_eq!(
            err.to_string(),
            "Directory store unavailable: database is locked"
        );
    }

    #[test]
    fn storage_display() {
        let err = DirectoryError::Storage("lock poisoned".to_string());
        assert_eq!(err.to_string(), "Storage error: lock poisoned");
    }

    #[test]
    fn kinds_are_stable() {
        assert_eq!(
            DirectoryError::EmailInUse(String::new()).kind(),
            "email_in_use"
        );
        assert_eq!(
            DirectoryError::Unavailable(String::new()).kind(),
            "store_unavailable"
        );
    }

    #[test]
    fn only_unavailable_is_retryable() {
        assert!(DirectoryError::Unavailable(String::new()).is_retryable());
        assert!(!DirectoryError::EmailInUse(String::new()).is_retryable());
        assert!(!DirectoryError::Storage(String::new()).is_retryable());
    }

    #[test]
    fn generic_sqlite_error_maps_to_database() {
        let err = DirectoryError::from(rusqlite::Error::InvalidQuery);
        assert!(matches!(err, DirectoryError::Database(_)));
    }
}
