//! Error types for weightlog.
//!
//! This module defines all error types used throughout the weightlog crate.
//! Most of them never reach the user: the ledger masks storage failures and
//! the entry form turns invalid weights into a message.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for weightlog operations.
#[derive(Error, Debug)]
pub enum Error {
    // === Ledger Errors ===
    /// The weight input is missing, empty, or not a positive finite number.
    #[error("Valor de peso inválido: {input:?}")]
    InvalidWeight {
        /// The raw input as received.
        input: String,
    },

    /// An import file was rejected.
    #[error("import rejected: {message}")]
    Import {
        /// Description of the rejected record.
        message: String,
    },

    // === Storage Errors ===
    /// Failed to open or create the database.
    #[error("failed to open database at {path}: {source}")]
    DatabaseOpen {
        /// Path to the database file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: rusqlite::Error,
    },

    /// A database query failed.
    #[error("database query failed: {0}")]
    DatabaseQuery(#[from] rusqlite::Error),

    /// Failed to run database migrations.
    #[error("database migration failed: {message}")]
    DatabaseMigration {
        /// Description of what went wrong.
        message: String,
    },

    /// A key-value store rejected an operation.
    #[error("storage error: {0}")]
    Storage(String),

    // === Configuration Errors ===
    /// Failed to load configuration.
    #[error("failed to load configuration: {0}")]
    ConfigLoad(Box<figment::Error>),

    /// Configuration validation failed.
    #[error("invalid configuration: {message}")]
    ConfigValidation {
        /// Description of the validation failure.
        message: String,
    },

    // === I/O Errors ===
    /// Failed to create a required directory.
    #[error("failed to create directory {path}: {source}")]
    DirectoryCreate {
        /// Path that couldn't be created.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Serialization Errors ===
    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// A specialized Result type for weightlog operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create an invalid weight error for the given raw input.
    #[must_use]
    pub fn invalid_weight(input: impl Into<String>) -> Self {
        Self::InvalidWeight {
            input: input.into(),
        }
    }

    /// Create a new storage error.
    #[must_use]
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage(message.into())
    }

    /// Create a new import error.
    #[must_use]
    pub fn import(message: impl Into<String>) -> Self {
        Self::Import {
            message: message.into(),
        }
    }

    /// Check if this error is a rejected weight value.
    #[must_use]
    pub fn is_invalid_weight(&self) -> bool {
        matches!(self, Self::InvalidWeight { .. })
    }

    /// Check if this error came from the persistence layer.
    #[must_use]
    pub fn is_storage_error(&self) -> bool {
        matches!(
            self,
            Self::DatabaseOpen { .. }
                | Self::DatabaseQuery(_)
                | Self::DatabaseMigration { .. }
                | Self::Storage(_)
                | Self::DirectoryCreate { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_weight_display() {
        let err = Error::invalid_weight("abc");
        let msg = err.to_string();
        assert!(msg.contains("Valor de peso inválido"));
        assert!(msg.contains("abc"));
    }

    #[test]
    fn test_is_invalid_weight() {
        assert!(Error::invalid_weight("").is_invalid_weight());
        assert!(!Error::storage("quota exceeded").is_invalid_weight());
    }

    #[test]
    fn test_is_storage_error() {
        assert!(Error::storage("quota exceeded").is_storage_error());
        assert!(!Error::invalid_weight("x").is_storage_error());
        assert!(!Error::import("bad record").is_storage_error());
    }

    #[test]
    fn test_storage_error_display() {
        let err = Error::storage("quota exceeded");
        assert_eq!(err.to_string(), "storage error: quota exceeded");
    }

    #[test]
    fn test_import_error_display() {
        let err = Error::import("record 3 has no date");
        assert_eq!(err.to_string(), "import rejected: record 3 has no date");
    }

    #[test]
    fn test_from_json_error() {
        let json_result: std::result::Result<i32, serde_json::Error> =
            serde_json::from_str("not valid json");
        if let Err(json_err) = json_result {
            let err: Error = json_err.into();
            assert!(matches!(err, Error::Json(_)));
        }
    }

    #[test]
    fn test_from_rusqlite_error() {
        let result = rusqlite::Connection::open_with_flags(
            "/nonexistent/path/db.sqlite",
            rusqlite::OpenFlags::SQLITE_OPEN_READ_ONLY,
        );
        if let Err(sqlite_err) = result {
            let err: Error = sqlite_err.into();
            assert!(matches!(err, Error::DatabaseQuery(_)));
            assert!(err.is_storage_error());
        }
    }

    #[test]
    fn test_config_validation_error_display() {
        let err = Error::ConfigValidation {
            message: "cooldown_hours must be greater than 0".to_string(),
        };
        assert!(err.to_string().contains("cooldown_hours"));
    }

    #[test]
    fn test_directory_create_error_display() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = Error::DirectoryCreate {
            path: PathBuf::from("/root/forbidden"),
            source: io_err,
        };
        assert!(err.to_string().contains("/root/forbidden"));
    }
}
