//! Core error types for geekfit-core.
//!
//! One hierarchy built with thiserror. Validation failures are raised before
//! any state is touched; storage failures abort the whole mutation.

use std::path::PathBuf;
use thiserror::Error;

use crate::model::ExerciseId;

/// Core error type for geekfit-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Input rejected before any mutation
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// Storage collaborator failed; the mutation was rolled back
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Reps must be a positive count
    #[error("reps must be positive, got {reps}")]
    NonPositiveReps { reps: i64 },

    /// Exercise id not present in the catalog
    #[error("unknown exercise id {0}")]
    UnknownExercise(ExerciseId),

    /// No exercise name matched a lookup
    #[error("no exercise found matching '{0}'")]
    NoMatchingExercise(String),

    /// Exercise name already taken
    #[error("exercise '{0}' already exists")]
    DuplicateExercise(String),

    /// Reminder category name not recognised
    #[error("unknown reminder category '{0}'")]
    UnknownCategory(String),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

/// Storage collaborator errors.
#[derive(Error, Debug)]
pub enum StorageError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A stored row could not be decoded
    #[error("Corrupt {table} row: {message}")]
    Corrupt { table: &'static str, message: String },

    /// Backend refused the write (used by in-memory stores and fakes)
    #[error("Storage unavailable: {0}")]
    Unavailable(String),
}

/// Configuration-specific errors.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to load configuration
    #[error("Failed to load configuration from {path}: {message}")]
    LoadFailed { path: PathBuf, message: String },

    /// Failed to save configuration
    #[error("Failed to save configuration to {path}: {message}")]
    SaveFailed { path: PathBuf, message: String },

    /// Key does not exist in the configuration tree
    #[error("unknown config key: {0}")]
    UnknownKey(String),

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Failed to determine the data directory
    #[error("Could not determine data directory: {0}")]
    DataDir(String),
}

impl From<rusqlite::Error> for StorageError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(inner, _msg) => {
                if inner.code == rusqlite::ErrorCode::DatabaseLocked {
                    StorageError::Locked
                } else {
                    StorageError::QueryFailed(err.to_string())
                }
            }
            _ => StorageError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_messages_name_the_input() {
        let err = CoreError::from(ValidationError::NonPositiveReps { reps: -3 });
        assert_eq!(err.to_string(), "Validation error: reps must be positive, got -3");

        let err = CoreError::from(ValidationError::UnknownExercise(42));
        assert!(err.to_string().contains("42"));
    }

    #[test]
    fn rusqlite_errors_map_to_query_failed() {
        let err = StorageError::from(rusqlite::Error::QueryReturnedNoRows);
        assert!(matches!(err, StorageError::QueryFailed(_)));
    }
}
