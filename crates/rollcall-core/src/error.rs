//! Core error types for rollcall-core.
//!
//! This module defines the error hierarchy using thiserror. `LedgerError`
//! is the caller-facing taxonomy of the engine; the remaining enums cover
//! the storage, configuration and input-parsing layers around it.

use std::path::PathBuf;

use chrono::{NaiveDate, NaiveTime};
use thiserror::Error;

/// Core error type for rollcall-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Ledger, roster and agenda rule violations
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// Database-related errors
    #[error("Database error: {0}")]
    Database(#[from] DatabaseError),

    /// Configuration-related errors
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Validation errors
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization/deserialization errors
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Deterministic rule violations raised by the engine.
///
/// None of these are retried; each one is scoped to the single
/// operation that produced it.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LedgerError {
    /// The member already has an attendance record for this date
    #[error("member {member_id} already checked in on {date}")]
    DuplicateCheckIn { member_id: String, date: NaiveDate },

    /// Redemption cost exceeds the member's current balance
    #[error("insufficient balance for member {member_id}: has {balance}, needs {requested}")]
    InsufficientBalance {
        member_id: String,
        balance: i64,
        requested: i64,
    },

    /// Points amounts must be strictly positive
    #[error("invalid points amount: {amount} (must be greater than zero)")]
    InvalidAmount { amount: i64 },

    /// Segment end must come after its start
    #[error("invalid segment range: end ({end}) must be after start ({start})")]
    InvalidSegmentRange { start: NaiveTime, end: NaiveTime },

    /// No member with this id exists in the roster
    #[error("member not found: {0}")]
    MemberNotFound(String),
}

/// Database-specific errors.
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Failed to open database connection
    #[error("Failed to open database at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Could not resolve or create the data directory
    #[error("Data directory unavailable: {0}")]
    DataDir(#[source] std::io::Error),

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Migration failed
    #[error("Database migration failed: {0}")]
    MigrationFailed(String),

    /// Database is locked
    #[error("Database is locked")]
    Locked,

    /// A write was rejected by an engine rule enforced in the schema
    #[error(transparent)]
    Rejected(#[from] LedgerError),
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

    /// Invalid configuration value
    #[error("Invalid configuration value for '{key}': {message}")]
    InvalidValue { key: String, message: String },

    /// Key does not exist in the configuration tree
    #[error("Unknown configuration key: {0}")]
    UnknownKey(String),

    /// Failed to parse configuration
    #[error("Failed to parse configuration: {0}")]
    ParseFailed(String),
}

/// Input validation errors.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Time of day not in zero-padded `HH:MM` form
    #[error("Invalid time of day '{0}': expected HH:MM")]
    InvalidTimeOfDay(String),

    /// Calendar date not in `YYYY-MM-DD` form
    #[error("Invalid date '{0}': expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Required text field left empty
    #[error("Field '{0}' must not be empty")]
    EmptyField(&'static str),

    /// Invalid value
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for DatabaseError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(code, _msg) => {
                if code.code == rusqlite::ErrorCode::DatabaseLocked
                    || code.code == rusqlite::ErrorCode::DatabaseBusy
                {
                    DatabaseError::Locked
                } else {
                    DatabaseError::QueryFailed(err.to_string())
                }
            }
            _ => DatabaseError::QueryFailed(err.to_string()),
        }
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
