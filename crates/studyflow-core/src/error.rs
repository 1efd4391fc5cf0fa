//! Core error types for studyflow-core.
//!
//! This module defines the error hierarchy using thiserror
//! for error handling and reporting across the library.

use chrono::NaiveDate;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for studyflow-core.
#[derive(Error, Debug)]
pub enum CoreError {
    /// Scheduling errors
    #[error("Scheduler error: {0}")]
    Scheduler(#[from] SchedulerError),

    /// Store-related errors
    #[error("Store error: {0}")]
    Store(#[from] StoreError),

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

    /// Generic errors with context
    #[error("{0}")]
    Custom(String),
}

/// Errors produced by the study scheduler.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SchedulerError {
    /// The assignment is already overdue relative to the reference date
    #[error("Due date {due} is in the past (today is {today})")]
    PastDueDate { due: NaiveDate, today: NaiveDate },

    /// The assignment carries values the scheduler cannot work with
    #[error("Invalid assignment field '{field}': {message}")]
    InvalidAssignment { field: String, message: String },
}

/// Store-specific errors.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Failed to open the store
    #[error("Failed to open store at {path}: {source}")]
    OpenFailed {
        path: PathBuf,
        #[source]
        source: rusqlite::Error,
    },

    /// Query execution failed
    #[error("Query failed: {0}")]
    QueryFailed(String),

    /// Schema migration failed
    #[error("Store migration failed: {0}")]
    MigrationFailed(String),

    /// A unique username or email is already taken
    #[error("Duplicate {field}: '{value}' already exists")]
    Duplicate { field: &'static str, value: String },

    /// No record found for the given key
    #[error("No {kind} found for '{key}'")]
    NotFound { kind: &'static str, key: String },

    /// Credential verification failed
    #[error("Invalid credentials for '{email}'")]
    InvalidCredentials { email: String },

    /// No user is currently logged in
    #[error("No active session")]
    NoSession,

    /// Store is locked by another connection
    #[error("Store is locked")]
    Locked,
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
}

/// Validation errors for account fields.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ValidationError {
    /// Username does not meet format requirements
    #[error("Invalid username: {0}")]
    InvalidUsername(String),

    /// Email fails the syntactic check
    #[error("Invalid email: {0}")]
    InvalidEmail(String),

    /// Password does not meet strength requirements
    #[error("Invalid password: {0}")]
    InvalidPassword(String),

    /// Invalid value for an arbitrary field
    #[error("Invalid value for '{field}': {message}")]
    InvalidValue { field: String, message: String },
}

impl From<rusqlite::Error> for StoreError {
    fn from(err: rusqlite::Error) -> Self {
        match &err {
            rusqlite::Error::SqliteFailure(err, _msg) => {
                if err.code == rusqlite::ErrorCode::DatabaseLocked {
                    StoreError::Locked
                } else {
                    StoreError::QueryFailed(err.to_string())
                }
            }
            _ => StoreError::QueryFailed(err.to_string()),
        }
    }
}

impl From<rusqlite::Error> for CoreError {
    fn from(err: rusqlite::Error) -> Self {
        CoreError::Store(StoreError::from(err))
    }
}

/// Result type alias for CoreError
pub type Result<T, E = CoreError> = std::result::Result<T, E>;
