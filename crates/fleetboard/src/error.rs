//! Error types for fleetboard.
//!
//! This module defines all error types used throughout the fleetboard crate,
//! providing detailed context for debugging and user-friendly error messages.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for fleetboard operations.
#[derive(Error, Debug)]
pub enum Error {
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

    // === Fleet File Errors ===
    /// The fleet file could not be read.
    #[error("failed to read fleet file {path}: {source}")]
    FleetRead {
        /// Path to the fleet file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    /// The fleet file is not valid JSON or has the wrong shape.
    #[error("failed to parse fleet file {path}: {source}")]
    FleetParse {
        /// Path to the fleet file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: serde_json::Error,
    },

    /// The fleet file could not be written.
    #[error("failed to write fleet file {path}: {source}")]
    FleetWrite {
        /// Path to the fleet file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Activity Log Errors ===
    /// Reading or writing the activity log failed.
    #[error("activity log error at {path}: {source}")]
    ActivityLog {
        /// Path to the activity log file.
        path: PathBuf,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === Admin Edit Errors ===
    /// A rename would give two trucks the same id.
    #[error("truck id '{id}' is already in use")]
    DuplicateTruckId {
        /// The colliding id.
        id: String,
    },

    // === Server Errors ===
    /// Failed to bind the HTTP listener.
    #[error("failed to bind {addr}: {source}")]
    Bind {
        /// The address that could not be bound.
        addr: String,
        /// The underlying error.
        #[source]
        source: std::io::Error,
    },

    // === I/O Errors ===
    /// File system operation failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

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

/// A specialized Result type for fleetboard operations.
pub type Result<T> = std::result::Result<T, Error>;

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Self::ConfigLoad(Box::new(err))
    }
}

impl Error {
    /// Create a duplicate truck id error.
    #[must_use]
    pub fn duplicate_truck_id(id: impl Into<String>) -> Self {
        Self::DuplicateTruckId { id: id.into() }
    }

    /// Create an activity log error for the given path.
    #[must_use]
    pub fn activity_log(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::ActivityLog {
            path: path.into(),
            source,
        }
    }

    /// Check if this error was caused by invalid user input rather than
    /// by the environment.
    #[must_use]
    pub fn is_validation_error(&self) -> bool {
        matches!(self, Self::DuplicateTruckId { .. })
    }
}
