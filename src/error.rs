//! Error handling module for pwquality-conf
//!
//! Every failure of a reconciliation pass is fatal to that pass and surfaces
//! as a `PwqualityError`. The caller decides on retry or termination policy.

use std::io;
use std::path::{Path, PathBuf};

use strum::{Display, IntoStaticStr};
use thiserror::Error;

/// Main error type for a reconciliation pass
#[derive(Error, Debug)]
pub enum PwqualityError {
    /// The configuration file does not exist; checked before any read
    #[error("{} does not exist", .path.display())]
    ConfigFileMissing { path: PathBuf },

    /// I/O or decoding error while reading the configuration file
    #[error("Failed to read config file {}: {source}", .path.display())]
    ReadFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O error while replacing the configuration file (original left intact)
    #[error("Failed to write config file {}: {source}", .path.display())]
    WriteFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// I/O error while creating the backup copy (nothing was written)
    #[error("Cannot create backup file {}: {source}", .path.display())]
    BackupFailure {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A desired value cannot be represented on a single line
    #[error("Invalid value for {name}: {reason}")]
    InvalidValue { name: String, reason: String },
}

/// Payload-free discriminant of [`PwqualityError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, IntoStaticStr)]
pub enum ErrorKind {
    ConfigFileMissing,
    ReadFailure,
    WriteFailure,
    BackupFailure,
    InvalidValue,
}

/// Result type alias for pwquality-conf operations
pub type Result<T> = std::result::Result<T, PwqualityError>;

impl PwqualityError {
    /// Create a missing-file error
    pub fn config_file_missing(path: impl AsRef<Path>) -> Self {
        Self::ConfigFileMissing {
            path: path.as_ref().to_path_buf(),
        }
    }

    /// Create a read error
    pub fn read_failure(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::ReadFailure {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a write error
    pub fn write_failure(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::WriteFailure {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create a backup error; `path` is the backup destination
    pub fn backup_failure(path: impl AsRef<Path>, source: io::Error) -> Self {
        Self::BackupFailure {
            path: path.as_ref().to_path_buf(),
            source,
        }
    }

    /// Create an invalid-value error for parameter `name`
    pub fn invalid_value(name: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidValue {
            name: name.into(),
            reason: reason.into(),
        }
    }

    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::ConfigFileMissing { .. } => ErrorKind::ConfigFileMissing,
            Self::ReadFailure { .. } => ErrorKind::ReadFailure,
            Self::WriteFailure { .. } => ErrorKind::WriteFailure,
            Self::BackupFailure { .. } => ErrorKind::BackupFailure,
            Self::InvalidValue { .. } => ErrorKind::InvalidValue,
        }
    }

    /// Path the failed operation was acting on, if it got as far as the filesystem
    pub fn path(&self) -> Option<&Path> {
        match self {
            Self::ConfigFileMissing { path }
            | Self::ReadFailure { path, .. }
            | Self::WriteFailure { path, .. }
            | Self::BackupFailure { path, .. } => Some(path),
            Self::InvalidValue { .. } => None,
        }
    }
}
