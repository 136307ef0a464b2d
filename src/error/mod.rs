//! # Error Module
//!
//! Error types for the file organizer.
//!
//! ## Design Principles
//! - **Setup errors are fatal** - a bad base or watch path stops construction
//! - **Per-file errors are not** - they become `OrganizeOutcome::Failed`
//! - **Include context** - paths and the underlying OS error
//! - **Classify move failures** - the pipeline switches on [`MoveErrorKind`]

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Top-level application error
#[derive(Error, Debug)]
pub enum OrganizerError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Scanning error: {0}")]
    Scan(#[from] ScanError),

    #[error("Watcher error: {0}")]
    Watcher(#[from] WatcherError),

    #[error("Category error: {0}")]
    Category(#[from] CategoryError),

    #[error("Logging error: {0}")]
    Logging(#[from] LoggingError),
}

/// Invalid base/watch path or missing default folder
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Path does not exist: {path}")]
    PathNotFound { path: PathBuf },

    #[error("Path is not a directory: {path}")]
    NotADirectory { path: PathBuf },

    #[error("Default Downloads folder not found: {path}. Please specify a custom path using --path")]
    DownloadsNotFound { path: PathBuf },
}

/// Errors that occur while enumerating a directory
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Failed to read directory {path}: {source}")]
    ReadDirectory {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// How a failed move should be treated by the retry loop
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveErrorKind {
    /// Permission-style failure, usually another process holding the file
    Locked,
    /// Source and destination live on different devices
    CrossDevice,
    /// Any other OS failure (disk full, vanished source, ...)
    Other,
}

impl MoveErrorKind {
    /// Classify an I/O error raised while creating folders or renaming
    pub fn classify(error: &io::Error) -> Self {
        if error.kind() == io::ErrorKind::PermissionDenied {
            return MoveErrorKind::Locked;
        }

        // ERROR_SHARING_VIOLATION / ERROR_LOCK_VIOLATION
        #[cfg(windows)]
        if matches!(error.raw_os_error(), Some(32) | Some(33)) {
            return MoveErrorKind::Locked;
        }

        // EXDEV
        #[cfg(unix)]
        if error.raw_os_error() == Some(18) {
            return MoveErrorKind::CrossDevice;
        }

        MoveErrorKind::Other
    }

    /// Whether the retry loop should try again
    pub fn is_retryable(&self) -> bool {
        matches!(self, MoveErrorKind::Locked)
    }
}

/// A single failed move attempt
#[derive(Error, Debug)]
#[error("Failed to move {source_path} to {destination}: {io}")]
pub struct MoveError {
    pub kind: MoveErrorKind,
    pub source_path: PathBuf,
    pub destination: PathBuf,
    #[source]
    pub io: io::Error,
}

impl MoveError {
    pub fn new(source_path: PathBuf, destination: PathBuf, io: io::Error) -> Self {
        Self {
            kind: MoveErrorKind::classify(&io),
            source_path,
            destination,
            io,
        }
    }
}

/// Errors that occur while setting up the folder watcher
#[derive(Error, Debug)]
pub enum WatcherError {
    #[error("Failed to initialize watcher: {0}")]
    InitFailed(String),

    #[error("Failed to watch {path}: {reason}")]
    WatchFailed { path: PathBuf, reason: String },

    #[error("Watcher is already running")]
    AlreadyRunning,

    #[error("Failed to listen for Ctrl+C: {0}")]
    Interrupt(String),
}

/// Errors loading custom category definitions
#[derive(Error, Debug)]
pub enum CategoryError {
    #[error("Failed to read category file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Invalid category file {path}: {reason}")]
    Parse { path: PathBuf, reason: String },

    #[error("Category label must not be empty")]
    EmptyLabel,
}

/// Errors installing the tracing subscriber
#[derive(Error, Debug)]
pub enum LoggingError {
    #[error("Failed to open log file {path}: {source}")]
    OpenLogFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("A global tracing subscriber is already installed")]
    AlreadyInitialized,
}

/// Convenience Result type alias
pub type Result<T> = std::result::Result<T, OrganizerError>;
