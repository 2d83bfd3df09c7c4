//! Error types for the glob tail library.

use std::path::PathBuf;
use thiserror::Error;

/// The main error type for watcher construction and lifecycle operations.
///
/// Nothing that happens inside a running poll loop is reported through this
/// type; see [`PollError`] for those conditions.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O errors outside the poll loop.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The fixed path to follow does not exist.
    #[error("File not found: {}", .path.display())]
    NotFound { path: PathBuf },

    /// The fixed path exists but cannot be opened for reading.
    #[error("File is not readable: {}: {source}", .path.display())]
    NotReadable {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The fixed path names a directory.
    #[error("Path is a directory: {}", .path.display())]
    IsDirectory { path: PathBuf },

    /// The glob pattern could not be compiled.
    #[error("Invalid glob pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        source: glob::PatternError,
    },

    /// The poll interval must be greater than zero.
    #[error("Poll interval must be greater than zero")]
    InvalidInterval,

    /// `start` was called on a watcher that is already running.
    #[error("Watcher already started")]
    AlreadyStarted,

    /// `start` was called on a watcher that has been stopped.
    #[error("Watcher has been stopped and cannot be restarted")]
    Stopped,
}

impl Error {
    /// Whether this error was raised while validating a fixed path.
    pub fn is_construction_error(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. } | Error::NotReadable { .. } | Error::IsDirectory { .. }
        )
    }
}

/// A convenient Result type for glob tail operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Conditions observed inside a poll loop.
///
/// These never terminate the loop on their own (except a callback failure
/// under [`CallbackPolicy::Abort`](crate::CallbackPolicy::Abort)); they are
/// logged and handed to the watcher's error hook, if one is installed.
#[derive(Error, Debug)]
pub enum PollError {
    /// The file could not be opened for lack of permission; it is retried next cycle.
    #[error("Permission denied, skipping this cycle: {}", .path.display())]
    SkippedPermission { path: PathBuf },

    /// The file vanished or failed to read; its offset is kept for the next cycle.
    #[error("Read failed, skipping this cycle: {}: {source}", .path.display())]
    SkippedTransient {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The line callback returned an error or panicked.
    #[error("Callback failed for line from {}: {reason}", .path.display())]
    Callback { path: PathBuf, reason: String },
}

impl PollError {
    /// The file the condition was observed on.
    pub fn path(&self) -> &std::path::Path {
        match self {
            PollError::SkippedPermission { path }
            | PollError::SkippedTransient { path, .. }
            | PollError::Callback { path, .. } => path,
        }
    }
}
