//! Error types for tfindex operations.
//!
//! Errors are categorized into two main types:
//!
//! - **`Error`**: Errors returned to the caller of an index operation (query
//!   misuse, group membership violations, bad configuration)
//! - **`LoadError`**: File-level errors that are collected while loading a
//!   workspace but don't halt the load
//!
//! ## Error Philosophy
//!
//! Parse problems are never errors: they become [`Diagnostic`](crate::Diagnostic)s
//! and the valid parts of a document are still indexed. Only programming
//! errors (asking for a position across all files, adding a file to the wrong
//! group) and infrastructure failures are surfaced as `Error`.

use std::path::PathBuf;
use thiserror::Error;

/// Result type for tfindex operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Top-level error type for tfindex operations.
#[derive(Debug, Error)]
pub enum Error {
    /// A `position` or `name_position` filter was combined with all-files scope.
    ///
    /// A position is only meaningful inside one concrete document.
    #[error("cannot query all files for a position or name position")]
    PositionRequiresFile,

    /// A file index was added to a group for a different directory.
    #[error("invalid index for group ({group}): {file}")]
    NotInGroup {
        /// Directory URI of the group.
        group: String,
        /// URI of the rejected file.
        file: String,
    },

    /// A string could not be interpreted as a URI.
    #[error("invalid URI '{uri}': {reason}")]
    InvalidUri {
        /// The offending input.
        uri: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An exclude pattern is not a valid glob.
    #[error("invalid exclude pattern {pattern:?}: {source}")]
    InvalidGlob {
        /// The offending pattern.
        pattern: String,
        /// The underlying globset error.
        #[source]
        source: globset::Error,
    },

    /// Invalid configuration or arguments
    #[error("configuration error: {0}")]
    Config(String),

    /// File system operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Output could not be serialized
    #[error("serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// A cancellable query observed its cancellation token.
    #[error("operation cancelled")]
    Cancelled,
}

/// Error encountered while loading a specific file into an index.
///
/// These errors are collected during workspace loading but don't halt it.
#[derive(Debug, Clone)]
pub struct LoadError {
    /// Path to the file that failed
    pub path: PathBuf,
    /// Category of the error
    pub kind: LoadErrorKind,
    /// Human-readable error message
    pub message: String,
}

impl std::fmt::Display for LoadError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}: {} ({})",
            self.path.display(),
            self.message,
            self.kind
        )
    }
}

impl std::error::Error for LoadError {}

/// Categorization of load errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorKind {
    /// File content is not valid UTF-8
    EncodingError,

    /// Could not read the file from disk
    IoError,

    /// The path could not be turned into a document URI
    InvalidPath,
}

impl std::fmt::Display for LoadErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EncodingError => write!(f, "encoding error"),
            Self::IoError => write!(f, "I/O error"),
            Self::InvalidPath => write!(f, "invalid path"),
        }
    }
}

impl LoadError {
    /// Create a new load error.
    #[must_use]
    pub fn new(path: PathBuf, kind: LoadErrorKind, message: impl Into<String>) -> Self {
        Self {
            path,
            kind,
            message: message.into(),
        }
    }

    /// Create an encoding error for a file.
    #[must_use]
    pub fn encoding_error(path: PathBuf) -> Self {
        Self::new(path, LoadErrorKind::EncodingError, "file is not valid UTF-8")
    }

    /// Create an I/O error for a file.
    #[must_use]
    pub fn io_error(path: PathBuf, error: &std::io::Error) -> Self {
        Self::new(path, LoadErrorKind::IoError, error.to_string())
    }
}
