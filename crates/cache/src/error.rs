//! Error types for the cache crate

// Rust 1.92 compiler bug: false positives for thiserror/miette derive macro fields
// https://github.com/rust-lang/rust/issues/147648
#![allow(unused_assignments)]

use miette::Diagnostic;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Error type for cache operations
#[derive(Error, Debug, Diagnostic)]
pub enum Error {
    /// No valid entry exists for the URL (absent, or expired and just removed)
    #[error("No cached target for {url}")]
    #[diagnostic(
        code(fan::cache::not_found),
        help("The entry may have expired or was never fetched")
    )]
    NotFound {
        /// The URL that was looked up
        url: String,
    },

    /// I/O error during cache operations
    #[error("I/O {operation} failed: {}", path.display())]
    #[diagnostic(
        code(fan::cache::io),
        help("Check file permissions and ensure the path exists")
    )]
    Io {
        /// The underlying I/O error
        #[source]
        source: std::io::Error,
        /// Path that caused the error
        path: Box<Path>,
        /// Operation that failed (e.g., "read", "write", "rename")
        operation: String,
    },

    /// Metadata could not be encoded or decoded
    #[error("Serialization error: {message}")]
    #[diagnostic(
        code(fan::cache::serialization),
        help("The entry metadata is corrupt; remove the entry directory to refetch it")
    )]
    Serialization {
        /// Error message describing the serialization issue
        message: String,
        /// Metadata file involved, if any
        path: Option<Box<Path>>,
    },

    /// The entry already holds a payload
    #[error("Target {url} is already cached at {}", path.display())]
    #[diagnostic(
        code(fan::cache::duplicate),
        help("Invalidate the entry before adding it again")
    )]
    DuplicateEntry {
        /// The URL being added
        url: String,
        /// Existing payload path
        path: PathBuf,
    },
}

/// The closed set of cache failure kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Entry absent or expired
    NotFound,
    /// Filesystem failure not caused by absence
    Io,
    /// Corrupt or unencodable metadata
    Serialization,
    /// Add over an existing payload
    DuplicateEntry,
}

impl Error {
    /// Create a not found error
    #[must_use]
    pub fn not_found(url: impl Into<String>) -> Self {
        Self::NotFound { url: url.into() }
    }

    /// Create an I/O error with path context
    #[must_use]
    pub fn io(
        source: std::io::Error,
        path: impl AsRef<Path>,
        operation: impl Into<String>,
    ) -> Self {
        Self::Io {
            source,
            path: path.as_ref().into(),
            operation: operation.into(),
        }
    }

    /// Create a serialization error for a metadata file
    #[must_use]
    pub fn serialization(msg: impl Into<String>, path: impl AsRef<Path>) -> Self {
        Self::Serialization {
            message: msg.into(),
            path: Some(path.as_ref().into()),
        }
    }

    /// Create a duplicate entry error
    #[must_use]
    pub fn duplicate(url: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        Self::DuplicateEntry {
            url: url.into(),
            path: path.into(),
        }
    }

    /// Kind of this error
    #[must_use]
    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::NotFound { .. } => ErrorKind::NotFound,
            Self::Io { .. } => ErrorKind::Io,
            Self::Serialization { .. } => ErrorKind::Serialization,
            Self::DuplicateEntry { .. } => ErrorKind::DuplicateEntry,
        }
    }

    /// Whether the caller should fetch and add the target
    #[must_use]
    pub const fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

/// Result type for cache operations
pub type Result<T> = std::result::Result<T, Error>;
