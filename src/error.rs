//! Error types for archive update operations.
//!
//! This module provides the [`Error`] enum which represents every failure a
//! caller can observe while composing and running an archive update, along
//! with a convenient [`Result<T>`] type alias.
//!
//! # Error Categories
//!
//! Errors fall into three groups:
//!
//! | Category | Variants | Typical Cause |
//! |----------|----------|---------------|
//! | Configuration | [`IndexOutOfRange`][Error::IndexOutOfRange], [`InvalidState`][Error::InvalidState], [`InvalidArchivePath`][Error::InvalidArchivePath], [`ItemRemoved`][Error::ItemRemoved] | Caller or engine misuse |
//! | Indexing | [`Io`][Error::Io], [`NotAFile`][Error::NotAFile], [`NotADirectory`][Error::NotADirectory], [`InvalidPattern`][Error::InvalidPattern] | Filesystem state at add time |
//! | Run | [`Cancelled`][Error::Cancelled], [`EngineFailure`][Error::EngineFailure] | Outcome reported by the engine |
//!
//! Failures to open a single item's data during a run are *not* errors: they
//! are recorded in the run's [`FailureLog`](crate::update::FailureLog) and the
//! run continues.
//!
//! ```rust
//! use arcweave::Error;
//!
//! fn describe(error: &Error) -> &'static str {
//!     match error {
//!         Error::IndexOutOfRange { .. } => "index is not part of the archive",
//!         Error::Cancelled => "the update was cancelled",
//!         Error::EngineFailure(_) => "the compression engine failed",
//!         _ => "other failure",
//!     }
//! }
//! # let _ = describe(&Error::Cancelled);
//! ```

use std::io;

/// The main error type for archive update operations.
#[derive(Debug, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// An I/O error occurred while indexing filesystem items.
    ///
    /// Errors opening an item's data *during* a run never surface here; they
    /// are collected in the run's failure log instead.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// An in-archive path is invalid.
    ///
    /// Archive paths must:
    /// - Not contain null bytes
    /// - Not be empty
    /// - Not be absolute
    /// - Not contain empty, `.` or `..` segments
    #[error("Invalid archive path: {0}")]
    InvalidArchivePath(String),

    /// An index is outside the range it is checked against.
    ///
    /// Returned when deleting, renaming or updating an original item that does
    /// not exist, and when the engine queries an output index beyond the total
    /// item count of the run.
    #[error("Index {index} out of range (count is {count})")]
    IndexOutOfRange {
        /// The offending index.
        index: u32,
        /// The number of valid indices.
        count: u32,
    },

    /// A protocol operation was invoked in a state that does not allow it.
    ///
    /// Typical causes are querying items before the total item count was
    /// requested, or after the engine signalled the end of the run.
    #[error("Cannot {operation} while the update is {state}")]
    InvalidState {
        /// The operation that was attempted.
        operation: &'static str,
        /// The state the update was in.
        state: &'static str,
    },

    /// A path expected to be a regular file points to a directory.
    #[error("Input path points to a directory, not a file: {path}")]
    NotAFile {
        /// The offending filesystem path.
        path: String,
    },

    /// A path expected to be a directory is not one.
    #[error("Input path is not a directory: {path}")]
    NotADirectory {
        /// The offending filesystem path.
        path: String,
    },

    /// No original item has the given path.
    ///
    /// Returned by the path-based delete and rename operations.
    #[error("Entry not found: {path}")]
    EntryNotFound {
        /// The path that was not found.
        path: String,
    },

    /// An original item was already deleted, renamed or replaced.
    #[error("Original item {index} is already deleted or replaced")]
    ItemRemoved {
        /// Index of the item in the original archive.
        index: u32,
    },

    /// A wildcard filter could not be parsed.
    #[error("Invalid wildcard pattern '{pattern}': {reason}")]
    InvalidPattern {
        /// The invalid pattern.
        pattern: String,
        /// Description of why the pattern is invalid.
        reason: String,
    },

    /// The resulting archive would hold more items than the engine can address.
    #[error("Too many items for a single archive: {count}")]
    TooManyItems {
        /// The number of items that was requested.
        count: u64,
    },

    /// The operation was cancelled.
    ///
    /// This error is returned when a progress reporter returns `false` (or
    /// [`AtomicProgress::cancel`] is called) and the engine stops the run.
    ///
    /// [`AtomicProgress::cancel`]: crate::progress::AtomicProgress::cancel
    #[error("Operation cancelled")]
    Cancelled,

    /// The compression engine reported a fatal outcome for the run.
    #[error("Update failed: {0}")]
    EngineFailure(String),
}

/// A specialized Result type for archive update operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Returns `true` for errors caused by misuse of the API or the protocol.
    ///
    /// Such errors indicate a bug in the caller (or in the engine) rather than
    /// a problem with the data being archived.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            Error::IndexOutOfRange { .. }
                | Error::InvalidState { .. }
                | Error::InvalidArchivePath(_)
                | Error::ItemRemoved { .. }
                | Error::InvalidPattern { .. }
                | Error::TooManyItems { .. }
        )
    }
}
