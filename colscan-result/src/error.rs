use std::{fmt, io};
use thiserror::Error;

/// Unified error type for all colscan operations.
///
/// Storage readers, the configuration loader, and the scan adapter all
/// report failures through this enum. `Error` is `Send + Sync`, so it can
/// be carried out of a scan and inspected on another thread.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error while opening, reading, or closing a storage resource.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Arrow error while assembling an output block or record batch.
    ///
    /// The most common source is text data that is not valid UTF-8 when it
    /// is appended to a string view block.
    #[error("Arrow error: {0}")]
    Arrow(#[from] arrow::error::ArrowError),

    /// Invalid caller input.
    ///
    /// Raised for contract violations such as a column vector whose length
    /// differs from the batch row count, or a vector whose representation
    /// does not match the declared scalar kind.
    #[error("Invalid argument: {0}")]
    InvalidArgumentError(String),

    /// A table, file, or column could not be located.
    #[error("not found: {0}")]
    NotFound(String),

    /// Configuration could not be read, parsed, or validated.
    #[error("configuration error: {0}")]
    Config(String),

    /// Failure reported by a storage reader implementation.
    #[error("storage error: {0}")]
    Storage(String),

    /// A deferred column handle was used after the scan moved to another batch.
    ///
    /// `expected` is the batch generation captured when the handle was
    /// issued; `current` is the generation the scan holds now (`None` once
    /// the scan is closed and no batch is held at all).
    #[error("stale batch: loader issued for batch {expected}, scan is at {current:?}")]
    StaleBatch { expected: u64, current: Option<u64> },

    /// Internal error indicating a bug or unexpected state.
    #[error("An internal operation failed: {0}")]
    Internal(String),
}

impl Error {
    /// Create a storage error from any displayable error.
    ///
    /// # Examples
    ///
    /// ```
    /// use colscan_result::Error;
    ///
    /// let err = Error::storage("disk unplugged");
    /// assert!(matches!(err, Error::Storage(msg) if msg == "disk unplugged"));
    /// ```
    #[inline]
    pub fn storage<E: fmt::Display>(err: E) -> Self {
        Error::Storage(err.to_string())
    }

    /// Create a configuration error from any displayable error.
    #[inline]
    pub fn config<E: fmt::Display>(err: E) -> Self {
        Error::Config(err.to_string())
    }

    /// Whether two errors describe the same failure.
    ///
    /// Errors are not comparable by identity once they have been moved out
    /// of the call that produced them, so this compares the rendered
    /// messages.
    pub fn same_cause(&self, other: &Error) -> bool {
        self.to_string() == other.to_string()
    }
}
