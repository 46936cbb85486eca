//! Calibre Error Types
//!
//! Structured errors using `exn` for automatic location tracking and error
//! tree construction.

use derive_more::{Display, Error};

/// A Calibre lookup error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for Calibre operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// Opening or querying `metadata.db` failed.
    #[display("database error")]
    Database,
    /// No book with this id is in the catalogue.
    #[display("no book {_0} in the catalogue")]
    BookNotFound(#[error(not(source))] u64),
    /// The book does not exist or has no EPUB format on record.
    #[display("no EPUB on record for book {_0}")]
    EpubNotFound(#[error(not(source))] u64),
    /// A value could not be converted to or from its database representation.
    #[display("invalid library data")]
    InvalidData,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Database)
    }
}
