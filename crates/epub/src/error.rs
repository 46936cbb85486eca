//! EPUB Error Types
//!
//! This module provides structured errors using `exn` for automatic location
//! tracking and error tree construction.

use derive_more::{Display, Error};
use std::path::PathBuf;

use crate::DocumentId;

/// An EPUB error with automatic location tracking.
pub type Error = exn::Exn<ErrorKind>;
/// Result type alias for EPUB operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Actionable error categories.
///
/// These describe what the caller should *do*, not what went wrong internally.
#[derive(Debug, Display, Error, Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The lookup collaborator knows no archive for this document.
    #[display("document not found: {_0}")]
    DocumentNotFound(#[error(not(source))] DocumentId),
    /// The archive file itself does not exist.
    #[display("archive not found: {}", _0.display())]
    ArchiveNotFound(#[error(not(source))] PathBuf),
    /// No archive entry matches the requested name exactly.
    #[display("archive entry not found: {_0}")]
    EntryNotFound(#[error(not(source))] String),
    /// The zip central directory (or an entry's data) could not be read.
    #[display("corrupt archive")]
    Corrupt,
    /// Reading the archive from disk failed.
    #[display("I/O error")]
    Io,
    /// `META-INF/container.xml` is missing, unparsable, or declares no rootfile.
    #[display("malformed container")]
    MalformedContainer,
    /// The package descriptor (OPF) is missing or unparsable.
    #[display("malformed package descriptor")]
    MalformedPackage,
    /// The manifest declares neither a navigation document nor an NCX.
    /// Recoverable: chapters fall back to titles derived from file names.
    #[display("no table of contents found")]
    NoTocFound,
    /// The navigation document has no `toc` landmark.
    #[display("malformed navigation document")]
    MalformedNavToc,
    /// The NCX document is unparsable.
    #[display("malformed NCX document")]
    MalformedNcxToc,
    /// Chapter index outside `[0, count)`.
    #[display("chapter index {index} out of range (document has {count} chapters)")]
    IndexOutOfRange {
        /// The requested index.
        index: usize,
        /// The number of chapters in the document.
        count: usize,
    },
    /// The lookup collaborator failed for a reason other than "not found".
    #[display("archive lookup failed")]
    Lookup,
    /// The caller cancelled the operation.
    #[display("operation cancelled")]
    Cancelled,
}

impl ErrorKind {
    /// Returns `true` if retrying might succeed.
    pub fn is_retryable(&self) -> bool {
        matches!(self, Self::Io | Self::Lookup)
    }

    /// Returns `true` for the "something is absent" family of errors.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::DocumentNotFound(_) | Self::ArchiveNotFound(_) | Self::EntryNotFound(_))
    }
}
