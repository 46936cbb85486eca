//! Read-only access to a Calibre library.
//!
//! Calibre keeps its catalogue in `metadata.db` at the library root, and each
//! book's files in a per-book directory beneath it. This crate reads book
//! records from that catalogue and finds the EPUB file of a book on disk.

mod book;
mod db;
pub mod error;
mod library;

pub use crate::book::{Book, BookDetails, Page, SearchResults};
pub use crate::db::Database;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::library::{Library, METADATA_DB};
