//! EPUB structure and text, for readers that do not render.
//!
//! Opens an EPUB archive, follows `META-INF/container.xml` to the package
//! descriptor, reconciles the spine with whichever table of contents the
//! publication carries (EPUB 3 navigation document or EPUB 2 NCX) and exposes
//! the result as a flat chapter list. Chapters can be reduced to plain text
//! and searched; search results are cached for a short window.
//!
//! Most callers want [`Bookshelf`], which maps document ids to archives via a
//! [`Locate`] implementation.

mod archive;
mod chapters;
mod consts;
mod document;
pub mod error;
#[cfg(test)]
mod fixtures;
pub mod package;
pub mod path;
mod reader;
mod search;
mod text;
pub mod toc;

pub use crate::archive::Archive;
pub use crate::chapters::Chapter;
pub use crate::consts::HIGHLIGHT_MARKER;
pub use crate::document::Document;
pub use crate::error::{Error, ErrorKind, Result};
pub use crate::reader::{Bookshelf, Locate};
pub use crate::search::{DEFAULT_TTL, Page, SearchCache, SearchMatch, find_match, highlight};
pub use crate::text::extract_text;
pub use tokio_util::sync::CancellationToken;

/// Identifier of a document in the external catalogue.
pub type DocumentId = u64;
