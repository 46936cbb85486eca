//! Catalogue records as Calibre describes them.

use std::collections::BTreeMap;

/// A book's catalogue entry.
///
/// Dates are passed through as Calibre stores them.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Book {
    pub id: u64,
    pub title: String,
    /// In the order Calibre lists them.
    pub authors: Vec<String>,
    /// Alphabetical.
    pub tags: Vec<String>,
    pub series: Option<String>,
    pub series_index: f64,
    /// Upper-case format names, such as `EPUB`.
    pub formats: Vec<String>,
    pub publisher: Option<String>,
    pub pubdate: Option<String>,
    pub isbn: Option<String>,
    pub language: Option<String>,
    /// Out of ten; Calibre shows half of this as stars.
    pub rating: Option<u8>,
    /// Description, usually HTML.
    pub comments: Option<String>,
    /// When the book was added to the library.
    pub timestamp: Option<String>,
    pub last_modified: Option<String>,
}

/// A [`Book`] together with the facts only a single-book lookup gathers.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct BookDetails {
    #[cfg_attr(feature = "serde", serde(flatten))]
    pub book: Book,
    /// Combined size of every format file, in bytes.
    pub size: u64,
    /// External identifiers by scheme, such as `isbn` or `goodreads`.
    pub identifiers: BTreeMap<String, String>,
}

/// One page of a catalogue search.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchResults {
    pub books: Vec<Book>,
    /// Matching books across all pages.
    pub total: u64,
}

/// Window over catalogue search results; a `limit` of zero means no limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    pub limit: usize,
    pub offset: usize,
}

impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }
}

#[derive(sqlx::FromRow)]
pub(crate) struct BookRow {
    pub id: i64,
    pub title: String,
    pub series: Option<String>,
    pub series_index: f64,
    pub publisher: Option<String>,
    pub pubdate: Option<String>,
    pub isbn: Option<String>,
    pub language: Option<String>,
    pub rating: Option<i64>,
    pub comments: Option<String>,
    pub timestamp: Option<String>,
    pub last_modified: Option<String>,
}

/// Turns free text into a `LIKE` pattern matching it anywhere, lower-cased,
/// with `LIKE` wildcards in the text taken literally.
pub(crate) fn like_pattern(query: &str) -> String {
    let mut pattern = String::with_capacity(query.len() + 2);
    pattern.push('%');
    for c in query.to_lowercase().chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}
