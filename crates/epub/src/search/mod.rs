//! Substring search over extracted chapter text.

mod cache;

pub use cache::{DEFAULT_TTL, SearchCache};

use crate::chapters::Chapter;
use crate::consts::HIGHLIGHT_MARKER;

/// A paragraph containing the query.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct SearchMatch {
    pub chapter_index: usize,
    pub chapter_title: String,
    /// The whole paragraph, with the first occurrence of the query wrapped in
    /// [`HIGHLIGHT_MARKER`]s. Casing is preserved.
    pub snippet: String,
}

/// A window over a result list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Page {
    /// Maximum number of results; `0` means unlimited.
    pub limit: usize,
    /// Number of leading results to skip.
    pub offset: usize,
}
impl Page {
    pub fn new(limit: usize, offset: usize) -> Self {
        Self { limit, offset }
    }

    /// Copies the windowed slice of `matches`.
    pub fn apply(&self, matches: &[SearchMatch]) -> Vec<SearchMatch> {
        let Some(rest) = matches.get(self.offset..) else {
            return Vec::new();
        };
        let rest = match self.limit {
            0 => rest,
            limit => &rest[..limit.min(rest.len())],
        };
        rest.to_vec()
    }
}

/// Finds every paragraph of `text` (one per line) that contains `query`,
/// ignoring case.
pub fn scan(chapter: &Chapter, text: &str, query: &str) -> Vec<SearchMatch> {
    text.split('\n')
        .filter(|paragraph| !paragraph.is_empty())
        .filter_map(|paragraph| {
            let span = find_match(paragraph, query)?;
            Some(SearchMatch {
                chapter_index: chapter.index,
                chapter_title: chapter.title.clone(),
                snippet: highlight(paragraph, span),
            })
        })
        .collect()
}

/// Returns the byte range of the first case-insensitive occurrence of
/// `needle` in `haystack`.
///
/// Characters are compared by their lowercase mapping, so the returned range
/// always lies on character boundaries of `haystack` even when the two sides
/// differ in encoded length.
pub fn find_match(haystack: &str, needle: &str) -> Option<(usize, usize)> {
    if needle.is_empty() {
        return None;
    }
    haystack.char_indices().find_map(|(start, _)| {
        let mut candidate = haystack[start..].char_indices();
        for expected in needle.chars() {
            let (_, actual) = candidate.next()?;
            if !actual.to_lowercase().eq(expected.to_lowercase()) {
                return None;
            }
        }
        let end = candidate.next().map(|(offset, _)| start + offset).unwrap_or(haystack.len());
        Some((start, end))
    })
}

/// Wraps the byte range `span` of `paragraph` in [`HIGHLIGHT_MARKER`]s.
pub fn highlight(paragraph: &str, (start, end): (usize, usize)) -> String {
    let mut snippet = String::with_capacity(paragraph.len() + 2 * HIGHLIGHT_MARKER.len());
    snippet.push_str(&paragraph[..start]);
    snippet.push_str(HIGHLIGHT_MARKER);
    snippet.push_str(&paragraph[start..end]);
    snippet.push_str(HIGHLIGHT_MARKER);
    snippet.push_str(&paragraph[end..]);
    snippet
}
