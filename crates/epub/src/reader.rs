//! Document-level operations, keyed by document id.

use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::DocumentId;
use crate::chapters::Chapter;
use crate::document::Document;
use crate::error::Result;
use crate::search::{Page, SearchCache, SearchMatch};

/// Resolves a document id to the filesystem path of its EPUB archive.
///
/// Implementations fail with [`ErrorKind::DocumentNotFound`] when the id is
/// unknown, and [`ErrorKind::Lookup`] for anything else.
///
/// [`ErrorKind::DocumentNotFound`]: crate::error::ErrorKind::DocumentNotFound
/// [`ErrorKind::Lookup`]: crate::error::ErrorKind::Lookup
pub trait Locate {
    fn locate(&self, id: DocumentId) -> Result<PathBuf>;
}

impl<F> Locate for F
where
    F: Fn(DocumentId) -> Result<PathBuf>,
{
    fn locate(&self, id: DocumentId) -> Result<PathBuf> {
        self(id)
    }
}

/// Entry point for listing, reading and searching documents.
///
/// Every call opens the archive afresh; only search results are cached.
#[derive(Debug)]
pub struct Bookshelf<L> {
    locator: L,
    cache: SearchCache,
}

impl<L: Locate> Bookshelf<L> {
    pub fn new(locator: L, cache: SearchCache) -> Self {
        Self { locator, cache }
    }

    pub fn locator(&self) -> &L {
        &self.locator
    }

    pub fn cache(&self) -> &SearchCache {
        &self.cache
    }

    fn open(&self, id: DocumentId) -> Result<Document> {
        let path = self.locator.locate(id)?;
        Document::open(path)
    }

    /// Lists the chapters of a document in reading order.
    #[instrument(skip(self))]
    pub fn list_chapters(&self, id: DocumentId) -> Result<Vec<Chapter>> {
        Ok(self.open(id)?.into_chapters())
    }

    /// Returns the plain text of one chapter.
    #[instrument(skip(self))]
    pub fn chapter_content(&self, id: DocumentId, index: usize) -> Result<String> {
        self.open(id)?.chapter_text(index)
    }

    /// Searches a document, serving recent identical searches from the cache.
    ///
    /// An empty query matches nothing and never touches the cache.
    pub fn search(&self, id: DocumentId, query: &str, page: Page) -> Result<Vec<SearchMatch>> {
        self.search_cancellable(id, query, page, &CancellationToken::new())
    }

    /// As [`search`](Self::search), abandoning the scan once `cancel` fires.
    /// Cancelled scans leave the cache untouched.
    #[instrument(skip(self, page, cancel), fields(limit = page.limit, offset = page.offset))]
    pub fn search_cancellable(
        &self,
        id: DocumentId,
        query: &str,
        page: Page,
        cancel: &CancellationToken,
    ) -> Result<Vec<SearchMatch>> {
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let matches = match self.cache.get(id, query) {
            Some(matches) => {
                tracing::debug!(total = matches.len(), "Serving cached search results");
                matches
            },
            None => {
                let matches = Arc::new(self.open(id)?.search(query, cancel)?);
                tracing::info!(total = matches.len(), "Computed search results");
                self.cache.insert(id, query, Arc::clone(&matches));
                matches
            },
        };
        Ok(page.apply(&matches))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;
    use crate::fixtures::{EpubBuilder, nav, opf, xhtml};
    use std::path::Path;
    use std::time::Duration;
    use tempfile::TempDir;

    const XHTML: &str = "application/xhtml+xml";
    const BOOK: DocumentId = 42;

    fn write_book(dir: &Path, chapters: &[(&str, &str, &str)]) -> PathBuf {
        let mut items = vec![("nav", "nav.xhtml", XHTML, "nav")];
        items.extend(chapters.iter().map(|(id, _, _)| (*id, *id, XHTML, "")));
        let spine: Vec<_> = chapters.iter().map(|(id, _, _)| *id).collect();
        let links: Vec<_> = chapters.iter().map(|(id, title, _)| (*id, *title)).collect();
        let mut builder = EpubBuilder::standard()
            .file("OEBPS/content.opf", opf(&items, &spine))
            .file("OEBPS/nav.xhtml", nav(&links));
        for (id, title, body) in chapters {
            builder = builder.file(&format!("OEBPS/{id}"), xhtml(title, body));
        }
        let path = dir.join("book.epub");
        builder.write_to(&path);
        path
    }

    fn dragon_book(dir: &Path) -> PathBuf {
        write_book(
            dir,
            &[
                ("one.xhtml", "Chapter One", "<p>The Dragon woke.</p><p>It was hungry.</p>"),
                ("two.xhtml", "Chapter Two", "<p>No beasts here.</p>"),
                ("three.xhtml", "Chapter Three", "<p>A dragon flew.</p><p>Another DRAGON followed a dragon.</p>"),
            ],
        )
    }

    fn shelf(path: PathBuf, ttl: Duration) -> Bookshelf<impl Locate> {
        let locator = move |id: DocumentId| -> Result<PathBuf> {
            match id {
                BOOK => Ok(path.clone()),
                other => exn::bail!(ErrorKind::DocumentNotFound(other)),
            }
        };
        Bookshelf::new(locator, SearchCache::new(ttl))
    }

    #[test]
    fn test_list_chapters() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_secs(60));
        let chapters = shelf.list_chapters(BOOK).unwrap();
        let listed: Vec<_> = chapters.iter().map(|c| (c.index, c.title.as_str(), c.href.as_str())).collect();
        let expected = vec![
            (0, "Chapter One", "OEBPS/one.xhtml"),
            (1, "Chapter Two", "OEBPS/two.xhtml"),
            (2, "Chapter Three", "OEBPS/three.xhtml"),
        ];
        assert_eq!(listed, expected);
    }

    #[test]
    fn test_unknown_document_and_missing_archive() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dir.path().join("nope.epub"), Duration::from_secs(60));
        assert_eq!(*shelf.list_chapters(7).unwrap_err(), ErrorKind::DocumentNotFound(7));
        assert!(matches!(*shelf.list_chapters(BOOK).unwrap_err(), ErrorKind::ArchiveNotFound(_)));
    }

    #[test]
    fn test_chapter_content() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_secs(60));
        assert_eq!(shelf.chapter_content(BOOK, 1).unwrap(), "No beasts here.");
    }

    #[test]
    fn test_out_of_range_chapter_leaves_cache_untouched() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_secs(60));
        shelf.search(BOOK, "dragon", Page::default()).unwrap();
        assert_eq!(shelf.cache().len(), 1);
        let err = shelf.chapter_content(BOOK, 3).unwrap_err();
        assert_eq!(*err, ErrorKind::IndexOutOfRange { index: 3, count: 3 });
        assert_eq!(shelf.cache().len(), 1);
        assert_eq!(shelf.search(BOOK, "dragon", Page::default()).unwrap().len(), 3);
    }

    #[test]
    fn test_search_is_case_insensitive_and_case_preserving() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_secs(60));
        let matches = shelf.search(BOOK, "dragon", Page::default()).unwrap();
        let found: Vec<_> = matches.iter().map(|m| (m.chapter_index, m.chapter_title.as_str(), m.snippet.as_str())).collect();
        let expected = vec![
            (0, "Chapter One", "The **Dragon** woke."),
            (2, "Chapter Three", "A **dragon** flew."),
            (2, "Chapter Three", "Another **DRAGON** followed a dragon."),
        ];
        assert_eq!(found, expected);
    }

    #[test]
    fn test_pagination_never_mutates_cache() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_secs(60));
        let first = shelf.search(BOOK, "dragon", Page::new(1, 1)).unwrap();
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].snippet, "A **dragon** flew.");
        assert_eq!(shelf.cache().get(BOOK, "dragon").unwrap().len(), 3);
        assert!(shelf.search(BOOK, "dragon", Page::new(0, 3)).unwrap().is_empty());
        assert_eq!(shelf.search(BOOK, "dragon", Page::new(2, 0)).unwrap().len(), 2);
        assert_eq!(shelf.cache().get(BOOK, "dragon").unwrap().len(), 3);
    }

    #[test]
    fn test_cached_results_are_stale_within_the_window() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_secs(60));
        assert_eq!(shelf.search(BOOK, "dragon", Page::default()).unwrap().len(), 3);
        write_book(dir.path(), &[("one.xhtml", "Only", "<p>No more beasts.</p>")]);
        assert_eq!(shelf.search(BOOK, "dragon", Page::default()).unwrap().len(), 3);
        assert_eq!(shelf.search(BOOK, "beasts", Page::default()).unwrap().len(), 1);
    }

    #[test]
    fn test_cached_results_refresh_after_the_window() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_millis(50));
        assert_eq!(shelf.search(BOOK, "dragon", Page::default()).unwrap().len(), 3);
        write_book(dir.path(), &[("one.xhtml", "Only", "<p>Here be dragons.</p>")]);
        std::thread::sleep(Duration::from_millis(100));
        let matches = shelf.search(BOOK, "dragon", Page::default()).unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].snippet, "Here be **dragon**s.");
    }

    #[test]
    fn test_empty_query_skips_the_cache() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_secs(60));
        assert!(shelf.search(BOOK, "", Page::default()).unwrap().is_empty());
        assert!(shelf.cache().is_empty());
    }

    #[test]
    fn test_cancelled_search_caches_nothing() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_secs(60));
        let token = CancellationToken::new();
        token.cancel();
        let err = shelf.search_cancellable(BOOK, "dragon", Page::default(), &token).unwrap_err();
        assert_eq!(*err, ErrorKind::Cancelled);
        assert!(shelf.cache().is_empty());
    }

    fn assert_send_sync<T: Send + Sync>(_: &T) {}

    #[test]
    fn test_concurrent_searches_share_one_cache_entry() {
        let dir = TempDir::new().unwrap();
        let shelf = shelf(dragon_book(dir.path()), Duration::from_secs(60));
        assert_send_sync(&shelf);
        let results: Vec<_> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| shelf.search(BOOK, "dragon", Page::default()).unwrap()))
                .collect();
            handles.into_iter().map(|handle| handle.join().unwrap()).collect()
        });
        for matches in &results {
            assert_eq!(matches, &results[0]);
            assert_eq!(matches.len(), 3);
        }
        assert_eq!(shelf.cache().len(), 1);
    }

    #[test]
    fn test_unreadable_chapter_is_skipped_during_search() {
        let dir = TempDir::new().unwrap();
        let items = [("a", "a.xhtml", XHTML, ""), ("b", "b.xhtml", XHTML, "")];
        let mut bytes = EpubBuilder::standard()
            .stored()
            .file("OEBPS/content.opf", opf(&items, &["a", "b"]))
            .file("OEBPS/a.xhtml", xhtml("A", "<p>dragon wyvern</p>"))
            .file("OEBPS/b.xhtml", xhtml("B", "<p>dragon</p>"))
            .to_bytes();
        // Corrupt the body of the first chapter so its checksum no longer matches.
        let at = bytes.windows(6).position(|w| w == b"wyvern").unwrap();
        bytes[at..at + 6].copy_from_slice(b"WYVERN");
        let path = dir.path().join("book.epub");
        std::fs::write(&path, bytes).unwrap();
        let shelf = shelf(path, Duration::from_secs(60));
        assert_eq!(shelf.list_chapters(BOOK).unwrap().len(), 2);
        let matches = shelf.search(BOOK, "dragon", Page::default()).unwrap();
        assert_eq!(matches.iter().map(|m| m.chapter_index).collect::<Vec<_>>(), vec![1]);
    }
}
