//! Catalogue queries and EPUB lookups by book id.

use exn::ResultExt;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tracing::instrument;

use crate::book::{Book, BookDetails, BookRow, Page, SearchResults, like_pattern};
use crate::db::Database;
use crate::error::{ErrorKind, Result};

/// File name of the Calibre catalogue inside a library root.
pub const METADATA_DB: &str = "metadata.db";

#[derive(sqlx::FromRow)]
struct EpubRow {
    /// Book directory, relative to the library root.
    path: String,
    /// Format file name without extension.
    name: String,
}

/// A Calibre library: a root directory holding `metadata.db` and one
/// directory per book.
#[derive(Debug, Clone)]
pub struct Library {
    root: PathBuf,
    db: Database,
}

impl Library {
    /// Opens the library at `root` read-only.
    pub async fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        let db = Database::connect(root.join(METADATA_DB)).await?;
        Ok(Self::new(root, db))
    }

    /// Wraps an existing connection; book paths are resolved against `root`.
    pub fn new(root: impl Into<PathBuf>, db: Database) -> Self {
        Self { root: root.into(), db }
    }

    /// Books whose title, author, tag or description contains `query`,
    /// ignoring case, in id order. An empty query matches every book.
    #[instrument(level = "debug", skip(self, page), fields(limit = page.limit, offset = page.offset))]
    pub async fn search_books(&self, query: &str, page: Page) -> Result<SearchResults> {
        let pattern = like_pattern(query);
        // SQLite reads a negative limit as "no limit".
        let limit = match page.limit {
            0 => -1,
            limit => i64::try_from(limit).or_raise(|| ErrorKind::InvalidData)?,
        };
        let offset = i64::try_from(page.offset).or_raise(|| ErrorKind::InvalidData)?;

        let total: i64 = sqlx::query_scalar(include_str!("../queries/count_books.sql"))
            .bind(pattern.as_str())
            .fetch_one(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        let rows: Vec<BookRow> = sqlx::query_as(include_str!("../queries/search_books.sql"))
            .bind(pattern.as_str())
            .bind(limit)
            .bind(offset)
            .fetch_all(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;

        let mut books = Vec::with_capacity(rows.len());
        for row in rows {
            books.push(self.hydrate(row).await?);
        }
        let total = u64::try_from(total).or_raise(|| ErrorKind::InvalidData)?;
        tracing::debug!(total, returned = books.len(), "Searched catalogue");
        Ok(SearchResults { books, total })
    }

    /// Everything the catalogue records about book `id`.
    #[instrument(level = "debug", skip(self))]
    pub async fn book(&self, id: u64) -> Result<BookDetails> {
        let key = i64::try_from(id).or_raise(|| ErrorKind::InvalidData)?;
        let row: Option<BookRow> = sqlx::query_as(include_str!("../queries/book.sql"))
            .bind(key)
            .fetch_optional(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        let Some(row) = row else {
            exn::bail!(ErrorKind::BookNotFound(id));
        };
        let book = self.hydrate(row).await?;

        let size: i64 = sqlx::query_scalar(include_str!("../queries/book_size.sql"))
            .bind(key)
            .fetch_one(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        let identifiers: Vec<(String, String)> = sqlx::query_as(include_str!("../queries/book_identifiers.sql"))
            .bind(key)
            .fetch_all(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;

        Ok(BookDetails {
            book,
            size: u64::try_from(size).or_raise(|| ErrorKind::InvalidData)?,
            identifiers: identifiers.into_iter().collect::<BTreeMap<_, _>>(),
        })
    }

    /// Absolute path of the EPUB file recorded for book `id`.
    #[instrument(level = "debug", skip(self))]
    pub async fn epub_path(&self, id: u64) -> Result<PathBuf> {
        let book = i64::try_from(id).or_raise(|| ErrorKind::InvalidData)?;
        let row: Option<EpubRow> = sqlx::query_as(include_str!("../queries/epub_path.sql"))
            .bind(book)
            .fetch_optional(self.db.pool())
            .await
            .or_raise(|| ErrorKind::Database)?;
        let Some(row) = row else {
            exn::bail!(ErrorKind::EpubNotFound(id));
        };
        Ok(self.root.join(row.path).join(format!("{}.epub", row.name)))
    }

    /// Completes a catalogue row with its authors, tags and formats.
    async fn hydrate(&self, row: BookRow) -> Result<Book> {
        let authors = self.names(include_str!("../queries/book_authors.sql"), row.id).await?;
        let tags = self.names(include_str!("../queries/book_tags.sql"), row.id).await?;
        let formats = self.names(include_str!("../queries/book_formats.sql"), row.id).await?;
        Ok(Book {
            id: u64::try_from(row.id).or_raise(|| ErrorKind::InvalidData)?,
            title: row.title,
            authors,
            tags,
            series: row.series,
            series_index: row.series_index,
            formats,
            publisher: row.publisher,
            pubdate: row.pubdate,
            isbn: row.isbn.filter(|isbn| !isbn.is_empty()),
            language: row.language,
            rating: row.rating.map(u8::try_from).transpose().or_raise(|| ErrorKind::InvalidData)?,
            comments: row.comments,
            timestamp: row.timestamp,
            last_modified: row.last_modified,
        })
    }

    async fn names(&self, sql: &'static str, book: i64) -> Result<Vec<String>> {
        sqlx::query_scalar(sql).bind(book).fetch_all(self.db.pool()).await.or_raise(|| ErrorKind::Database)
    }
}
