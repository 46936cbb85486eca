//! Blocking access to a Calibre library, and the [`Locate`] implementation
//! built on it.

use exn::ResultExt;
use quire_calibre::{BookDetails, Library, Page, SearchResults};
use quire_epub::{DocumentId, ErrorKind, Locate};
use std::path::{Path, PathBuf};
use tokio::runtime::{Builder, Runtime};

use crate::error::{ErrorKind as CliErrorKind, Result};

/// A Calibre library driven from synchronous code through a private
/// single-threaded runtime.
pub struct Catalogue {
    runtime: Runtime,
    library: Library,
}

impl Catalogue {
    pub fn open(root: &Path) -> Result<Self> {
        let runtime = Builder::new_current_thread().enable_all().build().or_raise(|| CliErrorKind::Library)?;
        let library = runtime.block_on(Library::open(root)).or_raise(|| CliErrorKind::Library)?;
        Ok(Self { runtime, library })
    }

    pub fn search_books(&self, query: &str, page: Page) -> quire_calibre::Result<SearchResults> {
        self.runtime.block_on(self.library.search_books(query, page))
    }

    pub fn book(&self, id: u64) -> quire_calibre::Result<BookDetails> {
        self.runtime.block_on(self.library.book(id))
    }
}

impl Locate for Catalogue {
    fn locate(&self, id: DocumentId) -> quire_epub::Result<PathBuf> {
        match self.runtime.block_on(self.library.epub_path(id)) {
            Ok(path) => Ok(path),
            Err(err) if *err == quire_calibre::ErrorKind::EpubNotFound(id) => {
                Err(err).or_raise(|| ErrorKind::DocumentNotFound(id))
            },
            Err(err) => Err(err).or_raise(|| ErrorKind::Lookup),
        }
    }
}
