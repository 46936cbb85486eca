//! An opened publication: its archive and chapter list.

use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tokio_util::sync::CancellationToken;
use tracing::instrument;

use crate::archive::Archive;
use crate::chapters::{self, Chapter};
use crate::error::{ErrorKind, Result};
use crate::package;
use crate::search::{self, SearchMatch};
use crate::text::extract_text;
use crate::toc;

pub struct Document<R = BufReader<File>> {
    archive: Archive<R>,
    chapters: Vec<Chapter>,
}

impl Document {
    /// Opens the EPUB at `path` and builds its chapter list.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Self::from_archive(Archive::open(path)?)
    }
}

impl<R: Read + Seek> Document<R> {
    /// Parses the package descriptor and table of contents of an archive.
    ///
    /// A missing or malformed container or package descriptor is fatal. A
    /// missing or malformed table of contents is not: chapters then take
    /// their titles from their file names.
    #[instrument(level = "debug", skip_all, fields(entries = archive.len()))]
    pub fn from_archive(mut archive: Archive<R>) -> Result<Self> {
        let descriptor = package::locate_descriptor(&mut archive)?;
        let package = package::parse_descriptor(&mut archive, &descriptor)?;
        let toc = match toc::resolve(&mut archive, &package) {
            Ok(toc) => Some(toc),
            Err(err) if *err == ErrorKind::NoTocFound => {
                tracing::debug!("No table of contents declared; using file names as titles");
                None
            },
            Err(err) => {
                tracing::warn!(error = ?err, "Unreadable table of contents; using file names as titles");
                None
            },
        };
        let chapters = chapters::build(&archive, &package, toc.as_ref());
        Ok(Self { archive, chapters })
    }

    pub fn chapters(&self) -> &[Chapter] {
        &self.chapters
    }

    pub fn into_chapters(self) -> Vec<Chapter> {
        self.chapters
    }

    /// Fails with [`ErrorKind::IndexOutOfRange`] for `index >= count`.
    pub fn chapter(&self, index: usize) -> Result<&Chapter> {
        match self.chapters.get(index) {
            Some(chapter) => Ok(chapter),
            None => exn::bail!(ErrorKind::IndexOutOfRange { index, count: self.chapters.len() }),
        }
    }

    /// Reads chapter `index` and reduces it to plain text.
    pub fn chapter_text(&mut self, index: usize) -> Result<String> {
        let href = self.chapter(index)?.href.clone();
        let markup = self.archive.read(&href)?;
        Ok(extract_text(&markup))
    }

    /// Scans every chapter in reading order for `query`.
    ///
    /// A chapter that cannot be read is skipped. The token is checked before
    /// each chapter.
    pub fn search(&mut self, query: &str, cancel: &CancellationToken) -> Result<Vec<SearchMatch>> {
        let mut matches = Vec::new();
        for index in 0..self.chapters.len() {
            if cancel.is_cancelled() {
                exn::bail!(ErrorKind::Cancelled);
            }
            let text = match self.chapter_text(index) {
                Ok(text) => text,
                Err(err) => {
                    tracing::debug!(index, error = ?err, "Skipping unreadable chapter");
                    continue;
                },
            };
            matches.extend(search::scan(&self.chapters[index], &text, query));
        }
        Ok(matches)
    }
}
