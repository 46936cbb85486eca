//! Reading-order chapter list.

use std::io::{Read, Seek};

use crate::archive::Archive;
use crate::package::Package;
use crate::path;
use crate::toc::TocMap;

/// One readable document of the spine.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Chapter {
    /// Dense, zero-based position among the emitted chapters.
    pub index: usize,
    pub title: String,
    /// Canonical archive path; always names an existing entry.
    pub href: String,
}

/// Builds the chapter list from the spine.
///
/// Spine entries referencing unknown manifest ids, or manifest items whose
/// href names no archive entry, are skipped. Titles come from the table of
/// contents when it has a non-empty one for the chapter's path, and from the
/// file name otherwise.
pub fn build<R: Read + Seek>(archive: &Archive<R>, package: &Package, toc: Option<&TocMap>) -> Vec<Chapter> {
    let mut chapters = Vec::with_capacity(package.spine.len());
    for idref in &package.spine {
        let Some(item) = package.item(idref) else {
            tracing::debug!(%idref, "Skipping spine entry with unknown manifest id");
            continue;
        };
        if !archive.contains(&item.href) {
            tracing::debug!(%idref, href = %item.href, "Skipping spine entry missing from the archive");
            continue;
        }
        let title = toc
            .and_then(|toc| toc.get(&item.href))
            .map(|title| title.trim())
            .filter(|title| !title.is_empty())
            .unwrap_or_else(|| path::file_stem(&item.href));
        chapters.push(Chapter { index: chapters.len(), title: title.to_string(), href: item.href.clone() });
    }
    chapters
}
