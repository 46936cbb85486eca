//! Table-of-contents resolution.
//!
//! EPUB 3 publications carry a navigation document (XHTML with a
//! `<nav epub:type="toc">` landmark), EPUB 2 publications an NCX document.
//! Both are reduced to the same [`TocMap`]: canonical archive path → title.

mod nav;
mod ncx;

use exn::{OptionExt, ResultExt};
use std::collections::HashMap;
use std::io::{Read, Seek};
use tracing::instrument;

use crate::archive::Archive;
use crate::error::{ErrorKind, Result};
use crate::package::Package;
use crate::path;

/// Canonical archive path → TOC title. Last write wins on duplicate paths.
pub type TocMap = HashMap<String, String>;

/// The schema of a table-of-contents document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TocKind {
    /// EPUB 3 navigation document.
    Nav,
    /// EPUB 2 navigation control file.
    Ncx,
}
impl TocKind {
    /// Parses a TOC document located at `toc_href` (canonical) into a [`TocMap`].
    ///
    /// Targets are resolved against the directory of `toc_href`, which is not
    /// necessarily the package descriptor's directory.
    pub fn parse(self, content: &[u8], toc_href: &str) -> Result<TocMap> {
        let links = match self {
            Self::Nav => nav::links(content)?,
            Self::Ncx => ncx::links(content)?,
        };
        let toc_dir = path::parent(toc_href);
        let mut map = TocMap::with_capacity(links.len());
        for (target, title) in links {
            if path::is_external(&target) {
                continue;
            }
            let target = path::strip_fragment(&target);
            let resolved = match target.is_empty() {
                // A bare `#fragment` points into the TOC document itself.
                true => toc_href.to_string(),
                false => path::resolve(toc_dir, target),
            };
            map.insert(resolved, title);
        }
        Ok(map)
    }
}

/// The manifest item chosen as the table of contents, tagged with its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocSource {
    pub kind: TocKind,
    /// Canonical archive path of the TOC document.
    pub href: String,
}
impl TocSource {
    /// Picks the TOC document from the manifest.
    ///
    /// A navigation document takes precedence over an NCX; within each kind
    /// the first item declared in the manifest wins.
    pub fn locate(package: &Package) -> Result<Self> {
        let nav = package.manifest.iter().find(|item| item.is_nav()).map(|item| (TocKind::Nav, item));
        let (kind, item) = nav
            .or_else(|| package.manifest.iter().find(|item| item.is_ncx()).map(|item| (TocKind::Ncx, item)))
            .ok_or_raise(|| ErrorKind::NoTocFound)?;
        Ok(Self { kind, href: item.href.clone() })
    }
}

/// Locates, reads and parses the table of contents of a package.
///
/// Failures here are recoverable: callers fall back to titles derived from
/// file names.
#[instrument(level = "debug", skip_all, fields(package = %package.path))]
pub fn resolve<R: Read + Seek>(archive: &mut Archive<R>, package: &Package) -> Result<TocMap> {
    let source = TocSource::locate(package)?;
    let malformed = match source.kind {
        TocKind::Nav => ErrorKind::MalformedNavToc,
        TocKind::Ncx => ErrorKind::MalformedNcxToc,
    };
    let content = archive.read(&source.href).or_raise(|| malformed.clone())?;
    let map = source.kind.parse(&content, &source.href)?;
    tracing::debug!(kind = ?source.kind, href = %source.href, entries = map.len(), "Resolved table of contents");
    Ok(map)
}
