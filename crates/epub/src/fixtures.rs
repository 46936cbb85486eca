//! In-memory EPUB builders for tests.

use std::io::{Cursor, Write};
use std::path::Path;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

use crate::archive::Archive;

pub(crate) const CONTAINER_XML: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<container version="1.0" xmlns="urn:oasis:names:tc:opendocument:xmlns:container">
  <rootfiles>
    <rootfile full-path="OEBPS/content.opf" media-type="application/oebps-package+xml"/>
  </rootfiles>
</container>"#;

/// Wraps chapter body markup in a minimal XHTML document.
pub(crate) fn xhtml(title: &str, body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml"><head><title>{title}</title></head>
<body>{body}</body></html>"#
    )
}

/// Builds an OPF package document from `(id, href, media-type, properties)`
/// manifest rows and a list of spine idrefs.
pub(crate) fn opf(items: &[(&str, &str, &str, &str)], spine: &[&str]) -> String {
    let mut manifest = String::new();
    for (id, href, media_type, properties) in items {
        match properties.is_empty() {
            true => manifest.push_str(&format!(r#"<item id="{id}" href="{href}" media-type="{media_type}"/>"#)),
            false => manifest.push_str(&format!(
                r#"<item id="{id}" href="{href}" media-type="{media_type}" properties="{properties}"/>"#
            )),
        }
    }
    let itemrefs: String = spine.iter().map(|id| format!(r#"<itemref idref="{id}"/>"#)).collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<package xmlns="http://www.idpf.org/2007/opf" version="3.0" unique-identifier="uid">
  <metadata xmlns:dc="http://purl.org/dc/elements/1.1/"><dc:title>Fixture</dc:title></metadata>
  <manifest>{manifest}</manifest>
  <spine>{itemrefs}</spine>
</package>"#
    )
}

/// Builds an EPUB 3 navigation document linking `(href, title)` pairs.
pub(crate) fn nav(links: &[(&str, &str)]) -> String {
    let items: String = links.iter().map(|(href, title)| format!(r#"<li><a href="{href}">{title}</a></li>"#)).collect();
    format!(
        r#"<?xml version="1.0" encoding="utf-8"?>
<html xmlns="http://www.w3.org/1999/xhtml" xmlns:epub="http://www.idpf.org/2007/ops">
<head><title>Contents</title></head>
<body>
  <nav epub:type="landmarks"><ol><li><a href="cover.xhtml">Cover</a></li></ol></nav>
  <nav epub:type="toc" id="toc"><h1>Contents</h1><ol>{items}</ol></nav>
</body></html>"#
    )
}

/// Builds an EPUB 2 NCX document with flat `(src, label)` navigation points.
pub(crate) fn ncx(points: &[(&str, &str)]) -> String {
    let nav_points: String = points
        .iter()
        .enumerate()
        .map(|(i, (src, label))| {
            format!(
                r#"<navPoint id="np{i}" playOrder="{}"><navLabel><text>{label}</text></navLabel><content src="{src}"/></navPoint>"#,
                i + 1
            )
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<ncx xmlns="http://www.daisy.org/z3986/2005/ncx/" version="2005-1">
  <head><meta name="dtb:uid" content="fixture"/></head>
  <docTitle><text>Fixture</text></docTitle>
  <navMap>{nav_points}</navMap>
</ncx>"#
    )
}

/// Accumulates archive entries and serializes them as a zip.
#[derive(Default)]
pub(crate) struct EpubBuilder {
    files: Vec<(String, Vec<u8>)>,
    stored: bool,
}

impl EpubBuilder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Starts from the `mimetype` and standard `META-INF/container.xml`
    /// pointing at `OEBPS/content.opf`.
    pub(crate) fn standard() -> Self {
        Self::new().file("mimetype", "application/epub+zip").file("META-INF/container.xml", CONTAINER_XML)
    }

    pub(crate) fn file(mut self, name: &str, contents: impl AsRef<[u8]>) -> Self {
        self.files.push((name.to_string(), contents.as_ref().to_vec()));
        self
    }

    /// Writes every entry uncompressed, so entry bodies appear verbatim in the bytes.
    pub(crate) fn stored(mut self) -> Self {
        self.stored = true;
        self
    }

    pub(crate) fn to_bytes(&self) -> Vec<u8> {
        let method = if self.stored { CompressionMethod::Stored } else { CompressionMethod::Deflated };
        let options = SimpleFileOptions::default().compression_method(method);
        let mut zip = ZipWriter::new(Cursor::new(Vec::new()));
        for (name, contents) in &self.files {
            zip.start_file(name.as_str(), options).unwrap();
            zip.write_all(contents).unwrap();
        }
        zip.finish().unwrap().into_inner()
    }

    pub(crate) fn into_archive(self) -> Archive<Cursor<Vec<u8>>> {
        Archive::from_reader(Cursor::new(self.to_bytes())).unwrap()
    }

    pub(crate) fn write_to(&self, path: &Path) {
        std::fs::write(path, self.to_bytes()).unwrap();
    }
}
