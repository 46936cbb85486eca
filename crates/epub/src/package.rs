//! Container pointer and package descriptor (OPF) parsing.

use exn::{OptionExt, ResultExt};
use quick_xml::Reader;
use quick_xml::escape::unescape;
use quick_xml::events::{BytesStart, Event};
use std::collections::HashMap;
use std::io::{Read, Seek};
use tracing::instrument;

use crate::archive::Archive;
use crate::consts::{CONTAINER_PATH, NAV_PROPERTY, NCX_MEDIA_TYPE};
use crate::error::{ErrorKind, Result};
use crate::path;

/// One `<item>` of the package manifest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestItem {
    pub id: String,
    /// Canonical archive path, already resolved against the descriptor's directory.
    pub href: String,
    pub media_type: String,
    /// Space-separated `properties` attribute (empty when absent).
    pub properties: String,
}
impl ManifestItem {
    /// Returns `true` if this item is declared as the EPUB 3 navigation document.
    pub fn is_nav(&self) -> bool {
        self.properties.split_ascii_whitespace().any(|p| p == NAV_PROPERTY)
    }

    /// Returns `true` if this item is an EPUB 2 NCX document.
    pub fn is_ncx(&self) -> bool {
        self.media_type.trim().eq_ignore_ascii_case(NCX_MEDIA_TYPE)
    }
}

/// The parsed package descriptor: manifest items in declaration order and
/// the spine as an ordered list of manifest ids (duplicates preserved).
#[derive(Debug, Clone, Default)]
pub struct Package {
    /// Canonical archive path of the descriptor itself.
    pub path: String,
    pub manifest: Vec<ManifestItem>,
    pub spine: Vec<String>,
    by_id: HashMap<String, usize>,
}
impl Package {
    /// Look up a manifest item by id. On duplicate ids the last declaration wins.
    pub fn item(&self, id: &str) -> Option<&ManifestItem> {
        self.by_id.get(id).map(|&i| &self.manifest[i])
    }

    /// Directory of the descriptor, against which manifest hrefs resolve.
    pub fn base_dir(&self) -> &str {
        path::parent(&self.path)
    }

    fn push_item(&mut self, item: ManifestItem) {
        self.by_id.insert(item.id.clone(), self.manifest.len());
        self.manifest.push(item);
    }
}

/// Finds the package descriptor path declared by `META-INF/container.xml`.
///
/// Only the first declared rootfile is honoured.
#[instrument(level = "debug", skip_all)]
pub fn locate_descriptor<R: Read + Seek>(archive: &mut Archive<R>) -> Result<String> {
    let xml = archive.read_to_string(CONTAINER_PATH).or_raise(|| ErrorKind::MalformedContainer)?;
    let path = parse_container(&xml)?;
    Ok(path::canonicalize(&path))
}

/// Reads and parses the package descriptor at `descriptor`.
#[instrument(level = "debug", skip(archive))]
pub fn parse_descriptor<R: Read + Seek>(archive: &mut Archive<R>, descriptor: &str) -> Result<Package> {
    let xml = archive.read_to_string(descriptor).or_raise(|| ErrorKind::MalformedPackage)?;
    let package = parse_package(&xml, descriptor)?;
    tracing::debug!(manifest = package.manifest.len(), spine = package.spine.len(), "Parsed package descriptor");
    Ok(package)
}

fn parse_container(xml: &str) -> Result<String> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut root_seen = false;
    loop {
        let event = reader.read_event().or_raise(|| ErrorKind::MalformedContainer)?;
        match event {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.local_name();
                if !root_seen {
                    if name.as_ref() != b"container" {
                        exn::bail!(ErrorKind::MalformedContainer);
                    }
                    root_seen = true;
                } else if name.as_ref() == b"rootfile"
                    && let Some(full_path) = attribute(&e, b"full-path")
                    && !full_path.is_empty()
                {
                    return Ok(full_path);
                }
            },
            Event::Eof => break,
            _ => {},
        }
    }
    exn::bail!(ErrorKind::MalformedContainer)
}

fn parse_package(xml: &str, descriptor: &str) -> Result<Package> {
    let mut package = Package { path: descriptor.to_string(), ..Default::default() };
    let base_dir = path::parent(descriptor);
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);
    let mut root_seen = false;
    let mut in_manifest = false;
    let mut in_spine = false;
    loop {
        let event = reader.read_event().or_raise(|| ErrorKind::MalformedPackage)?;
        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.local_name();
                let is_start = matches!(event, Event::Start(_));
                match name.as_ref() {
                    b"package" if !root_seen => root_seen = true,
                    _ if !root_seen => exn::bail!(ErrorKind::MalformedPackage),
                    b"manifest" => in_manifest = is_start,
                    b"spine" => in_spine = is_start,
                    b"item" if in_manifest => {
                        let (Some(id), Some(href)) = (attribute(e, b"id"), attribute(e, b"href")) else {
                            tracing::debug!("Skipping manifest item without id or href");
                            continue;
                        };
                        package.push_item(ManifestItem {
                            id,
                            href: path::resolve(base_dir, &href),
                            media_type: attribute(e, b"media-type").unwrap_or_default(),
                            properties: attribute(e, b"properties").unwrap_or_default(),
                        });
                    },
                    b"itemref" if in_spine => {
                        if let Some(idref) = attribute(e, b"idref") {
                            package.spine.push(idref);
                        }
                    },
                    _ => {},
                }
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"manifest" => in_manifest = false,
                b"spine" => in_spine = false,
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
    }
    root_seen.then_some(package).ok_or_raise(|| ErrorKind::MalformedPackage)
}

/// Returns the unescaped value of the attribute `key` (matched on its local name).
pub(crate) fn attribute(element: &BytesStart<'_>, key: &[u8]) -> Option<String> {
    element.attributes().flatten().find(|attr| attr.key.local_name().as_ref() == key).map(|attr| {
        let raw = String::from_utf8_lossy(&attr.value);
        unescape(&raw).map(|value| value.into_owned()).unwrap_or_else(|_| raw.into_owned())
    })
}
