//! Whole-entry access to the zip container of an EPUB.

use exn::ResultExt;
use std::fs::File;
use std::io::{BufReader, Read, Seek};
use std::path::Path;
use tracing::instrument;
use zip::ZipArchive;
use zip::result::ZipError;

use crate::error::{ErrorKind, Result};

const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// An open EPUB container.
///
/// The underlying file handle is owned by this value and released when it is
/// dropped, so every exit path of an operation (including `?`) closes it.
pub struct Archive<R = BufReader<File>> {
    zip: ZipArchive<R>,
}

impl Archive {
    /// Open the archive at `path` and read its central directory.
    #[instrument(level = "debug", skip_all, fields(path = %path.as_ref().display()))]
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let file = File::open(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::ArchiveNotFound(path.to_path_buf()),
            _ => ErrorKind::Io,
        })?;
        Self::from_reader(BufReader::new(file))
    }
}

impl<R: Read + Seek> Archive<R> {
    /// Wrap any seekable reader (an in-memory buffer, for example).
    pub fn from_reader(reader: R) -> Result<Self> {
        let zip = ZipArchive::new(reader).or_raise(|| ErrorKind::Corrupt)?;
        Ok(Self { zip })
    }

    /// Returns `true` if an entry with exactly this name exists.
    pub fn contains(&self, name: &str) -> bool {
        self.zip.index_for_name(name).is_some()
    }

    /// Number of entries in the archive.
    pub fn len(&self) -> usize {
        self.zip.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zip.is_empty()
    }

    /// Read the complete, decompressed contents of the entry `name`.
    pub fn read(&mut self, name: &str) -> Result<Vec<u8>> {
        let mut entry = match self.zip.by_name(name) {
            Ok(entry) => entry,
            Err(ZipError::FileNotFound) => exn::bail!(ErrorKind::EntryNotFound(name.to_string())),
            Err(ZipError::Io(_)) => exn::bail!(ErrorKind::Io),
            Err(e) => return Err(e).or_raise(|| ErrorKind::Corrupt),
        };
        let mut contents = Vec::new();
        entry.read_to_end(&mut contents).or_raise(|| ErrorKind::Corrupt)?;
        Ok(contents)
    }

    /// Read the entry `name` as text.
    ///
    /// A UTF-8 byte-order mark is stripped, and invalid byte sequences are
    /// replaced with U+FFFD rather than failing.
    pub fn read_to_string(&mut self, name: &str) -> Result<String> {
        let bytes = self.read(name)?;
        let bytes = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);
        Ok(String::from_utf8_lossy(bytes).into_owned())
    }
}
