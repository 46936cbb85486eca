//! Archive path canonicalization.
//!
//! Hrefs inside an EPUB are relative to whichever document declares them: the
//! package descriptor for manifest items, the TOC document for TOC targets.
//! Every href is resolved into a single canonical form before it is compared
//! or used as a key:
//!
//! - `/`-separated (backslashes are treated as separators),
//! - percent-decoded,
//! - no empty, `.` or `..` segments,
//! - relative to the archive root.
//!
//! Zip entry names are always `/`-separated regardless of platform, so this
//! works on strings rather than [`std::path::Path`].

use percent_encoding::percent_decode_str;

/// Canonicalizes an archive path.
///
/// `..` segments that would climb above the archive root are dropped; there is
/// nothing above the root of an archive to climb to.
///
/// # Examples
///
/// ```
/// use quire_epub::path::canonicalize;
/// assert_eq!(canonicalize("OEBPS//text/./ch1.xhtml"), "OEBPS/text/ch1.xhtml");
/// assert_eq!(canonicalize("OEBPS/text/../images/cover.jpg"), "OEBPS/images/cover.jpg");
/// assert_eq!(canonicalize("../../ch1.xhtml"), "ch1.xhtml");
/// assert_eq!(canonicalize("Text\\chapter%201.xhtml"), "Text/chapter 1.xhtml");
/// ```
pub fn canonicalize(path: &str) -> String {
    let decoded = percent_decode_str(path).decode_utf8_lossy();
    let mut segments: Vec<&str> = Vec::new();
    for segment in decoded.split(['/', '\\']) {
        match segment {
            "" | "." => {},
            ".." => {
                segments.pop();
            },
            normal => segments.push(normal),
        }
    }
    segments.join("/")
}

/// Resolves `href` against the directory `base_dir` and canonicalizes the result.
///
/// An href starting with `/` is taken relative to the archive root, ignoring
/// `base_dir`.
///
/// ```
/// use quire_epub::path::resolve;
/// assert_eq!(resolve("OEBPS/text", "ch1.xhtml"), "OEBPS/text/ch1.xhtml");
/// assert_eq!(resolve("OEBPS/text", "../ch1.xhtml"), "OEBPS/ch1.xhtml");
/// assert_eq!(resolve("", "ch1.xhtml"), "ch1.xhtml");
/// assert_eq!(resolve("OEBPS", "/ch1.xhtml"), "ch1.xhtml");
/// ```
pub fn resolve(base_dir: &str, href: &str) -> String {
    if href.starts_with('/') || base_dir.is_empty() {
        return canonicalize(href);
    }
    canonicalize(&format!("{base_dir}/{href}"))
}

/// Returns the directory portion of a canonical path (`""` for the archive root).
pub fn parent(path: &str) -> &str {
    path.rsplit_once('/').map(|(dir, _)| dir).unwrap_or("")
}

/// Removes a `#fragment` from an href.
pub fn strip_fragment(href: &str) -> &str {
    href.split_once('#').map(|(path, _)| path).unwrap_or(href)
}

/// Returns `true` when the href carries a URL scheme (`http:`, `mailto:`, ...)
/// and therefore can never name an archive entry.
pub(crate) fn is_external(href: &str) -> bool {
    match href.find(':') {
        Some(colon) => !href[..colon].contains(['/', '#', '?']),
        None => false,
    }
}

/// The final path segment with its extension removed.
///
/// When removing the extension would leave nothing (`.xhtml`) the whole
/// segment is returned instead.
pub fn file_stem(path: &str) -> &str {
    let name = path.rsplit_once('/').map(|(_, name)| name).unwrap_or(path);
    match name.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => name,
    }
}
