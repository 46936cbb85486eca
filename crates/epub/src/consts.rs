use regex::Regex;
use scraper::Selector;
use std::sync::LazyLock;

/// Fixed location of the container pointer file inside every EPUB.
pub(crate) const CONTAINER_PATH: &str = "META-INF/container.xml";
/// Media type identifying an EPUB 2 NCX table of contents.
pub(crate) const NCX_MEDIA_TYPE: &str = "application/x-dtbncx+xml";
/// Manifest `properties` token identifying an EPUB 3 navigation document.
pub(crate) const NAV_PROPERTY: &str = "nav";
/// Marker placed on both sides of a highlighted search match.
pub const HIGHLIGHT_MARKER: &str = "**";

macro_rules! selector {
    ($name:ident, $css:expr) => {
        pub(crate) static $name: LazyLock<Selector> = LazyLock::new(|| Selector::parse($css).unwrap());
    };
}

macro_rules! regex {
    ($name:ident, $regex:expr) => {
        pub(crate) static $name: LazyLock<Regex> = LazyLock::new(|| Regex::new($regex).unwrap());
    };
}

selector!(NAV_SELECTOR, "nav");
selector!(ANCHOR_SELECTOR, "a[href]");
// Blocks whose text content is never part of the reading text.
regex!(INVISIBLE_BLOCK_REGEX, r"(?is)<head\b.*?</head\s*>|<script\b.*?</script\s*>|<style\b.*?</style\s*>");
// Line breaks, rules, and the open and close of block-level elements.
regex!(
    LINE_BREAK_REGEX,
    r"(?i)<(?:br|hr)\b[^>]*>|<(?:p|div|ul|ol|dl|li|table|tr|pre|blockquote|figure|section|article|aside|header|footer|nav|main|address)\b[^>]*>|</(?:p|div|h[1-6]|li|blockquote|tr|section|dt|dd|td|th|pre|figcaption|figure|article|aside|header|footer|nav|ul|ol|dl|table|caption|address|main)\s*>"
);
regex!(ENTITY_REGEX, r"&(nbsp|amp|lt|gt|quot|apos|#39);");
