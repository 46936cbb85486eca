//! EPUB 3 navigation document.

use scraper::{ElementRef, Html};

use crate::consts;
use crate::error::{ErrorKind, Result};

/// Collects `(href, title)` pairs from the `toc` landmark, depth-first, in
/// document order. Links without visible text are skipped.
pub(super) fn links(content: &[u8]) -> Result<Vec<(String, String)>> {
    let document = Html::parse_document(&String::from_utf8_lossy(content));
    let Some(toc) = document.select(&consts::NAV_SELECTOR).find(is_toc_landmark) else {
        exn::bail!(ErrorKind::MalformedNavToc);
    };
    let mut links = Vec::new();
    for anchor in toc.select(&consts::ANCHOR_SELECTOR) {
        let Some(href) = anchor.value().attr("href").map(str::trim).filter(|h| !h.is_empty()) else {
            continue;
        };
        let title = anchor.text().flat_map(str::split_whitespace).collect::<Vec<_>>().join(" ");
        if !title.is_empty() {
            links.push((href.to_string(), title));
        }
    }
    Ok(links)
}

/// `<nav epub:type="toc">`, or `<nav type="toc">` in documents that dropped
/// the namespace prefix.
fn is_toc_landmark(nav: &ElementRef<'_>) -> bool {
    nav.value()
        .attrs()
        .any(|(name, value)| (name == "type" || name.ends_with(":type")) && value.contains("toc"))
}
