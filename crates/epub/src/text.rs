//! Plain-text extraction from chapter markup.

use memchr::memchr2;
use regex::Captures;
use std::borrow::Cow;

use crate::consts::{ENTITY_REGEX, INVISIBLE_BLOCK_REGEX, LINE_BREAK_REGEX};

/// Reduces XHTML chapter markup to plain reading text, one paragraph per line.
///
/// This is a lexical pass rather than a parse: malformed markup never fails,
/// it only produces less tidy text. Invalid UTF-8 is replaced with U+FFFD.
///
/// ```
/// use quire_epub::extract_text;
/// let markup = b"<html><head><title>Ch. 1</title></head><body><h1>One</h1><p>Tom &amp; Jerry<br/>ran.</p></body></html>";
/// assert_eq!(extract_text(markup), "One\nTom & Jerry\nran.");
/// ```
pub fn extract_text(markup: &[u8]) -> String {
    let markup = String::from_utf8_lossy(markup);
    let visible = INVISIBLE_BLOCK_REGEX.replace_all(&markup, "");
    let broken = LINE_BREAK_REGEX.replace_all(&visible, "\n");
    let stripped = strip_tags(&broken);
    let decoded = decode_entities(&stripped);
    decoded.lines().map(str::trim).filter(|line| !line.is_empty()).collect::<Vec<_>>().join("\n")
}

/// Removes everything from each `<` up to and including the next `>`.
///
/// A `<` with no closing `>` discards the rest of the input.
fn strip_tags(markup: &str) -> String {
    let bytes = markup.as_bytes();
    let mut text = String::with_capacity(markup.len());
    let mut cursor = 0;
    while let Some(offset) = memchr2(b'<', b'>', &bytes[cursor..]) {
        let open = cursor + offset;
        if bytes[open] == b'>' {
            // Stray `>` outside any tag is text.
            text.push_str(&markup[cursor..=open]);
            cursor = open + 1;
            continue;
        }
        text.push_str(&markup[cursor..open]);
        match memchr::memchr(b'>', &bytes[open + 1..]) {
            Some(close) => cursor = open + 1 + close + 1,
            None => return text,
        }
    }
    text.push_str(&markup[cursor..]);
    text
}

/// Decodes the handful of entities that survive in typical EPUB chapters.
///
/// Single pass: `&amp;lt;` becomes `&lt;`, not `<`.
fn decode_entities(text: &str) -> Cow<'_, str> {
    ENTITY_REGEX.replace_all(text, |caps: &Captures<'_>| match &caps[1] {
        "nbsp" => " ",
        "amp" => "&",
        "lt" => "<",
        "gt" => ">",
        "quot" => "\"",
        _ => "'",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case("<p>Hello</p><p>World</p>", "Hello\nWorld")]
    #[case("<div><h2>Title</h2>  <p>  Body text  </p></div>", "Title\nBody text")]
    #[case("line one<br>line two<BR />line three", "line one\nline two\nline three")]
    #[case("<ul><li>a</li><li>b</li></ul>", "a\nb")]
    #[case("<p>in<em>line</em> <strong>markup</strong></p>", "inline markup")]
    #[case("<p>a</p>\n\n\n<p>b</p>", "a\nb")]
    #[case("<dl><dt>Term</dt><dd>Definition</dd></dl>", "Term\nDefinition")]
    #[case("<table><tr><th>Key</th></tr><tr><td>Name</td><td>Value</td></tr></table>", "Key\nName\nValue")]
    #[case("<div>a<hr/>b<HR class=\"rule\">c</div>", "a\nb\nc")]
    #[case("<ul><li>Item<ul><li>Sub</li></ul></li></ul>", "Item\nSub")]
    #[case("text<ol><li>first</li></ol>", "text\nfirst")]
    #[case("lead<p>para</p>tail<div>block</div>", "lead\npara\ntail\nblock")]
    #[case(r#"<figure><img src="x.png"/><figcaption>Caption</figcaption></figure><pre>code</pre>After"#, "Caption\ncode\nAfter")]
    #[case("<article><header>Top</header><aside>Side</aside><footer>End</footer></article>", "Top\nSide\nEnd")]
    #[case("<pre>kept</pre>in<progress>line</progress><link/>", "kept\ninline")]
    #[case("", "")]
    fn test_block_structure(#[case] markup: &str, #[case] expected: &str) {
        assert_eq!(extract_text(markup.as_bytes()), expected);
    }

    #[rstest]
    #[case("Fish&nbsp;&amp;&nbsp;Chips", "Fish & Chips")]
    #[case("&lt;tag&gt;", "<tag>")]
    #[case("&quot;quoted&quot; &apos;single&#39;", "\"quoted\" 'single'")]
    #[case("&amp;lt;", "&lt;")]
    #[case("&copy; 2024", "&copy; 2024")]
    fn test_entities(#[case] markup: &str, #[case] expected: &str) {
        assert_eq!(extract_text(markup.as_bytes()), expected);
    }

    #[test]
    fn test_invisible_blocks_are_dropped() {
        let markup = r#"<html><head><title>Hidden</title><style>p { color: red; }</style></head>
            <body><script type="text/javascript">if (a < b) { alert("x"); }</script><p>Shown</p>
            <STYLE>.x{}</STYLE></body></html>"#;
        assert_eq!(extract_text(markup.as_bytes()), "Shown");
    }

    #[test]
    fn test_trailing_open_bracket() {
        assert_eq!(extract_text(b"<p>Complete</p><p>Cut off <em"), "Complete\nCut off");
        assert_eq!(extract_text(b"text <"), "text");
    }

    #[test]
    fn test_stray_close_bracket_is_text() {
        assert_eq!(extract_text(b"<p>a > b</p>"), "a > b");
    }

    #[rstest]
    #[case("Just some plain text.")]
    #[case("Two\nlines")]
    #[case("Ünïcödé — fine")]
    fn test_idempotent_on_plain_text(#[case] text: &str) {
        let once = extract_text(text.as_bytes());
        assert_eq!(once, text);
        assert_eq!(extract_text(once.as_bytes()), once);
    }

    #[test]
    fn test_invalid_utf8_is_replaced() {
        assert_eq!(extract_text(b"<p>caf\xe9</p>"), "caf\u{FFFD}");
    }
}
