//! EPUB 2 navigation control file (NCX).

use exn::ResultExt;
use quick_xml::Reader;
use quick_xml::events::Event;

use crate::error::{ErrorKind, Result};
use crate::package::attribute;

#[derive(Default)]
struct NavPoint {
    label: Option<String>,
    src: Option<String>,
}

/// Collects `(src, label)` pairs from every `navPoint`, nested ones included,
/// in document order.
pub(super) fn links(content: &[u8]) -> Result<Vec<(String, String)>> {
    let xml = String::from_utf8_lossy(content);
    // Text is split around entity references, so it must not be trimmed.
    let mut reader = Reader::from_str(&xml);

    let mut points: Vec<NavPoint> = Vec::new();
    // Indices into `points` of the currently open navPoints.
    let mut open: Vec<usize> = Vec::new();
    let mut root_seen = false;
    let mut in_label = false;
    let mut in_text = false;
    let mut text = String::new();

    loop {
        let event = reader.read_event().or_raise(|| ErrorKind::MalformedNcxToc)?;
        match &event {
            Event::Start(e) | Event::Empty(e) => {
                let name = e.local_name();
                let is_start = matches!(event, Event::Start(_));
                match name.as_ref() {
                    b"ncx" if !root_seen => root_seen = true,
                    _ if !root_seen => exn::bail!(ErrorKind::MalformedNcxToc),
                    b"navPoint" if is_start => {
                        open.push(points.len());
                        points.push(NavPoint::default());
                    },
                    b"navLabel" => in_label = is_start,
                    b"text" if in_label && is_start => {
                        in_text = true;
                        text.clear();
                    },
                    b"content" => {
                        if let Some(&current) = open.last()
                            && points[current].src.is_none()
                        {
                            points[current].src = attribute(e, b"src");
                        }
                    },
                    _ => {},
                }
            },
            Event::Text(e) if in_text => text.push_str(&String::from_utf8_lossy(e)),
            Event::CData(e) if in_text => text.push_str(&String::from_utf8_lossy(e)),
            Event::GeneralRef(e) if in_text => {
                if let Some(resolved) = resolve_entity(&String::from_utf8_lossy(e)) {
                    text.push(resolved);
                }
            },
            Event::End(e) => match e.local_name().as_ref() {
                b"navPoint" => {
                    open.pop();
                },
                b"navLabel" => in_label = false,
                b"text" if in_text => {
                    in_text = false;
                    // Only the first label text belongs to the point.
                    if let Some(&current) = open.last()
                        && points[current].label.is_none()
                    {
                        points[current].label = Some(text.split_whitespace().collect::<Vec<_>>().join(" "));
                    }
                },
                _ => {},
            },
            Event::Eof => break,
            _ => {},
        }
    }
    if !root_seen {
        exn::bail!(ErrorKind::MalformedNcxToc);
    }
    Ok(points
        .into_iter()
        .filter_map(|point| match point.src {
            Some(src) if !src.trim().is_empty() => Some((src.trim().to_string(), point.label.unwrap_or_default())),
            _ => None,
        })
        .collect())
}

fn resolve_entity(entity: &str) -> Option<char> {
    match entity {
        "apos" => Some('\''),
        "quot" => Some('"'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "amp" => Some('&'),
        _ => {
            let code = match entity.strip_prefix("#x").or_else(|| entity.strip_prefix("#X")) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => entity.strip_prefix('#')?.parse().ok()?,
            };
            char::from_u32(code)
        },
    }
}
