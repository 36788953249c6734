//! Heading positions in search content.

use std::collections::HashMap;

use quire_markdown::Header;

/// Locate each outline heading in the final search content.
///
/// The marker for a heading is `#` repeated `depth` times, a space and the
/// heading text, matched as a whole line. When earlier outline entries share
/// the same depth and text, that many matches are skipped first, so repeated
/// headings resolve to increasing offsets. The offset is a character
/// position; a heading that cannot be found gets [`Header::NO_CHAR_INDEX`].
#[must_use]
pub fn resolve_char_indices(headers: &[Header], content: &str) -> Vec<Header> {
    let mut seen: HashMap<(u8, &str), usize> = HashMap::new();
    headers
        .iter()
        .map(|header| {
            let earlier = seen.entry((header.depth, header.text.as_str())).or_default();
            let char_index = char_index(header, *earlier, content);
            *earlier += 1;
            Header {
                char_index,
                ..header.clone()
            }
        })
        .collect()
}

fn char_index(header: &Header, skip: usize, content: &str) -> i64 {
    let marker = format!("{} {}", "#".repeat(usize::from(header.depth)), header.text);

    let mut from = 0;
    let mut found = None;
    for _ in 0..=skip {
        let Some(pos) = find_line(content, &marker, from) else {
            return Header::NO_CHAR_INDEX;
        };
        found = Some(pos);
        from = pos + 1;
    }

    found.map_or(Header::NO_CHAR_INDEX, |pos| {
        i64::try_from(content[..pos].chars().count()).unwrap_or(Header::NO_CHAR_INDEX)
    })
}

/// Byte position of the first line equal to `marker` at or after `from`.
fn find_line(content: &str, marker: &str, from: usize) -> Option<usize> {
    let bytes = content.as_bytes();
    let mut start = from;
    loop {
        let pos = start + content.get(start..)?.find(marker)?;
        let end = pos + marker.len();
        let line_start = pos == 0 || bytes[pos - 1] == b'\n';
        let line_end = end == bytes.len() || bytes[end] == b'\n';
        if line_start && line_end {
            return Some(pos);
        }
        // Markers start with ASCII `#`, so this stays on a char boundary.
        start = pos + 1;
    }
}
