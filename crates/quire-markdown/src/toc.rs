//! Page title and heading outline extraction.

use std::collections::HashMap;

use crate::tree::{Node, Root};

/// Outline entry for one heading.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "camelCase"))]
pub struct Header {
    /// Heading level (2-6).
    pub depth: u8,
    /// Heading text.
    pub text: String,
    /// Anchor id, with a `-n` suffix for the n-th repeat of the same slug.
    pub id: String,
    /// Character offset of the heading in the page's search content,
    /// or [`Header::NO_CHAR_INDEX`].
    pub char_index: i64,
}

impl Header {
    /// Sentinel for "no position available".
    pub const NO_CHAR_INDEX: i64 = -1;

    /// Whether `char_index` points into the search content.
    #[must_use]
    pub fn has_char_index(&self) -> bool {
        self.char_index >= 0
    }
}

/// Title and outline of a page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Toc {
    /// Text of the first level-1 heading, empty if none.
    pub title: String,
    /// Headings of level 2 up to the configured maximum, in document order.
    pub headers: Vec<Header>,
}

/// Extract the title and outline from a freshly parsed tree.
///
/// Only top-level headings are considered. Level-1 headings never enter the
/// outline; the first one becomes the title. Ids come from the `{#id}`
/// attribute when present, otherwise from [`slugify`], and repeated ids get a
/// numeric suffix in document order (`usage`, `usage-1`, ...).
#[must_use]
pub fn parse_toc(root: &Root, max_depth: u8) -> Toc {
    let mut toc = Toc::default();
    let mut seen_title = false;
    let mut ids = IdGenerator::default();

    for node in &root.children {
        let Node::Heading {
            depth, id, children, ..
        } = node
        else {
            continue;
        };
        let text: String = children.iter().map(Node::text_content).collect();
        let text = text.trim();

        if *depth == 1 {
            if !seen_title {
                toc.title = text.to_owned();
                seen_title = true;
            }
            continue;
        }
        if *depth > max_depth {
            continue;
        }

        let id = match id {
            Some(custom) => ids.reserve(custom),
            None => ids.generate(text),
        };
        toc.headers.push(Header {
            depth: *depth,
            text: text.to_owned(),
            id,
            char_index: Header::NO_CHAR_INDEX,
        });
    }

    toc
}

/// Unique heading id generator.
#[derive(Default)]
struct IdGenerator {
    counts: HashMap<String, usize>,
}

impl IdGenerator {
    /// Generate a unique id for heading text.
    fn generate(&mut self, text: &str) -> String {
        let base_id = slugify(text);
        let count = self.counts.entry(base_id.clone()).or_default();
        let id = match *count {
            0 => base_id,
            n => format!("{base_id}-{n}"),
        };
        *count += 1;
        id
    }

    /// Record an explicit id so later generated ids avoid it.
    fn reserve(&mut self, id: &str) -> String {
        *self.counts.entry(id.to_owned()).or_default() += 1;
        id.to_owned()
    }
}

/// Convert heading text to an anchor slug.
///
/// Lowercases, turns each space into `-`, keeps letters and digits of any
/// script plus `-` and `_`, and drops everything else.
#[must_use]
pub fn slugify(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.trim().chars() {
        if c == ' ' {
            result.push('-');
        } else if c.is_alphanumeric() || c == '-' || c == '_' {
            result.extend(c.to_lowercase());
        }
    }
    result
}
