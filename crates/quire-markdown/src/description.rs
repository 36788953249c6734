//! Page description synthesis.
//!
//! The description is the prose between the page title and the first
//! level-2 heading, flattened to a single line.

use std::sync::LazyLock;

use regex::Regex;

use crate::tree::{Node, NodeKind, Root};

static DIRECTIVE_OPEN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\s*:::\s*(\w+)\s*(.*)?").unwrap());
static DIRECTIVE_CLOSE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"^\s*:::\s*$").unwrap());

/// Node kinds that never contribute text to a description.
const SKIPPED: [NodeKind; 7] = [
    NodeKind::Code,
    NodeKind::Html,
    NodeKind::MdxjsEsm,
    NodeKind::MdxFlowExpression,
    NodeKind::ThematicBreak,
    NodeKind::Image,
    NodeKind::Table,
];

#[derive(Clone, Copy, PartialEq, Eq)]
enum State {
    BeforeTitle,
    Collecting,
}

/// Extract the description of a page from its unmodified tree.
///
/// Collects the trimmed text of top-level nodes after the first level-1
/// heading and before the first level-2 heading that follows it. Code, HTML,
/// MDX statements and expressions, rules, images, tables and further level-1
/// headings are skipped.
/// Container directives (`:::tip` ... `:::`) are then removed and the
/// remaining non-empty lines are joined with single spaces.
#[must_use]
pub fn extract_description(root: &Root) -> String {
    let mut state = State::BeforeTitle;
    let mut fragments: Vec<String> = Vec::new();

    for node in &root.children {
        match (state, node) {
            (State::BeforeTitle, Node::Heading { depth: 1, .. }) => state = State::Collecting,
            (State::BeforeTitle, _) => {}
            (State::Collecting, Node::Heading { depth: 2, .. }) => break,
            (State::Collecting, Node::Heading { depth: 1, .. }) => {}
            (State::Collecting, node) if SKIPPED.contains(&node.kind()) => {}
            (State::Collecting, node) => {
                let text = node.text_content();
                let text = text.trim();
                if !text.is_empty() {
                    fragments.push(text.to_owned());
                }
            }
        }
    }

    let stripped = strip_container_directives(&fragments.join("\n"));
    stripped
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join(" ")
}

/// Remove `:::name` ... `:::` container directive blocks from text.
///
/// Works on lines so a directive split across several blocks is still
/// matched. An opener without a closer removes only its own line and
/// everything after it is kept as is.
#[must_use]
pub fn strip_container_directives(text: &str) -> String {
    if !text.contains(":::") {
        return text.to_owned();
    }

    let lines: Vec<&str> = text.split('\n').collect();
    let mut kept = Vec::with_capacity(lines.len());
    let mut i = 0;
    while i < lines.len() {
        let line = lines[i];
        if DIRECTIVE_OPEN.is_match(line) {
            let closer = lines[i + 1..]
                .iter()
                .position(|l| DIRECTIVE_CLOSE.is_match(l));
            let Some(offset) = closer else {
                kept.extend_from_slice(&lines[i + 1..]);
                break;
            };
            i += offset + 2;
            continue;
        }
        kept.push(line);
        i += 1;
    }
    kept.join("\n")
}
