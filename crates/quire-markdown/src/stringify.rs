//! Document tree to markdown serialization.
//!
//! Output style is fixed by [`StringifyOptions`]: ATX headings, fenced code,
//! `***` rules and list items whose continuation lines are indented by the
//! marker width plus one space.

use std::fmt::Write;

use crate::tree::{Align, Node, Root};

/// Serialization options.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StringifyOptions {
    /// Bullet character for unordered lists.
    pub bullet: char,
    /// Marker for thematic breaks.
    pub rule: &'static str,
}

impl Default for StringifyOptions {
    fn default() -> Self {
        Self {
            bullet: '-',
            rule: "***",
        }
    }
}

/// Serialize a document tree to markdown.
///
/// Blocks are separated by a blank line and non-empty output ends with a
/// single newline.
#[must_use]
pub fn stringify(root: &Root, options: &StringifyOptions) -> String {
    let writer = Writer { options };
    let mut out = writer.blocks(&root.children, "\n\n");
    if !out.is_empty() {
        out.push('\n');
    }
    out
}

struct Writer<'a> {
    options: &'a StringifyOptions,
}

impl Writer<'_> {
    fn blocks(&self, nodes: &[Node], separator: &str) -> String {
        let mut out = String::new();
        for node in nodes {
            let block = self.block(node);
            if !out.is_empty() {
                out.push_str(separator);
            }
            out.push_str(&block);
        }
        out
    }

    fn block(&self, node: &Node) -> String {
        match node {
            Node::Heading {
                depth, children, ..
            } => {
                let marker = "#".repeat(usize::from(*depth));
                let text = self.inlines(children);
                if text.is_empty() {
                    marker
                } else {
                    format!("{marker} {text}")
                }
            }
            Node::Paragraph { children } | Node::TableCell { children } => self.inlines(children),
            Node::Code { lang, meta, value } => {
                let fence = "`".repeat(longest_run(value, '`').max(2) + 1);
                let mut info = lang.clone().unwrap_or_default();
                if let Some(meta) = meta {
                    info.push(' ');
                    info.push_str(meta);
                }
                if value.is_empty() {
                    format!("{fence}{info}\n{fence}")
                } else {
                    format!("{fence}{info}\n{value}\n{fence}")
                }
            }
            Node::Html(value) | Node::MdxjsEsm(value) | Node::MdxFlowExpression(value) => {
                value.clone()
            }
            Node::List {
                ordered,
                start,
                spread,
                children,
            } => self.list(*ordered, *start, *spread, children),
            Node::ListItem { .. } => self.list_item(node, &self.options.bullet.to_string()),
            Node::Blockquote { children } => {
                let inner = self.blocks(children, "\n\n");
                prefix_lines(&inner, "> ", ">")
            }
            Node::ThematicBreak => self.options.rule.to_owned(),
            Node::Table { align, children } => self.table(align, children),
            Node::TableRow { children } => self.table_row(children),
            Node::Text(_)
            | Node::Emphasis { .. }
            | Node::Strong { .. }
            | Node::Delete { .. }
            | Node::InlineCode(_)
            | Node::Link { .. }
            | Node::Image { .. }
            | Node::Break => self.inline(node),
        }
    }

    fn list(&self, ordered: bool, start: Option<u64>, spread: bool, items: &[Node]) -> String {
        let separator = if spread { "\n\n" } else { "\n" };
        let mut out = String::new();
        let mut number = start.unwrap_or(1);
        for item in items {
            let marker = if ordered {
                let marker = format!("{number}.");
                number += 1;
                marker
            } else {
                self.options.bullet.to_string()
            };
            if !out.is_empty() {
                out.push_str(separator);
            }
            out.push_str(&self.list_item(item, &marker));
        }
        out
    }

    fn list_item(&self, item: &Node, marker: &str) -> String {
        let (checked, spread, children) = match item {
            Node::ListItem {
                checked,
                spread,
                children,
            } => (*checked, *spread, children.as_slice()),
            other => (None, false, std::slice::from_ref(other)),
        };

        let content = self.blocks(children, if spread { "\n\n" } else { "\n" });
        let task = match checked {
            Some(true) => "[x] ",
            Some(false) => "[ ] ",
            None => "",
        };

        if content.is_empty() && task.is_empty() {
            return marker.to_owned();
        }

        let indent = " ".repeat(marker.len() + 1);
        let mut out = String::with_capacity(content.len() + marker.len() + 8);
        for (i, line) in content.split('\n').enumerate() {
            if i == 0 {
                write!(out, "{marker} {task}{line}").unwrap();
            } else {
                out.push('\n');
                if !line.is_empty() {
                    out.push_str(&indent);
                    out.push_str(line);
                }
            }
        }
        out
    }

    fn table(&self, align: &[Align], rows: &[Node]) -> String {
        let mut lines = Vec::with_capacity(rows.len() + 1);
        for (i, row) in rows.iter().enumerate() {
            lines.push(self.block(row));
            if i == 0 {
                let columns = row.children().len().max(align.len());
                let cells: Vec<&str> = (0..columns)
                    .map(|c| match align.get(c) {
                        Some(Align::Left) => ":-",
                        Some(Align::Right) => "-:",
                        Some(Align::Center) => ":-:",
                        Some(Align::None) | None => "-",
                    })
                    .collect();
                lines.push(format!("| {} |", cells.join(" | ")));
            }
        }
        lines.join("\n")
    }

    fn table_row(&self, cells: &[Node]) -> String {
        let cells: Vec<String> = cells
            .iter()
            .map(|cell| self.inlines(cell.children()).replace('|', "\\|"))
            .collect();
        format!("| {} |", cells.join(" | "))
    }

    fn inlines(&self, nodes: &[Node]) -> String {
        nodes.iter().map(|node| self.inline(node)).collect()
    }

    fn inline(&self, node: &Node) -> String {
        match node {
            Node::Text(value) => value.clone(),
            Node::Emphasis { children } => format!("*{}*", self.inlines(children)),
            Node::Strong { children } => format!("**{}**", self.inlines(children)),
            Node::Delete { children } => format!("~~{}~~", self.inlines(children)),
            Node::InlineCode(value) => {
                let ticks = "`".repeat(longest_run(value, '`') + 1);
                if value.contains('`') {
                    format!("{ticks} {value} {ticks}")
                } else {
                    format!("{ticks}{value}{ticks}")
                }
            }
            Node::Html(value) => value.clone(),
            Node::Link {
                url,
                title,
                children,
            } => format!(
                "[{}]({}{})",
                self.inlines(children),
                url,
                title_suffix(title)
            ),
            Node::Image { url, title, alt } => format!("![{alt}]({url}{})", title_suffix(title)),
            Node::Break => "\\\n".to_owned(),
            block => self.block(block),
        }
    }
}

fn title_suffix(title: &str) -> String {
    if title.is_empty() {
        String::new()
    } else {
        format!(" \"{}\"", title.replace('"', "\\\""))
    }
}

/// Length of the longest run of `c` in `s`.
fn longest_run(s: &str, c: char) -> usize {
    let mut longest = 0;
    let mut current = 0;
    for ch in s.chars() {
        if ch == c {
            current += 1;
            longest = longest.max(current);
        } else {
            current = 0;
        }
    }
    longest
}

fn prefix_lines(text: &str, prefix: &str, empty_prefix: &str) -> String {
    text.split('\n')
        .map(|line| {
            if line.is_empty() {
                empty_prefix.to_owned()
            } else {
                format!("{prefix}{line}")
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
