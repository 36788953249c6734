//! Markdown to document tree conversion.
//!
//! Folds the pulldown-cmark event stream into a [`Root`] with a frame stack:
//! every `Start` pushes a frame collecting child nodes, the matching `End`
//! pops it and emits the finished node into its parent.

use std::ops::Range;
use std::sync::LazyLock;

use pulldown_cmark::{Alignment, CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::tree::{Align, Node, Root};

/// `import x from 'y'`, `import 'y'`, `export const ...` and friends.
static ESM_STATEMENT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r#"^(?:import\s*['"]|import\s+[\s\S]*?\sfrom\s*['"]|export\s+(?:default\b|const\s|let\s|var\s|function\b|async\s+function\b|class\s|type\s|interface\s|\{|\*))"#,
    )
    .unwrap()
});

/// Parser options: GFM tables, strikethrough, task lists and `{#id}` heading attributes.
fn parser_options() -> Options {
    Options::ENABLE_TABLES
        | Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_HEADING_ATTRIBUTES
}

/// Parse markdown into a document tree.
///
/// Top-level paragraphs that are really MDX blocks are recognised from their
/// source text: `import`/`export` statements become [`Node::MdxjsEsm`] and
/// paragraphs wrapped in braces become [`Node::MdxFlowExpression`].
#[must_use]
pub fn parse(markdown: &str) -> Root {
    let mut builder = TreeBuilder::new(markdown);
    for (event, range) in Parser::new_ext(markdown, parser_options()).into_offset_iter() {
        builder.event(event, range);
    }
    builder.finish()
}

/// Open container awaiting its `End` event.
enum Frame {
    Heading { depth: u8, id: Option<String> },
    Paragraph { range: Range<usize> },
    Emphasis,
    Strong,
    Delete,
    Link { url: String, title: String },
    Image { url: String, title: String },
    Code { lang: Option<String>, meta: Option<String> },
    Html,
    List { ordered: bool, start: Option<u64> },
    Item { checked: Option<bool> },
    Blockquote,
    Table { align: Vec<Align> },
    TableRow,
    TableCell,
    /// Container whose children are hoisted into the parent.
    Transparent,
    /// Container whose content is dropped (e.g. metadata blocks).
    Discard,
}

struct TreeBuilder<'s> {
    source: &'s str,
    stack: Vec<(Frame, Vec<Node>)>,
    root: Vec<Node>,
}

impl<'s> TreeBuilder<'s> {
    fn new(source: &'s str) -> Self {
        Self {
            source,
            stack: Vec::new(),
            root: Vec::new(),
        }
    }

    fn event(&mut self, event: Event<'_>, range: Range<usize>) {
        match event {
            Event::Start(tag) => self.start(tag, range),
            Event::End(tag) => self.end(tag),
            Event::Text(text) => self.push(Node::Text(text.into_string())),
            Event::Code(code) => self.push(Node::InlineCode(code.into_string())),
            Event::Html(html) => {
                if matches!(self.stack.last(), Some((Frame::Html, _))) {
                    self.push(Node::Text(html.into_string()));
                } else {
                    self.push(Node::Html(html.into_string()));
                }
            }
            Event::InlineHtml(html) => self.push(Node::Html(html.into_string())),
            Event::InlineMath(math) | Event::DisplayMath(math) => {
                self.push(Node::InlineCode(math.into_string()));
            }
            Event::FootnoteReference(label) => self.push(Node::Text(format!("[^{label}]"))),
            Event::SoftBreak => self.push(Node::Text("\n".to_owned())),
            Event::HardBreak => self.push(Node::Break),
            Event::Rule => self.push(Node::ThematicBreak),
            Event::TaskListMarker(checked) => self.mark_task(checked),
        }
    }

    fn start(&mut self, tag: Tag<'_>, range: Range<usize>) {
        let frame = match tag {
            Tag::Paragraph => Frame::Paragraph { range },
            Tag::Heading { level, id, .. } => Frame::Heading {
                depth: heading_depth(level),
                id: id.map(|id| id.into_string()),
            },
            Tag::BlockQuote(_) => Frame::Blockquote,
            Tag::CodeBlock(kind) => match kind {
                CodeBlockKind::Fenced(info) => {
                    let info = info.trim();
                    let (lang, meta) = match info.split_once(char::is_whitespace) {
                        Some((lang, meta)) => (lang, meta.trim()),
                        None => (info, ""),
                    };
                    Frame::Code {
                        lang: (!lang.is_empty()).then(|| lang.to_owned()),
                        meta: (!meta.is_empty()).then(|| meta.to_owned()),
                    }
                }
                CodeBlockKind::Indented => Frame::Code {
                    lang: None,
                    meta: None,
                },
            },
            Tag::HtmlBlock => Frame::Html,
            Tag::List(start) => Frame::List {
                ordered: start.is_some(),
                start,
            },
            Tag::Item => Frame::Item { checked: None },
            Tag::Table(alignments) => Frame::Table {
                align: alignments.iter().map(convert_alignment).collect(),
            },
            Tag::TableHead | Tag::TableRow => Frame::TableRow,
            Tag::TableCell => Frame::TableCell,
            Tag::Emphasis => Frame::Emphasis,
            Tag::Strong => Frame::Strong,
            Tag::Strikethrough => Frame::Delete,
            Tag::Link {
                dest_url, title, ..
            } => Frame::Link {
                url: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::Image {
                dest_url, title, ..
            } => Frame::Image {
                url: dest_url.into_string(),
                title: title.into_string(),
            },
            Tag::MetadataBlock(_) => Frame::Discard,
            Tag::FootnoteDefinition(_)
            | Tag::DefinitionList
            | Tag::DefinitionListTitle
            | Tag::DefinitionListDefinition
            | Tag::Superscript
            | Tag::Subscript => Frame::Transparent,
        };
        self.stack.push((frame, Vec::new()));
    }

    fn end(&mut self, _tag: TagEnd) {
        let Some((frame, children)) = self.stack.pop() else {
            return;
        };
        let at_top_level = self.stack.is_empty();

        match frame {
            Frame::Heading { depth, id } => self.push(Node::Heading {
                depth,
                id,
                children,
            }),
            Frame::Paragraph { range } => {
                let node = if at_top_level {
                    self.classify_paragraph(&range, children)
                } else {
                    Node::Paragraph { children }
                };
                self.push(node);
            }
            Frame::Emphasis => self.push(Node::Emphasis { children }),
            Frame::Strong => self.push(Node::Strong { children }),
            Frame::Delete => self.push(Node::Delete { children }),
            Frame::Link { url, title } => self.push(Node::Link {
                url,
                title,
                children,
            }),
            Frame::Image { url, title } => {
                let alt = children.iter().map(Node::text_content).collect();
                self.push(Node::Image { url, title, alt });
            }
            Frame::Code { lang, meta } => {
                let mut value = concat_text(&children);
                if value.ends_with('\n') {
                    value.pop();
                }
                self.push(Node::Code { lang, meta, value });
            }
            Frame::Html => {
                let value = concat_text(&children);
                self.push(Node::Html(value.trim_end_matches('\n').to_owned()));
            }
            Frame::List { ordered, start } => {
                let spread = children
                    .iter()
                    .any(|item| matches!(item, Node::ListItem { spread: true, .. }));
                self.push(Node::List {
                    ordered,
                    start,
                    spread,
                    children,
                });
            }
            Frame::Item { checked } => {
                let spread = children
                    .iter()
                    .any(|child| matches!(child, Node::Paragraph { .. }));
                self.push(Node::ListItem {
                    checked,
                    spread,
                    children: wrap_inline_runs(children),
                });
            }
            Frame::Blockquote => self.push(Node::Blockquote { children }),
            Frame::Table { align } => self.push(Node::Table { align, children }),
            Frame::TableRow => self.push(Node::TableRow { children }),
            Frame::TableCell => self.push(Node::TableCell { children }),
            Frame::Transparent => {
                for child in children {
                    self.push(child);
                }
            }
            Frame::Discard => {}
        }
    }

    /// Recognise MDX statement and expression blocks from paragraph source.
    fn classify_paragraph(&self, range: &Range<usize>, children: Vec<Node>) -> Node {
        let raw = self.source.get(range.clone()).unwrap_or_default().trim();
        if ESM_STATEMENT.is_match(raw) {
            Node::MdxjsEsm(raw.to_owned())
        } else if raw.starts_with('{') && raw.ends_with('}') {
            Node::MdxFlowExpression(raw.to_owned())
        } else {
            Node::Paragraph { children }
        }
    }

    fn mark_task(&mut self, checked: bool) {
        let item = self
            .stack
            .iter_mut()
            .rev()
            .find_map(|(frame, _)| match frame {
                Frame::Item { checked } => Some(checked),
                _ => None,
            });
        if let Some(slot) = item {
            *slot = Some(checked);
        }
    }

    /// Append a node to the innermost open container, merging adjacent text.
    fn push(&mut self, node: Node) {
        let target = match self.stack.last_mut() {
            Some((_, children)) => children,
            None => &mut self.root,
        };
        if let (Node::Text(next), Some(Node::Text(prev))) = (&node, target.last_mut()) {
            prev.push_str(next);
            return;
        }
        target.push(node);
    }

    fn finish(mut self) -> Root {
        while !self.stack.is_empty() {
            self.end(TagEnd::Paragraph);
        }
        Root {
            children: self.root,
        }
    }
}

/// Convert heading level enum to number (1-6).
fn heading_depth(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn convert_alignment(alignment: &Alignment) -> Align {
    match alignment {
        Alignment::None => Align::None,
        Alignment::Left => Align::Left,
        Alignment::Center => Align::Center,
        Alignment::Right => Align::Right,
    }
}

fn concat_text(children: &[Node]) -> String {
    children.iter().map(Node::text_content).collect()
}

/// Wrap runs of inline nodes in paragraphs (tight list items carry bare inlines).
fn wrap_inline_runs(children: Vec<Node>) -> Vec<Node> {
    let mut blocks = Vec::with_capacity(children.len());
    let mut run = Vec::new();
    for child in children {
        if child.is_inline() {
            run.push(child);
        } else {
            if !run.is_empty() {
                blocks.push(Node::Paragraph {
                    children: std::mem::take(&mut run),
                });
            }
            blocks.push(child);
        }
    }
    if !run.is_empty() {
        blocks.push(Node::Paragraph { children: run });
    }
    blocks
}
