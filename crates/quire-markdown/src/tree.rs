//! Document tree produced by [`parse`](crate::parse).
//!
//! The tree mirrors the node kinds of an mdast document closely enough that
//! stringification round-trips to equivalent markdown. Every consumer matches
//! on [`Node`] exhaustively, so adding a kind is a compile-time decision for
//! text extraction, transforms and the description skip set alike.

/// Column alignment of a table.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Align {
    None,
    Left,
    Center,
    Right,
}

/// Document root.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Root {
    pub children: Vec<Node>,
}

/// A node in the document tree.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Heading {
        /// Heading level (1-6).
        depth: u8,
        /// Explicit `{#id}` attribute, if present.
        id: Option<String>,
        children: Vec<Node>,
    },
    Paragraph {
        children: Vec<Node>,
    },
    Text(String),
    Emphasis {
        children: Vec<Node>,
    },
    Strong {
        children: Vec<Node>,
    },
    Delete {
        children: Vec<Node>,
    },
    InlineCode(String),
    Code {
        lang: Option<String>,
        meta: Option<String>,
        value: String,
    },
    /// Raw HTML or a JSX block.
    Html(String),
    Link {
        url: String,
        title: String,
        children: Vec<Node>,
    },
    Image {
        url: String,
        title: String,
        alt: String,
    },
    List {
        ordered: bool,
        start: Option<u64>,
        /// Loose list (items separated by blank lines).
        spread: bool,
        children: Vec<Node>,
    },
    ListItem {
        /// Task list state (`Some(true)` for `- [x]`).
        checked: Option<bool>,
        spread: bool,
        children: Vec<Node>,
    },
    Blockquote {
        children: Vec<Node>,
    },
    ThematicBreak,
    Table {
        align: Vec<Align>,
        children: Vec<Node>,
    },
    TableRow {
        children: Vec<Node>,
    },
    TableCell {
        children: Vec<Node>,
    },
    /// Hard line break.
    Break,
    /// Top-level `import`/`export` statement block.
    MdxjsEsm(String),
    /// Top-level `{expression}` block.
    MdxFlowExpression(String),
}

/// Tag identifying the kind of a [`Node`] without its payload.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Heading,
    Paragraph,
    Text,
    Emphasis,
    Strong,
    Delete,
    InlineCode,
    Code,
    Html,
    Link,
    Image,
    List,
    ListItem,
    Blockquote,
    ThematicBreak,
    Table,
    TableRow,
    TableCell,
    Break,
    MdxjsEsm,
    MdxFlowExpression,
}

impl Node {
    /// Kind tag of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Self::Heading { .. } => NodeKind::Heading,
            Self::Paragraph { .. } => NodeKind::Paragraph,
            Self::Text(_) => NodeKind::Text,
            Self::Emphasis { .. } => NodeKind::Emphasis,
            Self::Strong { .. } => NodeKind::Strong,
            Self::Delete { .. } => NodeKind::Delete,
            Self::InlineCode(_) => NodeKind::InlineCode,
            Self::Code { .. } => NodeKind::Code,
            Self::Html(_) => NodeKind::Html,
            Self::Link { .. } => NodeKind::Link,
            Self::Image { .. } => NodeKind::Image,
            Self::List { .. } => NodeKind::List,
            Self::ListItem { .. } => NodeKind::ListItem,
            Self::Blockquote { .. } => NodeKind::Blockquote,
            Self::ThematicBreak => NodeKind::ThematicBreak,
            Self::Table { .. } => NodeKind::Table,
            Self::TableRow { .. } => NodeKind::TableRow,
            Self::TableCell { .. } => NodeKind::TableCell,
            Self::Break => NodeKind::Break,
            Self::MdxjsEsm(_) => NodeKind::MdxjsEsm,
            Self::MdxFlowExpression(_) => NodeKind::MdxFlowExpression,
        }
    }

    /// Child nodes, or an empty slice for leaves.
    #[must_use]
    pub fn children(&self) -> &[Node] {
        match self {
            Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::Emphasis { children }
            | Self::Strong { children }
            | Self::Delete { children }
            | Self::Link { children, .. }
            | Self::List { children, .. }
            | Self::ListItem { children, .. }
            | Self::Blockquote { children }
            | Self::Table { children, .. }
            | Self::TableRow { children }
            | Self::TableCell { children } => children,
            Self::Text(_)
            | Self::InlineCode(_)
            | Self::Code { .. }
            | Self::Html(_)
            | Self::Image { .. }
            | Self::ThematicBreak
            | Self::Break
            | Self::MdxjsEsm(_)
            | Self::MdxFlowExpression(_) => &[],
        }
    }

    /// Mutable child nodes, `None` for leaves.
    pub fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Self::Heading { children, .. }
            | Self::Paragraph { children }
            | Self::Emphasis { children }
            | Self::Strong { children }
            | Self::Delete { children }
            | Self::Link { children, .. }
            | Self::List { children, .. }
            | Self::ListItem { children, .. }
            | Self::Blockquote { children }
            | Self::Table { children, .. }
            | Self::TableRow { children }
            | Self::TableCell { children } => Some(children),
            Self::Text(_)
            | Self::InlineCode(_)
            | Self::Code { .. }
            | Self::Html(_)
            | Self::Image { .. }
            | Self::ThematicBreak
            | Self::Break
            | Self::MdxjsEsm(_)
            | Self::MdxFlowExpression(_) => None,
        }
    }

    /// Recursive text content.
    ///
    /// Value-bearing nodes yield their value, parents concatenate their
    /// children, everything else (images, breaks, rules) yields nothing.
    #[must_use]
    pub fn text_content(&self) -> String {
        let mut out = String::new();
        self.push_text(&mut out);
        out
    }

    fn push_text(&self, out: &mut String) {
        match self {
            Self::Text(value)
            | Self::InlineCode(value)
            | Self::Html(value)
            | Self::MdxjsEsm(value)
            | Self::MdxFlowExpression(value)
            | Self::Code { value, .. } => out.push_str(value),
            Self::Image { .. } | Self::ThematicBreak | Self::Break => {}
            _ => {
                for child in self.children() {
                    child.push_text(out);
                }
            }
        }
    }

    /// Whether this node is phrasing (inline) content.
    #[must_use]
    pub fn is_inline(&self) -> bool {
        matches!(
            self,
            Self::Text(_)
                | Self::Emphasis { .. }
                | Self::Strong { .. }
                | Self::Delete { .. }
                | Self::InlineCode(_)
                | Self::Link { .. }
                | Self::Image { .. }
                | Self::Break
        )
    }
}

impl Root {
    /// Remove every node matching `predicate`, at any depth.
    pub fn remove_where(&mut self, predicate: &impl Fn(&Node) -> bool) {
        remove_in(&mut self.children, predicate);
    }

    /// Visit every node mutably, parents before children.
    pub fn visit_mut(&mut self, visitor: &mut impl FnMut(&mut Node)) {
        for child in &mut self.children {
            visit_node_mut(child, visitor);
        }
    }

    /// Recursive text content of the whole document.
    #[must_use]
    pub fn text_content(&self) -> String {
        self.children.iter().map(Node::text_content).collect()
    }
}

fn remove_in(nodes: &mut Vec<Node>, predicate: &impl Fn(&Node) -> bool) {
    nodes.retain(|node| !predicate(node));
    for node in nodes {
        if let Some(children) = node.children_mut() {
            remove_in(children, predicate);
        }
    }
}

fn visit_node_mut(node: &mut Node, visitor: &mut impl FnMut(&mut Node)) {
    visitor(node);
    if let Some(children) = node.children_mut() {
        for child in children {
            visit_node_mut(child, visitor);
        }
    }
}
