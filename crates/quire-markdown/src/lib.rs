//! Markdown document model and text extraction for Quire.
//!
//! This crate turns a raw content file into the pieces the page index needs:
//!
//! - [`load_frontmatter`]: split the leading YAML block from the body
//! - [`parse`]: build a [`Root`] document tree (GFM + MDX-lite blocks)
//! - [`parse_toc`]: page title and heading outline with stable ids
//! - [`extract_description`]: excerpt between the title and the first H2
//! - [`Processor`]: image/link/code stripping followed by [`stringify`]
//!
//! # Example
//!
//! ```
//! use quire_markdown::{Processor, parse, parse_toc};
//!
//! let root = parse("# Title\n\nSome *text*.\n\n## Next\n");
//! let toc = parse_toc(&root, 4);
//! assert_eq!(toc.title, "Title");
//! assert_eq!(toc.headers[0].id, "next");
//!
//! let content = Processor::shared(false).process(root);
//! assert!(content.starts_with("# Title"));
//! ```

mod description;
mod frontmatter;
mod parser;
mod stringify;
mod text;
mod toc;
mod transform;
mod tree;

pub use description::{extract_description, strip_container_directives};
pub use frontmatter::{Frontmatter, FrontmatterError, load_frontmatter};
pub use parser::parse;
pub use stringify::{StringifyOptions, stringify};
pub use text::{
    ReplaceRule, apply_replace_rules, apply_replace_rules_to_frontmatter,
    normalize_line_endings, strip_import_statements,
};
pub use toc::{Header, Toc, parse_toc, slugify};
pub use transform::{Processor, RemoveCodeBlocks, RemoveImages, StripLinkUrls, Transform};
pub use tree::{Align, Node, NodeKind, Root};
