//! Search-content transform pipeline.
//!
//! A [`Processor`] is an ordered list of [`Transform`] passes followed by
//! stringification. Two configurations exist for the whole process, with and
//! without code blocks; both are built once and shared read-only.

use std::sync::LazyLock;

use crate::stringify::{StringifyOptions, stringify};
use crate::tree::{Node, NodeKind, Root};

/// A tree-rewriting pass.
///
/// Passes carry their configuration from construction and hold no state
/// between calls, so one instance can serve concurrent extractions.
pub trait Transform: Send + Sync {
    /// Short name for logs.
    fn name(&self) -> &'static str;

    /// Rewrite the tree in place.
    fn apply(&self, root: &mut Root);
}

/// Removes images at any depth.
pub struct RemoveImages;

impl Transform for RemoveImages {
    fn name(&self) -> &'static str {
        "remove-images"
    }

    fn apply(&self, root: &mut Root) {
        root.remove_where(&|node| node.kind() == NodeKind::Image);
    }
}

/// Clears link targets, keeping the link text.
pub struct StripLinkUrls;

impl Transform for StripLinkUrls {
    fn name(&self) -> &'static str {
        "strip-link-urls"
    }

    fn apply(&self, root: &mut Root) {
        root.visit_mut(&mut |node| {
            if let Node::Link { url, title, .. } = node {
                url.clear();
                title.clear();
            }
        });
    }
}

/// Removes fenced and indented code blocks.
pub struct RemoveCodeBlocks;

impl Transform for RemoveCodeBlocks {
    fn name(&self) -> &'static str {
        "remove-code-blocks"
    }

    fn apply(&self, root: &mut Root) {
        root.remove_where(&|node| node.kind() == NodeKind::Code);
    }
}

static WITH_CODE: LazyLock<Processor> = LazyLock::new(|| Processor::new(true));
static WITHOUT_CODE: LazyLock<Processor> = LazyLock::new(|| Processor::new(false));

/// Ordered transform passes plus serialization options.
pub struct Processor {
    transforms: Vec<Box<dyn Transform>>,
    options: StringifyOptions,
}

impl Processor {
    /// Build a processor: remove images, strip link urls, then (unless
    /// `keep_code_blocks`) remove code blocks.
    #[must_use]
    pub fn new(keep_code_blocks: bool) -> Self {
        let mut transforms: Vec<Box<dyn Transform>> =
            vec![Box::new(RemoveImages), Box::new(StripLinkUrls)];
        if !keep_code_blocks {
            transforms.push(Box::new(RemoveCodeBlocks));
        }
        Self {
            transforms,
            options: StringifyOptions::default(),
        }
    }

    /// Process-wide processor for the given `search_code_blocks` setting.
    #[must_use]
    pub fn shared(search_code_blocks: bool) -> &'static Processor {
        if search_code_blocks {
            LazyLock::force(&WITH_CODE)
        } else {
            LazyLock::force(&WITHOUT_CODE)
        }
    }

    /// Append a pass after the built-in ones.
    #[must_use]
    pub fn with_transform<T: Transform + 'static>(mut self, transform: T) -> Self {
        self.transforms.push(Box::new(transform));
        self
    }

    /// Names of the configured passes, in order.
    pub fn transform_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.transforms.iter().map(|t| t.name())
    }

    /// Run every pass over the tree.
    #[must_use]
    pub fn run(&self, mut root: Root) -> Root {
        for transform in &self.transforms {
            transform.apply(&mut root);
        }
        root
    }

    /// Serialize a (transformed) tree.
    #[must_use]
    pub fn stringify(&self, root: &Root) -> String {
        stringify(root, &self.options)
    }

    /// Run the passes and serialize.
    #[must_use]
    pub fn process(&self, root: Root) -> String {
        self.stringify(&self.run(root))
    }
}
