//! Inlining of imported markdown components.
//!
//! MDX pages can import other markdown files and render them as components:
//!
//! ```text
//! import Shared from './_shared.mdx';
//!
//! <Shared />
//! ```
//!
//! For search and text exports the page is flattened: the import is removed
//! and each `<Shared />` is replaced by the imported file's body.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use async_trait::async_trait;
use futures::future::{BoxFuture, FutureExt};
use quire_markdown::load_frontmatter;
use regex::{NoExpand, Regex};

use crate::PageDataError;

/// Import alias prefixes mapped to directories (`@components` -> `/site/components`).
pub type AliasMap = BTreeMap<String, PathBuf>;

/// Maximum nesting of flattened imports.
const MAX_DEPTH: usize = 16;

static DEFAULT_IMPORT: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"(?m)^[ \t]*import\s+([A-Za-z_$][\w$]*)\s+from\s+['"]([^'"]+)['"];?[ \t]*\r?\n?"#)
        .unwrap()
});

/// Expands embedded components in page content.
#[async_trait]
pub trait ContentFlattener: Send + Sync {
    /// Return `content` (read from `path`) with its components expanded.
    async fn flatten(
        &self,
        content: &str,
        path: &Path,
        alias: &AliasMap,
    ) -> Result<String, PageDataError>;
}

/// Returns content unchanged.
pub struct IdentityFlattener;

#[async_trait]
impl ContentFlattener for IdentityFlattener {
    async fn flatten(
        &self,
        content: &str,
        _path: &Path,
        _alias: &AliasMap,
    ) -> Result<String, PageDataError> {
        Ok(content.to_owned())
    }
}

/// Inlines default imports of `.md`/`.mdx` files.
///
/// Specifiers starting with `.` resolve against the importing file, others
/// against the longest matching alias prefix; anything else (packages,
/// scripts) is left for import stripping. Imports nested deeper than 16
/// levels or forming a cycle are left unexpanded.
pub struct MdxFlattener;

#[async_trait]
impl ContentFlattener for MdxFlattener {
    async fn flatten(
        &self,
        content: &str,
        path: &Path,
        alias: &AliasMap,
    ) -> Result<String, PageDataError> {
        flatten_recursive(content.to_owned(), path.to_path_buf(), alias, Vec::new()).await
    }
}

fn flatten_recursive<'a>(
    content: String,
    path: PathBuf,
    alias: &'a AliasMap,
    mut stack: Vec<PathBuf>,
) -> BoxFuture<'a, Result<String, PageDataError>> {
    async move {
        if stack.len() >= MAX_DEPTH {
            tracing::warn!(path = %path.display(), "Component nesting too deep, not flattened");
            return Ok(content);
        }
        stack.push(path.clone());

        let imports: Vec<(String, String, String)> = DEFAULT_IMPORT
            .captures_iter(&content)
            .map(|c| (c[0].to_owned(), c[1].to_owned(), c[2].to_owned()))
            .collect();

        let mut output = content.clone();
        for (statement, name, specifier) in imports {
            if !is_markdown_specifier(&specifier) {
                continue;
            }
            let Some(target) = resolve_specifier(&specifier, &path, alias) else {
                continue;
            };
            if stack.contains(&target) {
                tracing::debug!(path = %target.display(), "Skipping cyclic component import");
                continue;
            }

            let source = tokio::fs::read_to_string(&target).await.map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    PageDataError::Flatten {
                        path: path.clone(),
                        message: format!("cannot resolve import {specifier:?}"),
                    }
                } else {
                    PageDataError::Io {
                        path: target.clone(),
                        source: e,
                    }
                }
            })?;
            let (_, body) = load_frontmatter(&source, &target)?;
            let body = flatten_recursive(body, target, alias, stack.clone()).await?;

            output = output.replacen(&statement, "", 1);
            let usage = component_usage(&name).map_err(|e| PageDataError::Flatten {
                path: path.clone(),
                message: e.to_string(),
            })?;
            output = usage
                .replace_all(&output, NoExpand(body.trim_end()))
                .into_owned();
        }

        Ok(output)
    }
    .boxed()
}

fn is_markdown_specifier(specifier: &str) -> bool {
    Path::new(specifier)
        .extension()
        .is_some_and(|ext| ext == "md" || ext == "mdx")
}

/// Resolve an import specifier to a file path.
fn resolve_specifier(specifier: &str, importer: &Path, alias: &AliasMap) -> Option<PathBuf> {
    if specifier.starts_with('.') {
        return Some(normalize(&importer.parent()?.join(specifier)));
    }
    alias
        .iter()
        .filter_map(|(prefix, dir)| {
            let rest = specifier.strip_prefix(prefix.as_str())?;
            if rest.is_empty() {
                Some((prefix.len(), dir.clone()))
            } else {
                let rest = rest.strip_prefix('/')?;
                Some((prefix.len(), dir.join(rest)))
            }
        })
        .max_by_key(|(len, _)| *len)
        .map(|(_, path)| normalize(&path))
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    use std::path::Component;

    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Matcher for `<Name />` and `<Name prop="x" />`.
fn component_usage(name: &str) -> Result<Regex, regex::Error> {
    Regex::new(&format!(r"<{}(?:\s[^<>]*)?/>", regex::escape(name)))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;

    use super::*;

    fn write(root: &Path, relative: &str, content: &str) -> PathBuf {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, content).unwrap();
        path
    }

    #[tokio::test]
    async fn test_identity() {
        let out = IdentityFlattener
            .flatten("import A from './a.mdx'\n", Path::new("/x.mdx"), &AliasMap::new())
            .await
            .unwrap();
        assert_eq!(out, "import A from './a.mdx'\n");
    }

    #[tokio::test]
    async fn test_relative_import_inlined() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "guide/_note.mdx", "---\ntitle: Note\n---\nShared **note**.\n");
        let page = write(dir.path(), "guide/page.mdx", "");
        let content = "import Note from './_note.mdx';\n\n# Page\n\n<Note />\n";

        let out = MdxFlattener
            .flatten(content, &page, &AliasMap::new())
            .await
            .unwrap();

        assert_eq!(out, "\n# Page\n\nShared **note**.\n");
    }

    #[tokio::test]
    async fn test_alias_import_and_props() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "components/intro.md", "Hello from alias.\n");
        let page = write(dir.path(), "docs/index.mdx", "");
        let alias = AliasMap::from([("@components".to_owned(), dir.path().join("components"))]);
        let content = "import Intro from '@components/intro.md'\n\n<Intro title=\"x\" />\n";

        let out = MdxFlattener.flatten(content, &page, &alias).await.unwrap();

        assert_eq!(out, "\nHello from alias.\n");
    }

    #[tokio::test]
    async fn test_nested_imports() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.mdx", "import B from './b.mdx'\n\nA then <B />\n");
        write(dir.path(), "b.mdx", "B body\n");
        let page = write(dir.path(), "page.mdx", "");

        let out = MdxFlattener
            .flatten("import A from './a.mdx'\n<A />\n", &page, &AliasMap::new())
            .await
            .unwrap();

        assert_eq!(out, "\nA then B body\n");
    }

    #[tokio::test]
    async fn test_cycle_left_unexpanded() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "a.mdx", "import A from './a.mdx'\n\nSelf: <A />\n");
        let page = write(dir.path(), "page.mdx", "");

        let out = MdxFlattener
            .flatten("import A from './a.mdx'\n<A />\n", &page, &AliasMap::new())
            .await
            .unwrap();

        assert!(out.contains("Self:"));
    }

    #[tokio::test]
    async fn test_non_markdown_imports_untouched() {
        let content = "import Tabs from '@theme/Tabs';\nimport Btn from './Btn.tsx'\n<Tabs />\n";
        let out = MdxFlattener
            .flatten(content, Path::new("/docs/page.mdx"), &AliasMap::new())
            .await
            .unwrap();
        assert_eq!(out, content);
    }

    #[tokio::test]
    async fn test_missing_import_names_page() {
        let dir = tempfile::tempdir().unwrap();
        let page = write(dir.path(), "page.mdx", "");

        let err = MdxFlattener
            .flatten("import X from './missing.mdx'\n", &page, &AliasMap::new())
            .await
            .unwrap_err();

        assert!(matches!(err, PageDataError::Flatten { .. }));
        assert!(err.to_string().contains("page.mdx"));
        assert!(err.to_string().contains("missing.mdx"));
    }

    #[test]
    fn test_resolve_specifier() {
        let alias = AliasMap::from([
            ("@".to_owned(), PathBuf::from("/site")),
            ("@docs".to_owned(), PathBuf::from("/site/docs")),
        ]);
        let importer = Path::new("/site/docs/guide/page.mdx");

        assert_eq!(
            resolve_specifier("../shared/a.md", importer, &alias),
            Some(PathBuf::from("/site/docs/shared/a.md"))
        );
        assert_eq!(
            resolve_specifier("@docs/b.mdx", importer, &alias),
            Some(PathBuf::from("/site/docs/b.mdx"))
        );
        assert_eq!(
            resolve_specifier("@/c.md", importer, &alias),
            Some(PathBuf::from("/site/c.md"))
        );
        assert_eq!(resolve_specifier("@docsx/d.md", importer, &alias), None);
        assert_eq!(resolve_specifier("pkg/e.md", importer, &alias), None);
    }
}
