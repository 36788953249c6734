//! Page-data extraction.
//!
//! For every route the content file is read once, parsed once, and turned
//! into a [`PageIndexInfo`]: title, outline, description and search content.
//! Pages are processed concurrently; the first failure aborts the batch.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;

use futures::future::try_join_all;
use quire_markdown::{
    Header, Processor, ReplaceRule, Toc, apply_replace_rules, apply_replace_rules_to_frontmatter,
    extract_description, load_frontmatter, normalize_line_endings, parse, parse_toc,
    strip_import_statements,
};
use quire_route::{PageIndexInfo, RouteMeta, RouteService};
use serde_json::Value;

use crate::flatten::{AliasMap, ContentFlattener};
use crate::offset::resolve_char_indices;
use crate::PageDataError;

/// Frontmatter key holding the raw body in some loaders; never exported.
const CONTENT_KEY: &str = "__content";

/// Settings for page-data extraction.
#[derive(Clone, Debug)]
pub struct ExtractPageDataOptions {
    /// Content root, used for relative paths.
    pub root: PathBuf,
    /// Keep code blocks in search content.
    pub search_code_blocks: bool,
    /// Substitutions applied to frontmatter strings and page source.
    pub replace_rules: Vec<ReplaceRule>,
    /// Import aliases for component flattening.
    pub alias: AliasMap,
    /// Synthesize descriptions for pages without one in frontmatter.
    pub extract_description: bool,
    /// Produce search content. When off, content is empty and no heading
    /// offsets are computed.
    pub search_enabled: bool,
    /// Deepest heading level in the outline.
    pub toc_max_depth: u8,
}

impl ExtractPageDataOptions {
    /// Defaults: code blocks searched, descriptions extracted, search on,
    /// outline down to level 4.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            search_code_blocks: true,
            replace_rules: Vec::new(),
            alias: AliasMap::new(),
            extract_description: true,
            search_enabled: true,
            toc_max_depth: 4,
        }
    }
}

/// Extract the page record for one route.
///
/// Files other than `.md`/`.mdx` get a placeholder record without being read.
///
/// # Errors
///
/// Returns an error if the file cannot be read, its frontmatter is
/// malformed, or component flattening fails.
pub async fn get_page_index_info_by_route(
    route: &RouteMeta,
    options: &ExtractPageDataOptions,
    flattener: &dyn ContentFlattener,
) -> Result<PageIndexInfo, PageDataError> {
    let mut info = PageIndexInfo::placeholder(route);
    if let Some(relative) = relative_path(&route.absolute_path, &options.root) {
        info.relative_path = relative;
    }
    if !route.is_markdown() {
        return Ok(info);
    }

    let source = tokio::fs::read_to_string(&route.absolute_path)
        .await
        .map_err(|source| PageDataError::Io {
            path: route.absolute_path.clone(),
            source,
        })?;
    let (mut frontmatter, body) = load_frontmatter(&source, &route.absolute_path)?;

    apply_replace_rules_to_frontmatter(&mut frontmatter, &options.replace_rules);
    let body = apply_replace_rules(&body, &options.replace_rules);
    let flatten_content = flattener
        .flatten(&body, &route.absolute_path, &options.alias)
        .await?;
    let content = normalize_line_endings(&strip_import_statements(&flatten_content));

    let tree = parse(&content);
    let Toc { title, headers } = parse_toc(&tree, options.toc_max_depth);

    let frontmatter_description = non_empty_str(frontmatter.get("description"));
    let extracted = if frontmatter_description.is_some() || !options.extract_description {
        String::new()
    } else {
        extract_description(&tree)
    };

    let (content, toc) = if options.search_enabled {
        let processed = Processor::shared(options.search_code_blocks).process(tree);
        let content = strip_leading_title(processed, &title);
        let toc = resolve_char_indices(&headers, &content);
        (content, toc)
    } else {
        let toc = headers
            .into_iter()
            .map(|h| Header {
                char_index: Header::NO_CHAR_INDEX,
                ..h
            })
            .collect();
        (String::new(), toc)
    };

    info.title = non_empty_str(frontmatter.get("title")).unwrap_or(title);
    info.description = frontmatter_description.or_else(|| Some(extracted).filter(|d| !d.is_empty()));
    info.content = content;
    info.toc = toc;
    info.flatten_content = flatten_content;
    frontmatter.remove(CONTENT_KEY);
    info.frontmatter = frontmatter;

    Ok(info)
}

/// Extract page records for every route and attach them to the table.
///
/// Records are returned in route order.
///
/// # Errors
///
/// Returns the first error from any page; no partial result is produced.
pub async fn extract_page_data(
    routes: &RouteService,
    options: &ExtractPageDataOptions,
    flattener: &dyn ContentFlattener,
) -> Result<Vec<Arc<PageIndexInfo>>, PageDataError> {
    let start = Instant::now();

    let pages = try_join_all(routes.get_routes().iter().map(|page| async move {
        let info = Arc::new(get_page_index_info_by_route(&page.meta, options, flattener).await?);
        tracing::debug!(route = %page.meta.route_path, headers = info.toc.len(), "Extracted page");
        page.set_page_index_info(Arc::clone(&info))?;
        Ok::<_, PageDataError>(info)
    }))
    .await?;

    tracing::info!(
        pages = pages.len(),
        search = options.search_enabled,
        elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
        "Extracted page data"
    );

    Ok(pages)
}

/// Drop a leading `# {title}` line and the whitespace after it.
fn strip_leading_title(content: String, title: &str) -> String {
    let heading = format!("# {title}");
    match content.strip_prefix(&heading) {
        Some(rest) if rest.is_empty() || rest.starts_with('\n') => rest.trim_start().to_owned(),
        _ => content,
    }
}

fn non_empty_str(value: Option<&Value>) -> Option<String> {
    value
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_owned)
}

/// Root-relative path with `/` separators.
fn relative_path(path: &Path, root: &Path) -> Option<String> {
    let relative = path.strip_prefix(root).ok()?;
    let parts: Vec<_> = relative
        .components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect();
    Some(parts.join("/"))
}

#[cfg(test)]
mod tests {
    use std::fs;

    use pretty_assertions::assert_eq;
    use quire_route::RouteConfig;

    use super::*;
    use crate::flatten::{IdentityFlattener, MdxFlattener};

    fn write(root: &Path, relative: &str, content: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, content).unwrap();
    }

    fn meta(root: &Path, relative: &str) -> RouteMeta {
        RouteMeta {
            absolute_path: root.join(relative),
            relative_path: relative.to_owned(),
            route_path: format!("/{}", relative.rsplit_once('.').unwrap().0),
            lang: String::new(),
            version: String::new(),
        }
    }

    async fn extract(source: &str, options: &ExtractPageDataOptions) -> PageIndexInfo {
        write(&options.root, "page.md", source);
        get_page_index_info_by_route(&meta(&options.root, "page.md"), options, &IdentityFlattener)
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_basic_page() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions::new(dir.path());

        let info = extract("# Title\n\nSome *text*.\n\n## Next\n", &options).await;

        assert_eq!(info.title, "Title");
        assert_eq!(info.description.as_deref(), Some("Some text."));
        assert_eq!(info.content, "Some *text*.\n\n## Next\n");
        assert_eq!(
            info.toc,
            vec![Header {
                depth: 2,
                text: "Next".to_owned(),
                id: "next".to_owned(),
                char_index: 14,
            }]
        );
        assert_eq!(info.relative_path, "page.md");
        assert_eq!(info.route_path, "/page");
    }

    #[tokio::test]
    async fn test_repeat_across_depths_and_custom_ids() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions::new(dir.path());

        let info = extract("# T\n\n## A\n\nx\n\n### A\n", &options).await;
        let toc: Vec<_> = info.toc.iter().map(|h| (h.id.as_str(), h.char_index)).collect();
        assert_eq!(toc, vec![("a", 0), ("a-1", 9)]);

        let info = extract("## Setup {#install}\n\n## Install\n", &options).await;
        let toc: Vec<_> = info.toc.iter().map(|h| (h.id.as_str(), h.char_index)).collect();
        assert_eq!(toc, vec![("install", 0), ("install-1", 10)]);
    }

    #[tokio::test]
    async fn test_repeated_headings_resolve_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions::new(dir.path());

        let info = extract("# T\n\n## Usage\n\nOne.\n\n## Usage\n\nTwo.\n", &options).await;

        let ids: Vec<_> = info.toc.iter().map(|h| h.id.as_str()).collect();
        assert_eq!(ids, vec!["usage", "usage-1"]);
        let (first, second) = (info.toc[0].char_index, info.toc[1].char_index);
        assert!(first >= 0);
        assert!(second > first, "{first} < {second}");
        let content: Vec<char> = info.content.chars().collect();
        let at = |i: i64| content[usize::try_from(i).unwrap()..].iter().take(8).collect::<String>();
        assert_eq!(at(first), "## Usage");
        assert_eq!(at(second), "## Usage");
    }

    #[tokio::test]
    async fn test_search_disabled() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions {
            search_enabled: false,
            ..ExtractPageDataOptions::new(dir.path())
        };

        let info = extract(
            "# Title\n\nIntro.\n\n## A\n\n```js\nx\n```\n\n### B\n\n| t |\n| - |\n| 1 |\n",
            &options,
        )
        .await;

        assert_eq!(info.content, "");
        assert_eq!(info.toc.len(), 2);
        assert!(info.toc.iter().all(|h| h.char_index == -1));
        assert_eq!(info.title, "Title");
        assert_eq!(info.description.as_deref(), Some("Intro."));
        assert!(info.flatten_content.contains("```js"));
    }

    #[tokio::test]
    async fn test_frontmatter_precedence() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions::new(dir.path());

        let info = extract(
            "---\ntitle: Custom\ndescription: From frontmatter\n__content: raw\n---\n# Title\n\nBody text.\n",
            &options,
        )
        .await;

        assert_eq!(info.title, "Custom");
        assert_eq!(info.description.as_deref(), Some("From frontmatter"));
        assert!(info.frontmatter.get("__content").is_none());
        assert_eq!(info.frontmatter.get("title"), Some(&Value::from("Custom")));
        // The parsed title is still what gets stripped from search content.
        assert_eq!(info.content, "Body text.\n");
    }

    #[tokio::test]
    async fn test_extraction_disabled_leaves_description_empty() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions {
            extract_description: false,
            ..ExtractPageDataOptions::new(dir.path())
        };

        let info = extract("# Title\n\nBody.\n", &options).await;

        assert_eq!(info.description, None);
    }

    #[tokio::test]
    async fn test_title_prefix_not_stripped_from_longer_heading() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions::new(dir.path());

        let info = extract("# Guide\n\nText.\n", &options).await;
        assert_eq!(info.content, "Text.\n");

        assert_eq!(
            strip_leading_title("# Guidelines\n\nx\n".to_owned(), "Guide"),
            "# Guidelines\n\nx\n"
        );
    }

    #[tokio::test]
    async fn test_replace_rules_and_imports() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions {
            replace_rules: vec![ReplaceRule::new("__NAME__", "Quire").unwrap()],
            search_code_blocks: false,
            ..ExtractPageDataOptions::new(dir.path())
        };

        let info = extract(
            "---\ntitle: About __NAME__\n---\nimport Tabs from '@theme/Tabs';\r\n\r\n# About\r\n\r\n__NAME__ docs. ![logo](l.png) [link](/x)\r\n\r\n```sh\r\nnpm i\r\n```\r\n",
            &options,
        )
        .await;

        assert_eq!(info.title, "About Quire");
        assert_eq!(info.content, "Quire docs.  [link]()\n");
        assert!(!info.content.contains('\r'));
        assert!(info.flatten_content.contains("import Tabs"));
    }

    #[tokio::test]
    async fn test_non_markdown_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions::new(dir.path());
        // Never read: the file does not even exist.
        let route = meta(dir.path(), "widget.tsx");

        let info = get_page_index_info_by_route(&route, &options, &IdentityFlattener)
            .await
            .unwrap();

        assert_eq!(info.title, "");
        assert_eq!(info.content, "");
        assert!(info.toc.is_empty());
        assert_eq!(info.route_path, "/widget");
        assert_eq!(info.relative_path, "widget.tsx");
    }

    #[tokio::test]
    async fn test_malformed_frontmatter_names_file() {
        let dir = tempfile::tempdir().unwrap();
        let options = ExtractPageDataOptions::new(dir.path());
        write(dir.path(), "bad.md", "---\ntitle: [oops\n---\n# Bad\n");

        let err = get_page_index_info_by_route(&meta(dir.path(), "bad.md"), &options, &IdentityFlattener)
            .await
            .unwrap_err();

        assert!(matches!(err, PageDataError::Frontmatter(_)));
        assert!(err.to_string().contains("bad.md"));
    }

    #[tokio::test]
    async fn test_extract_all_routes() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "# Home\n\nWelcome.\n");
        write(dir.path(), "guide/index.mdx", "import Note from './_note.md'\n\n# Guide\n\n<Note />\n");
        write(dir.path(), "guide/_note.md", "Shared note.\n");
        write(dir.path(), "demo.tsx", "export default () => null;\n");
        let service = RouteService::scan(RouteConfig {
            exclude: vec!["**/_*".to_owned()],
            ..RouteConfig::new(dir.path())
        })
        .unwrap();
        let options = ExtractPageDataOptions::new(dir.path());

        let pages = extract_page_data(&service, &options, &MdxFlattener).await.unwrap();

        let routes: Vec<_> = pages.iter().map(|p| p.route_path.as_str()).collect();
        assert_eq!(routes, vec!["/demo", "/guide/", "/"]);
        assert_eq!(pages[1].content, "Shared note.\n");
        assert_eq!(pages[1].description.as_deref(), Some("Shared note."));
        for page in service.get_routes() {
            let stored = page.page_index_info().unwrap();
            assert_eq!(stored.route_path, page.meta.route_path);
        }
    }

    #[tokio::test]
    async fn test_one_failure_fails_batch() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "good.md", "# Good\n");
        write(dir.path(), "bad.md", "---\n- not a mapping\n---\n");
        let service = RouteService::scan(RouteConfig::new(dir.path())).unwrap();

        let err = extract_page_data(&service, &ExtractPageDataOptions::new(dir.path()), &IdentityFlattener)
            .await
            .unwrap_err();

        assert!(err.to_string().contains("bad.md"));
    }

    #[tokio::test]
    async fn test_extract_twice_reports_existing_record() {
        let dir = tempfile::tempdir().unwrap();
        write(dir.path(), "index.md", "# Home\n");
        let service = RouteService::scan(RouteConfig::new(dir.path())).unwrap();
        let options = ExtractPageDataOptions::new(dir.path());

        extract_page_data(&service, &options, &IdentityFlattener).await.unwrap();
        let err = extract_page_data(&service, &options, &IdentityFlattener)
            .await
            .unwrap_err();

        assert!(matches!(err, PageDataError::Route(_)));
    }
}
