//! Route table for Quire content trees.
//!
//! [`RouteService::scan`] walks the content root once and derives a route for
//! every page file. Routes compose an optional base, a version segment (only
//! for non-default versions), a locale segment (only for non-default
//! locales) and the file path without extension:
//!
//! | File                    | Route            |
//! |-------------------------|------------------|
//! | `index.md`              | `/`              |
//! | `guide/index.md`        | `/guide/`        |
//! | `v2/zh/guide/intro.md`  | `/v2/zh/guide/intro` |
//!
//! Each [`RoutePage`] carries a write-once slot for its [`PageIndexInfo`],
//! filled by page-data extraction and read by later consumers.
//!
//! The service is a plain value: create one per build and pass it by
//! reference (or `Arc`) to whatever needs route lookups.

mod error;
mod page;
mod scanner;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

pub use error::RouteError;
pub use page::{PageIndexInfo, RouteMeta, RoutePage};

use scanner::{Scanner, derive_route};

/// Default page file extensions.
pub const DEFAULT_EXTENSIONS: [&str; 6] = ["md", "mdx", "js", "jsx", "ts", "tsx"];

/// Inputs for route discovery.
#[derive(Clone, Debug)]
pub struct RouteConfig {
    /// Content root directory.
    pub root: PathBuf,
    /// Base path prefix (`/` or `/prefix/`).
    pub base: String,
    /// Locale served without a path segment.
    pub default_lang: String,
    /// All locales. Empty for single-locale sites.
    pub langs: Vec<String>,
    /// Version served without a path segment.
    pub default_version: String,
    /// All versions. Empty for single-version sites.
    pub versions: Vec<String>,
    /// Page file extensions, without the dot.
    pub extensions: Vec<String>,
    /// Root-relative glob patterns to skip.
    pub exclude: Vec<String>,
}

impl RouteConfig {
    /// Single-locale, single-version config rooted at `root`.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            base: "/".to_owned(),
            default_lang: String::new(),
            langs: Vec::new(),
            default_version: String::new(),
            versions: Vec::new(),
            extensions: DEFAULT_EXTENSIONS.iter().map(|&e| e.to_owned()).collect(),
            exclude: Vec::new(),
        }
    }
}

/// Route table for one build.
#[derive(Debug)]
pub struct RouteService {
    config: RouteConfig,
    routes: Vec<RoutePage>,
    by_path: HashMap<String, usize>,
}

impl RouteService {
    /// Discover every page under the content root.
    ///
    /// # Errors
    ///
    /// Returns an error if a directory cannot be read, an exclude pattern is
    /// invalid, or two files map to the same route path.
    pub fn scan(config: RouteConfig) -> Result<Self, RouteError> {
        let start = Instant::now();
        let files = Scanner::new(&config)?.scan()?;

        let mut routes = Vec::with_capacity(files.len());
        let mut by_path: HashMap<String, usize> = HashMap::with_capacity(files.len());
        for file in files {
            let derived = derive_route(&file.relative_path, &config);
            if let Some(&existing) = by_path.get(&derived.route_path) {
                let first: &RoutePage = &routes[existing];
                return Err(RouteError::DuplicateRoute {
                    route_path: derived.route_path,
                    first: first.meta.absolute_path.clone(),
                    second: file.absolute_path,
                });
            }
            by_path.insert(derived.route_path.clone(), routes.len());
            routes.push(RoutePage::new(RouteMeta {
                absolute_path: file.absolute_path,
                relative_path: file.relative_path,
                route_path: derived.route_path,
                lang: derived.lang,
                version: derived.version,
            }));
        }

        tracing::debug!(
            root = %config.root.display(),
            routes = routes.len(),
            elapsed_ms = start.elapsed().as_secs_f64() * 1000.0,
            "Scanned routes"
        );

        Ok(Self {
            config,
            routes,
            by_path,
        })
    }

    /// The config this table was built from.
    #[must_use]
    pub fn config(&self) -> &RouteConfig {
        &self.config
    }

    /// All routes, ordered by relative file path.
    #[must_use]
    pub fn get_routes(&self) -> &[RoutePage] {
        &self.routes
    }

    /// Route with exactly this path.
    #[must_use]
    pub fn route_page(&self, route_path: &str) -> Option<&RoutePage> {
        self.by_path.get(route_path).map(|&i| &self.routes[i])
    }

    /// Route for a loosely written path.
    ///
    /// Accepts a missing leading `/`, a trailing `.html`, a trailing `/index`,
    /// and a directory route written with or without its trailing slash.
    #[must_use]
    pub fn route_page_by_path(&self, path: &str) -> Option<&RoutePage> {
        let mut normalized = String::with_capacity(path.len() + 1);
        if !path.starts_with('/') {
            normalized.push('/');
        }
        normalized.push_str(path);
        if let Some(stripped) = normalized.strip_suffix(".html") {
            normalized.truncate(stripped.len());
        }
        if normalized.ends_with("/index") {
            normalized.truncate(normalized.len() - "index".len());
        }

        if let Some(page) = self.route_page(&normalized) {
            return Some(page);
        }
        let alternate = match normalized.strip_suffix('/') {
            Some(trimmed) if !trimmed.is_empty() => trimmed.to_owned(),
            Some(_) => return None,
            None => format!("{normalized}/"),
        };
        self.route_page(&alternate)
    }

    /// Whether a route exists for a loosely written path.
    #[must_use]
    pub fn is_exist_route(&self, path: &str) -> bool {
        self.route_page_by_path(path).is_some()
    }

    /// Routes of one locale and version.
    pub fn routes_for<'a>(
        &'a self,
        lang: &'a str,
        version: &'a str,
    ) -> impl Iterator<Item = &'a RoutePage> + 'a {
        self.routes
            .iter()
            .filter(move |r| r.meta.lang == lang && r.meta.version == version)
    }

    /// Attach a page record to the route at `route_path`.
    ///
    /// # Errors
    ///
    /// Returns an error if the route does not exist or already has a record.
    pub fn set_page_index_info(
        &self,
        route_path: &str,
        info: Arc<PageIndexInfo>,
    ) -> Result<(), RouteError> {
        self.route_page(route_path)
            .ok_or_else(|| RouteError::UnknownRoute(route_path.to_owned()))?
            .set_page_index_info(info)
    }
}

#[cfg(test)]
mod tests {
    use std::fs;
    use std::path::Path;

    use pretty_assertions::assert_eq;

    use super::*;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "# Page\n").unwrap();
    }

    fn multi_version_site() -> (tempfile::TempDir, RouteService) {
        let dir = tempfile::tempdir().unwrap();
        for file in [
            "v1/en/index.md",
            "v1/en/guide/index.md",
            "v1/zh/index.md",
            "v2/en/guide/intro.md",
            "v2/zh/api.mdx",
        ] {
            touch(dir.path(), file);
        }
        let config = RouteConfig {
            base: "/base/".to_owned(),
            default_lang: "en".to_owned(),
            langs: vec!["en".to_owned(), "zh".to_owned()],
            default_version: "v1".to_owned(),
            versions: vec!["v1".to_owned(), "v2".to_owned()],
            ..RouteConfig::new(dir.path())
        };
        let service = RouteService::scan(config).unwrap();
        (dir, service)
    }

    #[test]
    fn test_scan_multi_version_table() {
        let (_dir, service) = multi_version_site();
        let table: Vec<_> = service
            .get_routes()
            .iter()
            .map(|r| {
                (
                    r.meta.relative_path.as_str(),
                    r.meta.route_path.as_str(),
                    r.meta.lang.as_str(),
                    r.meta.version.as_str(),
                )
            })
            .collect();

        assert_eq!(
            table,
            vec![
                ("v1/en/guide/index.md", "/base/guide/", "en", "v1"),
                ("v1/en/index.md", "/base/", "en", "v1"),
                ("v1/zh/index.md", "/base/zh/", "zh", "v1"),
                ("v2/en/guide/intro.md", "/base/v2/guide/intro", "en", "v2"),
                ("v2/zh/api.mdx", "/base/v2/zh/api", "zh", "v2"),
            ]
        );
    }

    #[test]
    fn test_route_lookup() {
        let (_dir, service) = multi_version_site();

        assert!(service.route_page("/base/guide/").is_some());
        assert!(service.route_page("/base/guide").is_none());

        let by_path = |p: &str| service.route_page_by_path(p).map(|r| r.meta.route_path.clone());
        assert_eq!(by_path("/base/guide"), Some("/base/guide/".to_owned()));
        assert_eq!(by_path("base/guide/index"), Some("/base/guide/".to_owned()));
        assert_eq!(by_path("/base/guide/index.html"), Some("/base/guide/".to_owned()));
        assert_eq!(by_path("/base/v2/zh/api.html"), Some("/base/v2/zh/api".to_owned()));
        assert_eq!(by_path("/base/v2/zh/api/"), Some("/base/v2/zh/api".to_owned()));
        assert_eq!(by_path("/base/missing"), None);
        assert!(service.is_exist_route("/base/index.html"));
    }

    #[test]
    fn test_routes_for_locale_and_version() {
        let (_dir, service) = multi_version_site();
        let zh_v2: Vec<_> = service
            .routes_for("zh", "v2")
            .map(|r| r.meta.route_path.as_str())
            .collect();
        assert_eq!(zh_v2, vec!["/base/v2/zh/api"]);
        assert_eq!(service.routes_for("en", "v1").count(), 2);
    }

    #[test]
    fn test_duplicate_route_names_both_files() {
        let dir = tempfile::tempdir().unwrap();
        touch(dir.path(), "guide.md");
        touch(dir.path(), "guide.mdx");

        let err = RouteService::scan(RouteConfig::new(dir.path())).unwrap_err();

        let RouteError::DuplicateRoute {
            route_path,
            first,
            second,
        } = err
        else {
            panic!("expected DuplicateRoute, got {err:?}");
        };
        assert_eq!(route_path, "/guide");
        assert!(first.ends_with("guide.md"));
        assert!(second.ends_with("guide.mdx"));
    }

    #[test]
    fn test_set_page_index_info_by_route() {
        let (_dir, service) = multi_version_site();
        let page = service.route_page("/base/zh/").unwrap();
        let info = Arc::new(PageIndexInfo::placeholder(&page.meta));

        service.set_page_index_info("/base/zh/", info).unwrap();

        assert_eq!(page.page_index_info().unwrap().lang, "zh");
        assert!(matches!(
            service.set_page_index_info("/nope", Arc::new(PageIndexInfo::default())),
            Err(RouteError::UnknownRoute(_))
        ));
    }

    #[test]
    fn test_independent_tables() {
        let (_a, first) = multi_version_site();
        let (_b, second) = multi_version_site();
        let page = first.route_page("/base/").unwrap();
        page.set_page_index_info(Arc::new(PageIndexInfo::placeholder(&page.meta)))
            .unwrap();
        assert!(second.route_page("/base/").unwrap().page_index_info().is_none());
    }
}
