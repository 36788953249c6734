//! Content discovery by filesystem walking.
//!
//! The scanner only finds files and derives their route paths; nothing is
//! read at this stage.

use std::fs;
use std::path::{Path, PathBuf};

use glob::Pattern;

use crate::{RouteConfig, RouteError};

/// A content file found under the root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) struct ContentFile {
    pub absolute_path: PathBuf,
    /// Root-relative, `/`-separated.
    pub relative_path: String,
}

/// Walks the content root collecting files with a page extension.
pub(crate) struct Scanner<'a> {
    config: &'a RouteConfig,
    exclude: Vec<Pattern>,
}

impl<'a> Scanner<'a> {
    pub fn new(config: &'a RouteConfig) -> Result<Self, RouteError> {
        let exclude = config
            .exclude
            .iter()
            .map(|p| {
                Pattern::new(p).map_err(|source| RouteError::Pattern {
                    pattern: p.clone(),
                    source,
                })
            })
            .collect::<Result<_, _>>()?;
        Ok(Self { config, exclude })
    }

    /// Scan the root, returning files sorted by relative path.
    ///
    /// A missing root yields no files.
    pub fn scan(&self) -> Result<Vec<ContentFile>, RouteError> {
        let mut files = Vec::new();
        if self.config.root.is_dir() {
            self.scan_directory(&self.config.root, "", &mut files)?;
        }
        files.sort_by(|a, b| a.relative_path.cmp(&b.relative_path));
        Ok(files)
    }

    fn scan_directory(
        &self,
        dir: &Path,
        prefix: &str,
        files: &mut Vec<ContentFile>,
    ) -> Result<(), RouteError> {
        let entries = fs::read_dir(dir).map_err(|source| RouteError::Io {
            path: dir.to_path_buf(),
            source,
        })?;

        for entry in entries.filter_map(Result::ok) {
            let name = entry.file_name().to_string_lossy().into_owned();
            if name.starts_with('.') || name == "node_modules" {
                continue;
            }

            let relative = if prefix.is_empty() {
                name
            } else {
                format!("{prefix}/{name}")
            };
            if self.is_excluded(&relative) {
                continue;
            }

            let path = entry.path();
            if entry.file_type().is_ok_and(|t| t.is_dir()) {
                self.scan_directory(&path, &relative, files)?;
            } else if self.has_page_extension(&path) {
                files.push(ContentFile {
                    absolute_path: path,
                    relative_path: relative,
                });
            }
        }
        Ok(())
    }

    fn is_excluded(&self, relative: &str) -> bool {
        self.exclude.iter().any(|p| p.matches(relative))
    }

    fn has_page_extension(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|e| e.to_str())
            .is_some_and(|ext| self.config.extensions.iter().any(|e| e == ext))
    }
}

/// Route derived from a relative content path.
#[derive(Debug, PartialEq, Eq)]
pub(crate) struct DerivedRoute {
    pub route_path: String,
    pub lang: String,
    pub version: String,
}

/// Derive the route of a root-relative content path.
///
/// Examples (base `/`, default version `v1`, default lang `en`):
/// - `v1/en/index.md` -> `/`
/// - `v1/zh/guide/index.md` -> `/zh/guide/`
/// - `v2/en/guide/intro.md` -> `/v2/guide/intro`
/// - `v2/zh/api.mdx` -> `/v2/zh/api`
pub(crate) fn derive_route(relative_path: &str, config: &RouteConfig) -> DerivedRoute {
    let mut segments: Vec<&str> = relative_path.split('/').collect();

    let mut version = config.default_version.clone();
    if !config.versions.is_empty()
        && segments.len() > 1
        && config.versions.iter().any(|v| v == segments[0])
    {
        version = segments.remove(0).to_owned();
    }

    let mut lang = config.default_lang.clone();
    if !config.langs.is_empty()
        && segments.len() > 1
        && config.langs.iter().any(|l| l == segments[0])
    {
        lang = segments.remove(0).to_owned();
    }

    let rest = segments.join("/");
    let without_ext = match rest.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() && !stem.ends_with('/') => stem,
        _ => rest.as_str(),
    };
    let page = if without_ext == "index" {
        ""
    } else if let Some(dir) = without_ext.strip_suffix("/index") {
        // Keep the trailing slash for directory routes.
        &without_ext[..=dir.len()]
    } else {
        without_ext
    };

    let mut route_path = config.base.trim_end_matches('/').to_owned();
    if !version.is_empty() && version != config.default_version {
        route_path.push('/');
        route_path.push_str(&version);
    }
    if !lang.is_empty() && lang != config.default_lang {
        route_path.push('/');
        route_path.push_str(&lang);
    }
    route_path.push('/');
    route_path.push_str(page);

    DerivedRoute {
        route_path,
        lang,
        version,
    }
}
