//! Route entries and their page records.

use std::path::PathBuf;
use std::sync::{Arc, OnceLock};

use quire_markdown::{Frontmatter, Header};
use serde::Serialize;

use crate::RouteError;

/// A discovered content file and the route it is served at.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RouteMeta {
    /// Absolute path of the content file.
    pub absolute_path: PathBuf,
    /// Path relative to the content root, `/`-separated.
    pub relative_path: String,
    /// URL path (e.g., `/`, `/guide/`, `/v2/zh/guide/intro`).
    pub route_path: String,
    /// Locale, empty for single-locale sites.
    pub lang: String,
    /// Version, empty for single-version sites.
    pub version: String,
}

impl RouteMeta {
    /// Flat page identifier (`/guide/intro` -> `guide_intro`, `/` -> `index`).
    #[must_use]
    pub fn page_name(&self) -> String {
        let trimmed = self.route_path.trim_matches('/');
        if trimmed.is_empty() {
            "index".to_owned()
        } else {
            trimmed.replace('/', "_")
        }
    }

    /// Whether the file is markdown (`.md` or `.mdx`).
    #[must_use]
    pub fn is_markdown(&self) -> bool {
        self.absolute_path
            .extension()
            .is_some_and(|ext| ext == "md" || ext == "mdx")
    }
}

/// Index record for one page.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PageIndexInfo {
    pub title: String,
    /// Search content: transformed markdown without the leading title.
    pub content: String,
    /// Source after component flattening, before any stripping.
    #[serde(rename = "_flattenContent")]
    pub flatten_content: String,
    pub route_path: String,
    pub lang: String,
    pub version: String,
    pub toc: Vec<Header>,
    pub frontmatter: Frontmatter,
    #[serde(rename = "_filepath")]
    pub filepath: PathBuf,
    #[serde(rename = "_relativePath")]
    pub relative_path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PageIndexInfo {
    /// Placeholder record for a route: empty title and content.
    #[must_use]
    pub fn placeholder(meta: &RouteMeta) -> Self {
        Self {
            route_path: meta.route_path.clone(),
            lang: meta.lang.clone(),
            version: meta.version.clone(),
            filepath: meta.absolute_path.clone(),
            relative_path: meta.relative_path.clone(),
            ..Self::default()
        }
    }
}

/// A route entry with its write-once page record slot.
#[derive(Debug)]
pub struct RoutePage {
    pub meta: RouteMeta,
    page_index_info: OnceLock<Arc<PageIndexInfo>>,
}

impl RoutePage {
    #[must_use]
    pub fn new(meta: RouteMeta) -> Self {
        Self {
            meta,
            page_index_info: OnceLock::new(),
        }
    }

    /// Attach the page record.
    ///
    /// # Errors
    ///
    /// Returns [`RouteError::PageDataAlreadySet`] if a record is already attached.
    pub fn set_page_index_info(&self, info: Arc<PageIndexInfo>) -> Result<(), RouteError> {
        self.page_index_info
            .set(info)
            .map_err(|_| RouteError::PageDataAlreadySet(self.meta.route_path.clone()))
    }

    /// The attached page record, if extraction has run.
    #[must_use]
    pub fn page_index_info(&self) -> Option<&Arc<PageIndexInfo>> {
        self.page_index_info.get()
    }
}
