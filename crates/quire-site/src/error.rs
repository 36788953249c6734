//! Page-data extraction errors.

use std::path::PathBuf;

use quire_markdown::FrontmatterError;
use quire_route::RouteError;

/// Error raised while extracting page data.
///
/// Every variant names the file it concerns so a failed build points at the
/// offending page.
#[derive(Debug, thiserror::Error)]
pub enum PageDataError {
    /// Content file could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Frontmatter is malformed.
    #[error(transparent)]
    Frontmatter(#[from] FrontmatterError),
    /// An embedded component could not be flattened.
    #[error("Failed to flatten {}: {message}", path.display())]
    Flatten { path: PathBuf, message: String },
    /// Record could not be attached to its route.
    #[error(transparent)]
    Route(#[from] RouteError),
}
