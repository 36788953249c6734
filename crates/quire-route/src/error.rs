//! Route table errors.

use std::path::PathBuf;

/// Error raised while building or updating the route table.
#[derive(Debug, thiserror::Error)]
pub enum RouteError {
    /// Directory could not be read.
    #[error("Failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    /// Two content files map to the same route path.
    #[error(
        "Route {route_path} is produced by both {} and {}",
        first.display(),
        second.display()
    )]
    DuplicateRoute {
        route_path: String,
        first: PathBuf,
        second: PathBuf,
    },
    /// Exclude glob does not compile.
    #[error("Invalid exclude pattern {pattern:?}: {source}")]
    Pattern {
        pattern: String,
        #[source]
        source: glob::PatternError,
    },
    /// No route with this path.
    #[error("Unknown route: {0}")]
    UnknownRoute(String),
    /// Page data was already attached to this route.
    #[error("Page data already set for route {0}")]
    PageDataAlreadySet(String),
}
