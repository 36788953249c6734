//! CLI error types.

use quire_config::ConfigError;
use quire_route::RouteError;
use quire_site::PageDataError;

/// CLI error type.
#[derive(Debug, thiserror::Error)]
pub(crate) enum CliError {
    #[error("{0}")]
    Config(#[from] ConfigError),

    #[error("{0}")]
    Io(#[from] std::io::Error),

    #[error("{0}")]
    Route(#[from] RouteError),

    #[error("{0}")]
    PageData(#[from] PageDataError),

    #[error("Failed to serialize page index: {0}")]
    Json(#[from] serde_json::Error),
}
