//! CLI command implementations.

mod index;
mod llms;

use std::path::PathBuf;

use clap::Args;
use quire_config::{CliSettings, Config};
use quire_route::{RouteConfig, RouteService};
use quire_site::{ContentFlattener, ExtractPageDataOptions, extract_page_data};

use crate::error::CliError;

pub(crate) use index::IndexArgs;
pub(crate) use llms::LlmsArgs;

/// Arguments shared by every command that reads the content tree.
#[derive(Args)]
pub(crate) struct SiteArgs {
    /// Path to configuration file (default: auto-discover quire.toml).
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Content root directory (overrides config).
    #[arg(short, long, env = "QUIRE_ROOT")]
    root: Option<PathBuf>,

    /// Route base path (overrides config).
    #[arg(long)]
    base: Option<String>,

    /// Enable verbose output (timing logs).
    #[arg(short, long)]
    pub verbose: bool,
}

impl SiteArgs {
    /// Load configuration with these arguments applied.
    pub(crate) fn load_config(&self, search_enabled: Option<bool>) -> Result<Config, CliError> {
        let cli_settings = CliSettings {
            root: self.root.clone(),
            base: self.base.clone(),
            search_enabled,
        };
        Ok(Config::load(self.config.as_deref(), Some(&cli_settings))?)
    }
}

/// Route discovery settings for a loaded configuration.
pub(crate) fn route_config(config: &Config) -> RouteConfig {
    let (default_version, versions) = config
        .multi_version
        .as_ref()
        .map(|mv| (mv.default.clone(), mv.versions.clone()))
        .unwrap_or_default();
    let langs = config.lang_codes();
    let default_lang = if langs.is_empty() {
        String::new()
    } else {
        config.lang.clone()
    };

    RouteConfig {
        root: config.root_dir.clone(),
        base: config.base.clone(),
        default_lang,
        langs,
        default_version,
        versions,
        extensions: config.route.extensions.clone(),
        exclude: config.route.exclude.clone(),
    }
}

/// Page-data extraction settings for a loaded configuration.
pub(crate) fn extract_options(config: &Config) -> ExtractPageDataOptions {
    ExtractPageDataOptions {
        root: config.root_dir.clone(),
        search_code_blocks: config.search.code_blocks,
        replace_rules: config.replace_rules_resolved.clone(),
        alias: config.alias_resolved.clone(),
        extract_description: config.markdown.extract_description,
        search_enabled: config.search.enabled,
        toc_max_depth: config.markdown.toc_max_depth,
    }
}

/// Scan the content tree and attach page data to every route.
pub(crate) async fn load_site(
    config: &Config,
    flattener: &dyn ContentFlattener,
) -> Result<RouteService, CliError> {
    let routes = RouteService::scan(route_config(config))?;
    extract_page_data(&routes, &extract_options(config), flattener).await?;
    Ok(routes)
}
