//! `quire index` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_route::PageIndexInfo;
use quire_site::{ContentFlattener, IdentityFlattener, MdxFlattener};

use super::{SiteArgs, load_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the index command.
#[derive(Args)]
pub(crate) struct IndexArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Skip search content and heading offsets.
    #[arg(long)]
    no_search: bool,

    /// Inline imported markdown components before indexing.
    #[arg(long)]
    flatten: bool,

    /// Write JSON to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl IndexArgs {
    /// Execute the index command.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(self.no_search.then_some(false))?;

        output.info(&format!("Content root: {}", config.root_dir.display()));

        let flattener: &dyn ContentFlattener = if self.flatten {
            &MdxFlattener
        } else {
            &IdentityFlattener
        };
        let routes = load_site(&config, flattener).await?;

        let records: Vec<&PageIndexInfo> = routes
            .get_routes()
            .iter()
            .filter_map(|page| page.page_index_info().map(AsRef::as_ref))
            .collect();
        let json = serde_json::to_string_pretty(&records)?;

        output.emit(self.output.as_deref(), &json)?;
        Ok(())
    }
}
