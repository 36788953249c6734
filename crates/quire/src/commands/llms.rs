//! `quire llms` command implementation.

use std::path::PathBuf;

use clap::Args;
use quire_site::{MdxFlattener, llms_full_txt, llms_txt};

use super::{SiteArgs, load_site};
use crate::error::CliError;
use crate::output::Output;

/// Arguments for the llms command.
#[derive(Args)]
pub(crate) struct LlmsArgs {
    #[command(flatten)]
    pub site: SiteArgs,

    /// Emit the full page sources (`llms-full.txt`) instead of the index.
    #[arg(long)]
    full: bool,

    /// Write the export to this file instead of stdout.
    #[arg(short, long)]
    output: Option<PathBuf>,
}

impl LlmsArgs {
    /// Execute the llms command.
    pub(crate) async fn execute(self) -> Result<(), CliError> {
        let output = Output::new();
        let config = self.site.load_config(None)?;
        let routes = load_site(&config, &MdxFlattener).await?;

        let text = if self.full {
            llms_full_txt(&routes)
        } else {
            llms_txt(&routes, &config.title)
        };

        output.emit(self.output.as_deref(), &text)?;
        Ok(())
    }
}
