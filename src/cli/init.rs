//! Init command: write the built-in layout as an editable file.

use crate::cli::common::{CliError, CliResult};
use crate::services::LayoutService;
use clap::Args;
use std::path::PathBuf;

/// Write the built-in Shingetsu layout to a markdown file
#[derive(Debug, Clone, Args)]
pub struct InitArgs {
    /// Layout markdown file to write
    #[arg(short, long, value_name = "FILE", default_value = "shingetsu.md")]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

impl InitArgs {
    /// Execute the init command
    pub fn execute(&self) -> CliResult<()> {
        if self.output.exists() && !self.force {
            return Err(CliError::validation(format!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            )));
        }

        let layout = LayoutService::builtin().map_err(|e| CliError::io(format!("{e:#}")))?;
        LayoutService::save(&layout, &self.output).map_err(|e| CliError::io(format!("{e:#}")))?;

        println!("✓ Wrote {}", self.output.display());
        Ok(())
    }
}
