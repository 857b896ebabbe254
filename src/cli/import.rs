//! Import command: analyzer JSON to layout markdown.

use crate::cli::common::{CliError, CliResult};
use crate::parser::parse_analyzer_json;
use crate::services::LayoutService;
use crate::validation::LayoutValidator;
use clap::Args;
use std::path::PathBuf;

/// Rebuild a layout markdown file from a keyboard_analyzer JSON file
#[derive(Debug, Clone, Args)]
pub struct ImportArgs {
    /// keyboard_analyzer JSON file
    #[arg(short, long, value_name = "FILE")]
    pub analyzer: PathBuf,

    /// Layout markdown file to write
    #[arg(short, long, value_name = "FILE")]
    pub output: PathBuf,

    /// Overwrite the output file if it exists
    #[arg(long)]
    pub force: bool,
}

impl ImportArgs {
    /// Execute the import command
    pub fn execute(&self) -> CliResult<()> {
        if self.output.exists() && !self.force {
            return Err(CliError::validation(format!(
                "{} already exists (use --force to overwrite)",
                self.output.display()
            )));
        }

        let analyzer = parse_analyzer_json(&self.analyzer)
            .map_err(|e| CliError::io(format!("Failed to read analyzer file: {e:#}")))?;
        let layout = analyzer
            .to_layout()
            .map_err(|e| CliError::io(format!("Failed to rebuild layout: {e:#}")))?;

        let report = LayoutValidator::new(&layout).validate();
        for warning in &report.warnings {
            tracing::warn!("{warning}");
        }

        LayoutService::save(&layout, &self.output)
            .map_err(|e| CliError::io(format!("{e:#}")))?;

        println!(
            "✓ Imported '{}' to {}",
            layout.metadata.name,
            self.output.display()
        );
        if !report.is_valid() {
            println!("⚠ The imported layout has validation errors:");
            print!("{}", report.format_message());
        }

        Ok(())
    }
}
