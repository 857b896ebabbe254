//! Consistency check of exported artifacts.

use crate::cli::common::{CheckGroup, CliError, CliResult, ValidationResponse};
use crate::config::Config;
use crate::services::layouts::sanitize_filename;
use crate::services::LayoutService;
use crate::validation::{ConsistencyChecker, ExportBundle};
use clap::Args;
use std::path::PathBuf;

/// Check that exported artifacts agree with each other
#[derive(Debug, Clone, Args)]
pub struct CheckArgs {
    /// Directory holding the exported files (defaults to the configured output directory)
    #[arg(short, long, value_name = "DIR")]
    pub dir: Option<PathBuf>,

    /// File name stem the files were exported under
    #[arg(short, long, value_name = "STEM")]
    pub name: Option<String>,

    /// Layout the files were exported from; its grids must match the analyzer file
    #[arg(short, long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings (such as missing files) as errors
    #[arg(long)]
    pub strict: bool,
}

impl CheckArgs {
    /// Execute the check command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::io(format!("Failed to load configuration: {e:#}")))?;

        let dir = self.dir.clone().unwrap_or_else(|| config.output_dir());
        let stem = self
            .name
            .as_deref()
            .map_or_else(|| config.export.stem.clone(), sanitize_filename);

        let bundle = ExportBundle::load(&dir, &stem)
            .map_err(|e| CliError::io(format!("Failed to read exported files: {e:#}")))?;

        let source = match &self.layout {
            Some(path) => Some(
                LayoutService::load(path)
                    .map_err(|e| CliError::io(format!("Failed to load layout: {e:#}")))?,
            ),
            None => None,
        };

        let mut checker = ConsistencyChecker::new(&bundle);
        if let Some(layout) = &source {
            checker = checker.with_source(layout);
        }
        let report = checker.check();

        let response = ValidationResponse::from_report(&report, CheckGroup::Artifacts);

        if self.json {
            response.print_json()?;
        } else {
            if response.valid {
                println!("✓ Artifacts consistent: {}/{stem}", dir.display());
            } else {
                println!("✗ Artifacts inconsistent: {}/{stem}", dir.display());
            }
            println!("\nChecks:");
            println!("  Sequences: {}", response.checks.sequences);
            println!("  Artifacts: {}", response.checks.artifacts);

            response.print_issues();
        }

        response.into_result(self.strict, "Consistency check failed")
    }
}
