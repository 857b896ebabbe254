//! Validation command for layout files.

use crate::cli::common::{CheckGroup, CliError, CliResult, ValidationResponse};
use crate::services::LayoutService;
use crate::validation::LayoutValidator;
use clap::Args;
use std::path::PathBuf;

/// Validate a layout file for errors and warnings
#[derive(Debug, Clone, Args)]
pub struct ValidateArgs {
    /// Path to layout markdown file (built-in layout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Output results as JSON
    #[arg(long)]
    pub json: bool,

    /// Treat warnings as errors (exit non-zero)
    #[arg(long)]
    pub strict: bool,
}

impl ValidateArgs {
    /// Execute the validate command
    pub fn execute(&self) -> CliResult<()> {
        let layout = LayoutService::load_or_builtin(self.layout.as_deref())
            .map_err(|e| CliError::io(format!("Failed to load layout: {e:#}")))?;

        let report = LayoutValidator::new(&layout).validate();
        tracing::debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Validated layout '{}'",
            layout.metadata.name
        );

        let response = ValidationResponse::from_report(&report, CheckGroup::Sequences);

        if self.json {
            response.print_json()?;
        } else {
            if response.valid {
                println!("✓ Validation passed: {}", layout.metadata.name);
            } else {
                println!("✗ Validation failed: {}", layout.metadata.name);
            }

            println!("\nChecks:");
            println!("  Prefixes:  {}", response.checks.prefixes);
            println!("  Outputs:   {}", response.checks.outputs);
            println!("  Sequences: {}", response.checks.sequences);

            response.print_issues();
        }

        response.into_result(self.strict, "Validation failed")
    }
}
