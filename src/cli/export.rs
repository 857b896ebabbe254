//! Export command for generating the remapper and analyzer artifacts.

use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::export::{self, ExportFormat};
use crate::models::Arrangement;
use crate::services::layouts::sanitize_filename;
use crate::services::LayoutService;
use crate::validation::LayoutValidator;
use clap::{Args, ValueEnum};
use std::path::PathBuf;

/// Arrangement selection on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ArrangementChoice {
    /// QWERTY legends
    Qwerty,
    /// Colemak legends
    Colemak,
    /// Both arrangements
    All,
}

impl ArrangementChoice {
    /// Arrangements this choice selects.
    #[must_use]
    pub fn arrangements(self) -> Vec<Arrangement> {
        match self {
            Self::Qwerty => vec![Arrangement::Qwerty],
            Self::Colemak => vec![Arrangement::Colemak],
            Self::All => Arrangement::ALL.to_vec(),
        }
    }
}

/// Export the layout to analyzer JSON, romaji tables and Karabiner rules
#[derive(Debug, Clone, Args)]
pub struct ExportArgs {
    /// Path to layout markdown file (built-in layout when omitted)
    #[arg(short, long, value_name = "FILE")]
    pub layout: Option<PathBuf>,

    /// Output directory (defaults to the configured output directory)
    #[arg(short, long, value_name = "DIR")]
    pub out_dir: Option<PathBuf>,

    /// File name stem of the exported files
    #[arg(short, long, value_name = "STEM")]
    pub name: Option<String>,

    /// Artifacts to write
    #[arg(long, value_enum)]
    pub format: Option<ExportFormat>,

    /// Arrangements to write romaji and Karabiner files for
    #[arg(long, value_enum)]
    pub arrangement: Option<ArrangementChoice>,

    /// Append a timestamp to the file names
    #[arg(long)]
    pub timestamp: bool,
}

impl ExportArgs {
    /// Execute the export command
    pub fn execute(&self) -> CliResult<()> {
        let layout = LayoutService::load_or_builtin(self.layout.as_deref())
            .map_err(|e| CliError::io(format!("Failed to load layout: {e:#}")))?;

        let config = Config::load()
            .map_err(|e| CliError::io(format!("Failed to load configuration: {e:#}")))?;

        let mut options = config.export_options(self.format.unwrap_or_default());
        if let Some(name) = &self.name {
            let stem = sanitize_filename(name);
            if stem.is_empty() {
                return Err(CliError::validation("--name cannot be empty"));
            }
            options.stem = stem;
        }
        if let Some(choice) = self.arrangement {
            options.arrangements = choice.arrangements();
        }
        options.timestamp |= self.timestamp;

        let out_dir = self.out_dir.clone().unwrap_or_else(|| config.output_dir());

        let report = LayoutValidator::new(&layout).validate();
        if !report.is_valid() {
            eprint!("{}", report.format_message());
            return Err(CliError::validation(format!(
                "Layout '{}' has validation errors; nothing was exported",
                layout.metadata.name
            )));
        }

        let written = export::export_all(&layout, &out_dir, &options)
            .map_err(|e| CliError::io(format!("Export failed: {e:#}")))?;

        println!(
            "✓ Exported '{}' to {}",
            layout.metadata.name,
            out_dir.display()
        );
        for path in &written {
            println!("  {}", path.display());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_arrangement_choice() {
        assert_eq!(
            ArrangementChoice::Colemak.arrangements(),
            vec![Arrangement::Colemak]
        );
        assert_eq!(ArrangementChoice::All.arrangements().len(), 2);
    }
}
