//! Configuration management CLI commands.

use crate::cli::common::{CliError, CliResult};
use crate::config::Config;
use crate::constants::APP_NAME;
use crate::models::Arrangement;
use clap::{Args, Subcommand};
use serde::Serialize;
use std::path::PathBuf;

/// Configuration management commands
#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    command: ConfigCommand,
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Display current configuration
    Show(ConfigShowArgs),
    /// Set configuration values
    Set(ConfigSetArgs),
}

/// Display current configuration
#[derive(Args, Debug)]
pub struct ConfigShowArgs {
    /// Output as JSON
    #[arg(long)]
    json: bool,
}

/// Set configuration values
#[derive(Args, Debug)]
pub struct ConfigSetArgs {
    /// Default export directory
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Default arrangements, comma separated (qwerty,colemak)
    #[arg(long, value_name = "LIST", value_enum, value_delimiter = ',')]
    arrangements: Option<Vec<Arrangement>>,

    /// Append a timestamp to exported file names
    #[arg(long, value_name = "BOOL")]
    timestamp: Option<bool>,

    /// Default file name stem of exported files
    #[arg(long, value_name = "STEM")]
    stem: Option<String>,
}

/// JSON-serializable configuration for output
#[derive(Serialize, Debug)]
struct ConfigOutput {
    config_file: String,
    paths: PathsOutput,
    export: ExportOutput,
}

#[derive(Serialize, Debug)]
struct PathsOutput {
    output_dir: String,
}

#[derive(Serialize, Debug)]
struct ExportOutput {
    arrangements: Vec<Arrangement>,
    timestamp_suffix: bool,
    stem: String,
}

impl ConfigArgs {
    /// Execute config subcommand
    pub fn execute(&self) -> CliResult<()> {
        match &self.command {
            ConfigCommand::Show(args) => args.execute(),
            ConfigCommand::Set(args) => args.execute(),
        }
    }
}

impl ConfigShowArgs {
    /// Execute show command
    pub fn execute(&self) -> CliResult<()> {
        let config = Config::load()
            .map_err(|e| CliError::io(format!("Failed to load configuration: {e:#}")))?;

        if self.json {
            output_json(&config)?;
        } else {
            output_human_readable(&config);
        }

        Ok(())
    }
}

impl ConfigSetArgs {
    /// Execute set command
    pub fn execute(&self) -> CliResult<()> {
        if self.output_dir.is_none()
            && self.arrangements.is_none()
            && self.timestamp.is_none()
            && self.stem.is_none()
        {
            return Err(CliError::validation(
                "At least one configuration option must be specified: --output-dir, --arrangements, --timestamp, or --stem",
            ));
        }

        let mut config = match Config::load() {
            Ok(config) => config,
            Err(e) => {
                tracing::warn!(
                    error = %format!("{e:#}"),
                    "Unreadable configuration replaced with defaults"
                );
                Config::default()
            }
        };

        if let Some(path) = &self.output_dir {
            std::fs::create_dir_all(path).map_err(|e| {
                CliError::io(format!(
                    "Failed to create output directory {}: {e}",
                    path.display()
                ))
            })?;
            config.paths.output_dir = Some(path.clone());
        }

        if let Some(arrangements) = &self.arrangements {
            config.export.arrangements.clone_from(arrangements);
        }

        if let Some(timestamp) = self.timestamp {
            config.export.timestamp_suffix = timestamp;
        }

        if let Some(stem) = &self.stem {
            config.export.stem = stem.trim().to_string();
        }

        config
            .validate()
            .map_err(|e| CliError::validation(format!("Invalid configuration: {e}")))?;

        config
            .save()
            .map_err(|e| CliError::io(format!("Failed to save configuration: {e:#}")))?;

        println!("Configuration updated successfully.");

        Ok(())
    }
}

fn config_file_display() -> String {
    Config::config_file_path()
        .map(|p| p.to_string_lossy().to_string())
        .unwrap_or_else(|_| "(unknown)".to_string())
}

/// Output configuration in JSON format
fn output_json(config: &Config) -> CliResult<()> {
    let output = ConfigOutput {
        config_file: config_file_display(),
        paths: PathsOutput {
            output_dir: config.output_dir().to_string_lossy().to_string(),
        },
        export: ExportOutput {
            arrangements: config.export.arrangements.clone(),
            timestamp_suffix: config.export.timestamp_suffix,
            stem: config.export.stem.clone(),
        },
    };

    let json = serde_json::to_string_pretty(&output)
        .map_err(|e| CliError::io(format!("Failed to serialize configuration to JSON: {e}")))?;

    println!("{json}");
    Ok(())
}

/// Output configuration in human-readable format
fn output_human_readable(config: &Config) {
    let title = format!("{APP_NAME} Configuration");
    println!("{title}");
    println!("{}", "=".repeat(title.len()));
    println!();
    println!("Config file: {}", config_file_display());
    println!();

    println!("Paths:");
    println!("  Output Directory: {}", config.output_dir().display());
    println!();

    let arrangements: Vec<&str> = config
        .export
        .arrangements
        .iter()
        .map(|a| a.slug())
        .collect();
    println!("Export:");
    println!("  Arrangements:     {}", arrangements.join(", "));
    println!("  Timestamp Suffix: {}", config.export.timestamp_suffix);
    println!("  File Stem:        {}", config.export.stem);
    println!();
}
