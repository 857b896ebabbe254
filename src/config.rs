//! Configuration management for the application.
//!
//! This module handles loading, validating, and saving application configuration
//! in TOML format with platform-specific directory resolution.

use crate::constants::{APP_BINARY_NAME, CONFIG_DIR_ENV, DEFAULT_EXPORT_STEM};
use crate::export::{ExportFormat, ExportOptions};
use crate::models::Arrangement;
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;

/// Path configuration for file system locations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct PathConfig {
    /// Default directory for exported artifacts (current directory when unset)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<PathBuf>,
}

/// Export defaults.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Arrangements exported when none is given on the command line
    pub arrangements: Vec<Arrangement>,
    /// Append a timestamp to exported file names
    pub timestamp_suffix: bool,
    /// File name stem of exported artifacts
    pub stem: String,
}

impl Default for ExportConfig {
    fn default() -> Self {
        Self {
            arrangements: Arrangement::ALL.to_vec(),
            timestamp_suffix: false,
            stem: DEFAULT_EXPORT_STEM.to_string(),
        }
    }
}

/// Application configuration.
///
/// Validation rules:
/// - at least one arrangement, none repeated
/// - the stem is non-empty and contains no path separators
/// - `output_dir`, when set, is not an existing regular file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
pub struct Config {
    /// File system paths
    #[serde(default)]
    pub paths: PathConfig,
    /// Export defaults
    #[serde(default)]
    pub export: ExportConfig,
}

impl Config {
    /// Creates a new Config with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Checks if the config file exists on disk.
    #[must_use]
    pub fn exists() -> bool {
        Self::config_file_path()
            .map(|path| path.exists())
            .unwrap_or(false)
    }

    /// Gets the config directory path.
    ///
    /// `SHINGETSU_CONFIG_DIR` overrides the platform location:
    /// - Linux: `~/.config/shingetsu/`
    /// - macOS: `~/Library/Application Support/shingetsu/`
    /// - Windows: `%APPDATA%\shingetsu\`
    pub fn config_dir() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os(CONFIG_DIR_ENV).filter(|dir| !dir.is_empty()) {
            return Ok(PathBuf::from(dir));
        }

        let config_dir = dirs::config_dir()
            .context("Failed to determine config directory")?
            .join(APP_BINARY_NAME);

        Ok(config_dir)
    }

    /// Gets the full path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Loads configuration from the config file.
    ///
    /// If the file doesn't exist, returns default configuration.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_file_path()?;

        if !config_path.exists() {
            tracing::debug!(path = %config_path.display(), "No config file, using defaults");
            return Ok(Self::new());
        }

        let content = fs::read_to_string(&config_path).with_context(|| {
            format!("Failed to read config file: {}", config_path.display())
        })?;

        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path.display()))
    }

    /// Parses and validates TOML configuration.
    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    /// Saves configuration to the config file using atomic write.
    ///
    /// Uses temp file + rename pattern for atomic writes.
    pub fn save(&self) -> Result<()> {
        self.validate()?;

        // Ensure config directory exists
        let config_dir = Self::config_dir()?;
        fs::create_dir_all(&config_dir).with_context(|| {
            format!("Failed to create config directory: {}", config_dir.display())
        })?;

        // Serialize to TOML
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;

        let config_path = Self::config_file_path()?;
        let temp_path = config_path.with_extension("toml.tmp");

        // Write to temp file
        fs::write(&temp_path, content).with_context(|| {
            format!("Failed to write temp config file: {}", temp_path.display())
        })?;

        // Atomic rename
        fs::rename(&temp_path, &config_path).with_context(|| {
            format!("Failed to rename temp config file to: {}", config_path.display())
        })?;

        tracing::info!(path = %config_path.display(), "Saved configuration");
        Ok(())
    }

    /// Validates configuration values.
    pub fn validate(&self) -> Result<()> {
        if self.export.arrangements.is_empty() {
            anyhow::bail!("export.arrangements must list at least one of: qwerty, colemak");
        }
        for (idx, arrangement) in self.export.arrangements.iter().enumerate() {
            if self.export.arrangements[..idx].contains(arrangement) {
                anyhow::bail!("export.arrangements lists '{arrangement}' twice");
            }
        }

        let stem = self.export.stem.trim();
        if stem.is_empty() {
            anyhow::bail!("export.stem cannot be empty");
        }
        if stem.contains(['/', '\\']) {
            anyhow::bail!("export.stem '{stem}' must not contain path separators");
        }

        if let Some(dir) = &self.paths.output_dir {
            if dir.is_file() {
                anyhow::bail!("Output directory is a file: {}", dir.display());
            }
        }

        Ok(())
    }

    /// Directory exports go to when none is given.
    #[must_use]
    pub fn output_dir(&self) -> PathBuf {
        self.paths
            .output_dir
            .clone()
            .unwrap_or_else(|| PathBuf::from("."))
    }

    /// Export options from these defaults.
    #[must_use]
    pub fn export_options(&self, format: ExportFormat) -> ExportOptions {
        ExportOptions {
            stem: self.export.stem.clone(),
            format,
            arrangements: self.export.arrangements.clone(),
            timestamp: self.export.timestamp_suffix,
        }
    }
}
