//! Export of a kana layout to the external tools' formats.
//!
//! Three artifacts are produced from one resolved [`LayoutMapping`]: the
//! keyboard_analyzer document, a hazkey romaji table per arrangement and a
//! Karabiner-Elements rule file per arrangement.

pub mod analyzer;
pub mod karabiner;
pub mod romaji;

pub use analyzer::{build_analyzer_layout, render_analyzer_json};
pub use karabiner::{build_karabiner_file, render_karabiner_json};
pub use romaji::{build_romaji_table, RomajiTable};

use crate::models::{Arrangement, Layout, LayoutMapping};
use crate::parser::analyzer_json::AnalyzerLayout;
use crate::parser::karabiner_json::KarabinerFile;
use crate::parser::template_gen::atomic_write;
use crate::validation::LayoutValidator;
use anyhow::{Context, Result};
use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

/// Artifact kinds selectable on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// keyboard_analyzer JSON
    Analyzer,
    /// hazkey romaji tables
    Romaji,
    /// Karabiner-Elements rules
    Karabiner,
    /// Every artifact
    #[default]
    All,
}

impl ExportFormat {
    /// Returns true if this selection covers `format`.
    #[must_use]
    pub fn includes(self, format: Self) -> bool {
        self == Self::All || self == format
    }
}

/// `<stem>_analyzer.json`
#[must_use]
pub fn analyzer_file_name(stem: &str) -> String {
    format!("{stem}_analyzer.json")
}

/// `<stem>-ansi-<arrangement>.tsv`
#[must_use]
pub fn romaji_file_name(stem: &str, arrangement: Arrangement) -> String {
    format!("{stem}-ansi-{}.tsv", arrangement.slug())
}

/// `<stem>-karabiner-<arrangement>.json`
#[must_use]
pub fn karabiner_file_name(stem: &str, arrangement: Arrangement) -> String {
    format!("{stem}-karabiner-{}.json", arrangement.slug())
}

/// Every artifact of a layout, built in memory.
#[derive(Debug, Clone)]
pub struct ExportSet {
    /// Analyzer document
    pub analyzer: AnalyzerLayout,
    /// Romaji tables by arrangement
    pub romaji: BTreeMap<Arrangement, RomajiTable>,
    /// Karabiner rules by arrangement
    pub karabiner: BTreeMap<Arrangement, KarabinerFile>,
}

impl ExportSet {
    /// Builds every artifact for both arrangements.
    pub fn build(layout: &Layout) -> Result<Self> {
        let mapping = LayoutMapping::build(layout)
            .with_context(|| format!("Failed to resolve layout '{}'", layout.metadata.name))?;
        let name = &layout.metadata.name;

        Ok(Self {
            analyzer: build_analyzer_layout(layout, &mapping),
            romaji: Arrangement::ALL
                .into_iter()
                .map(|arrangement| (arrangement, build_romaji_table(name, &mapping, arrangement)))
                .collect(),
            karabiner: Arrangement::ALL
                .into_iter()
                .map(|arrangement| (arrangement, build_karabiner_file(name, &mapping, arrangement)))
                .collect(),
        })
    }
}

/// What [`export_all`] writes.
#[derive(Debug, Clone)]
pub struct ExportOptions {
    /// File name stem
    pub stem: String,
    /// Artifact selection
    pub format: ExportFormat,
    /// Arrangements for the per-arrangement artifacts
    pub arrangements: Vec<Arrangement>,
    /// Append a `_YYYYMMDD-HHMMSS` timestamp to the stem
    pub timestamp: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            stem: crate::constants::DEFAULT_EXPORT_STEM.to_string(),
            format: ExportFormat::All,
            arrangements: Arrangement::ALL.to_vec(),
            timestamp: false,
        }
    }
}

impl ExportOptions {
    /// Stem used for file names, with the timestamp when requested.
    #[must_use]
    pub fn effective_stem(&self) -> String {
        if self.timestamp {
            format!(
                "{}_{}",
                self.stem,
                chrono::Local::now().format("%Y%m%d-%H%M%S")
            )
        } else {
            self.stem.clone()
        }
    }
}

/// Validates `layout` and writes the selected artifacts into `out_dir`.
///
/// Returns the written paths in write order. Nothing is written when the
/// layout has validation errors.
pub fn export_all(layout: &Layout, out_dir: &Path, options: &ExportOptions) -> Result<Vec<PathBuf>> {
    let report = LayoutValidator::new(layout).validate();
    if !report.is_valid() {
        anyhow::bail!(
            "Layout '{}' is not exportable:\n{}",
            layout.metadata.name,
            report.format_message()
        );
    }

    let set = ExportSet::build(layout)?;

    fs::create_dir_all(out_dir)
        .with_context(|| format!("Failed to create output directory: {}", out_dir.display()))?;

    let stem = options.effective_stem();
    let mut written = Vec::new();
    let mut write = |name: String, content: String| -> Result<()> {
        let path = out_dir.join(name);
        atomic_write(&path, &content)?;
        tracing::info!(path = %path.display(), "Wrote export");
        written.push(path);
        Ok(())
    };

    if options.format.includes(ExportFormat::Analyzer) {
        write(analyzer_file_name(&stem), render_analyzer_json(&set.analyzer)?)?;
    }

    for arrangement in &options.arrangements {
        if options.format.includes(ExportFormat::Romaji) {
            if let Some(table) = set.romaji.get(arrangement) {
                write(romaji_file_name(&stem, *arrangement), table.render())?;
            }
        }
        if options.format.includes(ExportFormat::Karabiner) {
            if let Some(file) = set.karabiner.get(arrangement) {
                write(
                    karabiner_file_name(&stem, *arrangement),
                    render_karabiner_json(file)?,
                )?;
            }
        }
    }

    Ok(written)
}
