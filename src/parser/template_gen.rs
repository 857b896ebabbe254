//! Markdown layout file generation (serialization).
//!
//! This module handles generating human-readable Markdown files from Layout structures,
//! with atomic file writes for safety.

use crate::models::key::{cols_for_row, ROWS};
use crate::models::{Layer, Layout};
use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::path::Path;

/// Widest row of the keyboard; every table gets this many columns.
const TABLE_COLS: usize = 11;

/// Generates a Markdown layout file from a Layout structure.
///
/// This performs an atomic write using a temp file + rename pattern to ensure
/// the file is never left in a corrupted state.
///
/// # Errors
///
/// Returns errors for:
/// - File I/O failures
/// - Permission issues
/// - Atomic rename failures
pub fn save_markdown_layout(layout: &Layout, path: &Path) -> Result<()> {
    let markdown = generate_markdown(layout)?;
    atomic_write(path, &markdown)
}

/// Generates Markdown content from a Layout.
pub fn generate_markdown(layout: &Layout) -> Result<String> {
    let mut output = String::new();

    output.push_str(&generate_frontmatter(layout)?);
    output.push('\n');

    let _ = writeln!(output, "# {}\n", layout.metadata.name);

    for layer in &layout.layers {
        output.push_str(&generate_layer(layer));
        output.push('\n');
    }

    Ok(output)
}

/// Generates YAML frontmatter from metadata.
fn generate_frontmatter(layout: &Layout) -> Result<String> {
    let yaml =
        serde_yml::to_string(&layout.metadata).context("Failed to serialize metadata to YAML")?;

    Ok(format!("---\n{yaml}---\n"))
}

/// Generates a layer section with header and table.
fn generate_layer(layer: &Layer) -> String {
    let mut output = String::new();

    let _ = writeln!(output, "## Layer {}: {}\n", layer.number, layer.name);

    output.push('|');
    for col in 0..TABLE_COLS {
        let _ = write!(output, " C{col} |");
    }
    output.push('\n');

    output.push('|');
    for _ in 0..TABLE_COLS {
        output.push_str("----|");
    }
    output.push('\n');

    for row in 0..ROWS {
        output.push('|');
        for output_cell in layer.row(row).iter().take(cols_for_row(row)) {
            let cell = output_cell.to_cell();
            if cell.is_empty() {
                output.push_str("    |");
            } else {
                let _ = write!(output, " {cell} |");
            }
        }
        output.push('\n');
    }

    output
}

/// Writes content to a file atomically using temp file + rename.
pub(crate) fn atomic_write(path: &Path, content: &str) -> Result<()> {
    let file_name = path
        .file_name()
        .ok_or_else(|| anyhow::anyhow!("Path has no file name: {}", path.display()))?;
    let mut temp_name = file_name.to_os_string();
    temp_name.push(".tmp");
    let temp_path = path.with_file_name(temp_name);

    std::fs::write(&temp_path, content)
        .with_context(|| format!("Failed to write to temporary file: {}", temp_path.display()))?;

    std::fs::rename(&temp_path, path)
        .with_context(|| format!("Failed to rename temporary file to: {}", path.display()))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{KeyOutput, LayoutMetadata, PhysicalKey, ShiftState};
    use crate::parser::layout::parse_markdown_layout_str;
    use chrono::{TimeZone, Utc};
    use tempfile::TempDir;

    fn create_test_layout() -> Layout {
        let mut layout = Layout::new("Test Layout").unwrap();
        layout.metadata = LayoutMetadata {
            name: "Test Layout".to_string(),
            description: "A test layout".to_string(),
            author: "test".to_string(),
            created: Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
            modified: Utc.with_ymd_and_hms(2025, 1, 2, 0, 0, 0).unwrap(),
            tags: vec!["test".to_string()],
            version: "1.0".to_string(),
        };
        let cells = [
            (1, 2, ShiftState::Unshifted, KeyOutput::Prefix(ShiftState::ShiftB)),
            (1, 7, ShiftState::Unshifted, KeyOutput::Prefix(ShiftState::ShiftA)),
            (1, 8, ShiftState::Unshifted, KeyOutput::Modifier),
            (1, 10, ShiftState::Unshifted, KeyOutput::Text("ー".to_string())),
            (2, 9, ShiftState::ShiftA, KeyOutput::Text("きゅ".to_string())),
            (0, 0, ShiftState::ShiftB, KeyOutput::Text("む".to_string())),
        ];
        for (row, col, state, output) in cells {
            layout
                .set_output(PhysicalKey::new(row, col), state, output)
                .unwrap();
        }
        layout
    }

    #[test]
    fn test_generate_markdown_shape() {
        let markdown = generate_markdown(&create_test_layout()).unwrap();
        assert!(markdown.starts_with("---\n"));
        assert!(markdown.contains("# Test Layout"));
        assert!(markdown.contains("## Layer 0: Unshifted"));
        assert!(markdown.contains("## Layer 2: Shift B"));
        assert!(markdown.contains("| ★ |"));
        assert!(markdown.contains("| きゅ |"));
    }

    #[test]
    fn test_round_trip() {
        let layout = create_test_layout();
        let markdown = generate_markdown(&layout).unwrap();
        let parsed = parse_markdown_layout_str(&markdown).unwrap();
        assert_eq!(parsed, layout);
    }

    #[test]
    fn test_atomic_write_replaces_file() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("layout.md");
        std::fs::write(&path, "old").unwrap();

        save_markdown_layout(&create_test_layout(), &path).unwrap();

        let written = std::fs::read_to_string(&path).unwrap();
        assert!(written.contains("## Layer 1: Shift A"));
        assert!(!temp_dir.path().join("layout.md.tmp").exists());
    }
}
