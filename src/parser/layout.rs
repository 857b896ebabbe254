//! Markdown layout file parsing.
//!
//! Layouts are stored as human-readable Markdown: YAML frontmatter for the
//! metadata, then one table per layer. Cells hold a kana, a yoon digraph, a
//! punctuation mark, a prefix key (☆/★), the modifier key (゛) or nothing.

use crate::constants::APP_BINARY_NAME;
use crate::models::key::cols_for_row;
use crate::models::{KeyOutput, Layer, Layout, LayoutMetadata};
use anyhow::{Context, Result};
use regex::Regex;
use std::path::Path;

/// Parses a Markdown layout file into a Layout structure.
///
/// # File Format
///
/// ```markdown
/// ---
/// name: 新月配列 (Shingetsu Layout)
/// description: Prefix-shift kana layout
/// author: ''
/// created: 2024-01-15T10:30:00Z
/// modified: 2024-01-20T15:45:00Z
/// tags: [kana, prefix-shift]
/// version: '1.0'
/// ---
///
/// # 新月配列 (Shingetsu Layout)
///
/// ## Layer 0: Unshifted
///
/// | C0 | C1 | C2 | ... | C10 |
/// |----|----|----|-----|-----|
/// | の | と | に | ... |
/// | か | う | ★ | ... | ー |
/// | れ | で | が | ... |
///
/// ## Layer 1: Shift A
/// ...
/// ```
///
/// # Errors
///
/// Returns errors for:
/// - File not found
/// - Invalid YAML frontmatter
/// - Malformed layer headers
/// - Rows wider than the keyboard or cells with more than two characters
pub fn parse_markdown_layout(path: &Path) -> Result<Layout> {
    if !path.exists() {
        anyhow::bail!(
            "Layout file not found: {}\n\n\
             Please check the file path and try again.\n\
             To start from the built-in layout, run: {} init --output {}",
            path.display(),
            APP_BINARY_NAME,
            path.display()
        );
    }

    if !path.is_file() {
        anyhow::bail!(
            "Path is not a file: {}\n\n\
            Please provide a path to a Markdown (.md) file.",
            path.display()
        );
    }

    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read layout file: {}", path.display()))?;

    parse_markdown_layout_str(&content)
        .with_context(|| format!("Failed to parse layout file: {}", path.display()))
}

/// Parses a Markdown layout from a string.
pub fn parse_markdown_layout_str(content: &str) -> Result<Layout> {
    let lines: Vec<&str> = content.lines().collect();

    let (metadata, content_start) = parse_frontmatter(&lines)?;

    let mut layout = Layout {
        metadata,
        layers: Vec::new(),
    };

    parse_content(&lines[content_start..], &mut layout)?;

    layout.validate()?;

    Ok(layout)
}

/// Parses YAML frontmatter from the beginning of the file.
///
/// Returns the parsed metadata and the line index where content starts.
fn parse_frontmatter(lines: &[&str]) -> Result<(LayoutMetadata, usize)> {
    let mut start_idx = None;
    let mut end_idx = None;

    for (idx, line) in lines.iter().enumerate() {
        if line.trim() == "---" {
            if start_idx.is_none() {
                start_idx = Some(idx);
            } else {
                end_idx = Some(idx);
                break;
            }
        }
    }

    let start =
        start_idx.ok_or_else(|| anyhow::anyhow!("Missing frontmatter start marker (---)"))?;
    let end = end_idx.ok_or_else(|| anyhow::anyhow!("Missing frontmatter end marker (---)"))?;

    let yaml_content = lines[start + 1..end].join("\n");

    let metadata: LayoutMetadata =
        serde_yml::from_str(&yaml_content).context("Failed to parse YAML frontmatter")?;

    validate_metadata(&metadata)?;

    Ok((metadata, end + 1))
}

/// Validates metadata after parsing.
fn validate_metadata(metadata: &LayoutMetadata) -> Result<()> {
    LayoutMetadata::validate_name(&metadata.name)?;

    if metadata.modified < metadata.created {
        anyhow::bail!("Modified timestamp cannot be before created timestamp");
    }

    if metadata.version != "1.0" {
        anyhow::bail!(
            "Unsupported schema version '{}'. Only version '1.0' is supported.",
            metadata.version
        );
    }

    for tag in &metadata.tags {
        LayoutMetadata::validate_tag(tag)?;
    }

    Ok(())
}

/// Parses the content section (layer tables).
fn parse_content(lines: &[&str], layout: &mut Layout) -> Result<()> {
    let layer_regex =
        Regex::new(r"^##\s+Layer\s+(\d+):\s+(.+)$").context("Invalid layer header pattern")?;
    let mut line_num = 0;

    while line_num < lines.len() {
        let line = lines[line_num].trim();

        if line.starts_with("## Layer ") {
            line_num = parse_layer(lines, line_num, &layer_regex, layout)
                .with_context(|| format!("Error parsing layer at line {}", line_num + 1))?;
            continue;
        }

        line_num += 1;
    }

    Ok(())
}

/// Parses a single layer section and returns the line after it.
fn parse_layer(
    lines: &[&str],
    start_line: usize,
    layer_regex: &Regex,
    layout: &mut Layout,
) -> Result<usize> {
    let header_line = lines[start_line].trim();

    let captures = layer_regex
        .captures(header_line)
        .ok_or_else(|| anyhow::anyhow!("Invalid layer header format: {header_line}"))?;

    let layer_number: u8 = captures[1]
        .parse()
        .context("Failed to parse layer number")?;
    let layer_name = captures[2].trim().to_string();

    let mut layer = Layer::new(layer_number, layer_name)?;

    // Skip blank lines and any property lines up to the table
    let mut line_num = start_line + 1;
    while line_num < lines.len() {
        let line = lines[line_num].trim();
        if line.starts_with('|') || line.starts_with("##") {
            break;
        }
        line_num += 1;
    }

    line_num = parse_layer_table(lines, line_num, &mut layer)?;

    layout.add_layer(layer)?;

    Ok(line_num)
}

/// Parses a layer's key table.
fn parse_layer_table(lines: &[&str], start_line: usize, layer: &mut Layer) -> Result<usize> {
    let mut line_num = start_line;
    let mut row = 0;

    // Skip table header row
    if line_num < lines.len() && lines[line_num].trim().starts_with('|') {
        line_num += 1;
    }

    // Skip separator row (|---|---|)
    if line_num < lines.len() && lines[line_num].contains("---") {
        line_num += 1;
    }

    while line_num < lines.len() {
        let line = lines[line_num].trim();

        if line.is_empty() || line.starts_with("##") || line.starts_with("---") {
            break;
        }

        if line.starts_with('|') {
            parse_table_row(line, row, layer).with_context(|| {
                format!("Error parsing table row {} at line {}", row, line_num + 1)
            })?;
            row += 1;
        }

        line_num += 1;
    }

    Ok(line_num)
}

/// Parses a single table row into key outputs.
fn parse_table_row(line: &str, row: usize, layer: &mut Layer) -> Result<()> {
    // Keep empty cells so blank keys do not shift later columns
    let cells: Vec<&str> = line.split('|').map(str::trim).collect();

    // Drop the empty elements before the leading and after the trailing pipe
    let cells = if cells.len() >= 2 {
        &cells[1..cells.len() - 1]
    } else {
        &cells[..]
    };

    if cells.len() > cols_for_row(row) {
        // Trailing empty cells are padding, not keys
        let used = cells.iter().rposition(|cell| !cell.is_empty()).map_or(0, |idx| idx + 1);
        if used > cols_for_row(row) {
            anyhow::bail!(
                "Row {row} has {used} cells but the keyboard has only {} keys in that row",
                cols_for_row(row)
            );
        }
    }

    let outputs = cells
        .iter()
        .take(cols_for_row(row))
        .enumerate()
        .map(|(col, cell)| {
            KeyOutput::parse_cell(cell)
                .with_context(|| format!("Error parsing cell at row {row}, col {col}: {cell}"))
        })
        .collect::<Result<Vec<_>>>()?;

    layer.set_row(row, outputs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{PhysicalKey, ShiftState};

    const HEADER: &str = r"---
name: Test Layout
description: A test
author: test
created: 2024-01-15T10:30:00Z
modified: 2024-01-20T15:45:00Z
tags: [test]
version: '1.0'
---

# Test Layout
";

    fn with_layers(body: &str) -> String {
        format!("{HEADER}\n{body}")
    }

    #[test]
    fn test_parse_frontmatter() {
        let lines: Vec<&str> = HEADER.lines().collect();
        let (metadata, end) = parse_frontmatter(&lines).unwrap();
        assert_eq!(metadata.name, "Test Layout");
        assert_eq!(metadata.tags, vec!["test".to_string()]);
        assert_eq!(end, 9);
    }

    #[test]
    fn test_parse_complete_layout() {
        let content = with_layers(
            "## Layer 0: Unshifted

| C0 | C1 | C2 | C3 | C4 | C5 | C6 | C7 | C8 | C9 | C10 |
|----|----|----|----|----|----|----|----|----|----|-----|
| の | と | に | る | を | ち | こ | く | て | さ |
| か | う | ★ | し | た | き | ん | ☆ | ゛ | い | ー |
| れ |    |    |    |    |    |    |    |    | ・ |

## Layer 1: Shift A

| C0 | C1 |
|----|----|
| あ | しょ |

## Layer 2: Shift B

| C0 |
|----|
| む |
",
        );

        let layout = parse_markdown_layout_str(&content).unwrap();
        assert_eq!(layout.layers.len(), 3);
        assert_eq!(
            layout.output(PhysicalKey::new(1, 2), ShiftState::Unshifted),
            &KeyOutput::Prefix(ShiftState::ShiftB)
        );
        assert_eq!(
            layout.output(PhysicalKey::new(1, 8), ShiftState::Unshifted),
            &KeyOutput::Modifier
        );
        assert_eq!(
            layout
                .output(PhysicalKey::new(1, 10), ShiftState::Unshifted)
                .as_text(),
            Some("ー")
        );
        // Empty cells keep later columns in place
        assert!(layout
            .output(PhysicalKey::new(2, 1), ShiftState::Unshifted)
            .is_blank());
        assert_eq!(
            layout
                .output(PhysicalKey::new(2, 9), ShiftState::Unshifted)
                .as_text(),
            Some("・")
        );
        assert_eq!(
            layout
                .output(PhysicalKey::new(0, 1), ShiftState::ShiftA)
                .as_text(),
            Some("しょ")
        );
        assert_eq!(layout.layers[2].name, "Shift B");
    }

    #[test]
    fn test_missing_layer_is_rejected() {
        let content = with_layers(
            "## Layer 0: Unshifted

| C0 |
|----|
| か |
",
        );
        assert!(parse_markdown_layout_str(&content).is_err());
    }

    #[test]
    fn test_out_of_order_layers_are_rejected() {
        let content = with_layers(
            "## Layer 0: Unshifted

| C0 |
|----|
| か |

## Layer 2: Shift B

| C0 |
|----|
| む |
",
        );
        let err = parse_markdown_layout_str(&content).unwrap_err();
        assert!(format!("{err:#}").contains("sequential"));
    }

    #[test]
    fn test_wide_row_is_rejected() {
        let content = with_layers(
            "## Layer 0: Unshifted

| C0 | C1 | C2 | C3 | C4 | C5 | C6 | C7 | C8 | C9 | C10 |
|----|----|----|----|----|----|----|----|----|----|-----|
| あ | い | う | え | お | か | き | く | け | こ | さ |
",
        );
        let err = parse_markdown_layout_str(&content).unwrap_err();
        assert!(format!("{err:#}").contains("only 10 keys"));
    }

    #[test]
    fn test_bad_version_is_rejected() {
        let content = HEADER.replace("version: '1.0'", "version: '2.0'");
        assert!(parse_markdown_layout_str(&content).is_err());
    }

    #[test]
    fn test_missing_file() {
        let err = parse_markdown_layout(Path::new("/nonexistent/layout.md")).unwrap_err();
        assert!(err.to_string().contains("not found"));
    }
}
