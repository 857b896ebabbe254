//! Romaji table (hazkey / Mozc TSV) reading and writing.
//!
//! Each non-comment line is `input<TAB>output`, or `input<TAB>output<TAB>pending`
//! where `pending` is text kept in the composition buffer and matched as the
//! start of the next input. Prefix keys use an empty output and their symbol
//! as pending text, so `d<TAB><TAB>★` followed by `★j<TAB>ま` types ま.

use anyhow::{Context, Result};
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

/// One table row.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RomajiRow {
    /// Characters matched in the composition buffer
    pub input: String,
    /// Committed output
    pub output: String,
    /// Text left pending after the match
    pub pending: Option<String>,
}

impl RomajiRow {
    /// Row producing `output` from `input`.
    pub fn new(input: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: output.into(),
            pending: None,
        }
    }

    /// Row leaving `pending` in the buffer without output.
    pub fn pending(input: impl Into<String>, pending: impl Into<String>) -> Self {
        Self {
            input: input.into(),
            output: String::new(),
            pending: Some(pending.into()),
        }
    }

    /// TSV line for this row.
    #[must_use]
    pub fn to_line(&self) -> String {
        match &self.pending {
            Some(pending) => format!("{}\t{}\t{}", self.input, self.output, pending),
            None => format!("{}\t{}", self.input, self.output),
        }
    }
}

/// Renders a table with `#` comment header lines.
#[must_use]
pub fn render_romaji_table(header: &[String], rows: &[RomajiRow]) -> String {
    let mut output = String::new();
    for line in header {
        let _ = writeln!(output, "# {line}");
    }
    for row in rows {
        output.push_str(&row.to_line());
        output.push('\n');
    }
    output
}

/// Replays typed characters through `rows` the way hazkey composes them.
///
/// The buffer waits while a longer input still starts with it. An exact match
/// commits its output and leaves its pending text in the buffer. A buffer no
/// input can complete commits its first character as typed. Text still
/// pending after the last character is committed as is.
#[must_use]
pub fn compose(rows: &[RomajiRow], typed: &str) -> String {
    let mut committed = String::new();
    let mut buffer = String::new();

    for ch in typed.chars() {
        buffer.push(ch);
        loop {
            if buffer.is_empty()
                || rows
                    .iter()
                    .any(|row| row.input.len() > buffer.len() && row.input.starts_with(&buffer))
            {
                break;
            }
            if let Some(row) = rows.iter().find(|row| row.input == buffer) {
                committed.push_str(&row.output);
                let next = row.pending.clone().unwrap_or_default();
                if next == buffer {
                    break;
                }
                buffer = next;
                continue;
            }
            let mut chars = buffer.chars();
            committed.extend(chars.next());
            buffer = chars.as_str().to_string();
        }
    }

    committed.push_str(&buffer);
    committed
}

/// Reads a romaji table file.
pub fn parse_romaji_table(path: &Path) -> Result<Vec<RomajiRow>> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read romaji table: {}", path.display()))?;

    parse_romaji_table_str(&content)
        .with_context(|| format!("Failed to parse romaji table: {}", path.display()))
}

/// Parses romaji table content, skipping blank and `#` comment lines.
pub fn parse_romaji_table_str(content: &str) -> Result<Vec<RomajiRow>> {
    let mut rows = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim().is_empty() || line.starts_with('#') {
            continue;
        }

        let fields: Vec<&str> = line.split('\t').collect();
        let row = match fields.as_slice() {
            [input, output] => RomajiRow::new(*input, *output),
            [input, output, pending] => RomajiRow {
                input: (*input).to_string(),
                output: (*output).to_string(),
                pending: Some((*pending).to_string()),
            },
            _ => anyhow::bail!(
                "Line {}: expected 2 or 3 tab-separated fields, found {}",
                idx + 1,
                fields.len()
            ),
        };

        if row.input.is_empty() {
            anyhow::bail!("Line {}: input is empty", idx + 1);
        }

        rows.push(row);
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_rows() {
        let content = "# header\n\nd\t\t★\na\tか\n★j\tま\n";
        let rows = parse_romaji_table_str(content).unwrap();
        assert_eq!(
            rows,
            vec![
                RomajiRow::pending("d", "★"),
                RomajiRow::new("a", "か"),
                RomajiRow::new("★j", "ま"),
            ]
        );
    }

    #[test]
    fn test_render_then_parse() {
        let rows = vec![RomajiRow::pending("k", "☆"), RomajiRow::new("かl", "が")];
        let text = render_romaji_table(&["title".to_string()], &rows);
        assert!(text.starts_with("# title\n"));
        assert!(text.contains("k\t\t☆\n"));
        assert_eq!(parse_romaji_table_str(&text).unwrap(), rows);
    }

    #[test]
    fn test_compose_follows_pending_text() {
        let rows = vec![
            RomajiRow::pending("k", "☆"),
            RomajiRow::pending("m", "は"),
            RomajiRow::new("a", "か"),
            RomajiRow::new("l", "゛"),
            RomajiRow::pending("はl", "ば"),
            RomajiRow::new("ばl", "ぱ"),
            RomajiRow::pending("☆q", "あ"),
            RomajiRow::new("あl", "ぁ"),
        ];
        assert_eq!(compose(&rows, "m"), "は");
        assert_eq!(compose(&rows, "ml"), "ば");
        assert_eq!(compose(&rows, "mll"), "ぱ");
        assert_eq!(compose(&rows, "ma"), "はか");
        assert_eq!(compose(&rows, "kql"), "ぁ");
        assert_eq!(compose(&rows, "mkq"), "はあ");
        assert_eq!(compose(&rows, "al"), "か゛");
        assert_eq!(compose(&rows, "x"), "x");
    }

    #[test]
    fn test_compose_committed_output_does_not_combine() {
        // は committed rather than pending never reaches the はl row
        let rows = vec![
            RomajiRow::new("m", "は"),
            RomajiRow::new("l", "゛"),
            RomajiRow::new("はl", "ば"),
        ];
        assert_eq!(compose(&rows, "ml"), "は゛");
    }

    #[test]
    fn test_bad_lines() {
        assert!(parse_romaji_table_str("just-one-field\n").is_err());
        assert!(parse_romaji_table_str("\tか\n").is_err());
        assert!(parse_romaji_table_str("a\tb\tc\td\n").is_err());
    }
}
