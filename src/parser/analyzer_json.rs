//! keyboard_analyzer JSON schema.
//!
//! An analyzer file describes the keyboard as rows of key objects whose
//! legends list the output in each layer, plus a `conversion` table giving
//! the keys pressed for every character. Files are often edited by hand, so
//! reading is lenient (JSON5: comments and trailing commas are accepted).

use crate::models::{KeyOutput, Layout, PhysicalKey, ShiftState};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

/// Analyzer file root.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerLayout {
    /// Layout name
    pub name: String,
    /// Free-form description
    #[serde(default)]
    pub remark: String,
    /// Keyboard rows from the number row to the space bar row
    pub keys: Vec<Vec<AnalyzerKey>>,
    /// Character → keys pressed
    #[serde(default)]
    pub conversion: BTreeMap<String, ConversionEntry>,
}

/// One key of the analyzer keyboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalyzerKey {
    /// Key identifier (the QWERTY legend for character keys)
    pub id: String,
    /// Legend per layer: unshifted, shift A, shift B
    pub legend: Vec<String>,
    /// Width in key units
    pub size: f64,
    /// Finger index (0-4 left, 5-9 right)
    pub finger: u8,
    /// Home-position marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub home: Option<bool>,
}

/// How one character is typed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConversionEntry {
    /// The character's own key
    pub keys: Vec<String>,
    /// Prefix and modifier keys pressed with it, in order
    #[serde(default)]
    pub shift: Vec<String>,
    /// Input style understood by the analyzer
    #[serde(rename = "type")]
    pub kind: String,
    /// Whether the character goes through the IME
    #[serde(default)]
    pub ime: bool,
    /// Continuous-shift flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub renzsft: Option<bool>,
}

impl AnalyzerLayout {
    /// Finds a key object by id.
    #[must_use]
    pub fn key(&self, id: &str) -> Option<&AnalyzerKey> {
        self.keys.iter().flatten().find(|key| key.id == id)
    }

    /// Legend of a mapped key in one grid tier.
    #[must_use]
    pub fn legend(&self, key: PhysicalKey, state: ShiftState) -> Option<&str> {
        let index = usize::from(state.layer_number()?);
        self.key(&key.analyzer_id())?
            .legend
            .get(index)
            .map(String::as_str)
    }

    /// Key whose unshifted legend is `symbol`.
    #[must_use]
    pub fn key_with_unshifted_legend(&self, symbol: char) -> Option<PhysicalKey> {
        let symbol = symbol.to_string();
        PhysicalKey::all().find(|key| self.legend(*key, ShiftState::Unshifted) == Some(symbol.as_str()))
    }

    /// Rebuilds the layout grids from the key legends.
    ///
    /// Legends are lossless: every output of the three grid tiers appears on
    /// its key, so the result equals the exported layout apart from
    /// timestamps, author and tags.
    pub fn to_layout(&self) -> Result<Layout> {
        let mut layout = Layout::new(self.name.clone())?;
        layout.metadata.description.clone_from(&self.remark);

        for key in PhysicalKey::all() {
            let id = key.analyzer_id();
            let analyzer_key = self
                .key(&id)
                .ok_or_else(|| anyhow::anyhow!("Analyzer file has no key '{id}'"))?;

            for state in ShiftState::GRID {
                let Some(index) = state.layer_number().map(usize::from) else {
                    continue;
                };
                let legend = analyzer_key.legend.get(index).map_or("", String::as_str);
                let output = KeyOutput::parse_cell(legend)
                    .with_context(|| format!("Invalid legend on key '{id}' in {state} layer"))?;
                layout.set_output(key, state, output)?;
            }
        }

        Ok(layout)
    }
}

/// Reads an analyzer file.
pub fn parse_analyzer_json(path: &Path) -> Result<AnalyzerLayout> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read analyzer file: {}", path.display()))?;

    parse_analyzer_json_str(&content)
        .with_context(|| format!("Failed to parse analyzer file: {}", path.display()))
}

/// Parses analyzer JSON (JSON5 accepted).
pub fn parse_analyzer_json_str(content: &str) -> Result<AnalyzerLayout> {
    json5::from_str(content).context("Invalid analyzer JSON")
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = r#"{
        // hand-edited
        "name": "Sample",
        "remark": "two keys",
        "keys": [
            [
                {"id": "tab", "legend": ["Tab"], "size": 1.5, "finger": 0},
                {"id": "q", "legend": ["の", "あ", "む"], "size": 1, "finger": 0},
            ],
            [
                {"id": "d", "legend": ["★", "　", "ろ"], "size": 1, "finger": 2, "home": true},
            ],
        ],
        "conversion": {
            "の": {"keys": ["q"], "shift": [], "type": "sim", "ime": true},
            "あ": {"keys": ["q"], "shift": ["k"], "type": "sim", "ime": true, "renzsft": false},
        },
    }"#;

    #[test]
    fn test_parse_lenient_json() {
        let analyzer = parse_analyzer_json_str(SAMPLE).unwrap();
        assert_eq!(analyzer.name, "Sample");
        assert_eq!(analyzer.keys.len(), 2);
        assert_eq!(analyzer.conversion["あ"].shift, vec!["k".to_string()]);
        assert_eq!(analyzer.conversion["の"].renzsft, None);
        assert_eq!(analyzer.key("d").unwrap().home, Some(true));
    }

    #[test]
    fn test_legend_lookup() {
        let analyzer = parse_analyzer_json_str(SAMPLE).unwrap();
        assert_eq!(
            analyzer.legend(PhysicalKey::new(0, 0), ShiftState::ShiftB),
            Some("む")
        );
        assert_eq!(
            analyzer.key_with_unshifted_legend('★'),
            Some(PhysicalKey::new(1, 2))
        );
        assert_eq!(analyzer.legend(PhysicalKey::new(0, 0), ShiftState::Diacritic), None);
    }

    #[test]
    fn test_to_layout_requires_every_key() {
        let analyzer = parse_analyzer_json_str(SAMPLE).unwrap();
        let err = analyzer.to_layout().unwrap_err();
        assert!(err.to_string().contains("has no key"));
    }

    #[test]
    fn test_invalid_json() {
        assert!(parse_analyzer_json_str("{ not json").is_err());
    }
}
