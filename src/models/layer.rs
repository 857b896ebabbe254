//! Shift states, key outputs and layer grids.

use crate::models::key::{cols_for_row, PhysicalKey, ROWS};
use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Symbol of the shift-A prefix key.
pub const SHIFT_A_SYMBOL: char = '☆';

/// Symbol of the shift-B prefix key.
pub const SHIFT_B_SYMBOL: char = '★';

/// Symbol of the unified diacritic/small-form key.
pub const MODIFIER_SYMBOL: char = '゛';

/// Blank legend used by analyzer files (ideographic space).
pub const BLANK_LEGEND: &str = "\u{3000}";

/// Longest key sequence any character may need.
pub const MAX_SEQUENCE_LEN: usize = 3;

/// Tier a character is typed in.
///
/// The three grid tiers are authored as layers 0-2; the diacritic tier is
/// derived by pressing the modifier key after a base kana.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ShiftState {
    /// No prefix pressed
    Unshifted,
    /// After the ☆ prefix
    ShiftA,
    /// After the ★ prefix
    ShiftB,
    /// Modifier applied to a previously typed kana
    Diacritic,
}

impl ShiftState {
    /// The three authored grid tiers, in layer order.
    pub const GRID: [Self; 3] = [Self::Unshifted, Self::ShiftA, Self::ShiftB];

    /// Maps a layer number from a layout file to its tier.
    #[must_use]
    pub const fn from_layer_number(number: u8) -> Option<Self> {
        match number {
            0 => Some(Self::Unshifted),
            1 => Some(Self::ShiftA),
            2 => Some(Self::ShiftB),
            _ => None,
        }
    }

    /// Layer number of a grid tier.
    #[must_use]
    pub const fn layer_number(self) -> Option<u8> {
        match self {
            Self::Unshifted => Some(0),
            Self::ShiftA => Some(1),
            Self::ShiftB => Some(2),
            Self::Diacritic => None,
        }
    }

    /// Symbol of the prefix key that enters this tier.
    #[must_use]
    pub const fn prefix_symbol(self) -> Option<char> {
        match self {
            Self::ShiftA => Some(SHIFT_A_SYMBOL),
            Self::ShiftB => Some(SHIFT_B_SYMBOL),
            Self::Unshifted | Self::Diacritic => None,
        }
    }

    /// Tier entered by the prefix key with the given symbol.
    #[must_use]
    pub const fn from_prefix_symbol(symbol: char) -> Option<Self> {
        match symbol {
            SHIFT_A_SYMBOL => Some(Self::ShiftA),
            SHIFT_B_SYMBOL => Some(Self::ShiftB),
            _ => None,
        }
    }

    /// Allowed key-sequence lengths for characters of this tier.
    #[must_use]
    pub const fn sequence_len_range(self) -> (usize, usize) {
        match self {
            Self::Unshifted => (1, 1),
            Self::ShiftA | Self::ShiftB => (2, 2),
            Self::Diacritic => (2, MAX_SEQUENCE_LEN),
        }
    }

    /// Returns true when `len` presses is a valid sequence length for this tier.
    #[must_use]
    pub const fn accepts_len(self, len: usize) -> bool {
        let (min, max) = self.sequence_len_range();
        len >= min && len <= max
    }

    /// Default layer name used when writing layout files.
    #[must_use]
    pub const fn default_name(self) -> &'static str {
        match self {
            Self::Unshifted => "Unshifted",
            Self::ShiftA => "Shift A",
            Self::ShiftB => "Shift B",
            Self::Diacritic => "Diacritic",
        }
    }
}

impl fmt::Display for ShiftState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unshifted => write!(f, "unshifted"),
            Self::ShiftA => write!(f, "shift-A ({SHIFT_A_SYMBOL})"),
            Self::ShiftB => write!(f, "shift-B ({SHIFT_B_SYMBOL})"),
            Self::Diacritic => write!(f, "diacritic ({MODIFIER_SYMBOL})"),
        }
    }
}

/// What a key produces in one tier.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "type", content = "value")]
pub enum KeyOutput {
    /// Nothing assigned
    Blank,
    /// A kana, yoon digraph or punctuation mark
    Text(String),
    /// A prefix key entering the given tier
    Prefix(ShiftState),
    /// The diacritic/small-form key
    Modifier,
}

impl KeyOutput {
    /// Parses a layout table cell.
    ///
    /// Empty cells and ideographic spaces are blank. Text cells hold one
    /// character or a two-character digraph.
    pub fn parse_cell(cell: &str) -> Result<Self> {
        let cell = cell.trim();
        let mut chars = cell.chars();
        match (chars.next(), chars.next(), chars.next()) {
            (None, _, _) => Ok(Self::Blank),
            (Some(MODIFIER_SYMBOL), None, _) => Ok(Self::Modifier),
            (Some(symbol), None, _) => Ok(ShiftState::from_prefix_symbol(symbol)
                .map_or_else(|| Self::Text(cell.to_string()), Self::Prefix)),
            (Some(_), Some(_), None) => Ok(Self::Text(cell.to_string())),
            _ => anyhow::bail!(
                "Cell '{cell}' holds more than two characters. Use a single kana or a yoon digraph"
            ),
        }
    }

    /// Cell text written to layout files.
    #[must_use]
    pub fn to_cell(&self) -> String {
        match self {
            Self::Blank => String::new(),
            _ => self.legend(),
        }
    }

    /// Legend shown on a keycap; blanks become an ideographic space.
    #[must_use]
    pub fn legend(&self) -> String {
        match self {
            Self::Blank => BLANK_LEGEND.to_string(),
            Self::Text(text) => text.clone(),
            Self::Prefix(state) => state
                .prefix_symbol()
                .map_or_else(String::new, |symbol| symbol.to_string()),
            Self::Modifier => MODIFIER_SYMBOL.to_string(),
        }
    }

    /// Text produced by this output, if any.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns true if nothing is assigned.
    #[must_use]
    pub const fn is_blank(&self) -> bool {
        matches!(self, Self::Blank)
    }
}

/// One authored tier of the layout: a 31-key grid.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layer {
    /// Layer number (0 = unshifted, 1 = shift-A, 2 = shift-B)
    pub number: u8,
    /// Human-readable layer name
    pub name: String,
    /// Key outputs by row; every row is padded to its full width
    rows: Vec<Vec<KeyOutput>>,
}

impl Layer {
    /// Creates an all-blank layer.
    pub fn new(number: u8, name: impl Into<String>) -> Result<Self> {
        if ShiftState::from_layer_number(number).is_none() {
            anyhow::bail!("Layer number {number} is out of range. Layers are numbered 0 to 2");
        }

        let name = name.into();
        if name.trim().is_empty() {
            anyhow::bail!("Layer {number} name cannot be empty");
        }

        let rows = (0..ROWS)
            .map(|row| vec![KeyOutput::Blank; cols_for_row(row)])
            .collect();

        Ok(Self { number, name, rows })
    }

    /// Tier this layer represents.
    #[must_use]
    pub fn state(&self) -> ShiftState {
        ShiftState::from_layer_number(self.number).unwrap_or(ShiftState::Unshifted)
    }

    /// Output at a key position.
    #[must_use]
    pub fn get(&self, key: PhysicalKey) -> &KeyOutput {
        self.rows
            .get(key.row as usize)
            .and_then(|row| row.get(key.col as usize))
            .unwrap_or(&KeyOutput::Blank)
    }

    /// Assigns the output of a key position.
    pub fn set(&mut self, key: PhysicalKey, output: KeyOutput) -> Result<()> {
        let slot = self
            .rows
            .get_mut(key.row as usize)
            .and_then(|row| row.get_mut(key.col as usize))
            .ok_or_else(|| {
                anyhow::anyhow!("Key position {key} is outside the 31-key block")
            })?;
        *slot = output;
        Ok(())
    }

    /// Fills one row from cells, left to right.
    pub fn set_row(&mut self, row: usize, cells: Vec<KeyOutput>) -> Result<()> {
        if row >= ROWS {
            anyhow::bail!("Layer {} has more than {ROWS} rows", self.number);
        }
        let width = cols_for_row(row);
        if cells.len() > width {
            anyhow::bail!(
                "Row {row} has {} cells but only {width} keys",
                cells.len()
            );
        }
        for (col, output) in cells.into_iter().enumerate() {
            self.rows[row][col] = output;
        }
        Ok(())
    }

    /// Iterates over every key and its output in row-major order.
    pub fn iter(&self) -> impl Iterator<Item = (PhysicalKey, &KeyOutput)> + '_ {
        PhysicalKey::all().map(move |key| (key, self.get(key)))
    }

    /// Outputs of one row.
    #[must_use]
    pub fn row(&self, row: usize) -> &[KeyOutput] {
        self.rows.get(row).map_or(&[], Vec::as_slice)
    }

    /// Number of non-blank keys.
    #[must_use]
    pub fn assigned_count(&self) -> usize {
        self.iter().filter(|(_, output)| !output.is_blank()).count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_cell() {
        assert_eq!(KeyOutput::parse_cell("").unwrap(), KeyOutput::Blank);
        assert_eq!(KeyOutput::parse_cell("\u{3000}").unwrap(), KeyOutput::Blank);
        assert_eq!(
            KeyOutput::parse_cell("☆").unwrap(),
            KeyOutput::Prefix(ShiftState::ShiftA)
        );
        assert_eq!(
            KeyOutput::parse_cell(" ★ ").unwrap(),
            KeyOutput::Prefix(ShiftState::ShiftB)
        );
        assert_eq!(KeyOutput::parse_cell("゛").unwrap(), KeyOutput::Modifier);
        assert_eq!(
            KeyOutput::parse_cell("しょ").unwrap(),
            KeyOutput::Text("しょ".to_string())
        );
        assert!(KeyOutput::parse_cell("しょう").is_err());
    }

    #[test]
    fn test_cell_round_trip() {
        for cell in ["", "か", "☆", "★", "゛", "きゃ", "ー"] {
            let output = KeyOutput::parse_cell(cell).unwrap();
            assert_eq!(output.to_cell(), cell);
        }
    }

    #[test]
    fn test_layer_set_and_get() {
        let mut layer = Layer::new(0, "Unshifted").unwrap();
        let key = PhysicalKey::new(1, 10);
        layer.set(key, KeyOutput::Text("ー".to_string())).unwrap();
        assert_eq!(layer.get(key).as_text(), Some("ー"));
        assert_eq!(layer.assigned_count(), 1);
        assert!(layer
            .set(PhysicalKey::new(0, 10), KeyOutput::Modifier)
            .is_err());
    }

    #[test]
    fn test_layer_rejects_wide_rows() {
        let mut layer = Layer::new(1, "Shift A").unwrap();
        let cells = vec![KeyOutput::Blank; 11];
        assert!(layer.set_row(0, cells.clone()).is_err());
        assert!(layer.set_row(1, cells).is_ok());
    }

    #[test]
    fn test_layer_number_range() {
        assert!(Layer::new(3, "Extra").is_err());
        assert_eq!(Layer::new(2, "Shift B").unwrap().state(), ShiftState::ShiftB);
    }

    #[test]
    fn test_tier_lengths() {
        assert!(ShiftState::Unshifted.accepts_len(1));
        assert!(!ShiftState::ShiftA.accepts_len(3));
        assert!(ShiftState::Diacritic.accepts_len(2));
        assert!(ShiftState::Diacritic.accepts_len(3));
        assert!(!ShiftState::Diacritic.accepts_len(4));
    }
}
