//! Physical key positions and legend arrangements.
//!
//! The layout covers the 31-key ANSI alphanumeric block: a top row of 10 keys,
//! a home row of 11 keys (ending with the quote key) and a bottom row of 10
//! keys. A [`PhysicalKey`] names a position independent of what is printed on
//! it; an [`Arrangement`] supplies the printed legends.

use clap::ValueEnum;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Number of key rows in a layer.
pub const ROWS: usize = 3;

/// Number of keys in one layer grid.
pub const KEYS_PER_LAYER: usize = 31;

/// Number of columns in the given row.
#[must_use]
pub const fn cols_for_row(row: usize) -> usize {
    if row == 1 {
        11
    } else {
        10
    }
}

const QWERTY_LEGENDS: [&[char]; ROWS] = [
    &['q', 'w', 'e', 'r', 't', 'y', 'u', 'i', 'o', 'p'],
    &['a', 's', 'd', 'f', 'g', 'h', 'j', 'k', 'l', ';', '\''],
    &['z', 'x', 'c', 'v', 'b', 'n', 'm', ',', '.', '/'],
];

const COLEMAK_LEGENDS: [&[char]; ROWS] = [
    &['q', 'w', 'f', 'p', 'g', 'j', 'l', 'u', 'y', ';'],
    &['a', 'r', 's', 't', 'd', 'h', 'n', 'e', 'i', 'o', '\''],
    &['z', 'x', 'c', 'v', 'b', 'k', 'm', ',', '.', '/'],
];

/// Position of a key on the physical keyboard.
///
/// Ordering is row-major, which is also the order every exporter walks keys in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct PhysicalKey {
    /// Row index (0 = top, 1 = home, 2 = bottom)
    pub row: u8,
    /// Column index from the left edge
    pub col: u8,
}

impl PhysicalKey {
    /// Creates a key position without bounds checking.
    #[must_use]
    pub const fn new(row: u8, col: u8) -> Self {
        Self { row, col }
    }

    /// Creates a key position if it lies inside the 31-key block.
    #[must_use]
    pub fn checked(row: usize, col: usize) -> Option<Self> {
        if row < ROWS && col < cols_for_row(row) {
            #[allow(clippy::cast_possible_truncation)]
            Some(Self::new(row as u8, col as u8))
        } else {
            None
        }
    }

    /// Iterates over every key of a layer in row-major order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..ROWS).flat_map(|row| (0..cols_for_row(row)).filter_map(move |col| Self::checked(row, col)))
    }

    /// Returns true for keys typed by the left hand.
    #[must_use]
    pub const fn is_left_hand(&self) -> bool {
        self.col < 5
    }

    /// Finger index as used by keyboard_analyzer.
    ///
    /// Left hand is 0 (pinky) to 3 (index), right hand 6 (index) to 9 (pinky).
    /// Index fingers cover the two inner columns of each half.
    #[must_use]
    pub fn finger(&self) -> u8 {
        if self.is_left_hand() {
            self.col.min(3)
        } else {
            6 + (self.col - 5).saturating_sub(1).min(3)
        }
    }

    /// Returns true for the eight home-position keys (`asdf` and `jkl;`).
    #[must_use]
    pub const fn is_home(&self) -> bool {
        self.row == 1 && matches!(self.col, 0..=3 | 6..=9)
    }

    /// Legend printed on this key in the given arrangement.
    #[must_use]
    pub fn legend(&self, arrangement: Arrangement) -> char {
        arrangement.legends()[self.row as usize][self.col as usize]
    }

    /// Finds the key carrying `legend` in the given arrangement.
    #[must_use]
    pub fn from_legend(legend: char, arrangement: Arrangement) -> Option<Self> {
        Self::all().find(|key| key.legend(arrangement) == legend)
    }

    /// Identifier used for this key in analyzer files (its QWERTY legend).
    #[must_use]
    pub fn analyzer_id(&self) -> String {
        self.legend(Arrangement::Qwerty).to_string()
    }

    /// Karabiner `key_code` of this physical key.
    ///
    /// Karabiner names keys after their US QWERTY legends regardless of the
    /// arrangement the OS is set to.
    #[must_use]
    pub fn karabiner_key_code(&self) -> String {
        karabiner_key_code(self.legend(Arrangement::Qwerty))
    }
}

impl fmt::Display for PhysicalKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.row, self.col)
    }
}

/// Karabiner `key_code` name for an ASCII character on a US keyboard.
#[must_use]
pub fn karabiner_key_code(ch: char) -> String {
    match ch {
        ';' => "semicolon".to_string(),
        '\'' => "quote".to_string(),
        ',' => "comma".to_string(),
        '.' => "period".to_string(),
        '/' => "slash".to_string(),
        '-' => "hyphen".to_string(),
        '[' => "open_bracket".to_string(),
        ']' => "close_bracket".to_string(),
        other => other.to_ascii_lowercase().to_string(),
    }
}

/// Inverse of [`karabiner_key_code`].
#[must_use]
pub fn char_for_karabiner_key_code(key_code: &str) -> Option<char> {
    match key_code {
        "semicolon" => Some(';'),
        "quote" => Some('\''),
        "comma" => Some(','),
        "period" => Some('.'),
        "slash" => Some('/'),
        "hyphen" => Some('-'),
        "open_bracket" => Some('['),
        "close_bracket" => Some(']'),
        other => {
            let mut chars = other.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) if c.is_ascii_lowercase() => Some(c),
                _ => None,
            }
        }
    }
}

/// Legend set printed on the physical keys.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, ValueEnum,
)]
#[serde(rename_all = "lowercase")]
pub enum Arrangement {
    /// US QWERTY
    Qwerty,
    /// Colemak
    Colemak,
}

impl Arrangement {
    /// Every supported arrangement, in export order.
    pub const ALL: [Self; 2] = [Self::Qwerty, Self::Colemak];

    /// Lowercase identifier used in file names and config values.
    #[must_use]
    pub const fn slug(self) -> &'static str {
        match self {
            Self::Qwerty => "qwerty",
            Self::Colemak => "colemak",
        }
    }

    /// Display name.
    #[must_use]
    pub const fn display_name(self) -> &'static str {
        match self {
            Self::Qwerty => "QWERTY",
            Self::Colemak => "Colemak",
        }
    }

    const fn legends(self) -> &'static [&'static [char]; ROWS] {
        match self {
            Self::Qwerty => &QWERTY_LEGENDS,
            Self::Colemak => &COLEMAK_LEGENDS,
        }
    }

    /// Parses an arrangement from its slug.
    pub fn from_slug(slug: &str) -> anyhow::Result<Self> {
        match slug.trim().to_lowercase().as_str() {
            "qwerty" => Ok(Self::Qwerty),
            "colemak" => Ok(Self::Colemak),
            other => anyhow::bail!("Unknown keyboard arrangement '{other}'. Expected 'qwerty' or 'colemak'"),
        }
    }
}

impl fmt::Display for Arrangement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.display_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_has_31_keys() {
        assert_eq!(PhysicalKey::all().count(), KEYS_PER_LAYER);
        assert!(PhysicalKey::checked(1, 10).is_some());
        assert!(PhysicalKey::checked(0, 10).is_none());
        assert!(PhysicalKey::checked(3, 0).is_none());
    }

    #[test]
    fn test_legends_are_unique_per_arrangement() {
        for arrangement in Arrangement::ALL {
            let mut legends: Vec<char> = PhysicalKey::all().map(|k| k.legend(arrangement)).collect();
            legends.sort_unstable();
            legends.dedup();
            assert_eq!(legends.len(), KEYS_PER_LAYER, "{arrangement} has duplicate legends");
        }
    }

    #[test]
    fn test_colemak_covers_every_letter() {
        for letter in 'a'..='z' {
            assert!(
                PhysicalKey::from_legend(letter, Arrangement::Colemak).is_some(),
                "Colemak is missing {letter}"
            );
        }
    }

    #[test]
    fn test_finger_assignment() {
        assert_eq!(PhysicalKey::new(1, 0).finger(), 0);
        assert_eq!(PhysicalKey::new(1, 3).finger(), 3);
        assert_eq!(PhysicalKey::new(1, 4).finger(), 3);
        assert_eq!(PhysicalKey::new(1, 5).finger(), 6);
        assert_eq!(PhysicalKey::new(1, 6).finger(), 6);
        assert_eq!(PhysicalKey::new(1, 9).finger(), 9);
        assert_eq!(PhysicalKey::new(1, 10).finger(), 9);
    }

    #[test]
    fn test_home_keys() {
        let homes: String = PhysicalKey::all()
            .filter(PhysicalKey::is_home)
            .map(|k| k.legend(Arrangement::Qwerty))
            .collect();
        assert_eq!(homes, "asdfjkl;");
    }

    #[test]
    fn test_karabiner_key_codes() {
        assert_eq!(PhysicalKey::new(1, 9).karabiner_key_code(), "semicolon");
        assert_eq!(PhysicalKey::new(1, 10).karabiner_key_code(), "quote");
        assert_eq!(PhysicalKey::new(0, 0).karabiner_key_code(), "q");
        assert_eq!(char_for_karabiner_key_code("slash"), Some('/'));
        assert_eq!(char_for_karabiner_key_code("j"), Some('j'));
        assert_eq!(char_for_karabiner_key_code("escape"), None);
    }
}
