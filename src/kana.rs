//! Kana tables: diacritic transformations and romaji spellings.
//!
//! The modifier key applies exactly one transformation to the kana typed
//! before it. Each base kana has at most one transformation, so repeated
//! presses walk a chain such as は → ば → ぱ or う → ゔ → ぅ.

use std::collections::HashMap;
use std::fmt;
use std::sync::OnceLock;

/// Kind of transformation applied by the modifier key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiacriticKind {
    /// Dakuten (゛)
    Voiced,
    /// Handakuten (゜)
    SemiVoiced,
    /// Small form
    Small,
}

impl fmt::Display for DiacriticKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Voiced => write!(f, "voiced"),
            Self::SemiVoiced => write!(f, "semi-voiced"),
            Self::Small => write!(f, "small"),
        }
    }
}

/// One modifier-key transformation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct DiacriticRule {
    /// Kana typed before the modifier
    pub base: char,
    /// Kana replacing it
    pub result: char,
    /// Transformation kind
    pub kind: DiacriticKind,
}

const fn voiced(base: char, result: char) -> DiacriticRule {
    DiacriticRule {
        base,
        result,
        kind: DiacriticKind::Voiced,
    }
}

const fn semi(base: char, result: char) -> DiacriticRule {
    DiacriticRule {
        base,
        result,
        kind: DiacriticKind::SemiVoiced,
    }
}

const fn small(base: char, result: char) -> DiacriticRule {
    DiacriticRule {
        base,
        result,
        kind: DiacriticKind::Small,
    }
}

/// Every transformation the modifier key knows, in derivation order.
pub const DIACRITIC_RULES: &[DiacriticRule] = &[
    voiced('か', 'が'),
    voiced('き', 'ぎ'),
    voiced('く', 'ぐ'),
    voiced('け', 'げ'),
    voiced('こ', 'ご'),
    voiced('さ', 'ざ'),
    voiced('し', 'じ'),
    voiced('す', 'ず'),
    voiced('せ', 'ぜ'),
    voiced('そ', 'ぞ'),
    voiced('た', 'だ'),
    voiced('ち', 'ぢ'),
    voiced('つ', 'づ'),
    voiced('て', 'で'),
    voiced('と', 'ど'),
    voiced('は', 'ば'),
    voiced('ひ', 'び'),
    voiced('ふ', 'ぶ'),
    voiced('へ', 'べ'),
    voiced('ほ', 'ぼ'),
    voiced('う', 'ゔ'),
    semi('ば', 'ぱ'),
    semi('び', 'ぴ'),
    semi('ぶ', 'ぷ'),
    semi('べ', 'ぺ'),
    semi('ぼ', 'ぽ'),
    small('あ', 'ぁ'),
    small('い', 'ぃ'),
    small('え', 'ぇ'),
    small('お', 'ぉ'),
    small('ゔ', 'ぅ'),
    small('や', 'ゃ'),
    small('ゆ', 'ゅ'),
    small('よ', 'ょ'),
    small('わ', 'ゎ'),
    small('づ', 'っ'),
];

/// Transformation applied to `base`, if the modifier key affects it.
#[must_use]
pub fn rule_for_base(base: &str) -> Option<&'static DiacriticRule> {
    let mut chars = base.chars();
    let ch = chars.next()?;
    if chars.next().is_some() {
        return None;
    }
    DIACRITIC_RULES.iter().find(|rule| rule.base == ch)
}

/// Romaji for a single character, as typed into a romaji IME.
fn romaji_char(ch: char) -> Option<&'static str> {
    let romaji = match ch {
        'あ' => "a",
        'い' => "i",
        'う' => "u",
        'え' => "e",
        'お' => "o",
        'か' => "ka",
        'き' => "ki",
        'く' => "ku",
        'け' => "ke",
        'こ' => "ko",
        'さ' => "sa",
        'し' => "si",
        'す' => "su",
        'せ' => "se",
        'そ' => "so",
        'た' => "ta",
        'ち' => "ti",
        'つ' => "tu",
        'て' => "te",
        'と' => "to",
        'な' => "na",
        'に' => "ni",
        'ぬ' => "nu",
        'ね' => "ne",
        'の' => "no",
        'は' => "ha",
        'ひ' => "hi",
        'ふ' => "hu",
        'へ' => "he",
        'ほ' => "ho",
        'ま' => "ma",
        'み' => "mi",
        'む' => "mu",
        'め' => "me",
        'も' => "mo",
        'や' => "ya",
        'ゆ' => "yu",
        'よ' => "yo",
        'ら' => "ra",
        'り' => "ri",
        'る' => "ru",
        'れ' => "re",
        'ろ' => "ro",
        'わ' => "wa",
        'を' => "wo",
        'ん' => "nn",
        'が' => "ga",
        'ぎ' => "gi",
        'ぐ' => "gu",
        'げ' => "ge",
        'ご' => "go",
        'ざ' => "za",
        'じ' => "zi",
        'ず' => "zu",
        'ぜ' => "ze",
        'ぞ' => "zo",
        'だ' => "da",
        'ぢ' => "di",
        'づ' => "du",
        'で' => "de",
        'ど' => "do",
        'ば' => "ba",
        'び' => "bi",
        'ぶ' => "bu",
        'べ' => "be",
        'ぼ' => "bo",
        'ぱ' => "pa",
        'ぴ' => "pi",
        'ぷ' => "pu",
        'ぺ' => "pe",
        'ぽ' => "po",
        'ゔ' => "vu",
        'ぁ' => "xa",
        'ぃ' => "xi",
        'ぅ' => "xu",
        'ぇ' => "xe",
        'ぉ' => "xo",
        'ゃ' => "xya",
        'ゅ' => "xyu",
        'ょ' => "xyo",
        'っ' => "xtu",
        'ゎ' => "xwa",
        'ー' => "-",
        '、' => ",",
        '。' => ".",
        '・' => "/",
        '「' => "[",
        '」' => "]",
        _ => return None,
    };
    Some(romaji)
}

/// Vowel of a small ya/yu/yo used to build yoon spellings.
const fn yoon_vowel(ch: char) -> Option<&'static str> {
    match ch {
        'ゃ' => Some("a"),
        'ゅ' => Some("u"),
        'ょ' => Some("o"),
        _ => None,
    }
}

/// Romaji spelling of an output text.
///
/// Yoon digraphs use the compact form (`しょ` → `syo`); any other sequence
/// is spelled character by character.
#[must_use]
pub fn romaji_for(text: &str) -> Option<String> {
    let chars: Vec<char> = text.chars().collect();
    if let [first, second] = chars.as_slice() {
        if let Some(vowel) = yoon_vowel(*second) {
            let stem = romaji_char(*first)?.strip_suffix('i')?;
            return Some(format!("{stem}y{vowel}"));
        }
    }

    if chars.is_empty() {
        return None;
    }

    chars.iter().map(|ch| romaji_char(*ch)).collect()
}

/// Kana covered by [`text_for_romaji`]: every spelled character plus the
/// yoon digraphs of the i-row.
fn reverse_table() -> &'static HashMap<String, String> {
    static TABLE: OnceLock<HashMap<String, String>> = OnceLock::new();
    TABLE.get_or_init(|| {
        let singles: Vec<char> = ('ぁ'..='ゖ')
            .chain(['ー', '、', '。', '・', '「', '」'])
            .filter(|ch| romaji_char(*ch).is_some())
            .collect();

        let mut table = HashMap::new();
        for ch in &singles {
            let text = ch.to_string();
            if let Some(romaji) = romaji_for(&text) {
                table.insert(romaji, text);
            }
        }
        for first in &singles {
            for second in ['ゃ', 'ゅ', 'ょ'] {
                let text = format!("{first}{second}");
                if let Some(romaji) = romaji_for(&text) {
                    table.entry(romaji).or_insert(text);
                }
            }
        }
        table
    })
}

/// Output text spelled by `romaji`, if it spells a known kana or digraph.
#[must_use]
pub fn text_for_romaji(romaji: &str) -> Option<String> {
    reverse_table().get(romaji).cloned()
}
