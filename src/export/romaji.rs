//! hazkey romaji table export.
//!
//! Key legends of the chosen arrangement become the latin input. Prefix keys
//! leave their symbol pending so the next key completes a shifted row. Kana
//! with a diacritic form stay pending too, so the modifier key typed next
//! replaces them in the buffer instead of following committed text.

use crate::models::{Arrangement, KeyOutput, LayoutMapping, ShiftState};
use crate::parser::romaji_table::{render_romaji_table, RomajiRow};

/// Romaji table for one arrangement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RomajiTable {
    /// Arrangement whose legends the inputs use
    pub arrangement: Arrangement,
    /// Comment lines written before the rows
    pub header: Vec<String>,
    /// Table rows in output order
    pub rows: Vec<RomajiRow>,
}

impl RomajiTable {
    /// TSV file content.
    #[must_use]
    pub fn render(&self) -> String {
        render_romaji_table(&self.header, &self.rows)
    }
}

/// Builds the romaji table of a resolved layout for one arrangement.
#[must_use]
pub fn build_romaji_table(
    layout_name: &str,
    mapping: &LayoutMapping,
    arrangement: Arrangement,
) -> RomajiTable {
    let legend = |key: crate::models::PhysicalKey| key.legend(arrangement).to_string();
    let row = |input: String, text: &str| {
        if mapping.is_diacritic_base(text) {
            RomajiRow::pending(input, text)
        } else {
            RomajiRow::new(input, text)
        }
    };
    let mut rows = Vec::new();

    // Prefix keys
    for state in [ShiftState::ShiftA, ShiftState::ShiftB] {
        if let (Some(key), Some(symbol)) = (mapping.prefix_key(state), state.prefix_symbol()) {
            rows.push(RomajiRow::pending(legend(key), symbol.to_string()));
        }
    }

    // Grid tiers
    for state in ShiftState::GRID {
        let prefix = state.prefix_symbol().map(String::from).unwrap_or_default();
        for entry in mapping.entries().iter().filter(|entry| entry.state == state) {
            match &entry.output {
                KeyOutput::Text(text) => {
                    rows.push(row(format!("{prefix}{}", legend(entry.key)), text));
                }
                KeyOutput::Modifier => {
                    rows.push(RomajiRow::new(legend(entry.key), entry.output.legend()));
                }
                KeyOutput::Prefix(_) | KeyOutput::Blank => {}
            }
        }
    }

    // Diacritic tier: base kana followed by the modifier key
    if let Some(modifier) = mapping.modifier_key() {
        for path in mapping.diacritic_paths() {
            if let Some(base) = path.base() {
                rows.push(row(format!("{base}{}", legend(modifier)), &path.text));
            }
        }
    }

    let describe = |state: ShiftState| {
        state
            .prefix_symbol()
            .zip(mapping.prefix_key(state))
            .map(|(symbol, key)| format!("{symbol}={}", legend(key)))
    };
    let mut keys: Vec<String> = [ShiftState::ShiftA, ShiftState::ShiftB]
        .into_iter()
        .filter_map(describe)
        .collect();
    if let Some(modifier) = mapping.modifier_key() {
        keys.push(format!("{}={}", KeyOutput::Modifier.legend(), legend(modifier)));
    }

    RomajiTable {
        arrangement,
        header: vec![
            format!(
                "{layout_name} {} ANSI hazkey romaji table",
                arrangement.display_name()
            ),
            keys.join(" "),
        ],
        rows,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::romaji_table::compose;
    use crate::services::LayoutService;
    use std::collections::HashSet;

    fn table(arrangement: Arrangement) -> RomajiTable {
        let layout = LayoutService::builtin().unwrap();
        let mapping = LayoutMapping::build(&layout).unwrap();
        build_romaji_table(&layout.metadata.name, &mapping, arrangement)
    }

    fn row_for<'a>(table: &'a RomajiTable, input: &str) -> Option<&'a RomajiRow> {
        table.rows.iter().find(|row| row.input == input)
    }

    #[test]
    fn test_qwerty_rows() {
        let table = table(Arrangement::Qwerty);
        assert_eq!(table.rows[0], RomajiRow::pending("k", "☆"));
        assert_eq!(table.rows[1], RomajiRow::pending("d", "★"));
        assert_eq!(row_for(&table, "a"), Some(&RomajiRow::new("a", "か")));
        assert_eq!(row_for(&table, "l"), Some(&RomajiRow::new("l", "゛")));
        assert_eq!(row_for(&table, "m"), Some(&RomajiRow::pending("m", "は")));
        assert_eq!(row_for(&table, "☆q"), Some(&RomajiRow::pending("☆q", "あ")));
        assert_eq!(row_for(&table, "☆g"), Some(&RomajiRow::pending("☆g", "ひ")));
        assert_eq!(row_for(&table, "☆k"), Some(&RomajiRow::new("☆k", "も")));
        assert_eq!(row_for(&table, "★d"), Some(&RomajiRow::new("★d", "ろ")));
        assert_eq!(row_for(&table, "かl"), None, "が is placed directly");
        assert_eq!(row_for(&table, "はl"), Some(&RomajiRow::pending("はl", "ば")));
        assert_eq!(row_for(&table, "ばl"), Some(&RomajiRow::new("ばl", "ぱ")));
        assert_eq!(row_for(&table, "ゔl"), Some(&RomajiRow::new("ゔl", "ぅ")));
        assert_eq!(table.header[1], "☆=k ★=d ゛=l");
    }

    #[test]
    fn test_qwerty_key_sequences_compose() {
        let rows = table(Arrangement::Qwerty).rows;
        assert_eq!(compose(&rows, "a"), "か");
        assert_eq!(compose(&rows, "m"), "は");
        assert_eq!(compose(&rows, "ml"), "ば");
        assert_eq!(compose(&rows, "mll"), "ぱ");
        assert_eq!(compose(&rows, "kq"), "あ");
        assert_eq!(compose(&rows, "kql"), "ぁ");
        assert_eq!(compose(&rows, "kgl"), "び");
        assert_eq!(compose(&rows, "sll"), "ぅ");
        assert_eq!(compose(&rows, "dd"), "ろ");
        assert_eq!(compose(&rows, "kj"), "じょ");
        assert_eq!(compose(&rows, "ma"), "はか");
        assert_eq!(compose(&rows, "mkq"), "はあ");
    }

    #[test]
    fn test_every_diacritic_path_is_typed() {
        let layout = LayoutService::builtin().unwrap();
        let mapping = LayoutMapping::build(&layout).unwrap();
        for arrangement in Arrangement::ALL {
            let rows = build_romaji_table(&layout.metadata.name, &mapping, arrangement).rows;
            for path in mapping.diacritic_paths() {
                let typed: String = path
                    .sequence
                    .keys()
                    .iter()
                    .map(|key| key.legend(arrangement))
                    .collect();
                assert_eq!(compose(&rows, &typed), path.text, "{arrangement} {typed}");
            }
        }
    }

    #[test]
    fn test_colemak_uses_colemak_legends() {
        let table = table(Arrangement::Colemak);
        assert_eq!(table.rows[0], RomajiRow::pending("e", "☆"));
        assert_eq!(table.rows[1], RomajiRow::pending("s", "★"));
        assert_eq!(row_for(&table, "a"), Some(&RomajiRow::new("a", "か")));
        assert_eq!(row_for(&table, "r"), Some(&RomajiRow::pending("r", "う")));
        assert_eq!(row_for(&table, "☆q"), Some(&RomajiRow::pending("☆q", "あ")));
        assert_eq!(compose(&table.rows, "mi"), "ば");
        assert!(table.header[0].contains("Colemak"));
    }

    #[test]
    fn test_inputs_are_unique() {
        for arrangement in Arrangement::ALL {
            let table = table(arrangement);
            let mut seen = HashSet::new();
            for row in &table.rows {
                assert!(seen.insert(row.input.clone()), "duplicate input {}", row.input);
            }
        }
    }

    #[test]
    fn test_render_has_header_comments() {
        let text = table(Arrangement::Qwerty).render();
        assert!(text.starts_with("# 新月配列 (Shingetsu Layout) QWERTY ANSI hazkey romaji table\n"));
        assert!(text.contains("\nk\t\t☆\n"));
        assert!(text.contains("\n☆j\tじょ\n"));
        assert!(text.contains("\nm\t\tは\n"));
    }
}
