//! Static consistency checks across exported artifacts.
//!
//! The analyzer file is the reference: its conversion table says how every
//! character is typed. Romaji tables and Karabiner rules must type the same
//! characters, in the same tier, with the same physical keys, and
//! re-exporting the analyzer must reproduce all of them byte for byte.

use super::{ValidationError, ValidationErrorKind, ValidationReport, ValidationWarning};
use crate::constants::{KARABINER_LAST_VARIABLE, KARABINER_SHIFT_VARIABLE};
use crate::export::karabiner::{BACKSPACE, ESCAPE};
use crate::export::{analyzer_file_name, karabiner_file_name, romaji_file_name, ExportSet};
use crate::kana;
use crate::models::key::char_for_karabiner_key_code;
use crate::models::layer::{MAX_SEQUENCE_LEN, MODIFIER_SYMBOL, SHIFT_A_SYMBOL, SHIFT_B_SYMBOL};
use crate::models::{Arrangement, Layout, PhysicalKey, ShiftState};
use crate::parser::analyzer_json::AnalyzerLayout;
use crate::parser::karabiner_json::{KarabinerFile, Manipulator};
use crate::parser::romaji_table::RomajiRow;
use crate::parser::{parse_analyzer_json, parse_karabiner_json, parse_romaji_table};
use anyhow::Result;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::path::{Path, PathBuf};

/// The artifacts of one export, as read back from disk.
#[derive(Debug, Clone)]
pub struct ExportBundle {
    /// Analyzer document
    pub analyzer: AnalyzerLayout,
    /// Romaji table rows by arrangement
    pub romaji: BTreeMap<Arrangement, Vec<RomajiRow>>,
    /// Karabiner rules by arrangement
    pub karabiner: BTreeMap<Arrangement, KarabinerFile>,
    /// Expected per-arrangement files that were not found
    pub missing: Vec<PathBuf>,
}

impl ExportBundle {
    /// Reads the artifacts written under `stem` in `dir`.
    ///
    /// The analyzer file is required; absent romaji or Karabiner files are
    /// recorded in [`Self::missing`].
    pub fn load(dir: &Path, stem: &str) -> Result<Self> {
        let analyzer = parse_analyzer_json(&dir.join(analyzer_file_name(stem)))?;
        let mut bundle = Self {
            analyzer,
            romaji: BTreeMap::new(),
            karabiner: BTreeMap::new(),
            missing: Vec::new(),
        };

        for arrangement in Arrangement::ALL {
            let path = dir.join(romaji_file_name(stem, arrangement));
            if path.exists() {
                bundle.romaji.insert(arrangement, parse_romaji_table(&path)?);
            } else {
                bundle.missing.push(path);
            }

            let path = dir.join(karabiner_file_name(stem, arrangement));
            if path.exists() {
                bundle.karabiner.insert(arrangement, parse_karabiner_json(&path)?);
            } else {
                bundle.missing.push(path);
            }
        }

        tracing::debug!(
            dir = %dir.display(),
            stem,
            romaji = bundle.romaji.len(),
            karabiner = bundle.karabiner.len(),
            missing = bundle.missing.len(),
            "Loaded export bundle"
        );

        Ok(bundle)
    }

    /// Bundle of freshly built artifacts.
    #[must_use]
    pub fn from_export_set(set: &ExportSet) -> Self {
        Self {
            analyzer: set.analyzer.clone(),
            romaji: set
                .romaji
                .iter()
                .map(|(arrangement, table)| (*arrangement, table.rows.clone()))
                .collect(),
            karabiner: set.karabiner.clone(),
            missing: Vec::new(),
        }
    }
}

/// How the analyzer says one character is typed.
#[derive(Debug, Clone)]
struct AnalyzedChar {
    state: ShiftState,
    sequence: Vec<PhysicalKey>,
}

/// Analyzer conversion table resolved to physical keys.
#[derive(Debug, Default)]
struct AnalyzerIndex {
    chars: BTreeMap<String, AnalyzedChar>,
    prefix_a: Option<PhysicalKey>,
    prefix_b: Option<PhysicalKey>,
    modifier: Option<PhysicalKey>,
}

fn analyzer_key(id: &str) -> Option<PhysicalKey> {
    let mut chars = id.chars();
    match (chars.next(), chars.next()) {
        (Some(ch), None) => PhysicalKey::from_legend(ch, Arrangement::Qwerty),
        _ => None,
    }
}

fn sequence_text(keys: &[PhysicalKey], arrangement: Arrangement) -> String {
    keys.iter().map(|key| key.legend(arrangement)).collect()
}

impl AnalyzerIndex {
    fn build(analyzer: &AnalyzerLayout, report: &mut ValidationReport) -> Self {
        let mut index = Self {
            prefix_a: analyzer.key_with_unshifted_legend(SHIFT_A_SYMBOL),
            prefix_b: analyzer.key_with_unshifted_legend(SHIFT_B_SYMBOL),
            modifier: analyzer.key_with_unshifted_legend(MODIFIER_SYMBOL),
            ..Self::default()
        };

        for (text, entry) in &analyzer.conversion {
            let key = match entry.keys.as_slice() {
                [id] => analyzer_key(id),
                _ => None,
            };
            let shift: Option<Vec<PhysicalKey>> =
                entry.shift.iter().map(|id| analyzer_key(id)).collect();
            let (Some(key), Some(shift)) = (key, shift) else {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::UnresolvedInput,
                    format!(
                        "Analyzer entry '{text}' uses keys outside the mapped block: keys {:?}, shift {:?}",
                        entry.keys, entry.shift
                    ),
                ));
                continue;
            };
            let Some(state) = index.tier_of(&shift) else {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::UnresolvedInput,
                    format!(
                        "Analyzer entry '{text}' has shift keys {:?} that are neither a prefix nor the modifier",
                        entry.shift
                    ),
                ));
                continue;
            };

            let (modifiers, prefixes): (Vec<PhysicalKey>, Vec<PhysicalKey>) = shift
                .into_iter()
                .partition(|shift_key| Some(*shift_key) == index.modifier);
            let mut sequence = prefixes;
            sequence.push(key);
            sequence.extend(modifiers);

            index.chars.insert(
                text.clone(),
                AnalyzedChar { state, sequence },
            );
        }

        index
    }

    fn tier_of(&self, shift: &[PhysicalKey]) -> Option<ShiftState> {
        if self.modifier.is_some_and(|modifier| shift.contains(&modifier)) {
            return Some(ShiftState::Diacritic);
        }
        match shift {
            [] => Some(ShiftState::Unshifted),
            [key] if Some(*key) == self.prefix_a => Some(ShiftState::ShiftA),
            [key] if Some(*key) == self.prefix_b => Some(ShiftState::ShiftB),
            _ => None,
        }
    }

    /// Compares an artifact's view of a character with the analyzer's.
    fn compare(
        &self,
        report: &mut ValidationReport,
        artifact: &str,
        text: &str,
        state: ShiftState,
        sequence: &[PhysicalKey],
    ) {
        let Some(analyzed) = self.chars.get(text) else {
            report.add_error(ValidationError::new(
                ValidationErrorKind::MissingAnalyzerEntry,
                format!("{artifact}: '{text}' has no analyzer conversion entry"),
            ));
            return;
        };

        if analyzed.state != state {
            report.add_error(ValidationError::new(
                ValidationErrorKind::TierMismatch,
                format!(
                    "{artifact}: '{text}' is in the {state} tier, the analyzer puts it in {}",
                    analyzed.state
                ),
            ));
        } else if analyzed.sequence != sequence {
            report.add_error(ValidationError::new(
                ValidationErrorKind::KeyMismatch,
                format!(
                    "{artifact}: '{text}' is typed {}, the analyzer types it {}",
                    sequence_text(sequence, Arrangement::Qwerty),
                    sequence_text(&analyzed.sequence, Arrangement::Qwerty)
                ),
            ));
        }
    }
}

/// Expands romaji table inputs into physical key presses.
///
/// Only pending text carries over into the next input, so kana and symbols
/// in an input expand through the row that left them pending. Committed
/// output never reaches the buffer.
struct RomajiExpander<'a> {
    arrangement: Arrangement,
    /// Pending text → input of the row leaving it
    pending: HashMap<&'a str, &'a str>,
}

impl<'a> RomajiExpander<'a> {
    fn new(rows: &'a [RomajiRow], arrangement: Arrangement) -> Self {
        let mut pending = HashMap::new();
        for row in rows {
            if let Some(text) = row.pending.as_deref().filter(|text| !text.is_empty()) {
                pending.entry(text).or_insert(row.input.as_str());
            }
        }
        Self {
            arrangement,
            pending,
        }
    }

    /// Physical keys typed for `input`.
    fn expand(&self, input: &str, depth: usize) -> Option<Vec<PhysicalKey>> {
        if depth > MAX_SEQUENCE_LEN {
            return None;
        }

        let chars: Vec<char> = input.chars().collect();
        let mut keys = Vec::new();
        let mut idx = 0;
        while idx < chars.len() {
            let ch = chars[idx];
            if ch.is_ascii() {
                keys.push(PhysicalKey::from_legend(ch, self.arrangement)?);
                idx += 1;
                continue;
            }
            let (len, source) = (1..=chars.len() - idx).rev().find_map(|len| {
                let text: String = chars[idx..idx + len].iter().collect();
                self.pending.get(text.as_str()).map(|source| (len, *source))
            })?;
            keys.extend(self.expand(source, depth + 1)?);
            idx += len;
        }
        Some(keys)
    }
}

/// Kana a row produces, committed or left pending. Prefix rows produce none.
fn produced_text(row: &RomajiRow) -> Option<&str> {
    if !row.output.is_empty() {
        return Some(&row.output);
    }
    let pending = row.pending.as_deref().filter(|text| !text.is_empty())?;
    let mut chars = pending.chars();
    match (chars.next(), chars.next()) {
        (Some(SHIFT_A_SYMBOL | SHIFT_B_SYMBOL), None) => None,
        _ => Some(pending),
    }
}

fn romaji_tier(input: &str) -> ShiftState {
    match input.chars().next() {
        Some(SHIFT_A_SYMBOL) => ShiftState::ShiftA,
        Some(SHIFT_B_SYMBOL) => ShiftState::ShiftB,
        Some(ch) if !ch.is_ascii() => ShiftState::Diacritic,
        _ => ShiftState::Unshifted,
    }
}

fn karabiner_physical_key(key_code: &str) -> Option<PhysicalKey> {
    PhysicalKey::from_legend(char_for_karabiner_key_code(key_code)?, Arrangement::Qwerty)
}

/// Text typed by a manipulator's key codes under `arrangement`.
fn karabiner_typed_text(key_codes: &[&str], arrangement: Arrangement) -> Option<String> {
    let romaji: Option<String> = key_codes
        .iter()
        .map(|code| {
            let ch = char_for_karabiner_key_code(code)?;
            Some(
                PhysicalKey::from_legend(ch, Arrangement::Qwerty)
                    .map_or(ch, |key| key.legend(arrangement)),
            )
        })
        .collect();
    kana::text_for_romaji(&romaji?)
}

fn karabiner_tier(manipulator: &Manipulator) -> Option<ShiftState> {
    if manipulator
        .variable_condition(KARABINER_LAST_VARIABLE)
        .is_some()
    {
        return Some(ShiftState::Diacritic);
    }
    match manipulator
        .variable_condition(KARABINER_SHIFT_VARIABLE)
        .unwrap_or(0)
    {
        0 => Some(ShiftState::Unshifted),
        value => u8::try_from(value)
            .ok()
            .and_then(ShiftState::from_layer_number),
    }
}

/// Cross-artifact checker.
pub struct ConsistencyChecker<'a> {
    bundle: &'a ExportBundle,
    source: Option<&'a Layout>,
}

impl<'a> ConsistencyChecker<'a> {
    /// Creates a checker for a bundle.
    #[must_use]
    pub const fn new(bundle: &'a ExportBundle) -> Self {
        Self {
            bundle,
            source: None,
        }
    }

    /// Also compares the analyzer grids with the layout they were exported from.
    #[must_use]
    pub const fn with_source(mut self, layout: &'a Layout) -> Self {
        self.source = Some(layout);
        self
    }

    /// Runs every check.
    #[must_use]
    pub fn check(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        for path in &self.bundle.missing {
            report.add_warning(ValidationWarning::new(format!(
                "{} not found; skipped",
                path.display()
            )));
        }

        let index = AnalyzerIndex::build(&self.bundle.analyzer, &mut report);
        Self::check_analyzer(&index, &mut report);

        for (arrangement, rows) in &self.bundle.romaji {
            Self::check_romaji(&index, *arrangement, rows, &mut report);
        }
        for (arrangement, file) in &self.bundle.karabiner {
            Self::check_karabiner(&index, *arrangement, file, &mut report);
        }

        self.check_round_trip(&mut report);

        tracing::debug!(
            errors = report.errors.len(),
            warnings = report.warnings.len(),
            "Consistency check finished"
        );

        report
    }

    fn check_analyzer(index: &AnalyzerIndex, report: &mut ValidationReport) {
        let mut sequences: HashMap<&[PhysicalKey], &str> = HashMap::new();
        for (text, analyzed) in &index.chars {
            if !analyzed.state.accepts_len(analyzed.sequence.len()) {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::SequenceLength,
                    format!(
                        "analyzer: '{text}' takes {} presses in the {} tier",
                        analyzed.sequence.len(),
                        analyzed.state
                    ),
                ));
            }
            if let Some(other) = sequences.insert(&analyzed.sequence, text) {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::SequenceCollision,
                    format!(
                        "analyzer: '{other}' and '{text}' are both typed {}",
                        sequence_text(&analyzed.sequence, Arrangement::Qwerty)
                    ),
                ));
            }
        }
    }

    fn check_romaji(
        index: &AnalyzerIndex,
        arrangement: Arrangement,
        rows: &[RomajiRow],
        report: &mut ValidationReport,
    ) {
        let artifact = format!("romaji ({arrangement})");
        let expander = RomajiExpander::new(rows, arrangement);
        let mut inputs = HashSet::new();
        let mut sequences: HashMap<Vec<PhysicalKey>, &str> = HashMap::new();

        for row in rows {
            if !inputs.insert(row.input.as_str()) {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::DuplicateInput,
                    format!("{artifact}: input '{}' appears more than once", row.input),
                ));
                continue;
            }
            let Some(text) = produced_text(row) else {
                continue;
            };

            let Some(sequence) = expander.expand(&row.input, 0) else {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::UnresolvedInput,
                    format!(
                        "{artifact}: input '{}' does not expand to physical keys",
                        row.input
                    ),
                ));
                continue;
            };

            if let Some(other) = sequences.insert(sequence.clone(), text) {
                if other != text {
                    report.add_error(ValidationError::new(
                        ValidationErrorKind::SequenceCollision,
                        format!(
                            "{artifact}: '{other}' and '{text}' are both typed {}",
                            sequence_text(&sequence, arrangement)
                        ),
                    ));
                }
            }

            if text == MODIFIER_SYMBOL.to_string() {
                if index.modifier.map(|key| vec![key]) != Some(sequence) {
                    report.add_error(ValidationError::new(
                        ValidationErrorKind::KeyMismatch,
                        format!("{artifact}: '{}' is not on the modifier key", row.input),
                    ));
                }
                continue;
            }

            let state = romaji_tier(&row.input);
            if !state.accepts_len(sequence.len()) {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::SequenceLength,
                    format!(
                        "{artifact}: '{text}' ({}) takes {} presses in the {state} tier",
                        row.input,
                        sequence.len()
                    ),
                ));
            }
            index.compare(report, &artifact, text, state, &sequence);
        }
    }

    fn check_karabiner(
        index: &AnalyzerIndex,
        arrangement: Arrangement,
        file: &KarabinerFile,
        report: &mut ValidationReport,
    ) {
        let artifact = format!("karabiner ({arrangement})");
        let mut triggers = HashSet::new();
        let mut typed: HashMap<String, usize> = HashMap::new();

        for manipulator in file.rules.iter().flat_map(|rule| &rule.manipulators) {
            let trigger = (
                manipulator.from.key_code.as_str(),
                manipulator.variable_condition(KARABINER_SHIFT_VARIABLE),
                manipulator.variable_condition(KARABINER_LAST_VARIABLE),
            );
            if !triggers.insert(trigger) {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::DuplicateInput,
                    format!(
                        "{artifact}: more than one rule for key '{}' with shift {:?} and last {:?}",
                        trigger.0, trigger.1, trigger.2
                    ),
                ));
                continue;
            }

            let sent: Vec<&str> = manipulator
                .sent_key_codes()
                .into_iter()
                .filter(|code| *code != BACKSPACE)
                .collect();
            if sent.is_empty() || manipulator.from.key_code == ESCAPE {
                continue;
            }

            let (Some(key), Some(text), Some(state)) = (
                karabiner_physical_key(&manipulator.from.key_code),
                karabiner_typed_text(&sent, arrangement),
                karabiner_tier(manipulator),
            ) else {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::UnresolvedInput,
                    format!(
                        "{artifact}: rule on '{}' sending {:?} does not type a known character",
                        manipulator.from.key_code, sent
                    ),
                ));
                continue;
            };
            *typed.entry(text.clone()).or_default() += 1;

            // The rule fires on the character's last press
            let Some(analyzed) = index.chars.get(&text) else {
                index.compare(report, &artifact, &text, state, &[key]);
                continue;
            };
            if analyzed.sequence.last() == Some(&key) {
                index.compare(report, &artifact, &text, state, &analyzed.sequence);
            } else {
                report.add_error(ValidationError::new(
                    ValidationErrorKind::KeyMismatch,
                    format!(
                        "{artifact}: '{text}' fires on {}, the analyzer ends it on {}",
                        key.legend(Arrangement::Qwerty),
                        sequence_text(&analyzed.sequence, Arrangement::Qwerty)
                    ),
                ));
            }
        }

        for text in index.chars.keys() {
            if kana::romaji_for(text).is_none() {
                continue;
            }
            match typed.get(text).copied().unwrap_or(0) {
                0 => report.add_error(ValidationError::new(
                    ValidationErrorKind::UncoveredCharacter,
                    format!("{artifact}: no rule types '{text}'"),
                )),
                1 => {}
                count => report.add_error(ValidationError::new(
                    ValidationErrorKind::DuplicateInput,
                    format!("{artifact}: '{text}' is typed by {count} rules"),
                )),
            }
        }
    }

    fn check_round_trip(&self, report: &mut ValidationReport) {
        let mismatch = |message: String| {
            ValidationError::new(ValidationErrorKind::RoundTripMismatch, message)
        };

        let imported = match self.bundle.analyzer.to_layout() {
            Ok(layout) => layout,
            Err(e) => {
                report.add_error(mismatch(format!("Analyzer does not import: {e:#}")));
                return;
            }
        };

        if let Some(source) = self.source {
            if !imported.same_grids(source) {
                let differing = ShiftState::GRID
                    .iter()
                    .flat_map(|state| PhysicalKey::all().map(move |key| (key, *state)))
                    .filter(|(key, state)| imported.output(*key, *state) != source.output(*key, *state))
                    .count();
                report.add_error(mismatch(format!(
                    "Analyzer legends differ from '{}' on {differing} keys",
                    source.metadata.name
                )));
            }
        }

        let set = match ExportSet::build(&imported) {
            Ok(set) => set,
            Err(e) => {
                report.add_error(mismatch(format!("Imported layout does not export: {e:#}")));
                return;
            }
        };

        if set.analyzer != self.bundle.analyzer {
            report.add_error(mismatch(
                "Re-exported analyzer differs from the analyzer file".to_string(),
            ));
        }
        for (arrangement, rows) in &self.bundle.romaji {
            if set.romaji.get(arrangement).map(|table| &table.rows) != Some(rows) {
                report.add_error(mismatch(format!(
                    "Re-exported {arrangement} romaji table differs from the file"
                )));
            }
        }
        for (arrangement, file) in &self.bundle.karabiner {
            if set.karabiner.get(arrangement) != Some(file) {
                report.add_error(mismatch(format!(
                    "Re-exported {arrangement} Karabiner rules differ from the file"
                )));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{export_all, ExportOptions};
    use crate::models::KeyOutput;
    use crate::services::LayoutService;
    use tempfile::TempDir;

    fn builtin_bundle() -> (Layout, ExportBundle) {
        let layout = LayoutService::builtin().unwrap();
        let set = ExportSet::build(&layout).unwrap();
        (layout, ExportBundle::from_export_set(&set))
    }

    #[test]
    fn test_fresh_export_is_consistent() {
        let (layout, bundle) = builtin_bundle();
        let report = ConsistencyChecker::new(&bundle).with_source(&layout).check();
        assert!(report.is_valid(), "{}", report.format_message());
        assert!(report.warnings.is_empty());
    }

    #[test]
    fn test_written_files_are_consistent() {
        let layout = LayoutService::builtin().unwrap();
        let dir = TempDir::new().unwrap();
        export_all(&layout, dir.path(), &ExportOptions::default()).unwrap();

        let bundle = ExportBundle::load(dir.path(), "shingetsu").unwrap();
        assert!(bundle.missing.is_empty());
        let report = ConsistencyChecker::new(&bundle).with_source(&layout).check();
        assert!(report.is_valid(), "{}", report.format_message());
    }

    #[test]
    fn test_missing_files_are_warnings() {
        let layout = LayoutService::builtin().unwrap();
        let dir = TempDir::new().unwrap();
        let options = ExportOptions {
            arrangements: vec![Arrangement::Qwerty],
            ..ExportOptions::default()
        };
        export_all(&layout, dir.path(), &options).unwrap();

        let bundle = ExportBundle::load(dir.path(), "shingetsu").unwrap();
        assert_eq!(bundle.missing.len(), 2);
        let report = ConsistencyChecker::new(&bundle).check();
        assert!(report.is_valid(), "{}", report.format_message());
        assert_eq!(report.warnings.len(), 2);
    }

    #[test]
    fn test_missing_analyzer_entry() {
        let (_, mut bundle) = builtin_bundle();
        bundle.analyzer.conversion.remove("あ");
        let report = ConsistencyChecker::new(&bundle).check();
        assert!(report.has_error(ValidationErrorKind::MissingAnalyzerEntry));
        assert!(report.has_error(ValidationErrorKind::RoundTripMismatch));
    }

    #[test]
    fn test_romaji_duplicates_and_collisions() {
        let (_, mut bundle) = builtin_bundle();
        let rows = bundle.romaji.get_mut(&Arrangement::Qwerty).unwrap();
        rows.push(RomajiRow::new("a", "か"));
        // k then q already types あ through the ☆ row
        rows.push(RomajiRow::new("kq", "ゐ"));
        let report = ConsistencyChecker::new(&bundle).check();
        assert!(report.has_error(ValidationErrorKind::DuplicateInput));
        assert!(report.has_error(ValidationErrorKind::SequenceCollision));
        assert!(report.has_error(ValidationErrorKind::SequenceLength));
    }

    #[test]
    fn test_committed_base_kana_strands_diacritic_rows() {
        let (_, mut bundle) = builtin_bundle();
        let rows = bundle.romaji.get_mut(&Arrangement::Qwerty).unwrap();
        let ha = rows.iter_mut().find(|row| row.input == "m").unwrap();
        *ha = RomajiRow::new("m", "は");
        let report = ConsistencyChecker::new(&bundle).check();
        assert!(report.errors.iter().any(|e| {
            e.kind == ValidationErrorKind::UnresolvedInput && e.message.contains("'はl'")
        }));
    }

    #[test]
    fn test_romaji_tier_mismatch() {
        let (_, mut bundle) = builtin_bundle();
        let rows = bundle.romaji.get_mut(&Arrangement::Colemak).unwrap();
        let row = rows.iter_mut().find(|row| row.output == "か").unwrap();
        row.input = "☆a".to_string();
        let report = ConsistencyChecker::new(&bundle).check();
        assert!(report.has_error(ValidationErrorKind::TierMismatch));
    }

    #[test]
    fn test_karabiner_key_mismatch() {
        let (_, mut bundle) = builtin_bundle();
        let file = bundle.karabiner.get_mut(&Arrangement::Qwerty).unwrap();
        let ka = file.rules[0]
            .manipulators
            .iter_mut()
            .find(|m| {
                m.from.key_code == "a"
                    && m.variable_condition(KARABINER_SHIFT_VARIABLE) == Some(0)
            })
            .unwrap();
        // Type さ instead of か
        ka.to[0] = crate::parser::karabiner_json::ToEvent::key("s");
        let report = ConsistencyChecker::new(&bundle).check();
        assert!(report.has_error(ValidationErrorKind::KeyMismatch));
        assert!(report.has_error(ValidationErrorKind::UncoveredCharacter));
    }

    #[test]
    fn test_source_grid_mismatch() {
        let (mut layout, bundle) = builtin_bundle();
        layout
            .set_output(
                PhysicalKey::new(0, 0),
                ShiftState::Unshifted,
                KeyOutput::Text("ゐ".to_string()),
            )
            .unwrap();
        let report = ConsistencyChecker::new(&bundle).with_source(&layout).check();
        let error = report
            .errors
            .iter()
            .find(|e| e.kind == ValidationErrorKind::RoundTripMismatch)
            .unwrap();
        assert!(error.message.contains("on 1 keys"));
    }

    #[test]
    fn test_analyzer_legend_edit_breaks_round_trip() {
        let (_, mut bundle) = builtin_bundle();
        let key = bundle
            .analyzer
            .keys
            .iter_mut()
            .flatten()
            .find(|key| key.id == "a")
            .unwrap();
        key.legend[0] = "ゐ".to_string();
        let report = ConsistencyChecker::new(&bundle).check();
        assert!(report.has_error(ValidationErrorKind::RoundTripMismatch));
    }
}
