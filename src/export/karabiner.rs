//! Karabiner-Elements complex modification export.
//!
//! Prefix-shift state lives in two Karabiner variables: the pending shift
//! tier and the last typed character that the modifier key can transform.
//! Characters are typed as romaji into the macOS Japanese input method.

use crate::constants::{KARABINER_LAST_VARIABLE, KARABINER_SHIFT_VARIABLE};
use crate::kana;
use crate::models::key::karabiner_key_code;
use crate::models::{Arrangement, KeyOutput, LayoutMapping, PhysicalKey, ShiftState};
use crate::parser::karabiner_json::{
    Condition, FromEvent, FromModifiers, InputSource, KarabinerFile, KarabinerRule, Manipulator,
    ToEvent,
};
use anyhow::{Context, Result};

const BASIC: &str = "basic";
pub(crate) const BACKSPACE: &str = "delete_or_backspace";
pub(crate) const ESCAPE: &str = "escape";

/// `shingetsu_shift` value of a tier. Unshifted and the diacritic tier use 0.
#[must_use]
pub fn shift_value(state: ShiftState) -> i64 {
    match state {
        ShiftState::Unshifted | ShiftState::Diacritic => 0,
        _ => state.layer_number().map_or(0, i64::from),
    }
}

/// `shingetsu_last` value remembering `text`.
///
/// Only characters the modifier key can transform get a non-zero id: their
/// position in the mapping's path list, plus one.
#[must_use]
pub fn last_value(mapping: &LayoutMapping, text: &str) -> i64 {
    if !mapping.is_diacritic_base(text) {
        return 0;
    }
    mapping
        .paths()
        .iter()
        .position(|path| path.text == text)
        .and_then(|idx| i64::try_from(idx + 1).ok())
        .unwrap_or(0)
}

/// Key codes that type `romaji` under the given arrangement.
///
/// Letters are sent as the physical key carrying that letter in the
/// arrangement; punctuation outside the mapped grid keeps its US name.
#[must_use]
pub fn romaji_key_codes(romaji: &str, arrangement: Arrangement) -> Vec<String> {
    romaji
        .chars()
        .map(|ch| {
            PhysicalKey::from_legend(ch, arrangement)
                .map_or_else(|| karabiner_key_code(ch), |key| key.karabiner_key_code())
        })
        .collect()
}

struct ManipulatorBuilder<'a> {
    mapping: &'a LayoutMapping,
    arrangement: Arrangement,
    manipulators: Vec<Manipulator>,
}

impl<'a> ManipulatorBuilder<'a> {
    fn new(mapping: &'a LayoutMapping, arrangement: Arrangement) -> Self {
        Self {
            mapping,
            arrangement,
            manipulators: Vec::new(),
        }
    }

    fn input_source_conditions() -> Vec<Condition> {
        vec![
            Condition::InputSourceIf {
                input_sources: vec![InputSource {
                    language: Some("^ja$".to_string()),
                    input_mode_id: None,
                }],
            },
            Condition::InputSourceUnless {
                input_sources: vec![InputSource {
                    language: None,
                    input_mode_id: Some("Roman$".to_string()),
                }],
            },
        ]
    }

    fn push(
        &mut self,
        description: String,
        key_code: String,
        variables: &[(&str, i64)],
        to: Vec<ToEvent>,
    ) {
        let mut conditions = Self::input_source_conditions();
        conditions.extend(variables.iter().map(|(name, value)| Condition::VariableIf {
            name: (*name).to_string(),
            value: *value,
        }));
        self.manipulators.push(Manipulator {
            kind: BASIC.to_string(),
            description: Some(description),
            from: FromEvent {
                key_code,
                modifiers: Some(FromModifiers {
                    optional: vec!["caps_lock".to_string()],
                }),
            },
            to,
            conditions,
        });
    }

    fn typed(&self, text: &str) -> Option<Vec<ToEvent>> {
        let Some(romaji) = kana::romaji_for(text) else {
            tracing::warn!(text, "No romaji spelling; key only cancels the pending shift");
            return None;
        };
        Some(
            romaji_key_codes(&romaji, self.arrangement)
                .into_iter()
                .map(ToEvent::key)
                .collect(),
        )
    }

    fn escape(&mut self) {
        self.push(
            "Escape clears pending shift".to_string(),
            ESCAPE.to_string(),
            &[],
            vec![
                ToEvent::set(KARABINER_SHIFT_VARIABLE, 0),
                ToEvent::set(KARABINER_LAST_VARIABLE, 0),
                ToEvent::key(ESCAPE),
            ],
        );
    }

    fn prefix(&mut self, key: PhysicalKey, target: ShiftState) {
        let symbol = KeyOutput::Prefix(target).legend();
        self.push(
            format!("{} → {symbol}", key.legend(self.arrangement)),
            key.karabiner_key_code(),
            &[(KARABINER_SHIFT_VARIABLE, 0)],
            vec![
                ToEvent::set(KARABINER_SHIFT_VARIABLE, shift_value(target)),
                ToEvent::set(KARABINER_LAST_VARIABLE, 0),
            ],
        );
    }

    fn text(&mut self, key: PhysicalKey, state: ShiftState, text: &str) {
        let Some(mut to) = self.typed(text) else {
            self.cancel(key, state);
            return;
        };
        to.push(ToEvent::set(KARABINER_SHIFT_VARIABLE, 0));
        to.push(ToEvent::set(
            KARABINER_LAST_VARIABLE,
            last_value(self.mapping, text),
        ));
        let prefix = state
            .prefix_symbol()
            .map(|symbol| format!("{symbol} "))
            .unwrap_or_default();
        self.push(
            format!("{prefix}{} → {text}", key.legend(self.arrangement)),
            key.karabiner_key_code(),
            &[(KARABINER_SHIFT_VARIABLE, shift_value(state))],
            to,
        );
    }

    fn cancel(&mut self, key: PhysicalKey, state: ShiftState) {
        let symbol = state.prefix_symbol().map(String::from).unwrap_or_default();
        self.push(
            format!("{symbol} {} cancels", key.legend(self.arrangement)),
            key.karabiner_key_code(),
            &[(KARABINER_SHIFT_VARIABLE, shift_value(state))],
            vec![
                ToEvent::set(KARABINER_SHIFT_VARIABLE, 0),
                ToEvent::set(KARABINER_LAST_VARIABLE, 0),
            ],
        );
    }

    fn modifier(&mut self, key: PhysicalKey) {
        let mapping = self.mapping;
        for path in mapping.diacritic_paths() {
            let Some(base) = path.base() else {
                continue;
            };
            let Some(typed) = self.typed(&path.text) else {
                continue;
            };
            let mut to: Vec<ToEvent> = base.chars().map(|_| ToEvent::key(BACKSPACE)).collect();
            to.extend(typed);
            to.push(ToEvent::set(
                KARABINER_LAST_VARIABLE,
                last_value(mapping, &path.text),
            ));
            self.push(
                format!("{base} {} → {}", key.legend(self.arrangement), path.text),
                key.karabiner_key_code(),
                &[
                    (KARABINER_SHIFT_VARIABLE, 0),
                    (KARABINER_LAST_VARIABLE, last_value(mapping, &base)),
                ],
                to,
            );
        }

        self.push(
            format!("{} with nothing to modify", key.legend(self.arrangement)),
            key.karabiner_key_code(),
            &[(KARABINER_SHIFT_VARIABLE, 0)],
            vec![ToEvent::set(KARABINER_LAST_VARIABLE, 0)],
        );
    }

    fn key(&mut self, key: PhysicalKey) {
        let mapping = self.mapping;
        for state in ShiftState::GRID {
            let Some(entry) = mapping.entry_at(key, state) else {
                if state != ShiftState::Unshifted {
                    self.cancel(key, state);
                }
                continue;
            };
            match &entry.output {
                KeyOutput::Text(text) => self.text(key, state, text),
                KeyOutput::Prefix(target) => self.prefix(key, *target),
                KeyOutput::Modifier => self.modifier(key),
                KeyOutput::Blank => {}
            }
        }
    }
}

/// Builds the Karabiner rule file for one arrangement.
#[must_use]
pub fn build_karabiner_file(
    layout_name: &str,
    mapping: &LayoutMapping,
    arrangement: Arrangement,
) -> KarabinerFile {
    let mut builder = ManipulatorBuilder::new(mapping, arrangement);
    builder.escape();
    for key in PhysicalKey::all() {
        builder.key(key);
    }

    tracing::debug!(
        arrangement = %arrangement,
        manipulators = builder.manipulators.len(),
        "Built Karabiner rules"
    );

    KarabinerFile {
        title: format!("{layout_name} ({})", arrangement.display_name()),
        rules: vec![KarabinerRule {
            description: format!(
                "{layout_name}: prefix shift for the Japanese input source ({} arrangement)",
                arrangement.display_name()
            ),
            manipulators: builder.manipulators,
        }],
    }
}

/// Serializes a rule file as pretty-printed JSON.
pub fn render_karabiner_json(file: &KarabinerFile) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(file).context("Failed to serialize Karabiner rules")?;
    json.push('\n');
    Ok(json)
}
