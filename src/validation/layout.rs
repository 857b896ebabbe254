//! Semantic checks of an authored layout.

use super::{ValidationError, ValidationErrorKind, ValidationReport, ValidationWarning};
use crate::kana;
use crate::models::{KeyOutput, Layout, LayoutMapping, PhysicalKey, ShiftState};
use std::collections::HashMap;

/// Layout validator.
pub struct LayoutValidator<'a> {
    layout: &'a Layout,
}

impl<'a> LayoutValidator<'a> {
    /// Creates a new layout validator.
    #[must_use]
    pub const fn new(layout: &'a Layout) -> Self {
        Self { layout }
    }

    /// Validates the layout.
    ///
    /// Checks:
    /// - Three layers numbered 0-2
    /// - Exactly one ☆ and one ★ prefix key, both on the unshifted layer
    /// - At most one modifier key, on the unshifted layer
    /// - Every character placed once
    /// - Every key sequence fits its tier
    ///
    /// Warns about characters without a romaji spelling, diacritic
    /// characters that would need more than three presses, and a missing
    /// modifier key.
    #[must_use]
    pub fn validate(&self) -> ValidationReport {
        let mut report = ValidationReport::new();

        if let Err(e) = self.layout.validate() {
            report.add_error(
                ValidationError::new(ValidationErrorKind::MissingLayer, e.to_string())
                    .with_suggestion("Define '## Layer 0', '## Layer 1' and '## Layer 2' sections"),
            );
            return report;
        }

        self.validate_special_keys(&mut report);
        self.validate_unique_outputs(&mut report);

        if !report.is_valid() {
            return report;
        }

        match LayoutMapping::build(self.layout) {
            Ok(mapping) => Self::validate_mapping(&mut report, &mapping),
            Err(e) => report.add_error(ValidationError::new(
                ValidationErrorKind::UnresolvableLayout,
                e.to_string(),
            )),
        }

        report
    }

    fn layer_number(state: ShiftState) -> u8 {
        state.layer_number().unwrap_or_default()
    }

    fn validate_special_keys(&self, report: &mut ValidationReport) {
        let mut prefixes: HashMap<ShiftState, Vec<PhysicalKey>> = HashMap::new();
        let mut modifiers = Vec::new();

        for state in ShiftState::GRID {
            let Some(layer) = self.layout.layer(state) else {
                continue;
            };
            for (key, output) in layer.iter() {
                let special = match output {
                    KeyOutput::Prefix(target) => {
                        prefixes.entry(*target).or_default().push(key);
                        true
                    }
                    KeyOutput::Modifier => {
                        modifiers.push(key);
                        true
                    }
                    KeyOutput::Blank | KeyOutput::Text(_) => false,
                };
                if special && state != ShiftState::Unshifted {
                    report.add_error(
                        ValidationError::new(
                            ValidationErrorKind::MisplacedSpecialKey,
                            format!("{} is only valid on the unshifted layer", output.legend()),
                        )
                        .with_layer(Self::layer_number(state))
                        .with_key(key)
                        .with_suggestion("Move the key to Layer 0"),
                    );
                }
            }
        }

        for target in [ShiftState::ShiftA, ShiftState::ShiftB] {
            let symbol = KeyOutput::Prefix(target).legend();
            match prefixes.get(&target).map(Vec::as_slice) {
                None | Some([]) => report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::MissingPrefix,
                        format!("No {symbol} prefix key for the {target} layer"),
                    )
                    .with_layer(0)
                    .with_suggestion(format!("Put {symbol} on one key of Layer 0")),
                ),
                Some([_]) => {}
                Some([first, rest @ ..]) => {
                    for key in rest {
                        report.add_error(
                            ValidationError::new(
                                ValidationErrorKind::DuplicateSpecialKey,
                                format!("{symbol} prefix key already placed at {first}"),
                            )
                            .with_layer(0)
                            .with_key(*key),
                        );
                    }
                }
            }
        }

        if let [first, rest @ ..] = modifiers.as_slice() {
            for key in rest {
                report.add_error(
                    ValidationError::new(
                        ValidationErrorKind::DuplicateSpecialKey,
                        format!(
                            "{} modifier key already placed at {first}",
                            KeyOutput::Modifier.legend()
                        ),
                    )
                    .with_layer(0)
                    .with_key(*key),
                );
            }
        } else {
            report.add_warning(ValidationWarning::new(
                "No ゛ modifier key: voiced, semi-voiced and small kana must be placed directly",
            ));
        }
    }

    fn validate_unique_outputs(&self, report: &mut ValidationReport) {
        let mut seen: HashMap<&str, (ShiftState, PhysicalKey)> = HashMap::new();

        for state in ShiftState::GRID {
            let Some(layer) = self.layout.layer(state) else {
                continue;
            };
            for (key, output) in layer.iter() {
                let Some(text) = output.as_text() else {
                    continue;
                };
                if let Some((first_state, first_key)) = seen.get(text) {
                    report.add_error(
                        ValidationError::new(
                            ValidationErrorKind::DuplicateOutput,
                            format!(
                                "'{text}' is already placed on layer {} at {first_key}",
                                Self::layer_number(*first_state)
                            ),
                        )
                        .with_layer(Self::layer_number(state))
                        .with_key(key)
                        .with_suggestion("Each character must be reachable by exactly one sequence"),
                    );
                } else {
                    seen.insert(text, (state, key));
                }
            }
        }
    }

    fn validate_mapping(report: &mut ValidationReport, mapping: &LayoutMapping) {
        for path in mapping.paths() {
            if !path.state.accepts_len(path.sequence.len()) {
                let (min, max) = path.state.sequence_len_range();
                report.add_error(ValidationError::new(
                    ValidationErrorKind::SequenceLength,
                    format!(
                        "'{}' takes {} presses ({}); the {} tier allows {min}-{max}",
                        path.text,
                        path.sequence.len(),
                        path.sequence,
                        path.state
                    ),
                ));
            }

            if kana::romaji_for(&path.text).is_none() {
                report.add_warning(ValidationWarning::new(format!(
                    "'{}' has no romaji spelling and is left out of the Karabiner rules",
                    path.text
                )));
            }
        }

        for skipped in mapping.skipped() {
            report.add_warning(ValidationWarning::new(format!(
                "'{}' ({} of '{}') would take {} presses and is not emitted; place it on a layer to make it reachable",
                skipped.rule.result, skipped.rule.kind, skipped.rule.base, skipped.length
            )));
        }
    }
}
