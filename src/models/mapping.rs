//! Resolved layout mapping.
//!
//! [`LayoutMapping`] turns the authored grids into the table every exporter
//! works from: each (physical key, shift state) output, the key sequence of
//! every reachable character, and the derived diacritic tier.

use crate::kana::{self, DiacriticRule};
use crate::models::key::PhysicalKey;
use crate::models::layer::{KeyOutput, ShiftState, MAX_SEQUENCE_LEN};
use crate::models::layout::Layout;
use anyhow::Result;
use std::collections::HashMap;
use std::fmt;

/// Ordered key presses that type one character.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct KeySequence(pub Vec<PhysicalKey>);

impl KeySequence {
    /// Number of presses.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns true for an empty sequence.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Keys in press order.
    #[must_use]
    pub fn keys(&self) -> &[PhysicalKey] {
        &self.0
    }

    fn extended(&self, key: PhysicalKey) -> Self {
        let mut keys = self.0.clone();
        keys.push(key);
        Self(keys)
    }
}

impl fmt::Display for KeySequence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.0.iter().map(ToString::to_string).collect();
        write!(f, "{}", parts.join(" → "))
    }
}

/// A grid assignment: what a key produces in one tier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingEntry {
    /// Physical key
    pub key: PhysicalKey,
    /// Grid tier
    pub state: ShiftState,
    /// Assigned output (never blank)
    pub output: KeyOutput,
}

/// How one reachable character is typed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CharacterPath {
    /// Output text
    pub text: String,
    /// Tier the character belongs to
    pub state: ShiftState,
    /// Full key sequence
    pub sequence: KeySequence,
    /// Index into `sequence` of the character's own key.
    ///
    /// For diacritic characters this is the key of the root base kana; all
    /// other presses are prefixes or modifier presses.
    pub key_index: usize,
    /// Transformation that produced this character, for the diacritic tier
    pub rule: Option<DiacriticRule>,
}

impl CharacterPath {
    /// The character's own key.
    #[must_use]
    pub fn key(&self) -> PhysicalKey {
        self.sequence.keys()[self.key_index]
    }

    /// Presses other than the character's own key, in order.
    #[must_use]
    pub fn shift_keys(&self) -> Vec<PhysicalKey> {
        self.sequence
            .keys()
            .iter()
            .enumerate()
            .filter(|(idx, _)| *idx != self.key_index)
            .map(|(_, key)| *key)
            .collect()
    }

    /// Base kana of a diacritic character.
    #[must_use]
    pub fn base(&self) -> Option<String> {
        self.rule.map(|rule| rule.base.to_string())
    }
}

/// Transformation that would exceed the press limit and is not emitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedDerivation {
    /// Transformation
    pub rule: DiacriticRule,
    /// Presses it would need
    pub length: usize,
}

/// Resolved table of every (key, shift state) output and character path.
#[derive(Debug, Clone)]
pub struct LayoutMapping {
    entries: Vec<MappingEntry>,
    paths: Vec<CharacterPath>,
    by_text: HashMap<String, usize>,
    prefix_a: PhysicalKey,
    prefix_b: PhysicalKey,
    modifier: Option<PhysicalKey>,
    skipped: Vec<SkippedDerivation>,
}

impl LayoutMapping {
    /// Resolves a layout.
    ///
    /// Fails when the layout is structurally unusable: a missing or repeated
    /// prefix key, prefix or modifier keys outside the unshifted layer, or a
    /// character placed twice. [`crate::validation::LayoutValidator`] reports
    /// the same problems in detail.
    pub fn build(layout: &Layout) -> Result<Self> {
        layout.validate()?;

        let mut entries = Vec::new();
        let mut prefix_a = None;
        let mut prefix_b = None;
        let mut modifier = None;

        for state in ShiftState::GRID {
            let Some(layer) = layout.layer(state) else {
                continue;
            };
            for (key, output) in layer.iter() {
                match output {
                    KeyOutput::Blank => continue,
                    KeyOutput::Prefix(_) | KeyOutput::Modifier
                        if state != ShiftState::Unshifted =>
                    {
                        anyhow::bail!(
                            "{} at {key} on the {state} layer: prefix and modifier keys belong on the unshifted layer",
                            output.legend()
                        );
                    }
                    KeyOutput::Prefix(target) => {
                        let slot = if *target == ShiftState::ShiftA {
                            &mut prefix_a
                        } else {
                            &mut prefix_b
                        };
                        if let Some(existing) = slot.replace(key) {
                            anyhow::bail!(
                                "{} prefix key appears twice, at {existing} and {key}",
                                output.legend()
                            );
                        }
                    }
                    KeyOutput::Modifier => {
                        if let Some(existing) = modifier.replace(key) {
                            anyhow::bail!(
                                "Modifier key appears twice, at {existing} and {key}"
                            );
                        }
                    }
                    KeyOutput::Text(_) => {}
                }
                entries.push(MappingEntry {
                    key,
                    state,
                    output: output.clone(),
                });
            }
        }

        let prefix_a = prefix_a.ok_or_else(|| {
            anyhow::anyhow!("Layout has no ☆ (shift A) prefix key on the unshifted layer")
        })?;
        let prefix_b = prefix_b.ok_or_else(|| {
            anyhow::anyhow!("Layout has no ★ (shift B) prefix key on the unshifted layer")
        })?;

        let mut mapping = Self {
            entries,
            paths: Vec::new(),
            by_text: HashMap::new(),
            prefix_a,
            prefix_b,
            modifier,
            skipped: Vec::new(),
        };

        mapping.resolve_direct_paths()?;
        mapping.resolve_diacritic_paths();

        tracing::debug!(
            entries = mapping.entries.len(),
            characters = mapping.paths.len(),
            skipped = mapping.skipped.len(),
            "Resolved layout mapping"
        );

        Ok(mapping)
    }

    fn resolve_direct_paths(&mut self) -> Result<()> {
        let mut paths = Vec::new();
        for entry in &self.entries {
            let KeyOutput::Text(text) = &entry.output else {
                continue;
            };
            let (sequence, key_index) = match self.prefix_key(entry.state) {
                Some(prefix) => (KeySequence(vec![prefix, entry.key]), 1),
                None => (KeySequence(vec![entry.key]), 0),
            };
            paths.push(CharacterPath {
                text: text.clone(),
                state: entry.state,
                sequence,
                key_index,
                rule: None,
            });
        }

        for path in paths {
            self.push_path(path)?;
        }
        Ok(())
    }

    /// Derives the diacritic tier until no rule adds a character.
    fn resolve_diacritic_paths(&mut self) {
        let Some(modifier) = self.modifier else {
            return;
        };

        loop {
            let mut added = false;
            for rule in kana::DIACRITIC_RULES {
                let result = rule.result.to_string();
                if self.by_text.contains_key(&result) {
                    continue;
                }
                let Some(base) = self.path_for(&rule.base.to_string()) else {
                    continue;
                };
                let sequence = base.sequence.extended(modifier);
                if sequence.len() > MAX_SEQUENCE_LEN {
                    continue;
                }
                let path = CharacterPath {
                    text: result,
                    state: ShiftState::Diacritic,
                    sequence,
                    key_index: base.key_index,
                    rule: Some(*rule),
                };
                self.by_text.insert(path.text.clone(), self.paths.len());
                self.paths.push(path);
                added = true;
            }
            if !added {
                break;
            }
        }

        for rule in kana::DIACRITIC_RULES {
            if self.by_text.contains_key(&rule.result.to_string()) {
                continue;
            }
            if let Some(base) = self.path_for(&rule.base.to_string()) {
                self.skipped.push(SkippedDerivation {
                    rule: *rule,
                    length: base.sequence.len() + 1,
                });
            }
        }
    }

    fn push_path(&mut self, path: CharacterPath) -> Result<()> {
        if let Some(existing) = self.path_for(&path.text) {
            anyhow::bail!(
                "'{}' is placed twice: {} at {} and {} at {}",
                path.text,
                existing.state,
                existing.key(),
                path.state,
                path.key()
            );
        }
        self.by_text.insert(path.text.clone(), self.paths.len());
        self.paths.push(path);
        Ok(())
    }

    /// Grid assignments, tier by tier in row-major order.
    #[must_use]
    pub fn entries(&self) -> &[MappingEntry] {
        &self.entries
    }

    /// Grid assignment at a key, if any.
    #[must_use]
    pub fn entry_at(&self, key: PhysicalKey, state: ShiftState) -> Option<&MappingEntry> {
        self.entries
            .iter()
            .find(|entry| entry.key == key && entry.state == state)
    }

    /// Every reachable character: grid characters first, then the diacritic tier.
    #[must_use]
    pub fn paths(&self) -> &[CharacterPath] {
        &self.paths
    }

    /// Path of a character.
    #[must_use]
    pub fn path_for(&self, text: &str) -> Option<&CharacterPath> {
        self.by_text.get(text).map(|idx| &self.paths[*idx])
    }

    /// Characters of the diacritic tier.
    pub fn diacritic_paths(&self) -> impl Iterator<Item = &CharacterPath> {
        self.paths
            .iter()
            .filter(|path| path.state == ShiftState::Diacritic)
    }

    /// Prefix key entering a shift tier.
    #[must_use]
    pub const fn prefix_key(&self, state: ShiftState) -> Option<PhysicalKey> {
        match state {
            ShiftState::ShiftA => Some(self.prefix_a),
            ShiftState::ShiftB => Some(self.prefix_b),
            ShiftState::Unshifted | ShiftState::Diacritic => None,
        }
    }

    /// The modifier key, if the layout has one.
    #[must_use]
    pub const fn modifier_key(&self) -> Option<PhysicalKey> {
        self.modifier
    }

    /// Transformations that would need more than three presses.
    #[must_use]
    pub fn skipped(&self) -> &[SkippedDerivation] {
        &self.skipped
    }

    /// Returns true if `text` is the base of an emitted diacritic character.
    #[must_use]
    pub fn is_diacritic_base(&self, text: &str) -> bool {
        self.diacritic_paths()
            .any(|path| path.base().as_deref() == Some(text))
    }
}
