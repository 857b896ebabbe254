//! keyboard_analyzer export.
//!
//! Produces the full ANSI keyboard with three-layer legends on the 31 mapped
//! keys and a conversion entry for every reachable character.

use crate::models::key::{cols_for_row, ROWS};
use crate::models::{Layout, LayoutMapping, PhysicalKey, ShiftState};
use crate::parser::analyzer_json::{AnalyzerKey, AnalyzerLayout, ConversionEntry};
use anyhow::{Context, Result};
use std::collections::BTreeMap;

/// Conversion type for prefix-shift input.
const CONVERSION_KIND: &str = "sim";

fn fixed_key(id: &str, legend: &[&str], size: f64, finger: u8) -> AnalyzerKey {
    AnalyzerKey {
        id: id.to_string(),
        legend: legend.iter().map(ToString::to_string).collect(),
        size,
        finger,
        home: None,
    }
}

fn number_row() -> Vec<AnalyzerKey> {
    let keys: [(&str, &str, u8); 13] = [
        ("`", "~", 0),
        ("1", "!", 0),
        ("2", "@", 1),
        ("3", "#", 2),
        ("4", "$", 3),
        ("5", "%", 3),
        ("6", "^", 6),
        ("7", "&", 6),
        ("8", "*", 7),
        ("9", "(", 8),
        ("0", ")", 9),
        ("-", "_", 9),
        ("=", "+", 9),
    ];
    let mut row: Vec<AnalyzerKey> = keys
        .iter()
        .map(|&(id, shifted, finger)| fixed_key(id, &[id, shifted], 1.0, finger))
        .collect();
    row.push(fixed_key("bs", &["BS"], 2.0, 9));
    row
}

fn mapped_key(layout: &Layout, key: PhysicalKey) -> AnalyzerKey {
    AnalyzerKey {
        id: key.analyzer_id(),
        legend: ShiftState::GRID
            .iter()
            .map(|state| layout.output(key, *state).legend())
            .collect(),
        size: 1.0,
        finger: key.finger(),
        home: key.is_home().then_some(true),
    }
}

fn mapped_row(layout: &Layout, row: usize) -> impl Iterator<Item = AnalyzerKey> + '_ {
    (0..cols_for_row(row))
        .filter_map(move |col| PhysicalKey::checked(row, col))
        .map(move |key| mapped_key(layout, key))
}

fn conversion_table(mapping: &LayoutMapping) -> BTreeMap<String, ConversionEntry> {
    let mut conversion = BTreeMap::new();
    for path in mapping.paths() {
        let entry = ConversionEntry {
            keys: vec![path.key().analyzer_id()],
            shift: path
                .shift_keys()
                .iter()
                .map(PhysicalKey::analyzer_id)
                .collect(),
            kind: CONVERSION_KIND.to_string(),
            ime: true,
            renzsft: (path.state != ShiftState::Unshifted).then_some(false),
        };
        conversion.entry(path.text.clone()).or_insert(entry);
    }
    conversion
}

/// Builds the analyzer document for a resolved layout.
#[must_use]
pub fn build_analyzer_layout(layout: &Layout, mapping: &LayoutMapping) -> AnalyzerLayout {
    let mut keys = vec![number_row()];

    for row in 0..ROWS {
        let mut keyboard_row = match row {
            0 => vec![fixed_key("tab", &["Tab"], 1.5, 0)],
            1 => vec![fixed_key("caps", &["Caps Lock"], 1.75, 0)],
            _ => vec![fixed_key("shift", &["Shift"], 2.25, 0)],
        };
        keyboard_row.extend(mapped_row(layout, row));
        match row {
            0 => {
                keyboard_row.push(fixed_key("[", &["[", "{"], 1.0, 9));
                keyboard_row.push(fixed_key("]", &["]", "}"], 1.0, 9));
                keyboard_row.push(fixed_key("\\", &["\\", "|"], 1.5, 9));
            }
            1 => keyboard_row.push(fixed_key("enter", &["Enter"], 2.25, 9)),
            _ => keyboard_row.push(fixed_key("rshift", &["Shift"], 2.75, 9)),
        }
        keys.push(keyboard_row);
    }

    keys.push(vec![
        fixed_key("ctrl", &["Ctrl"], 1.25, 0),
        fixed_key("win", &["Win"], 1.25, 0),
        fixed_key("alt", &["Alt"], 1.25, 0),
        fixed_key("space", &["Space"], 6.25, 4),
        fixed_key("ralt", &["Alt"], 1.25, 9),
        fixed_key("rwin", &["Win"], 1.25, 9),
        fixed_key("menu", &["Menu"], 1.25, 9),
        fixed_key("rctrl", &["Ctrl"], 1.25, 9),
    ]);

    AnalyzerLayout {
        name: layout.metadata.name.clone(),
        remark: layout.metadata.description.clone(),
        keys,
        conversion: conversion_table(mapping),
    }
}

/// Serializes an analyzer document as pretty-printed JSON.
pub fn render_analyzer_json(analyzer: &AnalyzerLayout) -> Result<String> {
    let mut json =
        serde_json::to_string_pretty(analyzer).context("Failed to serialize analyzer JSON")?;
    json.push('\n');
    Ok(json)
}
