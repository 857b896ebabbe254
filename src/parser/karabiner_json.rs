//! Karabiner-Elements complex modification schema.
//!
//! Only the subset the exporter emits is modelled: basic manipulators with
//! `variable_if` and input-source conditions, key-code and `set_variable`
//! events.

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

/// Importable rule file (`~/.config/karabiner/assets/complex_modifications/*.json`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KarabinerFile {
    /// Title shown in the import dialog
    pub title: String,
    /// Rules offered for enabling
    pub rules: Vec<KarabinerRule>,
}

/// A named group of manipulators.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct KarabinerRule {
    /// Rule description
    pub description: String,
    /// Manipulators, evaluated in order
    pub manipulators: Vec<Manipulator>,
}

/// A single key remapping.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manipulator {
    /// Manipulator type, always `basic`
    #[serde(rename = "type")]
    pub kind: String,
    /// Human-readable summary
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Triggering key
    pub from: FromEvent,
    /// Events sent instead
    #[serde(default)]
    pub to: Vec<ToEvent>,
    /// All conditions must hold
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub conditions: Vec<Condition>,
}

/// Trigger of a manipulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromEvent {
    /// Key code
    pub key_code: String,
    /// Modifiers allowed while matching
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub modifiers: Option<FromModifiers>,
}

/// Modifier constraints of a trigger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FromModifiers {
    /// Modifiers that may be held without blocking the match
    #[serde(default)]
    pub optional: Vec<String>,
}

/// Event sent by a manipulator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ToEvent {
    /// Key press
    Key {
        /// Key code
        key_code: String,
    },
    /// Variable assignment
    SetVariable {
        /// Assignment
        set_variable: SetVariable,
    },
}

impl ToEvent {
    /// Key press event.
    pub fn key(key_code: impl Into<String>) -> Self {
        Self::Key {
            key_code: key_code.into(),
        }
    }

    /// Variable assignment event.
    pub fn set(name: impl Into<String>, value: i64) -> Self {
        Self::SetVariable {
            set_variable: SetVariable {
                name: name.into(),
                value,
            },
        }
    }
}

/// Variable assignment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SetVariable {
    /// Variable name
    pub name: String,
    /// New value
    pub value: i64,
}

/// Manipulator condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Condition {
    /// Variable equals value
    VariableIf {
        /// Variable name
        name: String,
        /// Expected value
        value: i64,
    },
    /// Current input source matches one of the patterns
    InputSourceIf {
        /// Patterns
        input_sources: Vec<InputSource>,
    },
    /// Current input source matches none of the patterns
    InputSourceUnless {
        /// Patterns
        input_sources: Vec<InputSource>,
    },
}

/// Input source pattern (regular expressions matched by Karabiner).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSource {
    /// Language pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    /// Input mode pattern
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub input_mode_id: Option<String>,
}

impl Manipulator {
    /// Value required for `variable` by a `variable_if` condition.
    #[must_use]
    pub fn variable_condition(&self, variable: &str) -> Option<i64> {
        self.conditions.iter().find_map(|condition| match condition {
            Condition::VariableIf { name, value } if name == variable => Some(*value),
            _ => None,
        })
    }

    /// Value this manipulator assigns to `variable`.
    #[must_use]
    pub fn assigned_value(&self, variable: &str) -> Option<i64> {
        self.to.iter().find_map(|event| match event {
            ToEvent::SetVariable { set_variable } if set_variable.name == variable => {
                Some(set_variable.value)
            }
            _ => None,
        })
    }

    /// Key codes sent, in order.
    #[must_use]
    pub fn sent_key_codes(&self) -> Vec<&str> {
        self.to
            .iter()
            .filter_map(|event| match event {
                ToEvent::Key { key_code } => Some(key_code.as_str()),
                ToEvent::SetVariable { .. } => None,
            })
            .collect()
    }
}

/// Reads a Karabiner rule file.
pub fn parse_karabiner_json(path: &Path) -> Result<KarabinerFile> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read Karabiner file: {}", path.display()))?;

    serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse Karabiner file: {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_manipulator_json_shape() {
        let manipulator = Manipulator {
            kind: "basic".to_string(),
            description: None,
            from: FromEvent {
                key_code: "j".to_string(),
                modifiers: None,
            },
            to: vec![ToEvent::key("m"), ToEvent::set("shift", 0)],
            conditions: vec![Condition::VariableIf {
                name: "shift".to_string(),
                value: 2,
            }],
        };

        let json = serde_json::to_value(&manipulator).unwrap();
        assert_eq!(json["type"], "basic");
        assert_eq!(json["to"][0]["key_code"], "m");
        assert_eq!(json["to"][1]["set_variable"]["name"], "shift");
        assert_eq!(json["conditions"][0]["type"], "variable_if");
        assert!(json.get("description").is_none());

        let back: Manipulator = serde_json::from_value(json).unwrap();
        assert_eq!(back, manipulator);
        assert_eq!(back.variable_condition("shift"), Some(2));
        assert_eq!(back.assigned_value("shift"), Some(0));
        assert_eq!(back.sent_key_codes(), vec!["m"]);
    }

    #[test]
    fn test_input_source_condition_shape() {
        let condition = Condition::InputSourceUnless {
            input_sources: vec![InputSource {
                language: None,
                input_mode_id: Some("Roman$".to_string()),
            }],
        };
        let json = serde_json::to_value(&condition).unwrap();
        assert_eq!(json["type"], "input_source_unless");
        assert_eq!(json["input_sources"][0]["input_mode_id"], "Roman$");
    }
}
