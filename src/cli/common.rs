//! Shared CLI plumbing: error type, exit codes and JSON report shapes.

use crate::validation::{ValidationErrorKind, ValidationReport};
use serde::Serialize;
use std::fmt;

/// Process exit codes.
pub struct ExitCode;

impl ExitCode {
    /// Command succeeded
    pub const SUCCESS: i32 = 0;
    /// Validation or consistency check failed
    pub const VALIDATION: i32 = 1;
    /// File could not be read, parsed or written
    pub const IO: i32 = 2;
}

/// Error returned by a CLI command, carrying the process exit code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliError {
    /// Message printed to stderr
    pub message: String,
    /// Exit code for the process
    pub exit_code: i32,
}

impl CliError {
    /// I/O or parse failure (exit code 2).
    pub fn io(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::IO,
        }
    }

    /// Validation failure (exit code 1).
    pub fn validation(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            exit_code: ExitCode::VALIDATION,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::error::Error for CliError {}

/// Result type of CLI commands.
pub type CliResult<T> = Result<T, CliError>;

/// JSON output of `validate` and `check`.
#[derive(Debug, Serialize)]
pub struct ValidationResponse {
    /// True when no errors were found
    pub valid: bool,
    /// Errors and warnings
    pub errors: Vec<ValidationMessage>,
    /// Status per check group
    pub checks: ValidationChecks,
}

/// Status of each check group: `passed`, `failed` or `warning`.
#[derive(Debug, Serialize)]
pub struct ValidationChecks {
    /// Layer structure and prefix/modifier placement
    pub prefixes: String,
    /// Every character placed once
    pub outputs: String,
    /// Sequence lengths and diacritic derivations
    pub sequences: String,
    /// Agreement between exported artifacts
    pub artifacts: String,
}

impl ValidationChecks {
    /// All checks passed.
    #[must_use]
    pub fn all_passed() -> Self {
        Self {
            prefixes: "passed".to_string(),
            outputs: "passed".to_string(),
            sequences: "passed".to_string(),
            artifacts: "passed".to_string(),
        }
    }

    fn slot(&mut self, group: CheckGroup) -> &mut String {
        match group {
            CheckGroup::Prefixes => &mut self.prefixes,
            CheckGroup::Outputs => &mut self.outputs,
            CheckGroup::Sequences => &mut self.sequences,
            CheckGroup::Artifacts => &mut self.artifacts,
        }
    }
}

/// Check group a finding belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CheckGroup {
    /// Layer structure and special keys
    Prefixes,
    /// Character placement
    Outputs,
    /// Sequence lengths
    Sequences,
    /// Exported artifacts
    Artifacts,
}

impl From<ValidationErrorKind> for CheckGroup {
    fn from(kind: ValidationErrorKind) -> Self {
        match kind {
            ValidationErrorKind::MissingLayer
            | ValidationErrorKind::MissingPrefix
            | ValidationErrorKind::DuplicateSpecialKey
            | ValidationErrorKind::MisplacedSpecialKey => Self::Prefixes,
            ValidationErrorKind::DuplicateOutput => Self::Outputs,
            ValidationErrorKind::UnresolvableLayout | ValidationErrorKind::SequenceLength => {
                Self::Sequences
            }
            ValidationErrorKind::MissingAnalyzerEntry
            | ValidationErrorKind::TierMismatch
            | ValidationErrorKind::KeyMismatch
            | ValidationErrorKind::UncoveredCharacter
            | ValidationErrorKind::DuplicateInput
            | ValidationErrorKind::SequenceCollision
            | ValidationErrorKind::UnresolvedInput
            | ValidationErrorKind::RoundTripMismatch => Self::Artifacts,
        }
    }
}

/// One error or warning.
#[derive(Debug, Serialize)]
pub struct ValidationMessage {
    /// `error` or `warning`
    pub severity: String,
    /// Error kind, absent for warnings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub kind: Option<ValidationErrorKind>,
    /// Message text
    pub message: String,
    /// Grid location, when known
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<ValidationLocation>,
    /// How to fix it
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

/// Layer and grid position of a finding.
#[derive(Debug, Serialize)]
pub struct ValidationLocation {
    /// Layer number
    pub layer: u8,
    /// Grid position
    pub position: ValidationPosition,
}

/// Grid row and column.
#[derive(Debug, Serialize)]
pub struct ValidationPosition {
    /// Row
    pub row: u8,
    /// Column
    pub col: u8,
}

impl ValidationResponse {
    /// Converts a report. Each error fails its check group; warnings mark
    /// `warning_group` unless it already failed.
    #[must_use]
    pub fn from_report(report: &ValidationReport, warning_group: CheckGroup) -> Self {
        let mut checks = ValidationChecks::all_passed();
        let mut messages = Vec::new();

        for error in &report.errors {
            *checks.slot(error.kind.into()) = "failed".to_string();

            let location = match (error.layer, error.row, error.col) {
                (Some(layer), Some(row), Some(col)) => Some(ValidationLocation {
                    layer,
                    position: ValidationPosition { row, col },
                }),
                _ => None,
            };

            messages.push(ValidationMessage {
                severity: "error".to_string(),
                kind: Some(error.kind),
                message: error.message.clone(),
                location,
                suggestion: error.suggestion.clone(),
            });
        }

        for warning in &report.warnings {
            let slot = checks.slot(warning_group);
            if *slot == "passed" {
                *slot = "warning".to_string();
            }
            messages.push(ValidationMessage {
                severity: "warning".to_string(),
                kind: None,
                message: warning.message.clone(),
                location: None,
                suggestion: None,
            });
        }

        Self {
            valid: report.is_valid(),
            errors: messages,
            checks,
        }
    }

    /// True when any message is a warning.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        self.errors.iter().any(|m| m.severity == "warning")
    }

    /// Prints the response as pretty JSON.
    pub fn print_json(&self) -> CliResult<()> {
        let json = serde_json::to_string_pretty(self)
            .map_err(|e| CliError::io(format!("Failed to serialize JSON: {e}")))?;
        println!("{json}");
        Ok(())
    }

    /// Prints the issue list with ✗/⚠ markers.
    pub fn print_issues(&self) {
        if self.errors.is_empty() {
            return;
        }

        println!("\nIssues:");
        for msg in &self.errors {
            let prefix = if msg.severity == "error" { "  ✗" } else { "  ⚠" };
            if let Some(loc) = &msg.location {
                println!(
                    "{} [Layer {} ({}, {})] {}",
                    prefix, loc.layer, loc.position.row, loc.position.col, msg.message
                );
            } else {
                println!("{} {}", prefix, msg.message);
            }
            if let Some(suggestion) = &msg.suggestion {
                println!("      → {suggestion}");
            }
        }
    }

    /// Maps the outcome to the command result.
    pub fn into_result(self, strict: bool, failure: &str) -> CliResult<()> {
        if !self.valid {
            return Err(CliError::validation(failure));
        }
        if strict && self.has_warnings() {
            return Err(CliError::validation("Warnings found in strict mode"));
        }
        Ok(())
    }
}
