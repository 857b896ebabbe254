//! Layout and artifact validation.
//!
//! Validators never fail on bad input; they collect typed errors and
//! warnings in a [`ValidationReport`] and leave the decision to the caller.

// Allow format! appended to String - more readable for building messages
#![allow(clippy::format_push_string)]

pub mod consistency;
pub mod layout;

pub use consistency::{ConsistencyChecker, ExportBundle};
pub use layout::LayoutValidator;

use crate::models::PhysicalKey;
use serde::Serialize;

/// Validation result with specific errors and warnings.
#[derive(Debug, Clone, Default)]
pub struct ValidationReport {
    /// Problems that make the layout or artifacts unusable
    pub errors: Vec<ValidationError>,
    /// Non-critical findings
    pub warnings: Vec<ValidationWarning>,
}

impl ValidationReport {
    /// Creates a new empty validation report.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            errors: Vec::new(),
            warnings: Vec::new(),
        }
    }

    /// Returns true if there are no errors (warnings are allowed).
    #[must_use]
    pub const fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Adds an error to the report.
    pub fn add_error(&mut self, error: ValidationError) {
        self.errors.push(error);
    }

    /// Adds a warning to the report.
    pub fn add_warning(&mut self, warning: ValidationWarning) {
        self.warnings.push(warning);
    }

    /// Appends another report's findings.
    pub fn merge(&mut self, other: Self) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Returns true if any error has the given kind.
    #[must_use]
    pub fn has_error(&self, kind: ValidationErrorKind) -> bool {
        self.errors.iter().any(|error| error.kind == kind)
    }

    /// Formats the report as a user-friendly error message.
    #[must_use]
    pub fn format_message(&self) -> String {
        let mut message = String::new();

        if !self.errors.is_empty() {
            message.push_str(&format!("❌ {} validation errors:\n", self.errors.len()));
            for (idx, error) in self.errors.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, error));
            }
        }

        if !self.warnings.is_empty() {
            message.push_str(&format!("\n⚠️  {} warnings:\n", self.warnings.len()));
            for (idx, warning) in self.warnings.iter().enumerate() {
                message.push_str(&format!("  {}. {}\n", idx + 1, warning));
            }
        }

        message
    }
}

/// Validation error with context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    /// Type of validation error
    pub kind: ValidationErrorKind,
    /// Layer where the error occurred
    pub layer: Option<u8>,
    /// Grid row
    pub row: Option<u8>,
    /// Grid column
    pub col: Option<u8>,
    /// Human-readable error message
    pub message: String,
    /// Optional suggestion for fixing the error
    pub suggestion: Option<String>,
}

impl ValidationError {
    /// Creates a new validation error.
    pub fn new(kind: ValidationErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            layer: None,
            row: None,
            col: None,
            message: message.into(),
            suggestion: None,
        }
    }

    /// Sets the layer context.
    #[must_use]
    pub const fn with_layer(mut self, layer: u8) -> Self {
        self.layer = Some(layer);
        self
    }

    /// Sets the position context.
    #[must_use]
    pub const fn with_position(mut self, row: u8, col: u8) -> Self {
        self.row = Some(row);
        self.col = Some(col);
        self
    }

    /// Sets the position context from a physical key.
    #[must_use]
    pub const fn with_key(self, key: PhysicalKey) -> Self {
        self.with_position(key.row, key.col)
    }

    /// Sets a suggestion for fixing the error.
    #[must_use]
    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let (Some(layer), Some(row), Some(col)) = (self.layer, self.row, self.col) {
            write!(
                f,
                "[Layer {} ({}, {})] {}: {}",
                layer, row, col, self.kind, self.message
            )?;
        } else if let Some(layer) = self.layer {
            write!(f, "[Layer {}] {}: {}", layer, self.kind, self.message)?;
        } else {
            write!(f, "{}: {}", self.kind, self.message)?;
        }

        if let Some(suggestion) = &self.suggestion {
            write!(f, "\n    → {suggestion}")?;
        }

        Ok(())
    }
}

/// Types of validation errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// Layout does not have its three layers
    MissingLayer,
    /// A ☆ or ★ prefix key is missing
    MissingPrefix,
    /// A prefix or modifier key appears more than once
    DuplicateSpecialKey,
    /// A prefix or modifier key sits on a shift layer
    MisplacedSpecialKey,
    /// The same character is reachable by two sequences
    DuplicateOutput,
    /// Key sequences cannot be resolved from the grids
    UnresolvableLayout,
    /// A sequence is too long or too short for its tier
    SequenceLength,
    /// An artifact character has no analyzer conversion entry
    MissingAnalyzerEntry,
    /// An artifact places a character in a different tier than the analyzer
    TierMismatch,
    /// An artifact types a character with other keys than the analyzer
    KeyMismatch,
    /// An analyzer character is not typed by any remapper rule
    UncoveredCharacter,
    /// Two rows or manipulators share the same input
    DuplicateInput,
    /// Two different characters share one key sequence
    SequenceCollision,
    /// An artifact input cannot be expanded to physical keys
    UnresolvedInput,
    /// Re-exporting the imported analyzer does not reproduce an artifact
    RoundTripMismatch,
}

impl std::fmt::Display for ValidationErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MissingLayer => write!(f, "Missing Layer"),
            Self::MissingPrefix => write!(f, "Missing Prefix"),
            Self::DuplicateSpecialKey => write!(f, "Duplicate Special Key"),
            Self::MisplacedSpecialKey => write!(f, "Misplaced Special Key"),
            Self::DuplicateOutput => write!(f, "Duplicate Output"),
            Self::UnresolvableLayout => write!(f, "Unresolvable Layout"),
            Self::SequenceLength => write!(f, "Sequence Length"),
            Self::MissingAnalyzerEntry => write!(f, "Missing Analyzer Entry"),
            Self::TierMismatch => write!(f, "Tier Mismatch"),
            Self::KeyMismatch => write!(f, "Key Mismatch"),
            Self::UncoveredCharacter => write!(f, "Uncovered Character"),
            Self::DuplicateInput => write!(f, "Duplicate Input"),
            Self::SequenceCollision => write!(f, "Sequence Collision"),
            Self::UnresolvedInput => write!(f, "Unresolved Input"),
            Self::RoundTripMismatch => write!(f, "Round Trip Mismatch"),
        }
    }
}

/// Validation warning (non-blocking).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationWarning {
    /// Warning message
    pub message: String,
}

impl ValidationWarning {
    /// Creates a new validation warning
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
