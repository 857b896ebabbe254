//! Layout and metadata data structures.

use crate::models::key::PhysicalKey;
use crate::models::layer::{KeyOutput, Layer, ShiftState};
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// File metadata embedded in YAML frontmatter.
///
/// # Validation
///
/// - name must be non-empty, max 100 characters
/// - created must be <= modified
/// - tags must be lowercase, hyphen/alphanumeric only
/// - version must match supported versions (currently "1.0")
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LayoutMetadata {
    /// Layout name (e.g., "新月配列 (Shingetsu Layout)")
    pub name: String,
    /// Long description
    #[serde(default)]
    pub description: String,
    /// Creator name
    #[serde(default)]
    pub author: String,
    /// Creation timestamp (ISO 8601)
    pub created: DateTime<Utc>,
    /// Last modification timestamp (ISO 8601)
    pub modified: DateTime<Utc>,
    /// Searchable keywords
    #[serde(default)]
    pub tags: Vec<String>,
    /// Schema version (e.g., "1.0")
    pub version: String,
}

impl LayoutMetadata {
    /// Creates new metadata with default values.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        Self::validate_name(&name)?;

        let now = Utc::now();
        Ok(Self {
            name,
            description: String::new(),
            author: String::new(),
            created: now,
            modified: now,
            tags: Vec::new(),
            version: "1.0".to_string(),
        })
    }

    /// Validates metadata name.
    pub(crate) fn validate_name(name: &str) -> Result<()> {
        if name.trim().is_empty() {
            anyhow::bail!("Layout name cannot be empty");
        }

        let len = name.chars().count();
        if len > 100 {
            anyhow::bail!(
                "Layout name '{name}' exceeds maximum length of 100 characters (got {len})"
            );
        }

        Ok(())
    }

    /// Validates tag format (lowercase, hyphens, alphanumeric).
    pub(crate) fn validate_tag(tag: &str) -> Result<()> {
        if tag.is_empty() {
            anyhow::bail!("Tag cannot be empty");
        }

        if !tag
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
        {
            anyhow::bail!(
                "Tag '{tag}' must be lowercase with hyphens and alphanumeric characters only"
            );
        }

        Ok(())
    }

    /// Updates the modification timestamp to now.
    pub fn touch(&mut self) {
        self.modified = Utc::now();
    }
}

/// Complete kana layout: metadata plus the three authored tiers.
///
/// # Validation
///
/// - Exactly three layers, numbered 0 (unshifted), 1 (shift-A), 2 (shift-B)
/// - Layer numbers are sequential without gaps
///
/// Semantic rules (prefix placement, duplicate outputs, sequence lengths)
/// are checked by [`crate::validation::LayoutValidator`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Layout {
    /// File metadata
    pub metadata: LayoutMetadata,
    /// Ordered list of layers (0-2)
    pub layers: Vec<Layer>,
}

impl Layout {
    /// Creates a layout with three blank layers.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let metadata = LayoutMetadata::new(name)?;
        let mut layout = Self {
            metadata,
            layers: Vec::new(),
        };
        for state in ShiftState::GRID {
            if let Some(number) = state.layer_number() {
                layout.add_layer(Layer::new(number, state.default_name())?)?;
            }
        }
        Ok(layout)
    }

    /// Adds a layer to this layout.
    pub fn add_layer(&mut self, layer: Layer) -> Result<()> {
        if self.layers.len() >= ShiftState::GRID.len() {
            anyhow::bail!(
                "A layout has exactly {} layers (unshifted, shift A, shift B)",
                ShiftState::GRID.len()
            );
        }

        // Validate sequential layer numbers
        let expected_number = self.layers.len();
        if usize::from(layer.number) != expected_number {
            if expected_number == 0 {
                anyhow::bail!("First layer must have number 0, got {}", layer.number);
            }
            anyhow::bail!(
                "Layer numbers must be sequential. Expected layer {}, got {}",
                expected_number,
                layer.number
            );
        }

        self.layers.push(layer);
        Ok(())
    }

    /// Layer for a grid tier.
    #[must_use]
    pub fn layer(&self, state: ShiftState) -> Option<&Layer> {
        state
            .layer_number()
            .and_then(|number| self.layers.get(usize::from(number)))
    }

    /// Mutable layer for a grid tier.
    pub fn layer_mut(&mut self, state: ShiftState) -> Option<&mut Layer> {
        state
            .layer_number()
            .and_then(|number| self.layers.get_mut(usize::from(number)))
    }

    /// Output at a key in a grid tier; blank for the diacritic tier.
    #[must_use]
    pub fn output(&self, key: PhysicalKey, state: ShiftState) -> &KeyOutput {
        self.layer(state)
            .map_or(&KeyOutput::Blank, |layer| layer.get(key))
    }

    /// Assigns an output in a grid tier.
    pub fn set_output(&mut self, key: PhysicalKey, state: ShiftState, output: KeyOutput) -> Result<()> {
        let layer = self
            .layer_mut(state)
            .ok_or_else(|| anyhow::anyhow!("Layout has no {state} layer"))?;
        layer.set(key, output)
    }

    /// Validates layout structure.
    pub fn validate(&self) -> Result<()> {
        if self.layers.len() != ShiftState::GRID.len() {
            anyhow::bail!(
                "Layout must have {} layers (unshifted, shift A, shift B), found {}",
                ShiftState::GRID.len(),
                self.layers.len()
            );
        }

        for (idx, layer) in self.layers.iter().enumerate() {
            if usize::from(layer.number) != idx {
                anyhow::bail!(
                    "Layer at index {} has number {} (expected {})",
                    idx,
                    layer.number,
                    idx
                );
            }
        }

        Ok(())
    }

    /// Returns true if every grid tier has the same outputs as `other`.
    ///
    /// Metadata such as timestamps and layer names is ignored.
    #[must_use]
    pub fn same_grids(&self, other: &Self) -> bool {
        ShiftState::GRID.iter().all(|state| {
            PhysicalKey::all().all(|key| self.output(key, *state) == other.output(key, *state))
        })
    }
}
