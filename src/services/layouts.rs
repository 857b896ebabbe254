//! Layout file I/O service.
//!
//! This module centralizes all layout file operations, providing a consistent
//! interface for loading and saving layout files and for the built-in
//! Shingetsu layout.

use anyhow::{Context, Result};
use std::path::Path;

use crate::{models::Layout, parser};

/// Markdown source of the built-in layout.
pub const BUILTIN_LAYOUT: &str = include_str!("../../layouts/shingetsu.md");

/// Service for managing layout file I/O operations.
pub struct LayoutService;

impl LayoutService {
    /// Loads a layout from a Markdown file.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the layout file to load
    ///
    /// # Returns
    ///
    /// * `Ok(Layout)` - Successfully parsed layout
    /// * `Err(...)` - File not found, parse error, or I/O error
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use shingetsu::services::LayoutService;
    ///
    /// let layout = LayoutService::load(Path::new("my_layout.md"))?;
    /// # Ok::<(), anyhow::Error>(())
    /// ```
    pub fn load(path: &Path) -> Result<Layout> {
        parser::parse_markdown_layout(path)
            .with_context(|| format!("Failed to load layout from {}", path.display()))
    }

    /// Saves a layout to a Markdown file.
    ///
    /// This performs an atomic write using a temp file + rename pattern to ensure
    /// the file is never left in a corrupted state.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use std::path::Path;
    /// use shingetsu::services::LayoutService;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let layout = LayoutService::builtin()?;
    /// LayoutService::save(&layout, Path::new("shingetsu.md"))?;
    /// # Ok(())
    /// # }
    /// ```
    pub fn save(layout: &Layout, path: &Path) -> Result<()> {
        parser::save_markdown_layout(layout, path)
            .with_context(|| format!("Failed to save layout to {}", path.display()))
    }

    /// The Shingetsu layout shipped with the binary.
    pub fn builtin() -> Result<Layout> {
        parser::layout::parse_markdown_layout_str(BUILTIN_LAYOUT)
            .context("Failed to parse the built-in layout")
    }

    /// Loads `path` when given, the built-in layout otherwise.
    pub fn load_or_builtin(path: Option<&Path>) -> Result<Layout> {
        match path {
            Some(path) => Self::load(path),
            None => {
                tracing::debug!("No layout file given, using the built-in layout");
                Self::builtin()
            }
        }
    }
}

/// Sanitizes a name for use as an export file stem.
///
/// Replaces problematic characters with underscores and converts to lowercase.
///
/// # Examples
///
/// ```
/// # use shingetsu::services::layouts::sanitize_filename;
/// assert_eq!(sanitize_filename("My Layout"), "my_layout");
/// assert_eq!(sanitize_filename("Layout/Name:Test"), "layout_name_test");
/// ```
#[must_use]
pub fn sanitize_filename(name: &str) -> String {
    name.trim()
        .replace(['/', '\\', ':', ' '], "_")
        .to_lowercase()
}
