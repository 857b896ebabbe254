//! Application-wide constants.
//!
//! This module defines constants used throughout the application,
//! including the application name and the identifiers written into exports.

/// The display name of the application (human-readable, with proper capitalization).
pub const APP_NAME: &str = "Shingetsu Layout Tools";

/// The binary name of the application (used in command examples, lowercase with hyphens).
pub const APP_BINARY_NAME: &str = "shingetsu";

/// Environment variable overriding the configuration directory.
pub const CONFIG_DIR_ENV: &str = "SHINGETSU_CONFIG_DIR";

/// Default file stem for exported artifacts.
pub const DEFAULT_EXPORT_STEM: &str = "shingetsu";

/// Karabiner variable holding the pending prefix shift.
pub const KARABINER_SHIFT_VARIABLE: &str = "shingetsu_shift";

/// Karabiner variable remembering the last kana that accepts the modifier key.
pub const KARABINER_LAST_VARIABLE: &str = "shingetsu_last";
