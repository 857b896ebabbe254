//! Data models for kana layouts, layers, and the resolved key mapping.
//!
//! This module contains the core data structures used throughout the application.
//! Models are independent of file formats and the CLI.

pub mod key;
pub mod layer;
pub mod layout;
pub mod mapping;

// Re-export all model types
pub use key::{Arrangement, PhysicalKey};
pub use layer::{KeyOutput, Layer, ShiftState};
pub use layout::{Layout, LayoutMetadata};
pub use mapping::{CharacterPath, KeySequence, LayoutMapping, MappingEntry, SkippedDerivation};
