//! Parsing and serialization for the file formats the toolkit reads and writes.
//!
//! This module handles reading and writing kana layouts from Markdown, and the
//! schemas of the three external tools: keyboard_analyzer JSON, hazkey romaji
//! tables and Karabiner-Elements rule files.

pub mod analyzer_json;
pub mod karabiner_json;
pub mod layout;
pub mod romaji_table;
pub mod template_gen;

// Re-export commonly used functions
pub use analyzer_json::parse_analyzer_json;
pub use karabiner_json::parse_karabiner_json;
pub use layout::parse_markdown_layout;
pub use romaji_table::parse_romaji_table;
pub use template_gen::save_markdown_layout;
