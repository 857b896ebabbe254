//! Shingetsu Layout Library
//!
//! This library provides the core of the Shingetsu (新月配列) prefix-shift
//! kana layout tools: parsing layout files, resolving every character to a
//! key sequence, exporting keyboard_analyzer, hazkey and Karabiner-Elements
//! files, and cross-checking exported files against each other.

// Module declarations
pub mod cli;
pub mod config;
pub mod constants;
pub mod export;
pub mod kana;
pub mod logging;
pub mod models;
pub mod parser;
pub mod services;
pub mod validation;
