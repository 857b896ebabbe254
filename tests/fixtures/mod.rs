//! Shared test fixtures for E2E CLI tests.
#![allow(dead_code)] // Not every test binary uses every fixture

use shingetsu::models::{KeyOutput, Layout, PhysicalKey, ShiftState};
use shingetsu::services::LayoutService;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::{Command, Output};
use tempfile::TempDir;

/// Path to the shingetsu binary
pub fn shingetsu_bin() -> &'static str {
    env!("CARGO_BIN_EXE_shingetsu")
}

/// Command for the binary with an isolated config directory.
///
/// Every test passes its own directory so the user's configuration is
/// never read or written.
pub fn shingetsu_cmd(config_dir: &Path) -> Command {
    let mut cmd = Command::new(shingetsu_bin());
    cmd.env("SHINGETSU_CONFIG_DIR", config_dir);
    cmd.env_remove("RUST_LOG");
    cmd
}

/// Runs the binary with `args` and returns its output.
pub fn run(config_dir: &Path, args: &[&str]) -> Output {
    shingetsu_cmd(config_dir)
        .args(args)
        .output()
        .expect("Failed to execute command")
}

/// Stdout as text.
pub fn stdout(output: &Output) -> String {
    String::from_utf8_lossy(&output.stdout).to_string()
}

/// Stderr as text.
pub fn stderr(output: &Output) -> String {
    String::from_utf8_lossy(&output.stderr).to_string()
}

/// Parses stdout as JSON.
pub fn stdout_json(output: &Output) -> serde_json::Value {
    serde_json::from_str(&stdout(output)).expect("Should parse JSON output")
}

/// The built-in layout.
pub fn builtin_layout() -> Layout {
    LayoutService::builtin().expect("built-in layout parses")
}

/// Built-in layout with か also placed on the ☆ layer.
pub fn layout_with_duplicate_output() -> Layout {
    let mut layout = builtin_layout();
    layout
        .set_output(
            PhysicalKey::new(0, 0),
            ShiftState::ShiftA,
            KeyOutput::Text("か".to_string()),
        )
        .unwrap();
    layout
}

/// Built-in layout with the ☆ prefix key removed.
pub fn layout_without_shift_a() -> Layout {
    let mut layout = builtin_layout();
    layout
        .set_output(PhysicalKey::new(1, 7), ShiftState::Unshifted, KeyOutput::Blank)
        .unwrap();
    layout
}

/// Built-in layout with ヶ (no romaji spelling) on the blank ★ quote key.
pub fn layout_with_warning() -> Layout {
    let mut layout = builtin_layout();
    layout
        .set_output(
            PhysicalKey::new(1, 10),
            ShiftState::ShiftB,
            KeyOutput::Text("ヶ".to_string()),
        )
        .unwrap();
    layout
}

/// Writes a layout to a temp file.
///
/// Returns the file path and the TempDir (which must be kept alive).
pub fn create_temp_layout_file(layout: &Layout) -> (PathBuf, TempDir) {
    let temp_dir = TempDir::new().expect("Failed to create temp dir");
    let file_path = temp_dir.path().join("test_layout.md");
    LayoutService::save(layout, &file_path).expect("Failed to save layout");
    (file_path, temp_dir)
}

/// Exports the built-in layout into `out_dir` with default names.
pub fn export_builtin(config_dir: &Path, out_dir: &Path) {
    let output = run(
        config_dir,
        &["export", "--out-dir", out_dir.to_str().unwrap()],
    );
    assert_eq!(
        output.status.code(),
        Some(0),
        "export failed. stderr: {}",
        stderr(&output)
    );
}

/// Sorted file names in a directory.
pub fn file_names(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .expect("Failed to read dir")
        .map(|entry| entry.unwrap().file_name().to_string_lossy().to_string())
        .collect();
    names.sort();
    names
}
