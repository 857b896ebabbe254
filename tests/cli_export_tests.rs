//! End-to-end tests for `shingetsu export` command.

use std::fs;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

#[test]
fn test_export_builtin_writes_all_files() {
    let config_dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let output = run(
        config_dir.path(),
        &["export", "--out-dir", out.path().to_str().unwrap()],
    );

    assert_eq!(
        output.status.code(),
        Some(0),
        "Export should succeed. stderr: {}",
        stderr(&output)
    );
    assert!(stdout(&output).contains("✓"));

    assert_eq!(
        file_names(out.path()),
        vec![
            "shingetsu-ansi-colemak.tsv",
            "shingetsu-ansi-qwerty.tsv",
            "shingetsu-karabiner-colemak.json",
            "shingetsu-karabiner-qwerty.json",
            "shingetsu_analyzer.json",
        ]
    );

    let analyzer: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.path().join("shingetsu_analyzer.json")).unwrap(),
    )
    .unwrap();
    assert!(analyzer.is_object());

    let romaji = fs::read_to_string(out.path().join("shingetsu-ansi-qwerty.tsv")).unwrap();
    assert!(romaji.starts_with('#'));
    assert!(romaji.lines().any(|line| line == "a\tか"));
    assert!(romaji.lines().any(|line| line == "m\t\tは"));

    let colemak = fs::read_to_string(out.path().join("shingetsu-ansi-colemak.tsv")).unwrap();
    assert!(colemak.lines().any(|line| line == "a\tか"));
    assert!(colemak.lines().any(|line| line.starts_with("s\t\t")));
}

#[test]
fn test_export_filters_format_and_arrangement() {
    let config_dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let output = run(
        config_dir.path(),
        &[
            "export",
            "--out-dir",
            out.path().to_str().unwrap(),
            "--name",
            "My Kana",
            "--format",
            "romaji",
            "--arrangement",
            "colemak",
        ],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(file_names(out.path()), vec!["my_kana-ansi-colemak.tsv"]);
}

#[test]
fn test_export_timestamp_suffix() {
    let config_dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let output = run(
        config_dir.path(),
        &[
            "export",
            "--out-dir",
            out.path().to_str().unwrap(),
            "--format",
            "analyzer",
            "--timestamp",
        ],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    let names = file_names(out.path());
    assert_eq!(names.len(), 1);
    // shingetsu_YYYYMMDD-HHMMSS_analyzer.json
    assert!(names[0].starts_with("shingetsu_"));
    assert!(names[0].ends_with("_analyzer.json"));
    assert_eq!(names[0].len(), "shingetsu_20260101-000000_analyzer.json".len());
}

#[test]
fn test_export_from_layout_file() {
    let config_dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let (layout_path, _temp_dir) = create_temp_layout_file(&builtin_layout());

    let output = run(
        config_dir.path(),
        &[
            "export",
            "--layout",
            layout_path.to_str().unwrap(),
            "--out-dir",
            out.path().to_str().unwrap(),
            "--format",
            "karabiner",
        ],
    );

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert_eq!(
        file_names(out.path()),
        vec![
            "shingetsu-karabiner-colemak.json",
            "shingetsu-karabiner-qwerty.json",
        ]
    );

    let karabiner: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(out.path().join("shingetsu-karabiner-qwerty.json")).unwrap(),
    )
    .unwrap();
    assert!(karabiner["rules"][0]["manipulators"].is_array());
}

#[test]
fn test_export_uses_configured_output_dir() {
    let config_dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let target = out.path().join("configured");

    let output = run(
        config_dir.path(),
        &["config", "set", "--output-dir", target.to_str().unwrap()],
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));

    let output = run(config_dir.path(), &["export", "--format", "analyzer"]);
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(target.join("shingetsu_analyzer.json").exists());
}

#[test]
fn test_export_refuses_invalid_layout() {
    let config_dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();
    let target = out.path().join("never");
    let (layout_path, _temp_dir) = create_temp_layout_file(&layout_with_duplicate_output());

    let output = run(
        config_dir.path(),
        &[
            "export",
            "--layout",
            layout_path.to_str().unwrap(),
            "--out-dir",
            target.to_str().unwrap(),
        ],
    );

    assert_eq!(
        output.status.code(),
        Some(1),
        "Invalid layout should exit with code 1"
    );
    assert!(stderr(&output).contains("nothing was exported"));
    assert!(!target.exists(), "No files should be written");
}

#[test]
fn test_export_missing_layout_file() {
    let config_dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let output = run(
        config_dir.path(),
        &[
            "export",
            "--layout",
            "/nonexistent/layout.md",
            "--out-dir",
            out.path().to_str().unwrap(),
        ],
    );

    assert_eq!(output.status.code(), Some(2), "I/O errors exit with code 2");
    assert!(stderr(&output).contains("Failed to load layout"));
}
