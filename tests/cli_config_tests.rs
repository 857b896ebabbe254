//! End-to-end tests for `shingetsu config` commands.

use std::fs;
use tempfile::TempDir;

mod fixtures;
use fixtures::*;

// ============================================================================
// Show Command Tests
// ============================================================================

#[test]
fn test_config_show_default() {
    let config_dir = TempDir::new().unwrap();

    let output = run(config_dir.path(), &["config", "show"]);

    assert_eq!(
        output.status.code(),
        Some(0),
        "Show config should succeed. stderr: {}",
        stderr(&output)
    );
    let text = stdout(&output);
    assert!(text.contains("Output Directory"));
    assert!(text.contains("qwerty, colemak"));
}

#[test]
fn test_config_show_json_format() {
    let config_dir = TempDir::new().unwrap();

    let output = run(config_dir.path(), &["config", "show", "--json"]);

    assert_eq!(output.status.code(), Some(0));
    let json = stdout_json(&output);
    assert_eq!(json["paths"]["output_dir"], ".");
    assert_eq!(json["export"]["arrangements"][0], "qwerty");
    assert_eq!(json["export"]["arrangements"][1], "colemak");
    assert_eq!(json["export"]["timestamp_suffix"], false);
    assert_eq!(json["export"]["stem"], "shingetsu");
    assert!(json["config_file"]
        .as_str()
        .unwrap()
        .ends_with("config.toml"));
}

#[test]
fn test_config_show_corrupt_file() {
    let config_dir = TempDir::new().unwrap();
    fs::write(config_dir.path().join("config.toml"), "not = [valid").unwrap();

    let output = run(config_dir.path(), &["config", "show"]);

    assert_eq!(output.status.code(), Some(2));
    assert!(stderr(&output).contains("Failed to load configuration"));
}

// ============================================================================
// Set Command Tests
// ============================================================================

#[test]
fn test_config_set_then_show() {
    let config_dir = TempDir::new().unwrap();

    let output = run(
        config_dir.path(),
        &[
            "config",
            "set",
            "--arrangements",
            "colemak",
            "--timestamp",
            "true",
            "--stem",
            "kana",
        ],
    );
    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(config_dir.path().join("config.toml").exists());

    let json = stdout_json(&run(config_dir.path(), &["config", "show", "--json"]));
    assert_eq!(json["export"]["arrangements"].as_array().unwrap().len(), 1);
    assert_eq!(json["export"]["arrangements"][0], "colemak");
    assert_eq!(json["export"]["timestamp_suffix"], true);
    assert_eq!(json["export"]["stem"], "kana");
}

#[test]
fn test_config_arrangements_drive_export() {
    let config_dir = TempDir::new().unwrap();
    let out = TempDir::new().unwrap();

    let output = run(
        config_dir.path(),
        &["config", "set", "--arrangements", "qwerty"],
    );
    assert_eq!(output.status.code(), Some(0));

    export_builtin(config_dir.path(), out.path());
    assert_eq!(
        file_names(out.path()),
        vec![
            "shingetsu-ansi-qwerty.tsv",
            "shingetsu-karabiner-qwerty.json",
            "shingetsu_analyzer.json",
        ]
    );
}

#[test]
fn test_config_set_requires_an_option() {
    let config_dir = TempDir::new().unwrap();

    let output = run(config_dir.path(), &["config", "set"]);

    assert_eq!(output.status.code(), Some(1));
    assert!(stderr(&output).contains("At least one configuration option"));
}

#[test]
fn test_config_set_rejects_invalid_values() {
    let config_dir = TempDir::new().unwrap();

    let output = run(
        config_dir.path(),
        &["config", "set", "--arrangements", "qwerty,qwerty"],
    );
    assert_eq!(output.status.code(), Some(1));

    let output = run(config_dir.path(), &["config", "set", "--stem", "a/b"]);
    assert_eq!(output.status.code(), Some(1));

    // Unknown values are rejected by argument parsing
    let output = run(
        config_dir.path(),
        &["config", "set", "--arrangements", "dvorak"],
    );
    assert_eq!(output.status.code(), Some(2));

    assert!(!config_dir.path().join("config.toml").exists());
}

#[test]
fn test_config_set_replaces_corrupt_file() {
    let config_dir = TempDir::new().unwrap();
    let path = config_dir.path().join("config.toml");
    fs::write(&path, "not = [valid").unwrap();

    let output = run(config_dir.path(), &["config", "set", "--stem", "kana"]);

    assert_eq!(output.status.code(), Some(0), "stderr: {}", stderr(&output));
    assert!(stderr(&output).contains("Unreadable configuration replaced with defaults"));

    let json = stdout_json(&run(config_dir.path(), &["config", "show", "--json"]));
    assert_eq!(json["export"]["stem"], "kana");
    assert_eq!(json["export"]["arrangements"][1], "colemak");
}
