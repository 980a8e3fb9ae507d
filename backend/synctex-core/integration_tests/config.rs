use synctex_core::config::{BridgeConfig, ViewerFlags};
use synctex_core::error::config::ConfigError;

use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

/// **VALUE**: A saved config loads back identically.
///
/// **WHY THIS MATTERS**: The viewer path is typed once by the user. Losing it on the
/// next start means forward search silently stops working.
#[test]
fn given_saved_config_when_loaded_then_identical() {
    // GIVEN: A non-default config
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = BridgeConfig::default();
    config.viewer.executable_path = Some(PathBuf::from("/opt/sumatra/SumatraPDF.exe"));
    config.viewer.background_color = "#1e1e1e".to_string();
    config.inverse_search.listen_port = 7777;

    // WHEN: Saved and loaded
    config.save(dir.path()).expect("Save should succeed");
    let loaded = BridgeConfig::load(dir.path()).expect("Load should succeed");

    // THEN: Same values, and no temp file left behind
    assert_eq!(loaded, config);
    assert!(!dir.path().join("config.json.tmp").exists());
}

#[test]
fn given_missing_file_when_loaded_then_defaults() {
    let dir = TempDir::new().expect("Failed to create temp dir");

    let loaded = BridgeConfig::load(dir.path()).expect("Missing file should load defaults");

    assert_eq!(loaded, BridgeConfig::default());
}

/// **VALUE**: The persisted config never contains a secret, only the variable name.
///
/// **BUG THIS CATCHES**: Someone adding a `secret` field to the config struct, which
/// would write the session secret to disk.
#[test]
fn given_saved_config_when_read_raw_then_contains_variable_name_only() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    BridgeConfig::default()
        .save(dir.path())
        .expect("Save should succeed");

    let raw = fs::read_to_string(dir.path().join("config.json")).expect("Config should exist");
    let json: serde_json::Value = serde_json::from_str(&raw).expect("Config should be JSON");

    assert_eq!(
        json["inverse_search"]["secret_env_var"],
        "SYNCTEX_BRIDGE_SECRET"
    );
    assert!(json["inverse_search"].get("secret").is_none());
}

#[test]
fn given_corrupted_file_when_loaded_then_parse_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("config.json"), "{ not json").expect("Failed to write");

    let result = BridgeConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ParseError { .. })));
}

#[test]
fn given_invalid_values_when_loaded_then_validation_error() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        dir.path().join("config.json"),
        r#"{ "version": 1, "viewer": { "background_color": "red" } }"#,
    )
    .expect("Failed to write");

    let result = BridgeConfig::load(dir.path());

    assert!(matches!(result, Err(ConfigError::ValidationError { .. })));
}

#[test]
fn given_invalid_config_when_saved_then_nothing_written() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    let mut config = BridgeConfig::default();
    config.inverse_search.secret_env_var = String::new();

    assert!(config.save(dir.path()).is_err());
    assert!(!dir.path().join("config.json").exists());
}

/// **VALUE**: A broken `viewer.toml` never stops the editor from launching the viewer.
///
/// **WHY THIS MATTERS**: The override file is optional. A typo in it should degrade to
/// the SumatraPDF spelling, not turn forward search off.
#[test]
fn given_broken_viewer_toml_when_loaded_then_falls_back_to_sumatra() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("viewer.toml"), "page = [").expect("Failed to write");

    let flags = ViewerFlags::load(dir.path()).expect("Load never fails");

    assert_eq!(flags, ViewerFlags::sumatra());
}

#[test]
fn given_invalid_viewer_toml_when_loaded_then_falls_back_to_sumatra() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(dir.path().join("viewer.toml"), "page = \"\"\n").expect("Failed to write");

    let flags = ViewerFlags::load(dir.path()).expect("Load never fails");

    assert_eq!(flags, ViewerFlags::sumatra());
}

#[test]
fn given_viewer_toml_override_when_loaded_then_applied() {
    let dir = TempDir::new().expect("Failed to create temp dir");
    fs::write(
        dir.path().join("viewer.toml"),
        "forward_search = \"-fwdsearch\"\nreuse_instance = \"-reuse\"\n",
    )
    .expect("Failed to write");

    let flags = ViewerFlags::load(dir.path()).expect("Load never fails");

    assert_eq!(flags.forward_search, "-fwdsearch");
    assert_eq!(flags.reuse_instance, "-reuse");
    assert_eq!(flags.inverse_search, "-inverse-search");
}
