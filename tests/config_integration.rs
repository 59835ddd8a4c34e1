//! Integration tests for configuration loading
//!
//! Tests that verify config loading from files and environment variables.

use tetra4d::config::AppConfig;
use serial_test::serial;

#[test]
#[serial]
fn test_env_override() {
    std::env::set_var("T4D_WINDOW__TITLE", "Test From Env");
    let config = AppConfig::load().unwrap();
    assert_eq!(config.window.title, "Test From Env");
    std::env::remove_var("T4D_WINDOW__TITLE");
}

#[test]
#[serial]
fn test_default_config_loading() {
    std::env::remove_var("T4D_WINDOW__TITLE");

    let config = AppConfig::load().unwrap();
    // values from config/default.toml
    assert_eq!(config.window.width, 1280);
    assert_eq!(config.camera.fov, 90.0);
    assert!(config.light.animate);
}

#[test]
#[serial]
fn test_missing_config_dir_falls_back_to_defaults() {
    let config = AppConfig::load_from("no/such/dir").unwrap();
    assert_eq!(config.window.height, AppConfig::default().window.height);
}
