//! Integration test: configuration
//!
//! Settings normalization and TOML loading of easel.toml.

use std::path::PathBuf;

use easel_core::{CoreError, EaselConfig, LeakTracking, Settings};

fn temp_config(name: &str, content: &str) -> PathBuf {
    let path = std::env::temp_dir().join(format!("easel-{}-{}.toml", name, std::process::id()));
    std::fs::write(&path, content).expect("write temp config");
    path
}

#[test]
fn test_normalized_defaults() {
    let settings = Settings::default().normalized();
    assert!(!settings.defer_api_calls);
    assert_eq!(settings.sampler_cache_size, 32);
    assert_eq!(settings.leak_tracking, LeakTracking::Count);

    let custom = Settings {
        sampler_cache_size: 4,
        ..Settings::deferred()
    }
    .normalized();
    assert!(custom.defer_api_calls);
    assert_eq!(custom.sampler_cache_size, 4);
}

#[test]
fn test_parse_partial_toml() {
    let config: EaselConfig = toml::from_str(
        r#"
        [settings]
        defer_api_calls = true
        leak_tracking = "origin"
        "#,
    )
    .expect("parse config");
    assert!(config.settings.defer_api_calls);
    assert_eq!(config.settings.sampler_cache_size, 0);
    assert_eq!(config.settings.leak_tracking, LeakTracking::Origin);
    assert_eq!(config.logging.filter, "info");
}

#[test]
fn test_unknown_leak_tracking_mode_is_rejected() {
    let result: Result<EaselConfig, _> = toml::from_str(
        r#"
        [settings]
        leak_tracking = "verbose"
        "#,
    );
    assert!(result.is_err());
}

#[test]
fn test_load_from_file() {
    let path = temp_config(
        "load",
        "[settings]\nsampler_cache_size = 8\n\n[logging]\nfilter = \"debug\"\n",
    );
    let config = EaselConfig::load(&path).expect("load config");
    std::fs::remove_file(&path).ok();

    assert_eq!(config.settings.sampler_cache_size, 8);
    assert_eq!(config.logging.filter, "debug");
}

#[test]
fn test_load_reports_parse_errors() {
    let path = temp_config("broken", "[settings\n");
    let result = EaselConfig::load(&path);
    std::fs::remove_file(&path).ok();
    assert!(matches!(result, Err(CoreError::Toml(_))));
}

#[test]
fn test_missing_file_falls_back_to_defaults() {
    let path = std::env::temp_dir().join("easel-does-not-exist.toml");
    assert!(matches!(EaselConfig::load(&path), Err(CoreError::Io(_))));
    assert_eq!(EaselConfig::load_or_default(&path), EaselConfig::default());
}

#[test]
fn test_written_config_loads_back() {
    let config = EaselConfig {
        settings: Settings {
            defer_api_calls: true,
            sampler_cache_size: 16,
            leak_tracking: LeakTracking::Off,
        },
        ..EaselConfig::default()
    };
    let text = config.to_toml_string().expect("serialize config");
    let parsed: EaselConfig = toml::from_str(&text).expect("parse written config");
    assert_eq!(parsed, config);
}
