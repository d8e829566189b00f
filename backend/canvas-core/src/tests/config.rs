// Unit tests for config load/save/validate

use crate::config::{AppConfig, TimingConfig};

use tempfile::tempdir;

/// **VALUE**: Verifies a missing config file yields defaults instead of an
/// error.
///
/// **WHY THIS MATTERS**: First launch has no config. Erroring there would
/// make the viewer unusable out of the box.
#[test]
fn given_missing_config_file_when_loaded_then_defaults_returned() {
    let dir = tempdir().expect("temp dir");

    let config = AppConfig::load(dir.path()).expect("defaults load");

    assert_eq!(config.version, 1);
    assert_eq!(config.server.base_url, crate::CANVAS_SERVER_BASE_URL);
    assert_eq!(config.timing.reconnect_delay_ms, 3000);
    assert_eq!(config.timing.connected_notice_ms, 1200);
    assert_eq!(config.timing.settle_delay_ms, 250);
}

/// **VALUE**: Verifies save/load round-trips through the atomic write path.
///
/// **BUG THIS CATCHES**: Would catch the temp-file rename leaving the real
/// path untouched, or serialization dropping fields.
#[test]
fn given_saved_config_when_loaded_then_round_trips() {
    let dir = tempdir().expect("temp dir");
    let mut config = AppConfig::default();
    config.server.base_url = "https://canvas.example".to_string();
    config.timing.reconnect_delay_ms = 5000;

    config.save(dir.path()).expect("save succeeds");
    let loaded = AppConfig::load(dir.path()).expect("load succeeds");

    assert_eq!(loaded.server.base_url, "https://canvas.example");
    assert_eq!(loaded.timing.reconnect_delay_ms, 5000);
}

/// **VALUE**: Verifies a corrupted config file is an error, not silently
/// replaced.
///
/// **WHY THIS MATTERS**: Silent replacement would throw away a user's edits
/// on any typo; the caller decides whether to fall back.
#[test]
fn given_corrupted_config_file_when_loaded_then_parse_error() {
    let dir = tempdir().expect("temp dir");
    std::fs::write(dir.path().join("config.json"), "{not json").expect("write");

    assert!(AppConfig::load(dir.path()).is_err());
}

/// **VALUE**: Verifies validation rejects the values the rest of the system
/// assumes away: bad versions, non-http(s) base URLs, hyperactive reconnect
/// delays.
///
/// **BUG THIS CATCHES**: Would catch a base URL like `ftp://` reaching the
/// socket-scheme mapping, which only understands http and https.
#[test]
fn given_invalid_values_when_validated_then_rejected() {
    let mut config = AppConfig::default();
    config.version = 0;
    assert!(config.validate().is_err(), "version 0 rejected");

    let mut config = AppConfig::default();
    config.server.base_url = String::new();
    assert!(config.validate().is_err(), "empty base_url rejected");

    let mut config = AppConfig::default();
    config.server.base_url = "ftp://example".to_string();
    assert!(config.validate().is_err(), "non-http scheme rejected");

    let mut config = AppConfig::default();
    config.timing.reconnect_delay_ms = 10;
    assert!(config.validate().is_err(), "sub-100ms reconnect rejected");

    assert!(AppConfig::default().validate().is_ok());
}

/// **VALUE**: Verifies serde defaults fill absent sections, so old config
/// files keep working when new sections appear.
#[test]
fn given_partial_config_json_when_parsed_then_defaults_fill_gaps() {
    let partial = r#"{ "server": { "base_url": "http://example:9000" } }"#;

    let config: AppConfig = serde_json::from_str(partial).expect("partial parses");

    assert_eq!(config.version, 1);
    assert_eq!(config.server.base_url, "http://example:9000");
    assert_eq!(config.timing.reconnect_delay_ms, 3000);
}

/// **VALUE**: Verifies the Duration accessors convert milliseconds exactly.
#[test]
fn given_timing_config_when_converted_then_durations_match() {
    let timing = TimingConfig {
        reconnect_delay_ms: 3000,
        connected_notice_ms: 1200,
        settle_delay_ms: 250,
    };

    assert_eq!(timing.reconnect_delay().as_millis(), 3000);
    assert_eq!(timing.connected_notice().as_millis(), 1200);
    assert_eq!(timing.settle_delay().as_millis(), 250);
}
