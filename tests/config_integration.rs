//! Integration tests for configuration files
//!
//! - `config.toml` round-trips and validation
//! - `app_state.json` persistence

mod common;

use serial_plotter::config::{
    AppConfig, AppState, DataBits, Parity, SerialConfig, StopBits, BAUD_RATES,
};
use serial_plotter::ingest::DecodeErrorPolicy;
use serial_plotter::protocol::StartMarkerPolicy;
use serial_plotter::PlotterError;

#[test]
fn test_config_toml_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("config.toml");

    let mut config = AppConfig::default();
    config.serial = SerialConfig::for_port("/dev/ttyUSB0");
    config.serial.baud_rate = 9600;
    config.serial.parity = Parity::Even;
    config.serial.stop_bits = StopBits::Two;
    config.plot.window_size = 2000;
    config.protocol.decode_error_policy = DecodeErrorPolicy::Skip;
    config.protocol.start_marker_policy = StartMarkerPolicy::Ignore;
    config.protocol.max_channels = Some(3);

    config.save(&path).unwrap();
    let loaded = AppConfig::load(&path).unwrap();
    assert_eq!(loaded, config);
}

#[test]
fn test_partial_config_uses_defaults() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(
        &path,
        r#"
[serial]
baud_rate = 57600

[plot]
window_size = 50
"#,
    )
    .unwrap();

    let config = AppConfig::load(&path).unwrap();
    assert_eq!(config.serial.baud_rate, 57600);
    assert_eq!(config.serial.data_bits, DataBits::Eight);
    assert_eq!(config.plot.window_size, 50);
    assert_eq!(config.plot.tick_interval_ms, 20);
    assert_eq!(config.protocol.start_marker, '$');
    assert_eq!(config.protocol.end_marker, ';');
    assert!(BAUD_RATES.contains(&config.serial.baud_rate));
}

#[test]
fn test_invalid_markers_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");

    for body in [
        "[protocol]\nstart_marker = \";\"\n",
        "[protocol]\nstart_marker = \"7\"\n",
        "[protocol]\nend_marker = \" \"\n",
    ] {
        std::fs::write(&path, body).unwrap();
        assert!(
            matches!(AppConfig::load(&path), Err(PlotterError::Config(_))),
            "accepted {:?}",
            body
        );
    }
}

#[test]
fn test_malformed_toml_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("config.toml");
    std::fs::write(&path, "[serial\nbaud_rate = ").unwrap();
    assert!(AppConfig::load(&path).is_err());
}

#[test]
fn test_app_state_round_trip() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app_state.json");

    let mut serial = SerialConfig::for_port("COM3");
    serial.baud_rate = 19200;

    let mut state = AppState::default();
    state.remember_connection("COM3", &serial);
    state.ui_preferences.window_size = Some(1234);
    state.ui_preferences.dark_mode = false;
    state.save_to(&path).unwrap();

    let loaded = AppState::load_from(&path).unwrap();
    assert_eq!(loaded, state);

    let initial = loaded.initial_serial(&SerialConfig::default());
    assert_eq!(initial.port_name.as_deref(), Some("COM3"));
    assert_eq!(initial.baud_rate, 19200);
}

#[test]
fn test_app_state_ignores_unknown_fields() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("app_state.json");
    std::fs::write(
        &path,
        r#"{ "version": 1, "last_port": "/dev/ttyACM0", "something_new": true }"#,
    )
    .unwrap();

    let state = AppState::load_from(&path).unwrap();
    assert_eq!(state.last_port.as_deref(), Some("/dev/ttyACM0"));
    assert!(state.ui_preferences.dark_mode);
}
