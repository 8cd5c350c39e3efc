//! Configuration module for the serial plotter
//!
//! This module handles application configuration including:
//! - User-editable settings in `config.toml` (serial defaults, plot, protocol, logging)
//! - Application state persistence (last port, last serial settings, UI preferences)
//! - Runtime settings during execution
//!
//! # App Data Location
//!
//! Application data is stored in the platform-appropriate location:
//! - **Linux**: `~/.local/share/dev.serial-plotter/`
//! - **macOS**: `~/Library/Application Support/dev.serial-plotter/`
//! - **Windows**: `%APPDATA%\dev.serial-plotter\`
//!
//! # Files
//!
//! - `config.toml` - Settings, read at startup, never written by the app
//! - `app_state.json` - Last used port and UI preferences, written on exit
//! - `logs/` - Daily log files when file logging is enabled
//!
//! # Example
//!
//! ```ignore
//! use serial_plotter::config::{AppConfig, AppState};
//!
//! let config = AppConfig::load_or_default();
//! let mut state = AppState::load_or_default();
//!
//! state.remember_connection("/dev/ttyUSB0", &config.serial);
//! state.save()?;
//! ```

pub mod settings;

pub use settings::*;

use crate::error::{PlotterError, Result};
use crate::ingest::DecodeErrorPolicy;
use crate::protocol::StartMarkerPolicy;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Application identifier for data directories
pub const APP_ID: &str = "dev.serial-plotter";

/// Settings filename
pub const CONFIG_FILE: &str = "config.toml";

/// App state filename
pub const APP_STATE_FILE: &str = "app_state.json";

/// Log directory name inside the app data directory
pub const LOG_DIR: &str = "logs";

/// Default number of samples shown on the horizontal axis
pub const DEFAULT_WINDOW_SIZE: u64 = 500;

/// Default redraw interval in milliseconds
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 20;

/// Default vertical range, sized for a 12-bit ADC
pub const DEFAULT_Y_MIN: f64 = 0.0;
pub const DEFAULT_Y_MAX: f64 = 4095.0;
pub const DEFAULT_Y_STEP: f64 = 500.0;

/// Default baud rate
pub const DEFAULT_BAUD_RATE: u32 = 115_200;

/// Baud rates offered in the UI
pub const BAUD_RATES: [u32; 8] = [1200, 2400, 4800, 9600, 19200, 38400, 57600, 115_200];

/// Default serial read timeout in milliseconds
pub const DEFAULT_READ_TIMEOUT_MS: u64 = 10;

/// Default number of points kept per series
pub const DEFAULT_MAX_RETAINED_POINTS: usize = 1_000_000;

// ==================== App Data Directory ====================

/// Get the application data directory path
pub fn app_data_dir() -> Option<PathBuf> {
    dirs_next::data_dir().map(|p| p.join(APP_ID))
}

/// Ensure the app data directory exists
pub fn ensure_app_data_dir() -> Result<PathBuf> {
    let dir = app_data_dir().ok_or_else(|| {
        PlotterError::Config("Could not determine app data directory".to_string())
    })?;

    if !dir.exists() {
        std::fs::create_dir_all(&dir).map_err(|e| {
            PlotterError::Config(format!("Failed to create app data directory: {}", e))
        })?;
    }

    Ok(dir)
}

/// Get the path to the settings file
pub fn config_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(CONFIG_FILE))
}

/// Get the path to the app state file
pub fn app_state_path() -> Option<PathBuf> {
    app_data_dir().map(|p| p.join(APP_STATE_FILE))
}

// ==================== App Config ====================

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct AppConfig {
    /// Serial port defaults
    #[serde(default)]
    pub serial: SerialConfig,

    /// Plot appearance and timing
    #[serde(default)]
    pub plot: PlotConfig,

    /// Wire protocol settings
    #[serde(default)]
    pub protocol: ProtocolConfig,

    /// Logging output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Create a new default configuration
    pub fn new() -> Self {
        Self::default()
    }

    /// Load and validate a configuration file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PlotterError::Config(format!("Failed to read config file {:?}: {}", path, e))
        })?;

        let config: AppConfig = toml::from_str(&content).map_err(|e| {
            PlotterError::Config(format!("Failed to parse config file {:?}: {}", path, e))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Load the configuration from the default location.
    ///
    /// A missing file or an invalid one yields the defaults.
    pub fn load_or_default() -> Self {
        let Some(path) = config_path() else {
            return Self::default();
        };
        if !path.exists() {
            return Self::default();
        }
        Self::load(&path).unwrap_or_else(|e| {
            tracing::warn!("Failed to load config, using defaults: {}", e);
            Self::default()
        })
    }

    /// Write the configuration as TOML
    pub fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent).map_err(|e| {
                PlotterError::Config(format!("Failed to create config directory: {}", e))
            })?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| PlotterError::Serialization(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content).map_err(|e| {
            PlotterError::Config(format!("Failed to write config file {:?}: {}", path, e))
        })
    }

    /// Check cross-field constraints
    pub fn validate(&self) -> Result<()> {
        self.protocol.validate()?;
        self.plot.validate()
    }
}

// ==================== Serial Config ====================

/// Serial port settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SerialConfig {
    /// Port to open (e.g. `/dev/ttyUSB0`, `COM3`)
    #[serde(default)]
    pub port_name: Option<String>,

    #[serde(default = "default_baud_rate")]
    pub baud_rate: u32,

    #[serde(default)]
    pub data_bits: DataBits,

    #[serde(default)]
    pub parity: Parity,

    #[serde(default)]
    pub stop_bits: StopBits,

    /// Blocking read timeout; bounds how quickly the worker reacts to commands
    #[serde(default = "default_read_timeout_ms")]
    pub read_timeout_ms: u64,
}

fn default_baud_rate() -> u32 {
    DEFAULT_BAUD_RATE
}

fn default_read_timeout_ms() -> u64 {
    DEFAULT_READ_TIMEOUT_MS
}

impl Default for SerialConfig {
    fn default() -> Self {
        Self {
            port_name: None,
            baud_rate: DEFAULT_BAUD_RATE,
            data_bits: DataBits::default(),
            parity: Parity::default(),
            stop_bits: StopBits::default(),
            read_timeout_ms: DEFAULT_READ_TIMEOUT_MS,
        }
    }
}

impl SerialConfig {
    /// Settings for a given port, everything else default
    pub fn for_port(port_name: impl Into<String>) -> Self {
        Self {
            port_name: Some(port_name.into()),
            ..Default::default()
        }
    }
}

impl std::fmt::Display for SerialConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} {}{}{}",
            self.baud_rate,
            self.data_bits,
            self.parity.short(),
            self.stop_bits
        )
    }
}

/// Number of data bits per character
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DataBits {
    #[default]
    Eight,
    Seven,
}

impl DataBits {
    pub const ALL: [DataBits; 2] = [DataBits::Eight, DataBits::Seven];
}

impl std::fmt::Display for DataBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DataBits::Eight => write!(f, "8"),
            DataBits::Seven => write!(f, "7"),
        }
    }
}

impl From<DataBits> for serialport::DataBits {
    fn from(v: DataBits) -> Self {
        match v {
            DataBits::Eight => serialport::DataBits::Eight,
            DataBits::Seven => serialport::DataBits::Seven,
        }
    }
}

/// Parity checking mode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Parity {
    #[default]
    None,
    Odd,
    Even,
}

impl Parity {
    pub const ALL: [Parity; 3] = [Parity::None, Parity::Odd, Parity::Even];

    /// One-letter form used in `8N1` style summaries
    pub fn short(&self) -> char {
        match self {
            Parity::None => 'N',
            Parity::Odd => 'O',
            Parity::Even => 'E',
        }
    }
}

impl std::fmt::Display for Parity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Parity::None => write!(f, "None"),
            Parity::Odd => write!(f, "Odd"),
            Parity::Even => write!(f, "Even"),
        }
    }
}

impl From<Parity> for serialport::Parity {
    fn from(v: Parity) -> Self {
        match v {
            Parity::None => serialport::Parity::None,
            Parity::Odd => serialport::Parity::Odd,
            Parity::Even => serialport::Parity::Even,
        }
    }
}

/// Number of stop bits
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum StopBits {
    #[default]
    One,
    Two,
}

impl StopBits {
    pub const ALL: [StopBits; 2] = [StopBits::One, StopBits::Two];
}

impl std::fmt::Display for StopBits {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            StopBits::One => write!(f, "1"),
            StopBits::Two => write!(f, "2"),
        }
    }
}

impl From<StopBits> for serialport::StopBits {
    fn from(v: StopBits) -> Self {
        match v {
            StopBits::One => serialport::StopBits::One,
            StopBits::Two => serialport::StopBits::Two,
        }
    }
}

// ==================== Plot Config ====================

/// Plot configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlotConfig {
    /// Samples shown on the horizontal axis
    #[serde(default = "default_window_size")]
    pub window_size: u64,

    /// Redraw interval in milliseconds
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,

    #[serde(default = "default_y_min")]
    pub y_min: f64,

    #[serde(default = "default_y_max")]
    pub y_max: f64,

    /// Spacing of horizontal grid lines
    #[serde(default = "default_y_step")]
    pub y_step: f64,

    /// Plot line width in pixels
    #[serde(default = "default_line_width")]
    pub line_width: f32,

    #[serde(default = "default_true")]
    pub show_legend: bool,

    #[serde(default = "default_true")]
    pub show_grid: bool,

    /// Oldest points are dropped from a series beyond this count
    #[serde(default = "default_max_retained_points")]
    pub max_retained_points: usize,
}

fn default_window_size() -> u64 {
    DEFAULT_WINDOW_SIZE
}

fn default_tick_interval_ms() -> u64 {
    DEFAULT_TICK_INTERVAL_MS
}

fn default_y_min() -> f64 {
    DEFAULT_Y_MIN
}

fn default_y_max() -> f64 {
    DEFAULT_Y_MAX
}

fn default_y_step() -> f64 {
    DEFAULT_Y_STEP
}

fn default_line_width() -> f32 {
    1.5
}

fn default_true() -> bool {
    true
}

fn default_max_retained_points() -> usize {
    DEFAULT_MAX_RETAINED_POINTS
}

impl Default for PlotConfig {
    fn default() -> Self {
        Self {
            window_size: DEFAULT_WINDOW_SIZE,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            y_min: DEFAULT_Y_MIN,
            y_max: DEFAULT_Y_MAX,
            y_step: DEFAULT_Y_STEP,
            line_width: default_line_width(),
            show_legend: true,
            show_grid: true,
            max_retained_points: DEFAULT_MAX_RETAINED_POINTS,
        }
    }
}

impl PlotConfig {
    pub fn validate(&self) -> Result<()> {
        if self.y_min >= self.y_max {
            return Err(PlotterError::Config(format!(
                "y_min ({}) must be below y_max ({})",
                self.y_min, self.y_max
            )));
        }
        if self.y_step <= 0.0 {
            return Err(PlotterError::Config("y_step must be positive".to_string()));
        }
        if self.tick_interval_ms == 0 {
            return Err(PlotterError::Config(
                "tick_interval_ms must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

// ==================== Protocol Config ====================

/// Wire protocol settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProtocolConfig {
    #[serde(default = "default_start_marker")]
    pub start_marker: char,

    #[serde(default = "default_end_marker")]
    pub end_marker: char,

    /// Handling of a start marker inside an unterminated message
    #[serde(default)]
    pub start_marker_policy: StartMarkerPolicy,

    /// What to plot for tokens that fail to decode
    #[serde(default)]
    pub decode_error_policy: DecodeErrorPolicy,

    /// Values beyond this many channels are dropped
    #[serde(default)]
    pub max_channels: Option<usize>,
}

fn default_start_marker() -> char {
    crate::protocol::START_MARKER as char
}

fn default_end_marker() -> char {
    crate::protocol::END_MARKER as char
}

impl Default for ProtocolConfig {
    fn default() -> Self {
        Self {
            start_marker: default_start_marker(),
            end_marker: default_end_marker(),
            start_marker_policy: StartMarkerPolicy::default(),
            decode_error_policy: DecodeErrorPolicy::default(),
            max_channels: None,
        }
    }
}

impl ProtocolConfig {
    /// Markers as bytes, after validation
    pub fn markers(&self) -> Result<(u8, u8)> {
        let start = marker_byte(self.start_marker)?;
        let end = marker_byte(self.end_marker)?;
        if start == end {
            return Err(PlotterError::Config(format!(
                "Start and end marker must differ (both '{}')",
                self.start_marker
            )));
        }
        Ok((start, end))
    }

    pub fn validate(&self) -> Result<()> {
        self.markers()?;
        if self.max_channels == Some(0) {
            return Err(PlotterError::Config(
                "max_channels must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

fn marker_byte(marker: char) -> Result<u8> {
    if marker.is_ascii_digit() || marker.is_ascii_whitespace() {
        return Err(PlotterError::Config(format!(
            "Marker {:?} must not be a digit or whitespace",
            marker
        )));
    }
    if !marker.is_ascii_graphic() {
        return Err(PlotterError::Config(format!(
            "Marker {:?} must be a printable ASCII character",
            marker
        )));
    }
    Ok(marker as u8)
}

// ==================== Logging Config ====================

/// Logging output configuration
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct LoggingConfig {
    /// Also write logs to a daily rolling file
    #[serde(default)]
    pub log_to_file: bool,

    /// Directory for log files (defaults to `<app data>/logs`)
    #[serde(default)]
    pub log_dir: Option<PathBuf>,

    /// Filter directives, overridden by `RUST_LOG`
    #[serde(default)]
    pub filter: Option<String>,
}

impl LoggingConfig {
    /// Resolved log directory
    pub fn resolved_log_dir(&self) -> Option<PathBuf> {
        self.log_dir
            .clone()
            .or_else(|| app_data_dir().map(|p| p.join(LOG_DIR)))
    }
}

// ==================== App State ====================

/// Persistent application state
///
/// This stores what the user last did, so the next start can preselect it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AppState {
    /// Version for future migration support
    #[serde(default = "default_app_state_version")]
    pub version: u32,

    /// Last port that was connected successfully
    #[serde(default)]
    pub last_port: Option<String>,

    /// Serial settings used for that connection
    #[serde(default)]
    pub last_serial: Option<SerialConfig>,

    /// UI preferences
    #[serde(default)]
    pub ui_preferences: UiPreferences,
}

fn default_app_state_version() -> u32 {
    1
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            version: 1,
            last_port: None,
            last_serial: None,
            ui_preferences: UiPreferences::default(),
        }
    }
}

impl AppState {
    /// Load app state from the default location
    pub fn load() -> Result<Self> {
        let path = app_state_path().ok_or_else(|| {
            PlotterError::Config("Could not determine app state path".to_string())
        })?;

        if !path.exists() {
            return Ok(Self::default());
        }
        Self::load_from(&path)
    }

    /// Load app state from a specific file
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref())
            .map_err(|e| PlotterError::Config(format!("Failed to read app state: {}", e)))?;

        serde_json::from_str(&content)
            .map_err(|e| PlotterError::Config(format!("Failed to parse app state: {}", e)))
    }

    /// Load app state, returning defaults on any error
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_else(|e| {
            tracing::warn!("Failed to load app state, using defaults: {}", e);
            Self::default()
        })
    }

    /// Save app state to the default location
    pub fn save(&self) -> Result<()> {
        let dir = ensure_app_data_dir()?;
        self.save_to(dir.join(APP_STATE_FILE))
    }

    /// Save app state to a specific file
    pub fn save_to(&self, path: impl AsRef<Path>) -> Result<()> {
        let content = serde_json::to_string_pretty(self)
            .map_err(|e| PlotterError::Config(format!("Failed to serialize app state: {}", e)))?;

        std::fs::write(path.as_ref(), content)
            .map_err(|e| PlotterError::Config(format!("Failed to write app state: {}", e)))
    }

    /// Remember a successful connection
    pub fn remember_connection(&mut self, port_name: &str, serial: &SerialConfig) {
        self.last_port = Some(port_name.to_string());
        self.last_serial = Some(serial.clone());
    }

    /// Serial settings to preselect on startup. Uses the last connection's
    /// settings if there was one, otherwise `fallback`.
    pub fn initial_serial(&self, fallback: &SerialConfig) -> SerialConfig {
        let mut serial = self.last_serial.clone().unwrap_or_else(|| fallback.clone());
        if serial.port_name.is_none() {
            serial.port_name = self.last_port.clone();
        }
        serial
    }
}

/// UI preferences that persist across runs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct UiPreferences {
    /// Enable dark mode
    #[serde(default = "default_true")]
    pub dark_mode: bool,

    /// Last window size in samples
    #[serde(default)]
    pub window_size: Option<u64>,

    /// Show the channel list side panel
    #[serde(default = "default_true")]
    pub show_channel_list: bool,
}

impl Default for UiPreferences {
    fn default() -> Self {
        Self {
            dark_mode: true,
            window_size: None,
            show_channel_list: true,
        }
    }
}

// ==================== Tests ====================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_app_config_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.serial.baud_rate, 115_200);
        assert_eq!(config.serial.data_bits, DataBits::Eight);
        assert_eq!(config.serial.parity, Parity::None);
        assert_eq!(config.serial.stop_bits, StopBits::One);
        assert_eq!(config.plot.window_size, 500);
        assert_eq!(config.plot.tick_interval_ms, 20);
        assert_eq!(config.plot.y_max, 4095.0);
        assert_eq!(config.protocol.start_marker, '$');
        assert_eq!(config.protocol.end_marker, ';');
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [serial]
            baud_rate = 9600

            [protocol]
            start_marker = "<"
            end_marker = ">"
            decode_error_policy = "Skip"
            "#,
        )
        .unwrap();

        assert_eq!(config.serial.baud_rate, 9600);
        assert_eq!(config.serial.read_timeout_ms, DEFAULT_READ_TIMEOUT_MS);
        assert_eq!(config.protocol.markers().unwrap(), (b'<', b'>'));
        assert_eq!(config.protocol.decode_error_policy, DecodeErrorPolicy::Skip);
        assert_eq!(config.plot, PlotConfig::default());
    }

    #[test]
    fn test_marker_validation() {
        let mut protocol = ProtocolConfig::default();
        protocol.end_marker = '$';
        assert!(protocol.validate().is_err());

        protocol.end_marker = '7';
        assert!(protocol.validate().is_err());

        protocol.end_marker = ' ';
        assert!(protocol.validate().is_err());

        protocol.end_marker = 'é';
        assert!(protocol.validate().is_err());

        protocol.end_marker = '\n';
        assert!(protocol.validate().is_err());

        protocol.end_marker = '!';
        assert!(protocol.validate().is_ok());
    }

    #[test]
    fn test_plot_validation() {
        let mut plot = PlotConfig::default();
        plot.y_min = 5000.0;
        assert!(plot.validate().is_err());

        let mut plot = PlotConfig::default();
        plot.y_step = 0.0;
        assert!(plot.validate().is_err());
    }

    #[test]
    fn test_serial_conversions() {
        assert_eq!(
            serialport::DataBits::from(DataBits::Seven),
            serialport::DataBits::Seven
        );
        assert_eq!(serialport::Parity::from(Parity::Even), serialport::Parity::Even);
        assert_eq!(
            serialport::StopBits::from(StopBits::Two),
            serialport::StopBits::Two
        );
        assert_eq!(SerialConfig::default().to_string(), "115200 8N1");
    }

    #[test]
    fn test_app_state_serialization() {
        let mut state = AppState::default();
        let mut serial = SerialConfig::for_port("/dev/ttyUSB0");
        serial.baud_rate = 9600;
        state.remember_connection("/dev/ttyUSB0", &serial);

        let json = serde_json::to_string_pretty(&state).unwrap();
        let parsed: AppState = serde_json::from_str(&json).unwrap();

        assert_eq!(parsed, state);
        assert_eq!(parsed.initial_serial(&SerialConfig::default()).baud_rate, 9600);
    }

    #[test]
    fn test_initial_serial_falls_back() {
        let mut state = AppState::default();
        state.last_port = Some("COM3".to_string());

        let serial = state.initial_serial(&SerialConfig::default());
        assert_eq!(serial.port_name.as_deref(), Some("COM3"));
        assert_eq!(serial.baud_rate, DEFAULT_BAUD_RATE);
    }
}
