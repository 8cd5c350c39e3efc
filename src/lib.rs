//! # Serial Plotter
//!
//! A live plotter for integer samples streamed over a serial port. Devices
//! send messages such as `$512 1024 77;`; every value becomes a point on its
//! own channel and the view scrolls over the newest samples.
//!
//! ## Architecture
//!
//! - **Backend**: Reads the serial port in a separate thread and forwards raw bytes
//! - **Protocol**: Frames `$...;` messages out of the byte stream and decodes integers
//! - **Ingest**: Routes values to channels and drives the rolling window
//! - **Frontend**: Renders the UI using eframe/egui with egui_plot for the chart
//! - **Communication**: Crossbeam channels for thread-safe data transfer
//!
//! ## Configuration
//!
//! Settings (`config.toml`) and application state (`app_state.json`) are
//! stored in the platform-appropriate data directory under `dev.serial-plotter`:
//!
//! - **Linux**: `~/.local/share/dev.serial-plotter/`
//! - **macOS**: `~/Library/Application Support/dev.serial-plotter/`
//! - **Windows**: `%APPDATA%\dev.serial-plotter\`
//!
//! ## Example
//!
//! ```ignore
//! use serial_plotter::{
//!     backend::SerialBackend,
//!     config::{AppConfig, AppState},
//!     frontend::PlotterApp,
//! };
//!
//! fn main() -> eframe::Result<()> {
//!     let config = AppConfig::load_or_default();
//!     let app_state = AppState::load_or_default();
//!
//!     let (backend, frontend_receiver) = SerialBackend::new(config.clone());
//!     std::thread::spawn(move || backend.run());
//!
//!     eframe::run_native(
//!         "Serial Plotter",
//!         eframe::NativeOptions::default(),
//!         Box::new(|cc| {
//!             Ok(Box::new(PlotterApp::new(cc, frontend_receiver, config, app_state)))
//!         }),
//!     )
//! }
//! ```

pub mod app;
pub mod backend;
pub mod config;
pub mod error;
pub mod export;
pub mod frontend;
pub mod ingest;
pub mod protocol;
pub mod types;

// Re-export commonly used types
pub use app::PlotterApp;
pub use backend::{BackendCommand, BackendMessage, SerialBackend};
pub use config::{AppConfig, AppState};
pub use error::{PlotterError, Result};
pub use ingest::{ChartSink, PlotSession};
pub use protocol::{decode_message, ByteFramer};
