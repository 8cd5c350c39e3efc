//! Serial Plotter - Main Entry Point
//!
//! Reads `$...;` framed integer samples from a serial port and plots them
//! live.

use anyhow::Context;
use serial_plotter::{
    backend::SerialBackend,
    config::{AppConfig, AppState, LoggingConfig},
    frontend::PlotterApp,
};
use std::sync::atomic::Ordering;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

const DEFAULT_LOG_FILTER: &str = "info,serial_plotter=debug";

/// Install the tracing subscriber. The returned guard flushes the log file
/// and must live until the process exits.
fn init_logging(logging: &LoggingConfig) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().or_else(|_| {
        EnvFilter::try_new(logging.filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER))
            .context("Invalid log filter in config")
    })?;

    let (file_layer, guard) = if logging.log_to_file {
        let dir = logging
            .resolved_log_dir()
            .context("Could not determine log directory")?;
        std::fs::create_dir_all(&dir)
            .with_context(|| format!("Could not create log directory {}", dir.display()))?;

        let appender = tracing_appender::rolling::daily(&dir, "serial-plotter.log");
        let (writer, guard) = tracing_appender::non_blocking(appender);
        let layer = tracing_subscriber::fmt::layer()
            .with_writer(writer)
            .with_ansi(false);
        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .with(file_layer)
        .try_init()
        .context("Failed to install tracing subscriber")?;

    Ok(guard)
}

fn main() -> anyhow::Result<()> {
    let config = AppConfig::load_or_default();
    let _log_guard = init_logging(&config.logging)?;

    tracing::info!("Starting Serial Plotter");

    let app_state = AppState::load_or_default();

    // Spawn the serial backend thread
    let (backend, frontend) = SerialBackend::new(config.clone());
    let running = backend.stop_handle();
    let backend_handle = std::thread::Builder::new()
        .name("serial-backend".to_string())
        .spawn(move || backend.run())
        .context("Failed to spawn backend thread")?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([1280.0, 720.0])
            .with_min_inner_size([800.0, 500.0])
            .with_title("Serial Plotter"),
        ..Default::default()
    };

    let result = eframe::run_native(
        "Serial Plotter",
        native_options,
        Box::new(|cc| Ok(Box::new(PlotterApp::new(cc, frontend, config, app_state)))),
    );

    // Signal backend to stop and wait for it
    tracing::info!("Shutting down...");
    running.store(false, Ordering::SeqCst);
    if backend_handle.join().is_err() {
        tracing::error!("Backend thread panicked");
    }

    result.map_err(|e| anyhow::anyhow!("eframe error: {}", e))
}
