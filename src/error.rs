//! Error handling for the serial plotter
//!
//! This module defines custom error types and a Result alias for use
//! throughout the application. Per-token decode failures are not part of
//! this taxonomy; they live in [`crate::protocol::DecodeError`] because they
//! are absorbed by the ingestion pipeline and never abort anything.

use thiserror::Error;

/// Main error type for serial plotter operations
#[derive(Error, Debug)]
pub enum PlotterError {
    /// Errors raised by the serial port driver (open, configure, read)
    #[error("Serial port error: {0}")]
    Serial(#[from] serialport::Error),

    /// Errors related to configuration loading/saving/validation
    #[error("Configuration error: {0}")]
    Config(String),

    /// Errors while exporting series data
    #[error("Export error: {0}")]
    Export(String),

    /// Operation requires an open port
    #[error("Not connected")]
    NotConnected,

    /// IO errors
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Generic errors with context
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<PlotterError>,
    },
}

impl PlotterError {
    /// Add context to an error
    pub fn with_context(self, context: impl Into<String>) -> Self {
        PlotterError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// True for errors that mean the device went away mid-session
    pub fn is_disconnect(&self) -> bool {
        match self {
            PlotterError::Serial(e) => matches!(e.kind(), serialport::ErrorKind::NoDevice),
            PlotterError::Io(e) => matches!(
                e.kind(),
                std::io::ErrorKind::BrokenPipe
                    | std::io::ErrorKind::NotConnected
                    | std::io::ErrorKind::UnexpectedEof
                    | std::io::ErrorKind::PermissionDenied
            ),
            PlotterError::WithContext { source, .. } => source.is_disconnect(),
            _ => false,
        }
    }
}

/// Result type alias for serial plotter operations
pub type Result<T> = std::result::Result<T, PlotterError>;

/// Extension trait for adding context to Results
pub trait ResultExt<T> {
    /// Add context to an error result
    fn context(self, context: impl Into<String>) -> Result<T>;

    /// Add context lazily to an error result
    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| e.with_context(f()))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, serialport::Error> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| PlotterError::Serial(e).with_context(context))
    }

    fn with_context<F>(self, f: F) -> Result<T>
    where
        F: FnOnce() -> String,
    {
        self.map_err(|e| PlotterError::Serial(e).with_context(f()))
    }
}
