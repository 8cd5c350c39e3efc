//! Common test utilities and helpers

#![allow(dead_code)] // Test utilities may not all be used in every test file

pub mod builders;
pub mod mock_helpers;

use serial_plotter::ingest::{PlotSession, RecordingChart};
use std::time::Duration;

/// Create a test timeout duration
pub fn test_timeout() -> Duration {
    Duration::from_millis(100)
}

/// Assert two floats are approximately equal
pub fn assert_float_eq(a: f64, b: f64, epsilon: f64) {
    assert!(
        (a - b).abs() < epsilon,
        "Expected {} to be approximately equal to {} (epsilon: {})",
        a,
        b,
        epsilon
    );
}

/// Default session already connected as connection 1, with its chart
pub fn connected_session() -> (PlotSession, RecordingChart) {
    let mut session = PlotSession::default();
    let mut chart = RecordingChart::new();
    session.connect(1, &mut chart);
    chart.clear_events();
    (session, chart)
}
