//! Rolling window control
//!
//! On every tick the chart's horizontal range is moved so that the most
//! recent `window_size` samples are visible, then the chart is redrawn.
//! Ticks are skipped entirely while paused.

use super::chart::ChartSink;
use std::time::{Duration, Instant};

/// Smallest accepted window, in samples
pub const MIN_WINDOW_SIZE: u64 = 1;
/// Largest accepted window, in samples
pub const MAX_WINDOW_SIZE: u64 = 100_000;

/// Whether the plot follows incoming data
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    Running,
    Paused,
}

impl std::fmt::Display for RunState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RunState::Running => write!(f, "Running"),
            RunState::Paused => write!(f, "Paused"),
        }
    }
}

/// Horizontal range shown by the chart, in sample indices.
///
/// `lower` may be negative right after a connect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VisibleWindow {
    pub lower: i64,
    pub upper: i64,
}

impl VisibleWindow {
    /// Window ending at `current` and spanning `window_size` samples
    pub fn ending_at(current: u64, window_size: u64) -> Self {
        let upper = current.min(i64::MAX as u64) as i64;
        let lower = upper.saturating_sub(window_size.min(i64::MAX as u64) as i64);
        Self { lower, upper }
    }

    pub fn width(&self) -> i64 {
        self.upper - self.lower
    }

    pub fn contains(&self, x: f64) -> bool {
        x >= self.lower as f64 && x <= self.upper as f64
    }
}

/// Clamp a requested window size to the accepted range
pub fn clamp_window_size(size: u64) -> u64 {
    size.clamp(MIN_WINDOW_SIZE, MAX_WINDOW_SIZE)
}

/// Drives the periodic range update and redraw
#[derive(Debug, Clone)]
pub struct WindowController {
    state: RunState,
    window_size: u64,
    tick_interval: Duration,
    last_tick: Option<Instant>,
}

impl WindowController {
    pub fn new(window_size: u64, tick_interval: Duration) -> Self {
        Self {
            state: RunState::Running,
            window_size: clamp_window_size(window_size),
            tick_interval,
            last_tick: None,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        self.state == RunState::Running
    }

    pub fn pause(&mut self) {
        self.state = RunState::Paused;
    }

    pub fn resume(&mut self) {
        self.state = RunState::Running;
    }

    /// Flip between running and paused, returning the new state
    pub fn toggle(&mut self) -> RunState {
        self.state = match self.state {
            RunState::Running => RunState::Paused,
            RunState::Paused => RunState::Running,
        };
        self.state
    }

    pub fn window_size(&self) -> u64 {
        self.window_size
    }

    /// Set the window size, clamped to the accepted range.
    ///
    /// Takes effect on the next tick.
    pub fn set_window_size(&mut self, size: u64) -> u64 {
        self.window_size = clamp_window_size(size);
        self.window_size
    }

    pub fn visible_window(&self, current: u64) -> VisibleWindow {
        VisibleWindow::ending_at(current, self.window_size)
    }

    /// Apply the window to the chart and redraw. Does nothing when paused.
    pub fn tick(&mut self, current: u64, chart: &mut dyn ChartSink) -> Option<VisibleWindow> {
        if !self.is_running() {
            return None;
        }
        let window = self.visible_window(current);
        chart.set_visible_range(window.lower as f64, window.upper as f64);
        chart.redraw();
        Some(window)
    }

    /// Whether a tick interval has elapsed since the last tick
    pub fn is_due(&self, now: Instant) -> bool {
        match self.last_tick {
            Some(last) => now.saturating_duration_since(last) >= self.tick_interval,
            None => true,
        }
    }

    /// Time left until the next tick is due
    pub fn time_until_due(&self, now: Instant) -> Duration {
        match self.last_tick {
            Some(last) => self
                .tick_interval
                .saturating_sub(now.saturating_duration_since(last)),
            None => Duration::ZERO,
        }
    }

    /// Tick if the interval has elapsed
    pub fn poll(
        &mut self,
        now: Instant,
        current: u64,
        chart: &mut dyn ChartSink,
    ) -> Option<VisibleWindow> {
        if !self.is_due(now) {
            return None;
        }
        self.last_tick = Some(now);
        self.tick(current, chart)
    }

    /// Forget when the last tick happened so the next poll fires at once
    pub fn reset_timer(&mut self) {
        self.last_tick = None;
    }
}

impl Default for WindowController {
    fn default() -> Self {
        Self::new(
            crate::config::DEFAULT_WINDOW_SIZE,
            Duration::from_millis(crate::config::DEFAULT_TICK_INTERVAL_MS),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::chart::{ChartEvent, RecordingChart};

    #[test]
    fn test_window_bounds() {
        assert_eq!(VisibleWindow::ending_at(3, 2), VisibleWindow { lower: 1, upper: 3 });
        assert_eq!(VisibleWindow::ending_at(10, 500), VisibleWindow { lower: -490, upper: 10 });
        assert_eq!(VisibleWindow::ending_at(0, 500).width(), 500);
    }

    #[test]
    fn test_tick_sets_range_then_redraws() {
        let mut controller = WindowController::new(2, Duration::from_millis(20));
        let mut chart = RecordingChart::new();

        let window = controller.tick(3, &mut chart);
        assert_eq!(window, Some(VisibleWindow { lower: 1, upper: 3 }));
        assert_eq!(
            chart.events,
            vec![
                ChartEvent::SetVisibleRange { lower: 1.0, upper: 3.0 },
                ChartEvent::Redraw
            ]
        );
    }

    #[test]
    fn test_paused_tick_does_nothing() {
        let mut controller = WindowController::default();
        let mut chart = RecordingChart::new();

        controller.pause();
        assert_eq!(controller.tick(42, &mut chart), None);
        assert!(chart.events.is_empty());

        assert_eq!(controller.toggle(), RunState::Running);
        assert!(controller.tick(42, &mut chart).is_some());
    }

    #[test]
    fn test_window_size_is_clamped() {
        let mut controller = WindowController::default();
        assert_eq!(controller.window_size(), 500);
        assert_eq!(controller.set_window_size(0), MIN_WINDOW_SIZE);
        assert_eq!(controller.set_window_size(1_000_000), MAX_WINDOW_SIZE);
        assert_eq!(controller.set_window_size(250), 250);
    }

    #[test]
    fn test_poll_respects_interval() {
        let mut controller = WindowController::new(10, Duration::from_millis(20));
        let mut chart = RecordingChart::new();
        let start = Instant::now();

        assert!(controller.poll(start, 5, &mut chart).is_some());
        assert!(!controller.is_due(start + Duration::from_millis(5)));
        assert_eq!(
            controller.time_until_due(start + Duration::from_millis(5)),
            Duration::from_millis(15)
        );
        assert!(controller.poll(start + Duration::from_millis(5), 5, &mut chart).is_none());
        assert!(controller.poll(start + Duration::from_millis(20), 6, &mut chart).is_some());
        assert_eq!(chart.redraws, 2);

        controller.reset_timer();
        assert!(controller.is_due(start));
    }
}
