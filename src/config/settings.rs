//! Runtime settings that can be modified during application execution
//!
//! These are the values bound to the plot controls. They start from
//! [`PlotConfig`](super::PlotConfig) and are edited live; only the window
//! size is carried over to the next run (through `AppState`).
//!
//! # Axis Control
//!
//! - **Y range**: fixed lower/upper bound, with a fixed grid step
//! - **X range**: always the rolling window; the user may zoom or pan
//!   temporarily, and "Reset view" snaps back
//! - **Reset view** restores the configured Y range and step

use super::{PlotConfig, DEFAULT_Y_MAX, DEFAULT_Y_MIN, DEFAULT_Y_STEP};
use serde::{Deserialize, Serialize};

/// Runtime settings for the plot
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RuntimeSettings {
    /// Samples shown on the horizontal axis
    pub window_size: u64,

    /// Y-axis lower bound
    pub y_min: f64,

    /// Y-axis upper bound
    pub y_max: f64,

    /// Spacing of horizontal grid lines
    pub y_step: f64,

    /// Show the legend
    pub show_legend: bool,

    /// Show grid lines
    pub show_grid: bool,

    /// Line width in pixels
    pub line_width: f32,

    /// Set when the view must snap back to the rolling window on the next frame
    pub reset_requested: bool,

    /// Export settings
    pub export: ExportSettings,
}

impl Default for RuntimeSettings {
    fn default() -> Self {
        Self::from_plot_config(&PlotConfig::default())
    }
}

impl RuntimeSettings {
    /// Initial runtime settings for a plot configuration
    pub fn from_plot_config(plot: &PlotConfig) -> Self {
        Self {
            window_size: plot.window_size,
            y_min: plot.y_min,
            y_max: plot.y_max,
            y_step: plot.y_step,
            show_legend: plot.show_legend,
            show_grid: plot.show_grid,
            line_width: plot.line_width,
            reset_requested: false,
            export: ExportSettings::default(),
        }
    }

    /// Set the Y range. Ignored unless `min < max`.
    pub fn set_y_range(&mut self, min: f64, max: f64) -> bool {
        if min < max {
            self.y_min = min;
            self.y_max = max;
            true
        } else {
            false
        }
    }

    /// Set the grid step. Ignored unless positive.
    pub fn set_y_step(&mut self, step: f64) -> bool {
        if step > 0.0 {
            self.y_step = step;
            true
        } else {
            false
        }
    }

    /// Restore the default Y range and ask the plot to follow the window again
    pub fn reset_view(&mut self) {
        self.y_min = DEFAULT_Y_MIN;
        self.y_max = DEFAULT_Y_MAX;
        self.y_step = DEFAULT_Y_STEP;
        self.reset_requested = true;
    }

    /// Consume a pending reset request
    pub fn take_reset_request(&mut self) -> bool {
        std::mem::take(&mut self.reset_requested)
    }
}

/// Data export settings
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ExportSettings {
    /// Write a header row with channel names
    pub include_header: bool,

    /// Field delimiter
    pub delimiter: char,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            include_header: true,
            delimiter: ',',
        }
    }
}
