//! Plot rendering module using egui_plot
//!
//! [`PlotModel`] is the chart widget the ingestion pipeline drives through
//! [`ChartSink`]. It owns the series data and renders it with `egui_plot`.
//!
//! # View behaviour
//!
//! - **Following**: the X range tracks the rolling window set by the last
//!   tick and the Y range comes from the runtime settings
//! - **Free**: dragging or zooming detaches the view; data keeps arriving
//!   but the bounds stay where the user left them
//! - **Reset view** (or a double click) snaps back to following
//!
//! Only the points inside the visible X range are handed to egui_plot each
//! frame, so long captures stay cheap to draw.

use crate::config::settings::RuntimeSettings;
use crate::export::ExportSeries;
use crate::ingest::{ChartSink, SeriesHandle};
use crate::types::{palette_color, GUI_BACKGROUND, GUI_GRID, GUI_TEXT};
use egui::{Color32, Ui};
use egui_plot::{Corner, GridMark, Legend, Line, Plot, PlotBounds, PlotPoint, PlotPoints, PlotUi};
use std::collections::VecDeque;

/// Upper bound on grid lines per axis; the step is widened past this
const MAX_GRID_MARKS: usize = 200;

fn to_color32(rgba: [u8; 4]) -> Color32 {
    Color32::from_rgba_unmultiplied(rgba[0], rgba[1], rgba[2], rgba[3])
}

/// One line on the plot
#[derive(Debug, Clone)]
pub struct PlotSeries {
    pub name: String,
    pub color_index: usize,
    /// `[sample, value]` pairs in ascending sample order
    pub points: VecDeque<[f64; 2]>,
}

impl PlotSeries {
    fn new(color_index: usize, name: &str) -> Self {
        Self {
            name: name.to_string(),
            color_index,
            points: VecDeque::new(),
        }
    }

    pub fn color(&self) -> Color32 {
        to_color32(palette_color(self.color_index))
    }

    /// Points with `lower <= x <= upper`, plus one neighbour on each side so
    /// the line reaches the plot edges
    pub fn points_in_range(&self, lower: f64, upper: f64) -> Vec<[f64; 2]> {
        let start = self.points.partition_point(|p| p[0] < lower).saturating_sub(1);
        let end = (self.points.partition_point(|p| p[0] <= upper) + 1).min(self.points.len());
        if start >= end {
            return Vec::new();
        }
        self.points.range(start..end).copied().collect()
    }
}

/// Chart widget state: series data plus view bounds
#[derive(Debug, Clone)]
pub struct PlotModel {
    series: Vec<PlotSeries>,
    /// Range requested by the last window tick
    visible_range: Option<(f64, f64)>,
    /// Oldest points are dropped past this many per series
    max_retained_points: usize,
    /// False once the user drags or zooms away from the rolling window
    following: bool,
    redraw_requested: bool,
    /// Bounds drawn in the last frame
    last_bounds: Option<PlotBounds>,
}

impl Default for PlotModel {
    fn default() -> Self {
        Self::new(crate::config::DEFAULT_MAX_RETAINED_POINTS)
    }
}

impl PlotModel {
    pub fn new(max_retained_points: usize) -> Self {
        Self {
            series: Vec::new(),
            visible_range: None,
            max_retained_points: max_retained_points.max(1),
            following: true,
            redraw_requested: false,
            last_bounds: None,
        }
    }

    pub fn series(&self) -> &[PlotSeries] {
        &self.series
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    pub fn total_points(&self) -> usize {
        self.series.iter().map(|s| s.points.len()).sum()
    }

    pub fn visible_range(&self) -> Option<(f64, f64)> {
        self.visible_range
    }

    pub fn is_following(&self) -> bool {
        self.following
    }

    /// Snap the view back to the rolling window
    pub fn follow(&mut self) {
        self.following = true;
    }

    /// Consume a pending redraw request
    pub fn take_redraw_request(&mut self) -> bool {
        std::mem::take(&mut self.redraw_requested)
    }

    /// Copy of all series for CSV export
    pub fn export_series(&self) -> Vec<ExportSeries> {
        self.series
            .iter()
            .map(|s| ExportSeries {
                name: s.name.clone(),
                points: s.points.iter().map(|p| (p[0], p[1])).collect(),
            })
            .collect()
    }

    /// X range to draw when following: the last tick's window, or the
    /// newest `window_size` samples before the first tick
    fn follow_x_range(&self, window_size: u64) -> (f64, f64) {
        self.visible_range.unwrap_or_else(|| {
            let newest = self
                .series
                .iter()
                .filter_map(|s| s.points.back().map(|p| p[0]))
                .fold(0.0_f64, f64::max);
            (newest - window_size as f64, newest)
        })
    }

    /// Render the plot
    ///
    /// Returns the plot coordinates of a click, if any.
    pub fn render(&mut self, ui: &mut Ui, settings: &mut RuntimeSettings) -> Option<PlotPoint> {
        if settings.take_reset_request() {
            self.following = true;
        }

        let y_step = settings.y_step;
        let mut plot = Plot::new("serial_plot")
            .allow_double_click_reset(false)
            .allow_boxed_zoom(true)
            .show_axes(true)
            .show_grid(settings.show_grid)
            .x_axis_label("Sample")
            .y_axis_label("Value")
            .auto_bounds([false, false])
            .y_grid_spacer(move |input| fixed_step_marks(input.bounds, y_step));

        if settings.show_legend {
            plot = plot.legend(
                Legend::default()
                    .position(Corner::RightTop)
                    .background_alpha(0.8),
            );
        }

        let follow_bounds = self.following.then(|| {
            let (x_min, x_max) = self.follow_x_range(settings.window_size);
            PlotBounds::from_min_max([x_min, settings.y_min], [x_max, settings.y_max])
        });
        let draw_range = follow_bounds
            .as_ref()
            .or(self.last_bounds.as_ref())
            .map(|b| (b.min()[0], b.max()[0]))
            .unwrap_or((f64::NEG_INFINITY, f64::INFINITY));
        let line_width = settings.line_width;

        let response = egui::Frame::new()
            .fill(to_color32(GUI_BACKGROUND))
            .show(ui, |ui| {
                let visuals = ui.visuals_mut();
                visuals.override_text_color = Some(to_color32(GUI_TEXT));
                visuals.widgets.noninteractive.bg_stroke.color = to_color32(GUI_GRID);
                plot.show(ui, |plot_ui| {
                    if let Some(bounds) = follow_bounds {
                        plot_ui.set_plot_bounds(bounds);
                    }
                    self.render_lines(plot_ui, draw_range, line_width);
                })
            })
            .inner;

        if response.response.double_clicked() {
            self.following = true;
        } else if response.response.dragged() {
            self.following = false;
        } else if response.response.hovered() {
            let (scroll, zoom) = ui.input(|i| (i.raw_scroll_delta, i.zoom_delta()));
            if scroll != egui::Vec2::ZERO || zoom != 1.0 {
                self.following = false;
            }
        }

        self.last_bounds = Some(*response.transform.bounds());

        if response.response.clicked() {
            response
                .response
                .interact_pointer_pos()
                .map(|pos| response.transform.value_from_position(pos))
        } else {
            None
        }
    }

    fn render_lines(&self, plot_ui: &mut PlotUi, range: (f64, f64), width: f32) {
        for series in &self.series {
            let points = series.points_in_range(range.0, range.1);
            let line = Line::new(series.name.clone(), PlotPoints::from(points))
                .color(series.color())
                .width(width);
            plot_ui.line(line);
        }
    }
}

impl ChartSink for PlotModel {
    fn create_series(&mut self, color_index: usize, name: &str) -> SeriesHandle {
        self.series.push(PlotSeries::new(color_index, name));
        SeriesHandle(self.series.len() - 1)
    }

    fn append_point(&mut self, series: SeriesHandle, x: f64, y: f64) {
        let Some(s) = self.series.get_mut(series.0) else {
            tracing::warn!("append_point on unknown series {:?}", series);
            return;
        };
        s.points.push_back([x, y]);
        while s.points.len() > self.max_retained_points {
            s.points.pop_front();
        }
    }

    fn set_visible_range(&mut self, lower: f64, upper: f64) {
        self.visible_range = Some((lower, upper));
    }

    fn redraw(&mut self) {
        self.redraw_requested = true;
    }

    fn clear_series_data(&mut self, series: SeriesHandle) {
        if let Some(s) = self.series.get_mut(series.0) {
            s.points.clear();
        }
    }

    fn clear_all_series_data(&mut self) {
        for s in &mut self.series {
            s.points.clear();
        }
        self.redraw_requested = true;
    }

    fn set_series_name(&mut self, series: SeriesHandle, name: &str) {
        if let Some(s) = self.series.get_mut(series.0) {
            s.name = name.to_string();
        }
    }

    fn remove_all_series(&mut self) {
        self.series.clear();
        self.visible_range = None;
        self.following = true;
    }
}

/// Grid marks every `step` units across `bounds`
///
/// The step is doubled until at most [`MAX_GRID_MARKS`] marks fit, so a
/// tiny step on a huge range cannot stall the frame.
fn fixed_step_marks(bounds: (f64, f64), step: f64) -> Vec<GridMark> {
    let (min, max) = bounds;
    if step.is_nan() || step <= 0.0 || !min.is_finite() || !max.is_finite() || max < min {
        return Vec::new();
    }

    let mut step = step;
    while (max - min) / step > MAX_GRID_MARKS as f64 {
        step *= 2.0;
    }

    let first = (min / step).ceil() as i64;
    let last = (max / step).floor() as i64;
    (first..=last)
        .map(|i| GridMark {
            value: i as f64 * step,
            step_size: step,
        })
        .collect()
}
