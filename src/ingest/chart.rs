//! Chart widget capability
//!
//! The ingestion pipeline never renders anything itself. It talks to the
//! plotting widget through [`ChartSink`], so the same routing code drives the
//! egui plot in the application and the [`RecordingChart`] used in tests.

/// Opaque handle to a series owned by the chart widget
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SeriesHandle(pub usize);

/// What the ingestion pipeline needs from a chart widget
pub trait ChartSink {
    /// Allocate a new, empty series
    fn create_series(&mut self, color_index: usize, name: &str) -> SeriesHandle;

    /// Append one data point to a series
    fn append_point(&mut self, series: SeriesHandle, x: f64, y: f64);

    /// Set the horizontal range shown by the widget
    fn set_visible_range(&mut self, lower: f64, upper: f64);

    /// Request a repaint with the current data and range
    fn redraw(&mut self);

    /// Drop all points of a series but keep the series itself
    fn clear_series_data(&mut self, series: SeriesHandle);

    /// Drop the points of every series the widget holds
    fn clear_all_series_data(&mut self);

    /// Change the display name of a series
    fn set_series_name(&mut self, series: SeriesHandle, name: &str);

    /// Remove every series (used when a new connection starts)
    fn remove_all_series(&mut self);
}

/// One call made against a [`RecordingChart`]
#[derive(Debug, Clone, PartialEq)]
pub enum ChartEvent {
    CreateSeries {
        handle: SeriesHandle,
        color_index: usize,
        name: String,
    },
    AppendPoint {
        handle: SeriesHandle,
        x: f64,
        y: f64,
    },
    SetVisibleRange {
        lower: f64,
        upper: f64,
    },
    Redraw,
    ClearSeriesData(SeriesHandle),
    ClearAllSeriesData,
    SetSeriesName {
        handle: SeriesHandle,
        name: String,
    },
    RemoveAllSeries,
}

/// Series state kept by a [`RecordingChart`]
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordedSeries {
    pub color_index: usize,
    pub name: String,
    pub points: Vec<(f64, f64)>,
}

/// In-memory chart that records every call, for headless use
#[derive(Debug, Clone, Default)]
pub struct RecordingChart {
    pub events: Vec<ChartEvent>,
    pub series: Vec<RecordedSeries>,
    pub visible_range: Option<(f64, f64)>,
    pub redraws: usize,
}

impl RecordingChart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Points of a series, empty if the handle is unknown
    pub fn points(&self, series: SeriesHandle) -> &[(f64, f64)] {
        self.series
            .get(series.0)
            .map(|s| s.points.as_slice())
            .unwrap_or(&[])
    }

    /// Y values of a series in insertion order
    pub fn values(&self, series: SeriesHandle) -> Vec<f64> {
        self.points(series).iter().map(|&(_, y)| y).collect()
    }

    pub fn series_count(&self) -> usize {
        self.series.len()
    }

    /// Forget recorded events but keep series state
    pub fn clear_events(&mut self) {
        self.events.clear();
    }
}

impl ChartSink for RecordingChart {
    fn create_series(&mut self, color_index: usize, name: &str) -> SeriesHandle {
        let handle = SeriesHandle(self.series.len());
        self.series.push(RecordedSeries {
            color_index,
            name: name.to_string(),
            points: Vec::new(),
        });
        self.events.push(ChartEvent::CreateSeries {
            handle,
            color_index,
            name: name.to_string(),
        });
        handle
    }

    fn append_point(&mut self, series: SeriesHandle, x: f64, y: f64) {
        if let Some(s) = self.series.get_mut(series.0) {
            s.points.push((x, y));
        }
        self.events.push(ChartEvent::AppendPoint {
            handle: series,
            x,
            y,
        });
    }

    fn set_visible_range(&mut self, lower: f64, upper: f64) {
        self.visible_range = Some((lower, upper));
        self.events.push(ChartEvent::SetVisibleRange { lower, upper });
    }

    fn redraw(&mut self) {
        self.redraws += 1;
        self.events.push(ChartEvent::Redraw);
    }

    fn clear_series_data(&mut self, series: SeriesHandle) {
        if let Some(s) = self.series.get_mut(series.0) {
            s.points.clear();
        }
        self.events.push(ChartEvent::ClearSeriesData(series));
    }

    fn clear_all_series_data(&mut self) {
        for s in &mut self.series {
            s.points.clear();
        }
        self.events.push(ChartEvent::ClearAllSeriesData);
    }

    fn set_series_name(&mut self, series: SeriesHandle, name: &str) {
        if let Some(s) = self.series.get_mut(series.0) {
            s.name = name.to_string();
        }
        self.events.push(ChartEvent::SetSeriesName {
            handle: series,
            name: name.to_string(),
        });
    }

    fn remove_all_series(&mut self) {
        self.series.clear();
        self.visible_range = None;
        self.events.push(ChartEvent::RemoveAllSeries);
    }
}
