//! Plot session
//!
//! Owns the framer, router and window controller for one plotter and
//! wires them together. All methods run on the UI thread; the serial worker
//! only hands over raw byte chunks tagged with the connection they came from.

use super::chart::ChartSink;
use super::router::{Channel, ChannelRouter};
use super::window::{RunState, VisibleWindow, WindowController};
use crate::config::AppConfig;
use crate::error::Result;
use crate::protocol::{decode_message, ByteFramer};
use std::time::{Duration, Instant};

/// Counters for everything the session has processed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IngestStats {
    /// Bytes fed to the framer
    pub bytes: u64,
    /// Complete frames extracted
    pub frames: u64,
    /// Frames routed to the chart
    pub messages: u64,
    /// Points appended to the chart
    pub points: u64,
    /// Tokens that failed to decode
    pub decode_errors: u64,
    /// Values dropped by the channel limit
    pub dropped_values: u64,
    /// Frames discarded because plotting was paused
    pub ignored_while_paused: u64,
    /// Chunks discarded because they came from a closed connection
    pub stale_chunks: u64,
    /// Partial messages dropped on disconnect, resume or a data gap
    pub discarded_partials: u64,
    /// Times the worker reported chunks it could not deliver
    pub data_gaps: u64,
}

/// Framing, routing and windowing for a single plot
#[derive(Debug)]
pub struct PlotSession {
    framer: ByteFramer,
    router: ChannelRouter,
    window: WindowController,
    connection: Option<u64>,
    stats: IngestStats,
}

impl Default for PlotSession {
    fn default() -> Self {
        Self {
            framer: ByteFramer::default(),
            router: ChannelRouter::default(),
            window: WindowController::default(),
            connection: None,
            stats: IngestStats::default(),
        }
    }
}

impl PlotSession {
    /// Build a session from configuration. Fails if the markers are invalid.
    pub fn new(config: &AppConfig) -> Result<Self> {
        let (start, end) = config.protocol.markers()?;
        Ok(Self {
            framer: ByteFramer::new(start, end, config.protocol.start_marker_policy),
            router: ChannelRouter::new(
                config.protocol.max_channels,
                config.protocol.decode_error_policy,
            ),
            window: WindowController::new(
                config.plot.window_size,
                Duration::from_millis(config.plot.tick_interval_ms),
            ),
            connection: None,
            stats: IngestStats::default(),
        })
    }

    /// Start plotting a fresh connection.
    ///
    /// Everything from the previous connection is forgotten, including the
    /// chart series, and the plot is set running.
    pub fn connect(&mut self, connection_id: u64, chart: &mut dyn ChartSink) {
        self.framer.reset();
        self.router.reset();
        chart.remove_all_series();
        self.window.resume();
        self.window.reset_timer();
        self.stats = IngestStats::default();
        self.connection = Some(connection_id);
        tracing::info!("Plot session started for connection {}", connection_id);
    }

    /// Stop accepting data. The chart keeps what it shows until the next
    /// connect.
    pub fn disconnect(&mut self) {
        if self.framer.reset() {
            self.stats.discarded_partials += 1;
        }
        self.router.reset();
        if let Some(id) = self.connection.take() {
            tracing::info!("Plot session for connection {} ended", id);
        }
    }

    pub fn is_connected(&self) -> bool {
        self.connection.is_some()
    }

    pub fn connection_id(&self) -> Option<u64> {
        self.connection
    }

    /// Feed bytes received on `connection_id`. Chunks from any other
    /// connection are dropped.
    ///
    /// Returns the number of messages routed to the chart.
    pub fn ingest(&mut self, connection_id: u64, chunk: &[u8], chart: &mut dyn ChartSink) -> usize {
        if self.connection != Some(connection_id) {
            self.stats.stale_chunks += 1;
            tracing::trace!(
                "Dropping {} bytes from stale connection {}",
                chunk.len(),
                connection_id
            );
            return 0;
        }
        self.feed(chunk, chart)
    }

    /// Bytes were lost between the previous chunk and the next one.
    ///
    /// Any partial message is discarded so bytes from either side of the gap
    /// are never joined into one message.
    pub fn data_gap(&mut self, connection_id: u64) {
        if self.connection != Some(connection_id) {
            return;
        }
        self.stats.data_gaps += 1;
        if self.framer.reset() {
            self.stats.discarded_partials += 1;
        }
        tracing::debug!("Data gap on connection {}", connection_id);
    }

    /// Feed bytes without checking which connection they came from.
    ///
    /// Returns the number of messages routed to the chart.
    pub fn feed(&mut self, chunk: &[u8], chart: &mut dyn ChartSink) -> usize {
        self.stats.bytes += chunk.len() as u64;

        let router = &mut self.router;
        let window = &self.window;
        let stats = &mut self.stats;
        let mut routed = 0;

        self.framer.push_with(chunk, |raw| {
            stats.frames += 1;
            if !window.is_running() {
                stats.ignored_while_paused += 1;
                return;
            }
            let message = decode_message(raw);
            let outcome = router.route(&message, chart);
            stats.messages += 1;
            stats.points += outcome.appended as u64;
            stats.decode_errors += outcome.decode_errors as u64;
            stats.dropped_values += outcome.dropped as u64;
            routed += 1;
        });

        routed
    }

    /// Erase plotted data and restart the sample index at zero. Channels and
    /// their names are kept.
    ///
    /// After a disconnect the channels are gone but the chart still shows
    /// the last connection, so every series on the chart is emptied.
    pub fn clear(&mut self, chart: &mut dyn ChartSink) {
        self.router.clear(chart);
        if !self.is_connected() {
            chart.clear_all_series_data();
        }
        chart.redraw();
    }

    /// Stop plotting. Frames keep being consumed and discarded.
    pub fn pause(&mut self) {
        if self.window.is_running() {
            tracing::info!("Plotting paused at sample {}", self.current_sample_index());
        }
        self.window.pause();
    }

    /// Continue plotting from the current sample index.
    ///
    /// A message that started while paused is dropped.
    pub fn resume(&mut self) {
        if self.window.is_running() {
            return;
        }
        if self.framer.reset() {
            self.stats.discarded_partials += 1;
        }
        self.window.resume();
        tracing::info!("Plotting resumed at sample {}", self.current_sample_index());
    }

    pub fn toggle_pause(&mut self) -> RunState {
        match self.window.state() {
            RunState::Running => self.pause(),
            RunState::Paused => self.resume(),
        }
        self.window.state()
    }

    pub fn run_state(&self) -> RunState {
        self.window.state()
    }

    /// Move the visible range to the newest samples and redraw.
    ///
    /// Does nothing while paused or disconnected.
    pub fn tick(&mut self, chart: &mut dyn ChartSink) -> Option<VisibleWindow> {
        if !self.is_connected() {
            return None;
        }
        self.window.tick(self.router.current_sample_index(), chart)
    }

    /// Tick if the tick interval has elapsed
    pub fn poll_tick(&mut self, now: Instant, chart: &mut dyn ChartSink) -> Option<VisibleWindow> {
        if !self.is_connected() {
            return None;
        }
        self.window
            .poll(now, self.router.current_sample_index(), chart)
    }

    /// How long the UI may sleep before the next tick is due
    pub fn time_until_tick(&self, now: Instant) -> Duration {
        self.window.time_until_due(now)
    }

    pub fn window_size(&self) -> u64 {
        self.window.window_size()
    }

    /// Change how many samples are shown. Returns the clamped size.
    pub fn set_window_size(&mut self, size: u64) -> u64 {
        self.window.set_window_size(size)
    }

    pub fn visible_window(&self) -> VisibleWindow {
        self.window.visible_window(self.router.current_sample_index())
    }

    pub fn current_sample_index(&self) -> u64 {
        self.router.current_sample_index()
    }

    pub fn channels(&self) -> &[Channel] {
        self.router.channels().as_slice()
    }

    /// Rename a channel on both the session and the chart
    pub fn rename_channel(&mut self, index: usize, name: &str, chart: &mut dyn ChartSink) -> bool {
        self.router.rename(index, name, chart)
    }

    pub fn stats(&self) -> &IngestStats {
        &self.stats
    }

    /// Partial messages dropped so far because a new start marker arrived
    pub fn resync_count(&self) -> u64 {
        self.framer.resync_count()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ingest::chart::{RecordingChart, SeriesHandle};

    fn connected() -> (PlotSession, RecordingChart) {
        let mut session = PlotSession::default();
        let mut chart = RecordingChart::new();
        session.connect(1, &mut chart);
        (session, chart)
    }

    #[test]
    fn test_two_messages_one_chunk() {
        let (mut session, mut chart) = connected();

        assert_eq!(session.ingest(1, b"$1 2;$3 4;", &mut chart), 2);
        assert_eq!(chart.points(SeriesHandle(0)), &[(0.0, 1.0), (1.0, 3.0)]);
        assert_eq!(chart.points(SeriesHandle(1)), &[(0.0, 2.0), (1.0, 4.0)]);
        assert_eq!(session.current_sample_index(), 2);
    }

    #[test]
    fn test_rolling_window_scenario() {
        let (mut session, mut chart) = connected();
        session.set_window_size(2);

        session.ingest(1, b"$1;$2;$3;", &mut chart);
        let window = session.tick(&mut chart);

        assert_eq!(window, Some(VisibleWindow { lower: 1, upper: 3 }));
        assert_eq!(chart.visible_range, Some((1.0, 3.0)));
    }

    #[test]
    fn test_pause_stops_ingestion_and_ticks() {
        let (mut session, mut chart) = connected();
        session.ingest(1, b"$5;", &mut chart);

        session.pause();
        assert_eq!(session.ingest(1, b"$6;$7;", &mut chart), 0);
        assert_eq!(session.current_sample_index(), 1);
        assert_eq!(session.stats().ignored_while_paused, 2);

        let redraws = chart.redraws;
        assert!(session.tick(&mut chart).is_none());
        assert_eq!(chart.redraws, redraws);

        session.resume();
        session.ingest(1, b"$8;", &mut chart);
        assert_eq!(chart.values(SeriesHandle(0)), vec![5.0, 8.0]);
        assert_eq!(chart.points(SeriesHandle(0))[1].0, 1.0);
    }

    #[test]
    fn test_message_straddling_pause_is_not_plotted() {
        let (mut session, mut chart) = connected();

        session.pause();
        session.ingest(1, b"$1 2", &mut chart);
        assert_eq!(session.toggle_pause(), RunState::Running);
        session.ingest(1, b" 3;$4;", &mut chart);

        assert_eq!(chart.values(SeriesHandle(0)), vec![4.0]);
        assert_eq!(session.stats().discarded_partials, 1);
    }

    #[test]
    fn test_clear_keeps_channels_and_names() {
        let (mut session, mut chart) = connected();
        session.ingest(1, b"$1 2;$3 4;$5 6;", &mut chart);
        session.rename_channel(0, "Temp", &mut chart);

        session.clear(&mut chart);
        assert_eq!(session.current_sample_index(), 0);
        assert_eq!(session.channels().len(), 2);
        assert_eq!(session.channels()[0].name, "Temp");

        session.ingest(1, b"$9 9;", &mut chart);
        assert_eq!(chart.points(SeriesHandle(0)), &[(0.0, 9.0)]);
        assert_eq!(chart.series[0].name, "Temp");
    }

    #[test]
    fn test_stale_connection_is_ignored() {
        let (mut session, mut chart) = connected();
        session.disconnect();
        session.connect(2, &mut chart);

        assert_eq!(session.ingest(1, b"$1;", &mut chart), 0);
        assert_eq!(session.stats().stale_chunks, 1);
        assert_eq!(chart.series_count(), 0);

        assert_eq!(session.ingest(2, b"$1;", &mut chart), 1);
    }

    #[test]
    fn test_disconnect_discards_partial() {
        let (mut session, mut chart) = connected();
        session.ingest(1, b"$1 2;$3", &mut chart);
        session.disconnect();

        assert_eq!(session.stats().discarded_partials, 1);
        assert!(session.tick(&mut chart).is_none());
        // Chart still shows the old data until the next connect
        assert_eq!(chart.values(SeriesHandle(0)), vec![1.0]);

        session.connect(2, &mut chart);
        assert_eq!(chart.series_count(), 0);
        session.ingest(2, b" 4;$7;", &mut chart);
        assert_eq!(chart.values(SeriesHandle(0)), vec![7.0]);
        assert_eq!(session.current_sample_index(), 1);
    }

    #[test]
    fn test_clear_after_disconnect_empties_chart() {
        let (mut session, mut chart) = connected();
        session.ingest(1, b"$1 2;$3 4;", &mut chart);
        session.disconnect();

        session.clear(&mut chart);
        assert_eq!(chart.series_count(), 2);
        assert!(chart.points(SeriesHandle(0)).is_empty());
        assert!(chart.points(SeriesHandle(1)).is_empty());
        assert_eq!(session.current_sample_index(), 0);
    }

    #[test]
    fn test_data_gap_discards_partial_message() {
        let (mut session, mut chart) = connected();

        session.ingest(1, b"$1 2", &mut chart);
        session.data_gap(1);
        session.ingest(1, b" 6;$7 8;", &mut chart);

        assert_eq!(chart.series_count(), 2);
        assert_eq!(chart.values(SeriesHandle(0)), vec![7.0]);
        assert_eq!(chart.values(SeriesHandle(1)), vec![8.0]);
        assert_eq!(session.stats().data_gaps, 1);
        assert_eq!(session.stats().discarded_partials, 1);
    }

    #[test]
    fn test_data_gap_from_other_connection_is_ignored() {
        let (mut session, mut chart) = connected();
        session.ingest(1, b"$1", &mut chart);
        session.data_gap(9);
        session.ingest(1, b"2;", &mut chart);

        assert_eq!(chart.values(SeriesHandle(0)), vec![12.0]);
        assert_eq!(session.stats().data_gaps, 0);
    }

    #[test]
    fn test_new_rejects_bad_markers() {
        let mut config = AppConfig::default();
        config.protocol.start_marker = ';';
        assert!(PlotSession::new(&config).is_err());

        let config = AppConfig::default();
        let session = PlotSession::new(&config).unwrap();
        assert_eq!(session.window_size(), config.plot.window_size);
    }
}
