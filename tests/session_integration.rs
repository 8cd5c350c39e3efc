//! Integration tests for the ingestion pipeline
//!
//! These tests drive a [`PlotSession`] with raw bytes and check what reaches
//! the chart:
//! - Framing across chunk boundaries
//! - Channel creation and time alignment
//! - Rolling window, pause and clear
//! - Connection boundaries

mod common;

use common::builders::{chunked, frame, stream, FrameBuilder};
use common::connected_session;
use proptest::prelude::*;
use serial_plotter::config::AppConfig;
use serial_plotter::ingest::{
    ChartEvent, DecodeErrorPolicy, PlotSession, RecordingChart, RunState, SeriesHandle,
    VisibleWindow,
};
use serial_plotter::protocol::StartMarkerPolicy;

#[test]
fn test_two_messages_in_one_chunk_share_sample_indices() {
    let (mut session, mut chart) = connected_session();

    assert_eq!(session.ingest(1, b"$1 2;$3 4;", &mut chart), 2);

    assert_eq!(chart.points(SeriesHandle(0)), &[(0.0, 1.0), (1.0, 3.0)]);
    assert_eq!(chart.points(SeriesHandle(1)), &[(0.0, 2.0), (1.0, 4.0)]);
    assert_eq!(session.current_sample_index(), 2);
}

#[test]
fn test_window_of_two_after_three_messages() {
    let (mut session, mut chart) = connected_session();

    for row in [[10, 20], [11, 21], [12, 22]] {
        session.ingest(1, &frame(&row), &mut chart);
    }
    session.set_window_size(2);

    let window = session.tick(&mut chart).unwrap();
    assert_eq!(window, VisibleWindow { lower: 1, upper: 3 });
    assert_eq!(chart.visible_range, Some((1.0, 3.0)));
    assert_eq!(chart.redraws, 1);
}

#[test]
fn test_late_channel_has_no_backfill() {
    let (mut session, mut chart) = connected_session();

    let mut rows: Vec<Vec<i64>> = vec![vec![1]; 4];
    rows.push(vec![5, 50]);
    let rows: Vec<&[i64]> = rows.iter().map(Vec::as_slice).collect();
    session.ingest(1, &stream(&rows), &mut chart);

    assert_eq!(session.channels().len(), 2);
    assert_eq!(chart.points(SeriesHandle(1)), &[(4.0, 50.0)]);
    assert_eq!(chart.points(SeriesHandle(0)).len(), 5);
}

#[test]
fn test_stray_characters_are_stripped() {
    let (mut session, mut chart) = connected_session();

    session.ingest(1, b"noise\r\n$1a2 x3;\r\n", &mut chart);

    // Letters are dropped inside the message, so "1a2" becomes "12"
    assert_eq!(chart.values(SeriesHandle(0)), vec![12.0]);
    assert_eq!(chart.values(SeriesHandle(1)), vec![3.0]);
}

#[test]
fn test_message_split_across_many_chunks() {
    let (mut session, mut chart) = connected_session();
    let bytes = stream(&[&[100, 200, 300], &[101, 201, 301]]);

    let mut routed = 0;
    for chunk in chunked(&bytes, 1) {
        routed += session.ingest(1, &chunk, &mut chart);
    }

    assert_eq!(routed, 2);
    assert_eq!(chart.values(SeriesHandle(2)), vec![300.0, 301.0]);
}

#[test]
fn test_pause_drops_samples_and_freezes_cursor() {
    let (mut session, mut chart) = connected_session();
    session.ingest(1, &frame(&[1]), &mut chart);

    assert_eq!(session.toggle_pause(), RunState::Paused);
    session.ingest(1, &stream(&[&[2], &[3]]), &mut chart);
    assert_eq!(session.tick(&mut chart), None);
    assert_eq!(session.current_sample_index(), 1);
    assert_eq!(session.stats().ignored_while_paused, 2);

    assert_eq!(session.toggle_pause(), RunState::Running);
    session.ingest(1, &frame(&[4]), &mut chart);
    assert_eq!(chart.points(SeriesHandle(0)), &[(0.0, 1.0), (1.0, 4.0)]);
}

#[test]
fn test_clear_keeps_channels_and_restarts_index() {
    let (mut session, mut chart) = connected_session();
    session.ingest(1, &stream(&[&[1, 2], &[3, 4]]), &mut chart);
    session.rename_channel(1, "Current", &mut chart);

    session.clear(&mut chart);
    assert_eq!(session.current_sample_index(), 0);
    assert_eq!(chart.series_count(), 2);
    assert!(chart.points(SeriesHandle(0)).is_empty());
    assert_eq!(session.channels()[1].name, "Current");

    session.ingest(1, &frame(&[9, 8]), &mut chart);
    assert_eq!(chart.points(SeriesHandle(1)), &[(0.0, 8.0)]);
    // No new series were created for existing channels
    assert_eq!(chart.series_count(), 2);
}

#[test]
fn test_reconnect_starts_fresh() {
    let (mut session, mut chart) = connected_session();
    session.ingest(1, b"$1 2 3;$4", &mut chart);
    session.disconnect();
    assert_eq!(session.stats().discarded_partials, 1);

    session.connect(2, &mut chart);
    assert!(chart.events.contains(&ChartEvent::RemoveAllSeries));
    assert_eq!(chart.series_count(), 0);

    // Bytes still in flight from the old connection
    assert_eq!(session.ingest(1, b"5 6;", &mut chart), 0);
    assert_eq!(session.stats().stale_chunks, 1);

    session.ingest(2, b"$7;", &mut chart);
    assert_eq!(chart.points(SeriesHandle(0)), &[(0.0, 7.0)]);
}

#[test]
fn test_tick_requires_connection() {
    let mut session = PlotSession::default();
    let mut chart = RecordingChart::new();
    assert_eq!(session.tick(&mut chart), None);
    assert!(chart.events.is_empty());
}

#[test]
fn test_overflow_uses_configured_policy() {
    let huge = "99999999999999999999999";
    let bytes = FrameBuilder::tokens(&["1", huge, "3"]).build();

    for (policy, expected) in [
        (DecodeErrorPolicy::ZeroFill, vec![0.0]),
        (DecodeErrorPolicy::Saturate, vec![i64::MAX as f64]),
        (DecodeErrorPolicy::Skip, vec![]),
    ] {
        let mut config = AppConfig::default();
        config.protocol.decode_error_policy = policy;
        let mut session = PlotSession::new(&config).unwrap();
        let mut chart = RecordingChart::new();
        session.connect(1, &mut chart);

        session.ingest(1, &bytes, &mut chart);
        assert_eq!(chart.values(SeriesHandle(1)), expected, "{:?}", policy);
        assert_eq!(chart.values(SeriesHandle(2)), vec![3.0]);
        assert_eq!(session.current_sample_index(), 1);
        assert_eq!(session.stats().decode_errors, 1);
    }
}

#[test]
fn test_channel_cap_drops_extra_values() {
    let mut config = AppConfig::default();
    config.protocol.max_channels = Some(3);
    let mut session = PlotSession::new(&config).unwrap();
    let mut chart = RecordingChart::new();
    session.connect(1, &mut chart);

    session.ingest(1, &frame(&[1, 2, 3, 4, 5]), &mut chart);
    assert_eq!(chart.series_count(), 3);
    assert_eq!(session.stats().dropped_values, 2);
}

#[test]
fn test_custom_markers_and_ignore_policy() {
    let mut config = AppConfig::default();
    config.protocol.start_marker = '<';
    config.protocol.end_marker = '>';
    config.protocol.start_marker_policy = StartMarkerPolicy::Ignore;
    let mut session = PlotSession::new(&config).unwrap();
    let mut chart = RecordingChart::new();
    session.connect(1, &mut chart);

    // A second start marker inside a message is ignored
    session.ingest(1, b"<1 <2>", &mut chart);
    assert_eq!(chart.values(SeriesHandle(0)), vec![1.0]);
    assert_eq!(chart.values(SeriesHandle(1)), vec![2.0]);
    assert_eq!(session.resync_count(), 0);
}

#[test]
fn test_resync_policy_restarts_message() {
    let (mut session, mut chart) = connected_session();

    session.ingest(1, b"$1 2$3;", &mut chart);
    assert_eq!(chart.series_count(), 1);
    assert_eq!(chart.values(SeriesHandle(0)), vec![3.0]);
    assert_eq!(session.resync_count(), 1);
}

proptest! {
    #[test]
    fn prop_chunking_does_not_change_plot(
        rows in prop::collection::vec(prop::collection::vec(0i64..100_000, 1..5), 1..20),
        chunk_size in 1usize..16,
    ) {
        let rows: Vec<&[i64]> = rows.iter().map(Vec::as_slice).collect();
        let bytes = stream(&rows);

        let (mut whole, mut whole_chart) = connected_session();
        whole.ingest(1, &bytes, &mut whole_chart);

        let (mut split, mut split_chart) = connected_session();
        for chunk in chunked(&bytes, chunk_size) {
            split.ingest(1, &chunk, &mut split_chart);
        }

        prop_assert_eq!(whole.current_sample_index(), rows.len() as u64);
        prop_assert_eq!(split.current_sample_index(), rows.len() as u64);
        prop_assert_eq!(&whole_chart.series, &split_chart.series);
    }
}
