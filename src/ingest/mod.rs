//! Sample ingestion pipeline
//!
//! Bytes from the serial worker flow through:
//!
//! ```text
//! bytes -> ByteFramer -> decode_message -> ChannelRouter -> ChartSink
//!                                                              ^
//!                                 WindowController (tick) -----+
//! ```
//!
//! [`PlotSession`] owns the stateful pieces and is the entry point used by
//! the application.

pub mod chart;
pub mod router;
pub mod session;
pub mod window;

pub use chart::{ChartEvent, ChartSink, RecordingChart, SeriesHandle};
pub use router::{Channel, ChannelRouter, ChannelSet, DecodeErrorPolicy, RouteOutcome};
pub use session::{IngestStats, PlotSession};
pub use window::{RunState, VisibleWindow, WindowController, MAX_WINDOW_SIZE, MIN_WINDOW_SIZE};
