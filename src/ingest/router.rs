//! Channel routing
//!
//! Maps each decoded value to its channel by position and appends it to the
//! matching chart series at the current sample index. Channels are created
//! lazily the first time a message carries enough values to reach them; a
//! late channel is never back-filled.

use super::chart::{ChartSink, SeriesHandle};
use crate::protocol::DecodedMessage;
use crate::types::PALETTE_SIZE;
use serde::{Deserialize, Serialize};

/// What to plot for a token that failed to decode
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DecodeErrorPolicy {
    /// Plot zero at this position
    #[default]
    ZeroFill,
    /// Append nothing to this channel for this sample
    Skip,
    /// Plot the clamped value for out-of-range numbers, skip anything else
    Saturate,
}

impl DecodeErrorPolicy {
    pub const ALL: [DecodeErrorPolicy; 3] = [
        DecodeErrorPolicy::ZeroFill,
        DecodeErrorPolicy::Skip,
        DecodeErrorPolicy::Saturate,
    ];
}

impl std::fmt::Display for DecodeErrorPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DecodeErrorPolicy::ZeroFill => write!(f, "Zero fill"),
            DecodeErrorPolicy::Skip => write!(f, "Skip"),
            DecodeErrorPolicy::Saturate => write!(f, "Saturate"),
        }
    }
}

/// Name given to a channel when it is first created
pub fn default_channel_name(index: usize) -> String {
    format!("Channel {}", index)
}

/// One plotted channel
#[derive(Debug, Clone, PartialEq)]
pub struct Channel {
    /// Position of this channel's value within each message
    pub index: usize,
    pub handle: SeriesHandle,
    pub color_index: usize,
    pub name: String,
}

/// Ordered set of channels known for the current connection.
///
/// Element `i` always has `index == i` and the set only grows until it is
/// reset.
#[derive(Debug, Clone, Default)]
pub struct ChannelSet {
    channels: Vec<Channel>,
}

impl ChannelSet {
    pub fn len(&self) -> usize {
        self.channels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Channel> {
        self.channels.get(index)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Channel> {
        self.channels.iter()
    }

    pub fn as_slice(&self) -> &[Channel] {
        &self.channels
    }

    fn ensure(&mut self, count: usize, chart: &mut dyn ChartSink) -> usize {
        let mut created = 0;
        while self.channels.len() < count {
            let index = self.channels.len();
            let color_index = index % PALETTE_SIZE;
            let name = default_channel_name(index);
            let handle = chart.create_series(color_index, &name);
            tracing::debug!("Created channel {} ({:?})", index, handle);
            self.channels.push(Channel {
                index,
                handle,
                color_index,
                name,
            });
            created += 1;
        }
        created
    }

    fn clear(&mut self) {
        self.channels.clear();
    }
}

/// Monotonic x-coordinate shared by all channels
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SampleCursor(u64);

impl SampleCursor {
    pub fn get(&self) -> u64 {
        self.0
    }

    fn advance(&mut self) {
        self.0 = self.0.saturating_add(1);
    }

    fn reset(&mut self) {
        self.0 = 0;
    }
}

/// What routing one message did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RouteOutcome {
    /// Channels created by this message
    pub created: usize,
    /// Points appended to the chart
    pub appended: usize,
    /// Tokens that failed to decode
    pub decode_errors: usize,
    /// Values beyond the channel limit
    pub dropped: usize,
}

/// Routes decoded messages to chart series
#[derive(Debug, Clone, Default)]
pub struct ChannelRouter {
    channels: ChannelSet,
    cursor: SampleCursor,
    max_channels: Option<usize>,
    error_policy: DecodeErrorPolicy,
}

impl ChannelRouter {
    pub fn new(max_channels: Option<usize>, error_policy: DecodeErrorPolicy) -> Self {
        Self {
            channels: ChannelSet::default(),
            cursor: SampleCursor::default(),
            max_channels,
            error_policy,
        }
    }

    pub fn channels(&self) -> &ChannelSet {
        &self.channels
    }

    /// Index the next routed message will be plotted at
    pub fn current_sample_index(&self) -> u64 {
        self.cursor.get()
    }

    pub fn error_policy(&self) -> DecodeErrorPolicy {
        self.error_policy
    }

    pub fn set_error_policy(&mut self, policy: DecodeErrorPolicy) {
        self.error_policy = policy;
    }

    /// Plot one message at the current sample index, then advance the index.
    ///
    /// An empty message creates nothing but still advances the index.
    pub fn route(&mut self, message: &DecodedMessage, chart: &mut dyn ChartSink) -> RouteOutcome {
        let mut outcome = RouteOutcome::default();

        let usable = match self.max_channels {
            Some(limit) => message.len().min(limit),
            None => message.len(),
        };
        outcome.dropped = message.len() - usable;
        outcome.created = self.channels.ensure(usable, chart);

        let x = self.cursor.get() as f64;
        for (i, value) in message.values.iter().take(usable).enumerate() {
            let y = match value {
                Ok(v) => Some(*v),
                Err(err) => {
                    outcome.decode_errors += 1;
                    tracing::trace!("Channel {}: {}", i, err);
                    match self.error_policy {
                        DecodeErrorPolicy::ZeroFill => Some(0),
                        DecodeErrorPolicy::Skip => None,
                        DecodeErrorPolicy::Saturate => err.saturated(),
                    }
                }
            };
            if let (Some(y), Some(channel)) = (y, self.channels.get(i)) {
                chart.append_point(channel.handle, x, y as f64);
                outcome.appended += 1;
            }
        }

        self.cursor.advance();
        outcome
    }

    /// Drop plotted data and restart the index at zero, keeping channels
    pub fn clear(&mut self, chart: &mut dyn ChartSink) {
        for channel in self.channels.iter() {
            chart.clear_series_data(channel.handle);
        }
        self.cursor.reset();
    }

    /// Forget all channels and restart the index at zero
    pub fn reset(&mut self) {
        self.channels.clear();
        self.cursor.reset();
    }

    /// Rename a channel. Returns false if the channel does not exist.
    pub fn rename(&mut self, index: usize, name: &str, chart: &mut dyn ChartSink) -> bool {
        match self.channels.channels.get_mut(index) {
            Some(channel) => {
                channel.name = name.to_string();
                chart.set_series_name(channel.handle, name);
                true
            }
            None => false,
        }
    }
}
