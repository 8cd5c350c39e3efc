//! Simulated serial device for testing
//!
//! This module provides a transport that behaves like a device streaming
//! `$...;` frames, so the application can be run and tested without
//! hardware.
//!
//! # Sources
//!
//! - [`MockSource::Waveform`] - Multi-channel waveforms at a fixed frame rate,
//!   paced by wall-clock time (used by the demo port)
//! - [`MockSource::Scripted`] - A fixed list of chunks returned one per read,
//!   for deterministic tests
//!
//! # Data Patterns
//!
//! Each waveform channel uses one [`MockPattern`], cycling through
//! sine, triangle, square and sawtooth by channel index. Values stay in
//! `0..=4095` like a 12-bit ADC.
//!
//! # Enabling
//!
//! The transport is always compiled. The demo port only shows up in the port
//! list when the `mock-serial` feature is enabled:
//!
//! ```bash
//! cargo run --features mock-serial
//! ```

use super::transport::Transport;
use crate::config::SerialConfig;
use crate::error::{PlotterError, Result};
use crate::types::{PortInfo, PortKind};
use std::collections::VecDeque;
use std::time::{Duration, Instant};

/// Port name of the simulated device
pub const DEMO_PORT_NAME: &str = "DEMO";

/// Midpoint and swing of generated values
const ADC_MID: f64 = 2048.0;
const ADC_SWING: f64 = 1800.0;

/// Shape of one generated channel
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MockPattern {
    Sine,
    Triangle,
    Square,
    Sawtooth,
}

impl MockPattern {
    const CYCLE: [MockPattern; 4] = [
        MockPattern::Sine,
        MockPattern::Triangle,
        MockPattern::Square,
        MockPattern::Sawtooth,
    ];

    /// Pattern used for a channel index
    pub fn for_channel(channel: usize) -> Self {
        Self::CYCLE[channel % Self::CYCLE.len()]
    }

    /// Value in `-1.0..=1.0` at `phase` (in cycles)
    fn unit(&self, phase: f64) -> f64 {
        let p = phase.fract();
        match self {
            MockPattern::Sine => (2.0 * std::f64::consts::PI * p).sin(),
            MockPattern::Triangle => 1.0 - 4.0 * (p - 0.5).abs(),
            MockPattern::Square => {
                if p < 0.5 {
                    1.0
                } else {
                    -1.0
                }
            }
            MockPattern::Sawtooth => 2.0 * p - 1.0,
        }
    }
}

/// Build the frame for sample `n` of a `channels`-wide waveform at
/// `rate_hz` frames per second
pub fn waveform_frame(n: u64, channels: usize, rate_hz: f64) -> String {
    let t = n as f64 / rate_hz.max(1.0);
    let values: Vec<String> = (0..channels)
        .map(|ch| {
            // Each channel runs a little slower than the previous one
            let frequency = 1.0 / (ch as f64 + 1.0);
            let v = ADC_MID + ADC_SWING * MockPattern::for_channel(ch).unit(t * frequency);
            (v.round() as i64).clamp(0, 4095).to_string()
        })
        .collect();
    format!("${};", values.join(" "))
}

/// Where the simulated bytes come from
#[derive(Debug, Clone)]
pub enum MockSource {
    /// Continuous frames paced by elapsed time
    Waveform { channels: usize, rate_hz: f64 },
    /// Fixed chunks, one per read
    Scripted(VecDeque<Vec<u8>>),
}

/// Information about the simulated port
pub fn list_mock_ports() -> Vec<PortInfo> {
    vec![PortInfo {
        name: DEMO_PORT_NAME.to_string(),
        kind: PortKind::Demo,
    }]
}

/// Simulated serial device
#[derive(Debug)]
pub struct MockTransport {
    source: MockSource,
    open: bool,
    port_name: Option<String>,
    fail_open: bool,
    /// Fail reads once the script is exhausted, like an unplugged device
    disconnect_when_drained: bool,
    opened_at: Option<Instant>,
    frames_sent: u64,
    read_timeout: Duration,
    pending: VecDeque<u8>,
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::waveform(3, 100.0)
    }
}

impl MockTransport {
    fn with_source(source: MockSource) -> Self {
        Self {
            source,
            open: false,
            port_name: None,
            fail_open: false,
            disconnect_when_drained: false,
            opened_at: None,
            frames_sent: 0,
            read_timeout: Duration::from_millis(crate::config::DEFAULT_READ_TIMEOUT_MS),
            pending: VecDeque::new(),
        }
    }

    /// Device streaming `channels` waveforms at `rate_hz` frames per second
    pub fn waveform(channels: usize, rate_hz: f64) -> Self {
        Self::with_source(MockSource::Waveform {
            channels: channels.max(1),
            rate_hz: rate_hz.max(1.0),
        })
    }

    /// Device that returns `chunks` in order, one per read
    pub fn scripted<I, B>(chunks: I) -> Self
    where
        I: IntoIterator<Item = B>,
        B: Into<Vec<u8>>,
    {
        Self::with_source(MockSource::Scripted(
            chunks.into_iter().map(Into::into).collect(),
        ))
    }

    /// Make every open attempt fail
    pub fn failing_open(mut self) -> Self {
        self.fail_open = true;
        self
    }

    /// Report a lost device once the scripted chunks are used up
    pub fn disconnect_when_drained(mut self) -> Self {
        self.disconnect_when_drained = true;
        self
    }

    fn generate_due_frames(&mut self, channels: usize, rate_hz: f64) {
        let Some(opened_at) = self.opened_at else {
            return;
        };
        let due = (opened_at.elapsed().as_secs_f64() * rate_hz) as u64;
        while self.frames_sent < due {
            let frame = waveform_frame(self.frames_sent, channels, rate_hz);
            self.pending.extend(frame.bytes());
            self.pending.extend(b"\r\n");
            self.frames_sent += 1;
        }
    }
}

impl Transport for MockTransport {
    fn open(&mut self, config: &SerialConfig) -> Result<()> {
        if self.fail_open {
            return Err(PlotterError::Io(std::io::Error::new(
                std::io::ErrorKind::PermissionDenied,
                "simulated open failure",
            )));
        }
        self.open = true;
        self.port_name = Some(
            config
                .port_name
                .clone()
                .unwrap_or_else(|| DEMO_PORT_NAME.to_string()),
        );
        self.read_timeout = Duration::from_millis(config.read_timeout_ms);
        self.opened_at = Some(Instant::now());
        self.frames_sent = 0;
        self.pending.clear();
        tracing::info!("Opened simulated device");
        Ok(())
    }

    fn close(&mut self) {
        if self.open {
            tracing::info!("Closed simulated device");
        }
        self.open = false;
        self.port_name = None;
        self.opened_at = None;
        self.pending.clear();
    }

    fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        if !self.open {
            return Err(PlotterError::NotConnected);
        }

        match &mut self.source {
            MockSource::Scripted(chunks) => {
                if self.pending.is_empty() {
                    match chunks.pop_front() {
                        Some(chunk) => self.pending.extend(chunk),
                        None if self.disconnect_when_drained => {
                            return Err(PlotterError::Io(std::io::Error::new(
                                std::io::ErrorKind::BrokenPipe,
                                "simulated device unplugged",
                            )));
                        }
                        None => {
                            std::thread::sleep(self.read_timeout);
                        }
                    }
                }
            }
            MockSource::Waveform { channels, rate_hz } => {
                let (channels, rate_hz) = (*channels, *rate_hz);
                self.generate_due_frames(channels, rate_hz);
                if self.pending.is_empty() {
                    std::thread::sleep(self.read_timeout);
                    self.generate_due_frames(channels, rate_hz);
                }
            }
        }

        let n = buf.len().min(self.pending.len());
        for (slot, byte) in buf.iter_mut().zip(self.pending.drain(..n)) {
            *slot = byte;
        }
        Ok(n)
    }

    fn transport_name(&self) -> &'static str {
        "mock"
    }
}
