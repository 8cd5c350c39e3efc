//! Core data types shared between the backend and the frontend
//!
//! # Main Types
//!
//! - [`ConnectionStatus`] - State of the serial connection
//! - [`CollectionStats`] - Transport-level counters reported by the worker
//! - [`PortInfo`] - A serial port found during discovery
//!
//! The channel colour palette also lives here: series colours are picked as
//! `channel_index % CHANNEL_PALETTE.len()`.

/// Line colours for channel data (MATLAB parula-style palette), RGBA
pub const CHANNEL_PALETTE: [[u8; 4]; 7] = [
    [0x00, 0x72, 0xbd, 255], // blue
    [0xd9, 0x53, 0x19, 255], // orange
    [0xed, 0xb1, 0x20, 255], // yellow
    [0x7e, 0x2f, 0x8e, 255], // purple
    [0x77, 0xac, 0x30, 255], // green
    [0x4d, 0xbe, 0xee, 255], // light blue
    [0xa2, 0x14, 0x2f, 255], // red
];

/// Number of distinct channel colours before the palette repeats
pub const PALETTE_SIZE: usize = CHANNEL_PALETTE.len();

/// Monochrome colours for the plot background, grid and text, RGBA
pub const GUI_BACKGROUND: [u8; 4] = [48, 47, 47, 255];
pub const GUI_GRID: [u8; 4] = [80, 80, 80, 255];
pub const GUI_TEXT: [u8; 4] = [170, 170, 170, 255];

/// Colour for a palette index (wraps around)
pub fn palette_color(color_index: usize) -> [u8; 4] {
    CHANNEL_PALETTE[color_index % PALETTE_SIZE]
}

/// Represents the connection status of the serial port
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ConnectionStatus {
    /// No port open
    #[default]
    Disconnected,
    /// Attempting to open the port
    Connecting,
    /// Port open and being read
    Connected,
    /// Opening failed or the device went away
    Error,
}

impl ConnectionStatus {
    /// Whether the settings controls may be edited in this state
    pub fn controls_enabled(&self) -> bool {
        matches!(self, ConnectionStatus::Disconnected | ConnectionStatus::Error)
    }
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Disconnected => write!(f, "Disconnected"),
            ConnectionStatus::Connecting => write!(f, "Connecting..."),
            ConnectionStatus::Connected => write!(f, "Connected"),
            ConnectionStatus::Error => write!(f, "Error"),
        }
    }
}

/// Statistics about the raw byte transport
#[derive(Debug, Clone, Default)]
pub struct CollectionStats {
    /// Total bytes read from the port
    pub bytes_read: u64,
    /// Number of non-empty reads
    pub chunks_read: u64,
    /// Number of failed reads
    pub read_errors: u64,
    /// Chunks dropped because the UI queue was full
    pub dropped_chunks: u64,
    /// Throughput over the last reporting interval
    pub bytes_per_second: f64,
}

impl CollectionStats {
    /// Record a successful read of `len` bytes
    pub fn record_chunk(&mut self, len: usize) {
        self.bytes_read += len as u64;
        self.chunks_read += 1;
    }
}

/// Kind of serial port, as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PortKind {
    Usb {
        vid: u16,
        pid: u16,
        manufacturer: Option<String>,
        product: Option<String>,
        serial_number: Option<String>,
    },
    Bluetooth,
    Pci,
    /// Simulated device for running without hardware
    Demo,
    Unknown,
}

/// A serial port found during discovery
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PortInfo {
    /// OS name of the port (e.g. `/dev/ttyUSB0`, `COM3`)
    pub name: String,
    pub kind: PortKind,
}

impl PortInfo {
    /// Human readable description shown in the status bar
    pub fn description(&self) -> String {
        match &self.kind {
            PortKind::Usb {
                manufacturer,
                product,
                vid,
                pid,
                ..
            } => {
                let parts: Vec<&str> = [manufacturer.as_deref(), product.as_deref()]
                    .into_iter()
                    .flatten()
                    .collect();
                if parts.is_empty() {
                    format!("USB Serial ({:04x}:{:04x})", vid, pid)
                } else {
                    parts.join(" ")
                }
            }
            PortKind::Bluetooth => "Bluetooth".to_string(),
            PortKind::Pci => "PCI".to_string(),
            PortKind::Demo => "Demo device".to_string(),
            PortKind::Unknown => "Serial port".to_string(),
        }
    }
}

impl std::fmt::Display for PortInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name)
    }
}
