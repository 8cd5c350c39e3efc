//! Backend module for serial port I/O
//!
//! This module handles all serial communication in a separate thread to keep
//! the UI responsive. It uses crossbeam channels for thread-safe communication
//! with the frontend. The backend never parses the stream: it forwards raw
//! byte chunks and the UI thread runs framing, decoding and routing.
//!
//! # Architecture
//!
//! - [`BackendCommand`] - Messages sent from UI to backend (connect, disconnect, refresh)
//! - [`BackendMessage`] - Messages sent from backend to UI (bytes, status, errors)
//! - [`FrontendReceiver`] - UI-side handle for sending commands and receiving messages
//! - [`SerialBackend`] - Main backend entry point that owns the worker state
//!
//! # Components
//!
//! - [`Transport`] - Byte source abstraction
//! - [`SerialPortTransport`] - Real serial port via the `serialport` crate
//! - [`MockTransport`] - Simulated device for demos and tests
//! - [`BackendWorker`] - Worker loop that processes commands and reads the port
//!
//! # Example
//!
//! ```ignore
//! use serial_plotter::backend::{BackendMessage, SerialBackend};
//! use serial_plotter::config::{AppConfig, SerialConfig};
//!
//! let config = AppConfig::default();
//! let (backend, frontend) = SerialBackend::new(config);
//!
//! // Spawn backend thread
//! std::thread::spawn(move || backend.run());
//!
//! frontend.connect(SerialConfig::for_port("/dev/ttyUSB0"));
//!
//! for msg in frontend.drain() {
//!     if let BackendMessage::Data { connection_id, bytes } = msg {
//!         // Feed the plot session
//!     }
//! }
//! ```

pub mod mock_port;
pub mod serial;
pub mod transport;
pub mod worker;

pub use mock_port::{list_mock_ports, waveform_frame, MockPattern, MockTransport, DEMO_PORT_NAME};
pub use serial::{list_ports, SerialPortTransport};
pub use transport::Transport;
pub use worker::BackendWorker;

use crate::config::{AppConfig, SerialConfig};
use crate::types::{CollectionStats, ConnectionStatus, PortInfo};
use crossbeam_channel::{bounded, Receiver, Sender};
use std::sync::atomic::AtomicBool;
use std::sync::Arc;

/// Capacity of the command queue
const COMMAND_QUEUE_SIZE: usize = 256;

/// Capacity of the message queue. Chunks are dropped (and counted) when
/// the UI falls this far behind, and a [`BackendMessage::DataGap`] marks
/// where.
const MESSAGE_QUEUE_SIZE: usize = 10_000;

/// Message sent from the UI to the backend
#[derive(Debug, Clone)]
pub enum BackendCommand {
    /// Open a port
    Connect {
        /// Port name and line settings
        serial: SerialConfig,
    },
    /// Close the current port
    Disconnect,
    /// Request port list refresh
    RefreshPorts,
    /// Request current statistics
    RequestStats,
    /// Shutdown the backend
    Shutdown,
    /// Use the simulated device instead of a real port (only available with mock-serial feature)
    #[cfg(feature = "mock-serial")]
    UseMockPort(bool),
}

/// Message sent from the backend to the UI
#[derive(Debug, Clone)]
pub enum BackendMessage {
    /// Connection status changed
    ConnectionStatus(ConnectionStatus),
    /// A port was opened; its chunks carry `connection_id`
    PortOpened {
        connection_id: u64,
        port_name: String,
    },
    /// The port of `connection_id` was closed
    PortClosed { connection_id: u64 },
    /// Opening or reading the port failed
    ConnectionError(String),
    /// Raw bytes read from the port
    Data { connection_id: u64, bytes: Vec<u8> },
    /// Chunks of `connection_id` were dropped because the queue was full.
    /// Sent before the next delivered chunk.
    DataGap { connection_id: u64 },
    /// Port list update (response to RefreshPorts)
    PortList(Vec<PortInfo>),
    /// Statistics update
    Stats(CollectionStats),
    /// Backend is shutting down
    Shutdown,
}

/// List all ports to offer in the UI (real + simulated if feature enabled)
///
/// Enumeration failures are logged and yield an empty list.
pub fn list_all_ports() -> Vec<PortInfo> {
    let mut ports = match list_ports() {
        Ok(ports) => ports,
        Err(e) => {
            tracing::warn!("Port enumeration failed: {}", e);
            Vec::new()
        }
    };

    #[cfg(feature = "mock-serial")]
    ports.extend(list_mock_ports());

    tracing::debug!("Found {} ports", ports.len());
    ports
}

/// Frontend receiver for backend messages
pub struct FrontendReceiver {
    /// Receiver for backend messages
    pub receiver: Receiver<BackendMessage>,
    /// Sender for commands to the backend
    pub command_sender: Sender<BackendCommand>,
}

impl FrontendReceiver {
    /// Try to receive a message without blocking
    pub fn try_recv(&self) -> Option<BackendMessage> {
        self.receiver.try_recv().ok()
    }

    /// Receive all pending messages
    pub fn drain(&self) -> Vec<BackendMessage> {
        self.receiver.try_iter().collect()
    }

    /// Send a command to the backend
    pub fn send_command(&self, cmd: BackendCommand) -> bool {
        self.command_sender.send(cmd).is_ok()
    }

    /// Request opening a port
    pub fn connect(&self, serial: SerialConfig) {
        let _ = self.command_sender.send(BackendCommand::Connect { serial });
    }

    /// Request closing the port
    pub fn disconnect(&self) {
        let _ = self.command_sender.send(BackendCommand::Disconnect);
    }

    /// Request a fresh port list
    pub fn refresh_ports(&self) {
        let _ = self.command_sender.send(BackendCommand::RefreshPorts);
    }

    /// Request a statistics update
    pub fn request_stats(&self) {
        let _ = self.command_sender.send(BackendCommand::RequestStats);
    }

    /// Set whether to use the simulated device (only available with mock-serial feature)
    #[cfg(feature = "mock-serial")]
    pub fn use_mock_port(&self, use_mock: bool) {
        let _ = self
            .command_sender
            .send(BackendCommand::UseMockPort(use_mock));
    }

    /// Request shutdown
    pub fn shutdown(&self) {
        let _ = self.command_sender.send(BackendCommand::Shutdown);
    }
}

/// The serial backend that runs in a separate thread
pub struct SerialBackend {
    /// Configuration
    config: AppConfig,
    /// Receiver for commands from the UI
    command_receiver: Receiver<BackendCommand>,
    /// Sender for messages to the UI
    message_sender: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Byte source; `None` means a real serial port
    transport: Option<Box<dyn Transport>>,
}

impl SerialBackend {
    /// Create a new serial backend with communication channels
    pub fn new(config: AppConfig) -> (Self, FrontendReceiver) {
        Self::build(config, None)
    }

    /// Create a backend reading from a custom transport
    pub fn with_transport(
        config: AppConfig,
        transport: Box<dyn Transport>,
    ) -> (Self, FrontendReceiver) {
        Self::build(config, Some(transport))
    }

    fn build(config: AppConfig, transport: Option<Box<dyn Transport>>) -> (Self, FrontendReceiver) {
        let (cmd_tx, cmd_rx) = bounded(COMMAND_QUEUE_SIZE);
        // Bounded for backpressure if the UI can't keep up
        let (msg_tx, msg_rx) = bounded(MESSAGE_QUEUE_SIZE);

        let backend = Self {
            config,
            command_receiver: cmd_rx,
            message_sender: msg_tx,
            running: Arc::new(AtomicBool::new(true)),
            transport,
        };

        let frontend = FrontendReceiver {
            receiver: msg_rx,
            command_sender: cmd_tx,
        };

        (backend, frontend)
    }

    /// Run the backend loop
    pub fn run(self) {
        let mut worker = match self.transport {
            Some(transport) => BackendWorker::with_transport(
                self.config,
                self.command_receiver,
                self.message_sender,
                self.running,
                transport,
            ),
            None => BackendWorker::new(
                self.config,
                self.command_receiver,
                self.message_sender,
                self.running,
            ),
        };
        worker.run();
    }

    /// Get a handle to stop the backend
    pub fn stop_handle(&self) -> Arc<AtomicBool> {
        self.running.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    #[test]
    fn test_backend_creation() {
        let config = AppConfig::default();
        let (backend, frontend) = SerialBackend::new(config);

        // Backend should be running
        assert!(backend.running.load(Ordering::SeqCst));

        // Should be able to send commands
        assert!(frontend.send_command(BackendCommand::Shutdown));
    }

    #[test]
    fn test_frontend_receiver_commands() {
        let (backend, frontend) = SerialBackend::new(AppConfig::default());

        frontend.refresh_ports();
        frontend.connect(SerialConfig::for_port("/dev/ttyUSB0"));
        frontend.request_stats();
        frontend.disconnect();
        frontend.shutdown();

        let commands: Vec<BackendCommand> = backend.command_receiver.try_iter().collect();
        assert_eq!(commands.len(), 5);
        assert!(matches!(
            &commands[1],
            BackendCommand::Connect { serial } if serial.port_name.as_deref() == Some("/dev/ttyUSB0")
        ));
    }

    #[test]
    fn test_stop_handle_shares_flag() {
        let (backend, _frontend) = SerialBackend::new(AppConfig::default());
        let handle = backend.stop_handle();
        handle.store(false, Ordering::SeqCst);
        assert!(!backend.running.load(Ordering::SeqCst));
    }

    #[test]
    #[ignore = "Port enumeration depends on the host"]
    fn test_list_all_ports_does_not_panic() {
        let _ = list_all_ports();
    }
}
