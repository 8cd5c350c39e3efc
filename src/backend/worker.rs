//! Backend Worker Thread Implementation
//!
//! This module contains the worker loop that owns the serial transport and
//! runs in a separate thread. It communicates with the UI thread through
//! crossbeam channels.
//!
//! # Responsibilities
//!
//! - **Command processing**: Responds to UI commands (connect, disconnect, refresh)
//! - **Reading**: Pulls raw bytes from the open port and forwards them unparsed
//! - **Connection identity**: Tags every chunk with the id of the connection
//!   it was read on, so the UI can drop bytes from a port it already closed
//! - **Statistics tracking**: Byte counts, throughput and dropped chunks
//!
//! # Pacing
//!
//! While a port is open the loop is paced by the transport's read timeout.
//! While idle it blocks on the command channel for up to [`IDLE_WAIT`].

use crate::backend::serial::SerialPortTransport;
use crate::backend::transport::Transport;
use crate::backend::{BackendCommand, BackendMessage};
use crate::config::{AppConfig, SerialConfig};
use crate::types::{CollectionStats, ConnectionStatus};
use crossbeam_channel::{Receiver, RecvTimeoutError, Sender, TryRecvError};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

#[cfg(feature = "mock-serial")]
use crate::backend::mock_port::MockTransport;

/// How long the idle loop waits for a command before checking `running`
pub const IDLE_WAIT: Duration = Duration::from_millis(50);

/// Size of the read buffer handed to the transport
pub const READ_BUFFER_SIZE: usize = 4096;

/// Interval between automatic statistics updates
const STATS_INTERVAL: Duration = Duration::from_millis(500);

/// The backend worker that runs the read loop
pub struct BackendWorker {
    /// Application configuration
    config: AppConfig,
    /// Command receiver from the UI
    command_rx: Receiver<BackendCommand>,
    /// Message sender to the UI
    message_tx: Sender<BackendMessage>,
    /// Running flag
    running: Arc<AtomicBool>,
    /// Byte source (real port or simulated device)
    transport: Box<dyn Transport>,
    /// Whether currently using the simulated device
    #[cfg(feature = "mock-serial")]
    is_mock_port: bool,
    /// Current connection status
    connection_status: ConnectionStatus,
    /// Id of the open connection
    connection_id: Option<u64>,
    /// Id handed to the next successful open
    next_connection_id: u64,
    /// Statistics
    stats: CollectionStats,
    /// Reusable read buffer
    read_buf: Vec<u8>,
    /// Last time stats were sent to UI
    last_stats_time: Instant,
    /// Bytes read at the last stats update, for throughput
    bytes_at_last_stats: u64,
    /// A chunk was dropped and the UI has not been told yet
    gap_pending: bool,
}

impl BackendWorker {
    /// Create a worker reading from a real serial port
    pub fn new(
        config: AppConfig,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
    ) -> Self {
        Self::with_transport(
            config,
            command_rx,
            message_tx,
            running,
            Box::new(SerialPortTransport::new()),
        )
    }

    /// Create a worker with an explicit transport
    pub fn with_transport(
        config: AppConfig,
        command_rx: Receiver<BackendCommand>,
        message_tx: Sender<BackendMessage>,
        running: Arc<AtomicBool>,
        transport: Box<dyn Transport>,
    ) -> Self {
        Self {
            config,
            command_rx,
            message_tx,
            running,
            transport,
            #[cfg(feature = "mock-serial")]
            is_mock_port: false,
            connection_status: ConnectionStatus::Disconnected,
            connection_id: None,
            next_connection_id: 1,
            stats: CollectionStats::default(),
            read_buf: vec![0u8; READ_BUFFER_SIZE],
            last_stats_time: Instant::now(),
            bytes_at_last_stats: 0,
            gap_pending: false,
        }
    }

    /// Run the main worker loop
    pub fn run(&mut self) {
        tracing::info!(
            "Backend worker started ({} transport)",
            self.transport.transport_name()
        );

        while self.running.load(Ordering::SeqCst) {
            self.process_commands();

            if self.connection_id.is_some() {
                self.read_once();

                if self.last_stats_time.elapsed() >= STATS_INTERVAL {
                    self.send_stats();
                }
            } else {
                self.wait_for_command();
            }
        }

        // Cleanup
        self.close_port();
        let _ = self.message_tx.send(BackendMessage::Shutdown);
        tracing::info!("Backend worker stopped");
    }

    /// Process pending commands from the UI
    pub(crate) fn process_commands(&mut self) {
        loop {
            match self.command_rx.try_recv() {
                Ok(cmd) => self.handle_command(cmd),
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.running.store(false, Ordering::SeqCst);
                    break;
                }
            }
        }
    }

    /// Block until a command arrives or the idle wait elapses
    fn wait_for_command(&mut self) {
        match self.command_rx.recv_timeout(IDLE_WAIT) {
            Ok(cmd) => self.handle_command(cmd),
            Err(RecvTimeoutError::Timeout) => {}
            Err(RecvTimeoutError::Disconnected) => {
                self.running.store(false, Ordering::SeqCst);
            }
        }
    }

    /// Handle a single command
    fn handle_command(&mut self, cmd: BackendCommand) {
        match cmd {
            BackendCommand::Connect { serial } => {
                self.handle_connect(serial);
            }
            BackendCommand::Disconnect => {
                self.handle_disconnect();
            }
            BackendCommand::RefreshPorts => {
                self.refresh_ports();
            }
            BackendCommand::RequestStats => {
                self.send_stats();
            }
            BackendCommand::Shutdown => {
                self.running.store(false, Ordering::SeqCst);
            }
            #[cfg(feature = "mock-serial")]
            BackendCommand::UseMockPort(use_mock) => {
                if use_mock == self.is_mock_port {
                    return;
                }
                if self.connection_id.is_some() {
                    self.handle_disconnect();
                }
                if use_mock {
                    self.transport = Box::new(MockTransport::default());
                    tracing::info!("Switched to simulated device");
                } else {
                    self.transport = Box::new(SerialPortTransport::new());
                    tracing::info!("Switched to serial port");
                }
                self.is_mock_port = use_mock;
            }
        }
    }

    /// Enumerate ports and send the list to the UI
    fn refresh_ports(&self) {
        let ports = crate::backend::list_all_ports();
        let _ = self.message_tx.send(BackendMessage::PortList(ports));
    }

    /// Handle connect command
    fn handle_connect(&mut self, serial: SerialConfig) {
        if self.connection_id.is_some() {
            self.close_port();
        }

        self.update_connection_status(ConnectionStatus::Connecting);

        match self.transport.open(&serial) {
            Ok(()) => {
                let id = self.next_connection_id;
                self.next_connection_id += 1;
                self.connection_id = Some(id);
                self.stats = CollectionStats::default();
                self.bytes_at_last_stats = 0;
                self.gap_pending = false;
                self.last_stats_time = Instant::now();

                let port_name = self
                    .transport
                    .port_name()
                    .map(str::to_string)
                    .or(serial.port_name)
                    .unwrap_or_default();
                tracing::info!("Connection {} opened on {}", id, port_name);

                let _ = self.message_tx.send(BackendMessage::PortOpened {
                    connection_id: id,
                    port_name,
                });
                self.update_connection_status(ConnectionStatus::Connected);
            }
            Err(e) => {
                tracing::error!("Cannot open port: {}", e);
                self.update_connection_status(ConnectionStatus::Error);
                let _ = self
                    .message_tx
                    .send(BackendMessage::ConnectionError(e.to_string()));
            }
        }
    }

    /// Handle disconnect command
    fn handle_disconnect(&mut self) {
        self.close_port();
        self.update_connection_status(ConnectionStatus::Disconnected);
    }

    /// Close the transport and tell the UI which connection ended
    fn close_port(&mut self) {
        if let Some(id) = self.connection_id.take() {
            self.gap_pending = false;
            self.transport.close();
            tracing::info!("Connection {} closed", id);
            let _ = self
                .message_tx
                .send(BackendMessage::PortClosed { connection_id: id });
        }
    }

    /// Read one chunk from the transport and forward it
    fn read_once(&mut self) {
        let Some(connection_id) = self.connection_id else {
            return;
        };

        match self.transport.read_chunk(&mut self.read_buf) {
            Ok(0) => {}
            Ok(n) => {
                self.stats.record_chunk(n);
                tracing::trace!("Read {} bytes on connection {}", n, connection_id);
                let bytes = self.read_buf[..n].to_vec();
                self.forward_chunk(connection_id, bytes);
            }
            Err(e) => {
                self.stats.read_errors += 1;
                if e.is_disconnect() {
                    tracing::warn!("Device on connection {} went away: {}", connection_id, e);
                } else {
                    tracing::error!("Read failed on connection {}: {}", connection_id, e);
                }
                self.close_port();
                self.update_connection_status(ConnectionStatus::Error);
                let _ = self
                    .message_tx
                    .send(BackendMessage::ConnectionError(e.to_string()));
            }
        }
    }

    /// Update connection status and notify UI
    fn update_connection_status(&mut self, status: ConnectionStatus) {
        self.connection_status = status;
        let _ = self
            .message_tx
            .send(BackendMessage::ConnectionStatus(status));
    }

    /// Send statistics to UI
    fn send_stats(&mut self) {
        let elapsed = self.last_stats_time.elapsed().as_secs_f64();
        if elapsed > 0.0 {
            self.stats.bytes_per_second =
                (self.stats.bytes_read - self.bytes_at_last_stats) as f64 / elapsed;
        }
        self.bytes_at_last_stats = self.stats.bytes_read;
        self.last_stats_time = Instant::now();

        // Skipped when the queue is full; the next interval resends
        let _ = self.message_tx.try_send(BackendMessage::Stats(self.stats.clone()));
    }

    /// Queue a chunk for the UI without blocking
    ///
    /// A chunk that does not fit is dropped and counted. Until the UI has
    /// been sent a [`BackendMessage::DataGap`], no further chunk is queued,
    /// so the bytes on either side of a gap never reach the framer back to
    /// back.
    fn forward_chunk(&mut self, connection_id: u64, bytes: Vec<u8>) {
        if self.gap_pending {
            if self
                .message_tx
                .try_send(BackendMessage::DataGap { connection_id })
                .is_err()
            {
                self.stats.dropped_chunks += 1;
                return;
            }
            self.gap_pending = false;
        }

        if self
            .message_tx
            .try_send(BackendMessage::Data {
                connection_id,
                bytes,
            })
            .is_err()
        {
            self.stats.dropped_chunks += 1;
            if !self.gap_pending {
                tracing::warn!("UI queue full, dropping data on connection {}", connection_id);
            }
            self.gap_pending = true;
        }
    }

    /// The configuration this worker was started with
    pub fn config(&self) -> &AppConfig {
        &self.config
    }
}
