//! Backend construction helpers

use crossbeam_channel::{bounded, Receiver, Sender};
use serial_plotter::backend::{BackendMessage, FrontendReceiver, MockTransport, SerialBackend};
use serial_plotter::config::AppConfig;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Create test channels with default size
pub fn create_test_channels<T, U>() -> (Sender<T>, Receiver<T>, Sender<U>, Receiver<U>) {
    let (tx1, rx1) = bounded(16);
    let (tx2, rx2) = bounded(16);
    (tx1, rx1, tx2, rx2)
}

/// Run a backend reading from `transport` on its own thread
pub fn spawn_backend(transport: MockTransport) -> (JoinHandle<()>, FrontendReceiver) {
    let (backend, frontend) = SerialBackend::with_transport(AppConfig::default(), Box::new(transport));
    let handle = thread::spawn(move || backend.run());
    (handle, frontend)
}

/// Collect messages until `done` returns true for one of them, or `timeout`
/// elapses. Returns everything received.
pub fn collect_until(
    frontend: &FrontendReceiver,
    timeout: Duration,
    mut done: impl FnMut(&BackendMessage) -> bool,
) -> Vec<BackendMessage> {
    let deadline = Instant::now() + timeout;
    let mut messages = Vec::new();
    while Instant::now() < deadline {
        match frontend.receiver.recv_timeout(Duration::from_millis(10)) {
            Ok(msg) => {
                let stop = done(&msg);
                messages.push(msg);
                if stop {
                    break;
                }
            }
            Err(_) => continue,
        }
    }
    messages
}

/// Concatenate the bytes of all `Data` messages for `connection_id`
pub fn data_bytes(messages: &[BackendMessage], connection_id: u64) -> Vec<u8> {
    messages
        .iter()
        .filter_map(|m| match m {
            BackendMessage::Data {
                connection_id: id,
                bytes,
            } if *id == connection_id => Some(bytes.as_slice()),
            _ => None,
        })
        .flatten()
        .copied()
        .collect()
}
