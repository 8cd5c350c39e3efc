//! Transport trait for byte sources
//!
//! This module provides a common trait for everything the worker can read
//! samples from: a real serial port (via the `serialport` crate) and the
//! simulated device used for demos and tests.

use crate::config::SerialConfig;
use crate::error::Result;

/// A source of raw bytes, read from the worker thread
///
/// Implementations must be `Send` so the worker can own them.
///
/// # Example
///
/// ```ignore
/// fn pump(transport: &mut dyn Transport, buf: &mut [u8]) -> Result<Vec<u8>> {
///     let n = transport.read_chunk(buf)?;
///     Ok(buf[..n].to_vec())
/// }
/// ```
pub trait Transport: Send {
    /// Open the port described by `config`
    fn open(&mut self, config: &SerialConfig) -> Result<()>;

    /// Close the port. Does nothing if already closed.
    fn close(&mut self);

    /// Name of the open port
    fn port_name(&self) -> Option<&str>;

    /// Read whatever is available into `buf`.
    ///
    /// Blocks for at most the configured read timeout and returns `Ok(0)`
    /// if nothing arrived. An error means the port is no longer usable.
    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize>;

    /// Human readable transport kind, for logs
    fn transport_name(&self) -> &'static str;
}
