//! Serial port transport
//!
//! Wraps the `serialport` crate: port discovery and a [`Transport`] that
//! reads raw bytes with a short timeout so the worker stays responsive to
//! commands.

use super::transport::Transport;
use crate::config::SerialConfig;
use crate::error::{PlotterError, Result, ResultExt};
use crate::types::{PortInfo, PortKind};
use serialport::{SerialPort, SerialPortType};
use std::io::{ErrorKind, Read};
use std::time::Duration;

/// List serial ports present on the system, sorted by name
pub fn list_ports() -> Result<Vec<PortInfo>> {
    let ports = serialport::available_ports().context("Failed to enumerate serial ports")?;

    let mut out: Vec<PortInfo> = ports
        .into_iter()
        .map(|p| PortInfo {
            name: p.port_name,
            kind: match p.port_type {
                SerialPortType::UsbPort(info) => PortKind::Usb {
                    vid: info.vid,
                    pid: info.pid,
                    manufacturer: info.manufacturer,
                    product: info.product,
                    serial_number: info.serial_number,
                },
                SerialPortType::BluetoothPort => PortKind::Bluetooth,
                SerialPortType::PciPort => PortKind::Pci,
                SerialPortType::Unknown => PortKind::Unknown,
            },
        })
        .collect();

    out.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(out)
}

/// Transport backed by an OS serial port
#[derive(Default)]
pub struct SerialPortTransport {
    port: Option<Box<dyn SerialPort>>,
    port_name: Option<String>,
}

impl SerialPortTransport {
    pub fn new() -> Self {
        Self::default()
    }
}

impl std::fmt::Debug for SerialPortTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SerialPortTransport")
            .field("port_name", &self.port_name)
            .field("open", &self.port.is_some())
            .finish()
    }
}

impl Transport for SerialPortTransport {
    fn open(&mut self, config: &SerialConfig) -> Result<()> {
        let name = config
            .port_name
            .as_deref()
            .ok_or_else(|| PlotterError::Config("No serial port selected".to_string()))?;

        self.close();

        let port = serialport::new(name, config.baud_rate)
            .timeout(Duration::from_millis(config.read_timeout_ms.max(1)))
            .data_bits(config.data_bits.into())
            .parity(config.parity.into())
            .stop_bits(config.stop_bits.into())
            .open()
            .with_context(|| format!("Failed to open {}", name))?;

        tracing::info!("Opened {} at {}", name, config);
        self.port = Some(port);
        self.port_name = Some(name.to_string());
        Ok(())
    }

    fn close(&mut self) {
        if self.port.take().is_some() {
            tracing::info!(
                "Closed {}",
                self.port_name.as_deref().unwrap_or("serial port")
            );
        }
        self.port_name = None;
    }

    fn port_name(&self) -> Option<&str> {
        self.port_name.as_deref()
    }

    fn read_chunk(&mut self, buf: &mut [u8]) -> Result<usize> {
        let port = self.port.as_mut().ok_or(PlotterError::NotConnected)?;

        match port.read(buf) {
            Ok(n) => Ok(n),
            Err(e) if matches!(e.kind(), ErrorKind::TimedOut | ErrorKind::WouldBlock) => Ok(0),
            Err(e) if e.kind() == ErrorKind::Interrupted => Ok(0),
            Err(e) => Err(PlotterError::Io(e)),
        }
    }

    fn transport_name(&self) -> &'static str {
        "serial"
    }
}
