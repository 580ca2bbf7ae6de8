//! Real hardware: serial transport and system clock.
//!
//! The motorboard hangs off a USB serial adapter on the deploying
//! machine; the moisture probe is read through a Linux IIO ADC channel.

use std::fs;
use std::io::{Read as _, Write as _};
use std::path::PathBuf;
use std::thread;
use std::time::{Duration, Instant};

use log::{error, warn};
use serialport::SerialPort;

use crate::clock::{Clock, ClockTime};
use crate::sensor::{MoistureSample, SensorCal};
use crate::traits::{MoistureSource, Transport};

/// Transport over a [`serialport`] device.
///
/// Reads are non-blocking: availability comes from the driver's input
/// queue, and a read with nothing pending returns `None`.
pub struct SerialTransport {
    port_name: String,
    port: Option<Box<dyn SerialPort>>,
}

impl SerialTransport {
    /// Creates a transport for the given device path, e.g.
    /// `/dev/ttyUSB0`. The port is opened by
    /// [`initialize`](Transport::initialize).
    pub fn new(port_name: impl Into<String>) -> Self {
        Self {
            port_name: port_name.into(),
            port: None,
        }
    }
}

impl Transport for SerialTransport {
    type Error = serialport::Error;

    /// Opens the port. The pin arguments only apply to soft-serial
    /// transports and are ignored here.
    fn initialize(&mut self, baud: u32, _rx_pin: u8, _tx_pin: u8) -> Result<(), Self::Error> {
        let port = serialport::new(&self.port_name, baud)
            .timeout(Duration::from_millis(10))
            .open()?;
        self.port = Some(port);
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error> {
        let Some(port) = self.port.as_mut() else {
            return Err(serialport::Error::new(
                serialport::ErrorKind::NoDevice,
                "port not initialized",
            ));
        };
        port.write_all(bytes).map_err(|e| {
            error!("serial write failed: {e}");
            serialport::Error::new(serialport::ErrorKind::Io(e.kind()), e.to_string())
        })
    }

    fn bytes_available(&mut self) -> usize {
        self.port
            .as_mut()
            .and_then(|port| port.bytes_to_read().ok())
            .unwrap_or(0) as usize
    }

    fn read_byte(&mut self) -> Option<u8> {
        let port = self.port.as_mut()?;
        let mut byte = [0u8; 1];
        match port.read(&mut byte) {
            Ok(1) => Some(byte[0]),
            Ok(_) => None,
            Err(e) => {
                if e.kind() != std::io::ErrorKind::TimedOut {
                    warn!("serial read failed: {e}");
                }
                None
            }
        }
    }
}

/// Wall clock backed by [`Instant`], truncated to the 32-bit
/// millisecond counter the rest of the crate runs on.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    /// Creates a clock with its epoch at construction time.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> ClockTime {
        // Truncation wraps exactly like the embedded counter would.
        self.origin.elapsed().as_millis() as ClockTime
    }

    fn sleep_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(ms as u64));
    }
}

/// Moisture source reading a Linux IIO ADC channel.
///
/// Reads a raw value from a sysfs attribute such as
/// `/sys/bus/iio/devices/iio:device0/in_voltage0_raw` and aligns it
/// through a [`SensorCal`]. An unreadable or unparsable attribute is
/// reported as a line fault, which the dryness policy fails safe on.
pub struct IioMoisture {
    path: PathBuf,
    cal: SensorCal,
}

impl IioMoisture {
    /// Creates a source for the given sysfs attribute path.
    pub fn new(path: impl Into<PathBuf>, cal: SensorCal) -> Self {
        Self {
            path: path.into(),
            cal,
        }
    }
}

impl MoistureSource for IioMoisture {
    fn read(&mut self) -> MoistureSample {
        let raw = match fs::read_to_string(&self.path) {
            Ok(text) => match text.trim().parse::<u16>() {
                Ok(raw) => raw,
                Err(e) => {
                    warn!("unparsable ADC reading: {e}");
                    return MoistureSample::LineFault;
                }
            },
            Err(e) => {
                warn!("ADC read failed: {e}");
                return MoistureSample::LineFault;
            }
        };
        self.cal.align(raw)
    }
}
