//! Hardware abstraction traits for the transport channel, moisture
//! sensing, and pump actuation.
//!
//! For testing and desktop development, use the mock implementations
//! from [`crate::hal::mock`]. For a real serial port, use
//! `hal::serial` (requires the `serial` feature).

use crate::sensor::MoistureSample;

/// Byte-oriented, half-duplex communication channel.
///
/// Represents the serial line to the motorboard. No framing guarantees
/// are assumed beyond raw byte delivery order: no length prefix, no
/// checksum. Reads are non-blocking; all waiting is done by the caller
/// against an injected clock so that every wait stays bounded.
///
/// # Implementation Notes
///
/// - `read_byte` must never block; return `None` when nothing is pending
/// - `bytes_available` is a cheap availability check, safe to poll
/// - the pin arguments of `initialize` matter only to soft-serial
///   transports; other implementations ignore them
pub trait Transport {
    /// Error type for transport operations.
    type Error;

    /// Open the channel at the given baud rate.
    fn initialize(&mut self, baud: u32, rx_pin: u8, tx_pin: u8) -> Result<(), Self::Error>;

    /// Write the full byte sequence to the channel.
    fn write(&mut self, bytes: &[u8]) -> Result<(), Self::Error>;

    /// Number of received bytes waiting to be read.
    fn bytes_available(&mut self) -> usize;

    /// Read one pending byte, if any.
    fn read_byte(&mut self) -> Option<u8>;
}

/// Source of filtered moisture readings.
///
/// The value is already smoothed and mapped onto the aligned 0–100
/// scale; raw analog sampling and its noise filtering live behind this
/// trait. A reading whose raw signal fell outside the physically
/// plausible bounds comes back as [`MoistureSample::LineFault`].
pub trait MoistureSource {
    /// Take one reading.
    fn read(&mut self) -> MoistureSample;
}

/// On/off actuation of the watering pump.
///
/// Implementations must be idempotent: calling `turn_on` while already
/// on, or `turn_off` while already off, is a no-op and must not toggle
/// the physical output or emit another log line.
pub trait PumpActuator {
    /// Error type for actuation operations.
    type Error;

    /// Start the pump. No-op when already running.
    fn turn_on(&mut self) -> Result<(), Self::Error>;

    /// Stop the pump. No-op when already stopped.
    fn turn_off(&mut self) -> Result<(), Self::Error>;

    /// Whether the pump is currently running.
    fn is_on(&self) -> bool;

    /// Convenience: drive the pump to the given state.
    fn set(&mut self, on: bool) -> Result<(), Self::Error> {
        if on {
            self.turn_on()
        } else {
            self.turn_off()
        }
    }
}
