//! Trait definitions for hardware abstraction.
//!
//! These seams are what let the protocol engine and the irrigation
//! controller run against deterministic test doubles on desktop and
//! against a real serial port in the field:
//!
//! - [`Transport`]: byte-oriented half-duplex channel (the serial line)
//! - [`MoistureSource`]: filtered moisture readings, fault-tagged
//! - [`PumpActuator`]: idempotent on/off motor actuation
//! - [`Clock`]: injectable time source with a bounded sleep

pub mod hardware;

pub use hardware::*;

pub use crate::clock::Clock;
