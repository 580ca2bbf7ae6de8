//! # rs-irrigate
//!
//! Moisture-driven irrigation controller with a serial motorboard link.
//!
//! The pump sits behind a separate motor controller board reached over a
//! half-duplex serial line with no framing: the board confirms each
//! command by printing `\n` `G` `\n` and going silent. This crate pairs
//! a best-effort request/acknowledge protocol over that link with a
//! slow bang-bang irrigation state machine that decides when to run the
//! pump.
//!
//! ## Architecture
//!
//! The crate is structured to allow testing on desktop without hardware:
//!
//! - `clock` - millisecond time with wraparound-safe comparison
//! - `traits` - transport, moisture source, and pump abstractions
//! - `command` - motorboard wire text
//! - `protocol` - ready-sentinel request/acknowledge engine
//! - `link` - connection setup, ping, self-test, pump actuation
//! - `sensor` - calibration and the fail-safe dryness policy
//! - `controller` - the idle / staging / pouring cycle
//! - `hal` - concrete implementations (mock for testing, serial for
//!   hardware)
//!
//! ## Example
//!
//! ```rust
//! use rs_irrigate::{
//!     IrrigationConfig, IrrigationController, IrrigationState, MoistureSample,
//!     hal::MockPump,
//! };
//!
//! let config = IrrigationConfig::default()
//!     .with_idle_ms(1_000)
//!     .with_staging_ms(500);
//! let mut controller = IrrigationController::new(MockPump::new(), config);
//!
//! // Dry soil once the idle pause has elapsed: staging begins, and if
//! // dryness persists through the staging window the pump turns on.
//! controller.tick(MoistureSample::Level(5), 1_000).unwrap();
//! assert_eq!(controller.state(), IrrigationState::PreStaging);
//!
//! controller.tick(MoistureSample::Level(5), 1_500).unwrap();
//! assert_eq!(controller.state(), IrrigationState::Pouring);
//! assert!(controller.pump().on);
//! ```

#![warn(missing_docs)]

/// Millisecond clock with wraparound-safe arithmetic.
pub mod clock;
/// Motorboard command text.
pub mod command;
/// Startup configuration for the link and the irrigation cycle.
pub mod config;
/// The irrigation state machine.
pub mod controller;
/// Error types for the protocol and link layers.
pub mod error;
/// Hardware abstraction layer with mock implementations for testing.
pub mod hal;
/// Motorboard link: setup, ping, self-test, pump actuation.
pub mod link;
/// Command protocol engine: ready-sentinel request/acknowledge.
pub mod protocol;
/// Moisture calibration and the fail-safe dryness policy.
pub mod sensor;
/// Core traits for hardware abstraction.
pub mod traits;

// Re-exports for convenience
pub use clock::{elapsed, Clock, ClockTime};
pub use command::{CommandText, MotorCommand};
pub use config::{IrrigationConfig, LinkConfig};
pub use controller::{IrrigationController, IrrigationState, IrrigationStatus};
pub use error::{LinkError, ProtocolError};
pub use link::Motorboard;
pub use protocol::{ProtocolSession, READY_SENTINEL};
pub use sensor::{is_dry, MoistureSample, SensorCal};
pub use traits::{MoistureSource, PumpActuator, Transport};
