//! Irrigation state machine.
//!
//! A three-state cycle driven by periodic moisture samples:
//!
//! - **Idle**: wait out the evaluation pause, then check dryness.
//! - **PreStaging**: dryness must persist through a debounce window
//!   before a pour starts; a transient dry reading falls back to Idle.
//! - **Pouring**: pump on for the current pour duration, then off,
//!   followed by a mandatory settle period before the next dryness
//!   check is trusted.
//!
//! The pour duration adapts: after each completed pour, it is rescaled
//! by the ratio of the target cycle duration to the observed one, so
//! the realized watering cadence converges on the target without an
//! explicit tuning step. A hard ceiling bounds the rescale so a freak
//! short cycle cannot cause a runaway motor run.
//!
//! All scheduling uses wraparound-safe elapsed-time comparison; the
//! controller runs for months without a restart.

use log::{debug, info};

use crate::clock::{elapsed, ClockTime};
use crate::config::IrrigationConfig;
use crate::sensor::{is_dry, MoistureSample};
use crate::traits::PumpActuator;

/// Phase of the irrigation cycle. Exactly one is active at a time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum IrrigationState {
    /// Waiting for the soil to read dry.
    Idle,
    /// Dry reading seen; debouncing before the pour.
    PreStaging,
    /// Pump running.
    Pouring,
}

/// Snapshot of controller state for display and logging.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IrrigationStatus {
    /// Current phase.
    pub state: IrrigationState,
    /// Current (adapted) pour duration in milliseconds.
    pub pour_ms: u32,
    /// When the pump last turned off, if it ever has.
    pub last_motor_off: Option<ClockTime>,
    /// Whether the pump reports running.
    pub pump_on: bool,
}

/// The irrigation controller.
///
/// Owns the pump and all mutable cycle state; transitions happen only
/// inside [`tick`](Self::tick), guarded by the scheduled phase
/// deadline. Single-threaded by design: call `tick` once per sampling
/// interval from the main loop.
///
/// # Example
///
/// ```
/// use rs_irrigate::{IrrigationConfig, IrrigationController, IrrigationState, MoistureSample};
/// use rs_irrigate::hal::MockPump;
///
/// let config = IrrigationConfig::default().with_idle_ms(1_000);
/// let mut controller = IrrigationController::new(MockPump::new(), config);
///
/// // Dry reading once the idle pause has elapsed: staging begins.
/// controller.tick(MoistureSample::Level(5), 1_000).unwrap();
/// assert_eq!(controller.state(), IrrigationState::PreStaging);
/// ```
pub struct IrrigationController<P: PumpActuator> {
    pump: P,
    config: IrrigationConfig,
    state: IrrigationState,
    phase_entered_at: ClockTime,
    phase_wait_ms: u32,
    last_motor_off: Option<ClockTime>,
    pour_ms: u32,
}

impl<P: PumpActuator> IrrigationController<P> {
    /// Creates a controller in `Idle`, with the first dryness
    /// evaluation due one idle period after time zero.
    pub fn new(pump: P, config: IrrigationConfig) -> Self {
        Self {
            pump,
            config,
            state: IrrigationState::Idle,
            phase_entered_at: 0,
            phase_wait_ms: config.idle_ms,
            last_motor_off: None,
            pour_ms: config.base_pour_ms,
        }
    }

    /// Evaluates the cycle against the current moisture sample.
    ///
    /// Does nothing until the current phase's deadline is reached. Pump
    /// errors propagate to the caller, but the phase is not advanced on
    /// failure, so the next tick retries the same transition; the
    /// controller never ends up believing a pour happened that didn't.
    pub fn tick(&mut self, sample: MoistureSample, now: ClockTime) -> Result<(), P::Error> {
        if elapsed(self.phase_entered_at, now) < self.phase_wait_ms {
            return Ok(());
        }

        match self.state {
            IrrigationState::Idle => {
                if is_dry(sample, self.config.dry_threshold_pc) {
                    info!("soil reads dry ({sample:?}), staging before pour");
                    self.enter(IrrigationState::PreStaging, now, self.config.staging_ms);
                } else {
                    self.enter(IrrigationState::Idle, now, self.config.idle_ms);
                }
            }

            IrrigationState::PreStaging => {
                if is_dry(sample, self.config.dry_threshold_pc) {
                    self.pump.turn_on()?;
                    let pour_ms = self.rescaled_pour_ms(now);
                    self.pour_ms = pour_ms;
                    info!("pouring for {pour_ms} ms");
                    self.enter(IrrigationState::Pouring, now, pour_ms);
                } else {
                    debug!("dryness did not persist through staging, back to idle");
                    self.enter(IrrigationState::Idle, now, self.config.idle_ms);
                }
            }

            IrrigationState::Pouring => {
                self.pump.turn_off()?;
                self.last_motor_off = Some(now);
                info!("pour done, settling for {} ms", self.config.settle_ms);
                self.enter(IrrigationState::Idle, now, self.config.settle_ms);
            }
        }

        Ok(())
    }

    /// Current phase.
    pub fn state(&self) -> IrrigationState {
        self.state
    }

    /// Current (adapted) pour duration.
    pub fn pour_ms(&self) -> u32 {
        self.pour_ms
    }

    /// When the pump last turned off.
    pub fn last_motor_off(&self) -> Option<ClockTime> {
        self.last_motor_off
    }

    /// Borrow the pump.
    pub fn pump(&self) -> &P {
        &self.pump
    }

    /// Borrow the pump mutably, e.g. to force it off on shutdown.
    pub fn pump_mut(&mut self) -> &mut P {
        &mut self.pump
    }

    /// Snapshot for display and logging.
    pub fn status(&self) -> IrrigationStatus {
        IrrigationStatus {
            state: self.state,
            pour_ms: self.pour_ms,
            last_motor_off: self.last_motor_off,
            pump_on: self.pump.is_on(),
        }
    }

    fn enter(&mut self, state: IrrigationState, now: ClockTime, wait_ms: u32) {
        self.state = state;
        self.phase_entered_at = now;
        self.phase_wait_ms = wait_ms;
    }

    /// Rescales the pour duration by target-over-observed cycle time,
    /// clamped to the hard ceiling. First pour runs unscaled.
    fn rescaled_pour_ms(&self, now: ClockTime) -> u32 {
        let Some(off_at) = self.last_motor_off else {
            return self.pour_ms;
        };
        let observed_ms = elapsed(off_at, now).max(1);
        let scaled =
            self.pour_ms as u64 * self.config.target_cycle_ms as u64 / observed_ms as u64;
        let clamped = scaled.min(self.config.max_pour_ms as u64) as u32;
        if clamped != self.pour_ms {
            info!(
                "cycle took {observed_ms} ms, pour duration rescaled {} -> {clamped} ms",
                self.pour_ms
            );
        }
        clamped
    }
}
