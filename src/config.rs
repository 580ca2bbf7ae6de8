//! Configuration for the motorboard link and the irrigation cycle.
//!
//! Everything here is a startup constant; nothing is persisted across
//! power cycles. Defaults match the deployed hardware (57600 baud soft
//! serial, 24-hour target watering cadence).
//!
//! # Example
//!
//! ```
//! use rs_irrigate::{IrrigationConfig, LinkConfig};
//!
//! let link = LinkConfig::default().with_baud(115_200);
//! let cycle = IrrigationConfig::default()
//!     .with_base_pour_ms(20_000)
//!     .with_max_pour_ms(120_000);
//! assert_eq!(link.baud, 115_200);
//! assert_eq!(cycle.max_pour_ms, 120_000);
//! ```

/// Motorboard link configuration.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LinkConfig {
    /// Serial baud rate.
    pub baud: u32,
    /// Receive pin for soft-serial transports.
    pub rx_pin: u8,
    /// Transmit pin for soft-serial transports.
    pub tx_pin: u8,
    /// Pause between connectivity probes while establishing.
    pub probe_retry_ms: u32,
    /// Wall-clock budget for establishing connectivity.
    pub establish_budget_ms: u32,
    /// Number of back-to-back probes in a ping measurement.
    pub ping_probes: u8,
    /// Response wait budget for a normal command.
    ///
    /// Commands are not parsed locally, so their execution time is
    /// unknown; this bounds the time wasted when the link has dropped.
    pub command_timeout_ms: u32,
    /// Longer grace budget used when the board talks unprompted (its
    /// startup banner) before a command can be sent.
    pub banner_grace_ms: u32,
    /// Duration field of one pump directive.
    ///
    /// The board caps a single directive's duration phase at five
    /// seconds, so a pump run is tiled out of back-to-back pulses of
    /// this length.
    pub pump_pulse_ms: u16,
    /// Total motor run covered by one pump-on command.
    ///
    /// Must be at least the longest pour the irrigation controller can
    /// schedule (its hard ceiling); `turn_off` cuts the run short at
    /// the scheduled pour deadline.
    pub pump_run_ms: u32,
    /// Power applied to both motors while the pump runs.
    pub pump_power_pc: i8,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            baud: 57_600,
            rx_pin: 12,
            tx_pin: 14,
            probe_retry_ms: 10,
            establish_budget_ms: 40_000,
            ping_probes: 5,
            command_timeout_ms: 5_000,
            banner_grace_ms: 4_000,
            pump_pulse_ms: 5_000,
            pump_run_ms: 120_000,
            pump_power_pc: 100,
        }
    }
}

impl LinkConfig {
    /// Set the baud rate.
    pub fn with_baud(mut self, baud: u32) -> Self {
        self.baud = baud;
        self
    }

    /// Set the soft-serial pins.
    pub fn with_pins(mut self, rx_pin: u8, tx_pin: u8) -> Self {
        self.rx_pin = rx_pin;
        self.tx_pin = tx_pin;
        self
    }

    /// Set the establish retry budget.
    pub fn with_establish_budget_ms(mut self, ms: u32) -> Self {
        self.establish_budget_ms = ms;
        self
    }

    /// Set the per-command response timeout.
    pub fn with_command_timeout_ms(mut self, ms: u32) -> Self {
        self.command_timeout_ms = ms;
        self
    }

    /// Set the number of ping probes.
    pub fn with_ping_probes(mut self, probes: u8) -> Self {
        self.ping_probes = probes;
        self
    }

    /// Set the startup-banner grace budget.
    pub fn with_banner_grace_ms(mut self, ms: u32) -> Self {
        self.banner_grace_ms = ms;
        self
    }

    /// Set the total motor run covered by one pump-on command.
    pub fn with_pump_run_ms(mut self, ms: u32) -> Self {
        self.pump_run_ms = ms;
        self
    }
}

/// Irrigation cycle configuration.
///
/// The controller wakes every `sample_period_ms`; all other durations are
/// phase deadlines evaluated inside those ticks.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IrrigationConfig {
    /// Sampling tick period of the main loop.
    pub sample_period_ms: u32,
    /// Pause between dryness evaluations while idle.
    pub idle_ms: u32,
    /// Debounce stage before a pour; dryness must persist this long.
    pub staging_ms: u32,
    /// Initial pour duration, before any adaptive rescaling.
    pub base_pour_ms: u32,
    /// Mandatory soak period after a pour before the next dryness
    /// check is trusted.
    pub settle_ms: u32,
    /// Target duration of one full watering cycle; pour duration is
    /// rescaled toward this.
    pub target_cycle_ms: u32,
    /// Hard ceiling on a single motor run, bounding water usage when
    /// rescaling computes anomalously large.
    pub max_pour_ms: u32,
    /// Aligned moisture below this counts as dry.
    pub dry_threshold_pc: u8,
}

impl Default for IrrigationConfig {
    fn default() -> Self {
        Self {
            sample_period_ms: 2_000,
            idle_ms: 300_000,
            staging_ms: 60_000,
            base_pour_ms: 20_000,
            settle_ms: 1_800_000,
            target_cycle_ms: 86_400_000,
            max_pour_ms: 120_000,
            dry_threshold_pc: 40,
        }
    }
}

impl IrrigationConfig {
    /// Set the sampling tick period.
    pub fn with_sample_period_ms(mut self, ms: u32) -> Self {
        self.sample_period_ms = ms;
        self
    }

    /// Set the idle evaluation pause.
    pub fn with_idle_ms(mut self, ms: u32) -> Self {
        self.idle_ms = ms;
        self
    }

    /// Set the pre-pour staging duration.
    pub fn with_staging_ms(mut self, ms: u32) -> Self {
        self.staging_ms = ms;
        self
    }

    /// Set the initial pour duration.
    pub fn with_base_pour_ms(mut self, ms: u32) -> Self {
        self.base_pour_ms = ms;
        self
    }

    /// Set the post-pour settle duration.
    pub fn with_settle_ms(mut self, ms: u32) -> Self {
        self.settle_ms = ms;
        self
    }

    /// Set the target full-cycle duration.
    pub fn with_target_cycle_ms(mut self, ms: u32) -> Self {
        self.target_cycle_ms = ms;
        self
    }

    /// Set the hard motor-on ceiling.
    pub fn with_max_pour_ms(mut self, ms: u32) -> Self {
        self.max_pour_ms = ms;
        self
    }

    /// Set the dryness threshold.
    pub fn with_dry_threshold_pc(mut self, pc: u8) -> Self {
        self.dry_threshold_pc = pc;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn link_defaults() {
        let cfg = LinkConfig::default();
        assert_eq!(cfg.baud, 57_600);
        assert_eq!(cfg.command_timeout_ms, 5_000);
        assert!(cfg.banner_grace_ms < cfg.establish_budget_ms);
        // One pump-on command must cover the longest schedulable pour.
        assert!(cfg.pump_run_ms >= IrrigationConfig::default().max_pour_ms);
    }

    #[test]
    fn link_builders_chain() {
        let cfg = LinkConfig::default()
            .with_baud(9_600)
            .with_pins(4, 5)
            .with_ping_probes(3)
            .with_establish_budget_ms(1_000);
        assert_eq!(cfg.baud, 9_600);
        assert_eq!((cfg.rx_pin, cfg.tx_pin), (4, 5));
        assert_eq!(cfg.ping_probes, 3);
        assert_eq!(cfg.establish_budget_ms, 1_000);
    }

    #[test]
    fn irrigation_defaults_are_ordered_sanely() {
        let cfg = IrrigationConfig::default();
        assert!(cfg.base_pour_ms <= cfg.max_pour_ms);
        assert!(cfg.settle_ms < cfg.target_cycle_ms);
        assert!(cfg.sample_period_ms <= cfg.idle_ms);
    }

    #[test]
    fn irrigation_builders_chain() {
        let cfg = IrrigationConfig::default()
            .with_idle_ms(1_000)
            .with_staging_ms(500)
            .with_base_pour_ms(2_000)
            .with_settle_ms(3_000)
            .with_max_pour_ms(10_000)
            .with_dry_threshold_pc(55);
        assert_eq!(cfg.idle_ms, 1_000);
        assert_eq!(cfg.staging_ms, 500);
        assert_eq!(cfg.base_pour_ms, 2_000);
        assert_eq!(cfg.settle_ms, 3_000);
        assert_eq!(cfg.max_pour_ms, 10_000);
        assert_eq!(cfg.dry_threshold_pc, 55);
    }
}
