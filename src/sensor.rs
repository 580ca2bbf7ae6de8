//! Moisture readings and the fail-safe dryness policy.
//!
//! Raw analog sampling and its noise filtering live behind the
//! [`MoistureSource`](crate::traits::MoistureSource) trait; this module
//! owns the calibration math that turns a raw reading into a tagged
//! [`MoistureSample`] and the policy that decides what counts as "dry".
//!
//! The fail-safe choice is explicit: a reading flagged as a line fault is
//! never dry, regardless of its numeric value, so a disconnected or
//! shorted sensor can never start a pour.

/// One moisture reading on a consistent 0–100 scale.
///
/// `Level(100)` is saturated-wet, `Level(0)` is bone-dry, for either
/// sensor polarity; [`SensorCal::align`] folds the polarity in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum MoistureSample {
    /// Aligned moisture level, 0 (dry) to 100 (wet).
    Level(u8),
    /// The raw signal fell outside the physically plausible range:
    /// sensor disconnected, shorted, or wiring broken.
    LineFault,
}

/// Calibration for mapping raw ADC readings onto the aligned scale.
#[derive(Clone, Copy, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SensorCal {
    /// Raw reading of a bone-dry (or saturated, depending on polarity) probe.
    pub min_raw: u16,
    /// Raw reading at the other end of the probe's range.
    pub max_raw: u16,
    /// Raw readings at or below this are a broken line.
    pub fault_floor: u16,
    /// Raw readings at or above this are a shorted line.
    pub fault_ceiling: u16,
    /// Whether a higher raw value means drier soil.
    pub high_means_dry: bool,
}

impl Default for SensorCal {
    fn default() -> Self {
        Self {
            min_raw: 0,
            max_raw: 680,
            fault_floor: 10,
            fault_ceiling: 1000,
            high_means_dry: false,
        }
    }
}

impl SensorCal {
    /// Set the usable raw range.
    pub fn with_range(mut self, min_raw: u16, max_raw: u16) -> Self {
        self.min_raw = min_raw;
        self.max_raw = max_raw;
        self
    }

    /// Set the plausible-signal bounds for line-fault detection.
    pub fn with_fault_bounds(mut self, floor: u16, ceiling: u16) -> Self {
        self.fault_floor = floor;
        self.fault_ceiling = ceiling;
        self
    }

    /// Set the polarity.
    pub fn with_high_means_dry(mut self, high_means_dry: bool) -> Self {
        self.high_means_dry = high_means_dry;
        self
    }

    /// Maps a raw reading onto the aligned 0–100 moisture scale.
    ///
    /// Readings outside the plausible bounds come back as
    /// [`MoistureSample::LineFault`]; everything else is clamped into the
    /// calibrated range and scaled, honoring the polarity.
    ///
    /// # Example
    ///
    /// ```
    /// use rs_irrigate::{MoistureSample, SensorCal};
    ///
    /// let cal = SensorCal::default().with_range(0, 680);
    /// assert_eq!(cal.align(680), MoistureSample::Level(100));
    /// assert_eq!(cal.align(0), MoistureSample::LineFault); // below fault floor
    /// ```
    pub fn align(&self, raw: u16) -> MoistureSample {
        if raw <= self.fault_floor || raw >= self.fault_ceiling {
            return MoistureSample::LineFault;
        }
        let clamped = raw.clamp(self.min_raw, self.max_raw);
        let span = (self.max_raw - self.min_raw).max(1) as u32;
        let pos = ((clamped - self.min_raw) as u32 * 100 / span) as u8;
        let level = if self.high_means_dry { 100 - pos } else { pos };
        MoistureSample::Level(level)
    }
}

/// Dryness policy over a tagged sample.
///
/// `Level(v)` is dry when `v` is below the threshold. `LineFault` is
/// never dry: a faulty sensor fails safe toward not watering.
pub fn is_dry(sample: MoistureSample, threshold_pc: u8) -> bool {
    match sample {
        MoistureSample::Level(v) => v < threshold_pc,
        MoistureSample::LineFault => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn align_endpoints() {
        let cal = SensorCal::default();
        assert_eq!(cal.align(680), MoistureSample::Level(100));
        assert_eq!(cal.align(340), MoistureSample::Level(50));
        assert_eq!(cal.align(11), MoistureSample::Level(1));
    }

    #[test]
    fn align_clamps_out_of_range() {
        let cal = SensorCal::default().with_fault_bounds(10, 2000);
        assert_eq!(cal.align(900), MoistureSample::Level(100));
    }

    #[test]
    fn align_polarity_inverts_scale() {
        let cal = SensorCal::default().with_high_means_dry(true);
        assert_eq!(cal.align(680), MoistureSample::Level(0));
        assert_eq!(cal.align(340), MoistureSample::Level(50));
    }

    #[test]
    fn implausible_raw_is_line_fault() {
        let cal = SensorCal::default();
        assert_eq!(cal.align(0), MoistureSample::LineFault);
        assert_eq!(cal.align(10), MoistureSample::LineFault);
        assert_eq!(cal.align(1000), MoistureSample::LineFault);
        assert_eq!(cal.align(u16::MAX), MoistureSample::LineFault);
    }

    #[test]
    fn dryness_threshold() {
        assert!(is_dry(MoistureSample::Level(0), 40));
        assert!(is_dry(MoistureSample::Level(39), 40));
        assert!(!is_dry(MoistureSample::Level(40), 40));
        assert!(!is_dry(MoistureSample::Level(100), 40));
    }

    #[test]
    fn line_fault_is_never_dry_for_either_polarity() {
        // The fault tag is decided before polarity ever applies, but make
        // sure both calibrations produce it and the policy rejects it.
        for high_means_dry in [false, true] {
            let cal = SensorCal::default().with_high_means_dry(high_means_dry);
            let sample = cal.align(0);
            assert_eq!(sample, MoistureSample::LineFault);
            for threshold in [0, 40, 100, u8::MAX] {
                assert!(!is_dry(sample, threshold));
            }
        }
    }
}
