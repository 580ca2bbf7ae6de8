//! Millisecond clock with wraparound-safe arithmetic.
//!
//! The motorboard and the irrigation controller both run against a `u32`
//! millisecond counter that wraps roughly every 49.7 days of uptime. Every
//! duration comparison in this crate goes through [`elapsed`], which stays
//! correct across a single wrap of the counter. Raw `now - start` followed
//! by an ordered compare is a bug here.

/// Timestamp in milliseconds since an arbitrary epoch (device boot).
///
/// Wraps at `u32::MAX`; see [`elapsed`] for how to compare timestamps.
pub type ClockTime = u32;

/// Forward elapsed time from `start` to `now` in milliseconds.
///
/// Correct even when `now` has numerically wrapped past `u32::MAX`
/// exactly once since `start` was taken.
///
/// # Examples
///
/// ```
/// use rs_irrigate::clock::elapsed;
///
/// assert_eq!(elapsed(100, 350), 250);
/// assert_eq!(elapsed(u32::MAX - 5, 10), 16); // across the wrap
/// ```
#[inline]
pub fn elapsed(start: ClockTime, now: ClockTime) -> u32 {
    now.wrapping_sub(start)
}

/// Time source with a bounded sleep.
///
/// `sleep_ms` exists so the protocol's polling waits are injectable: the
/// mock clock advances simulated time instead of blocking, which makes the
/// ready-wait loop fully deterministic under test.
///
/// # Example
///
/// ```
/// use rs_irrigate::clock::Clock;
/// use rs_irrigate::hal::MockClock;
///
/// let mut clock = MockClock::new();
/// clock.sleep_ms(250);
/// assert_eq!(clock.now_ms(), 250);
/// ```
pub trait Clock {
    /// Current time in milliseconds since an arbitrary epoch.
    ///
    /// Monotonic apart from the `u32` wrap.
    fn now_ms(&self) -> ClockTime;

    /// Suspend for the given number of milliseconds.
    fn sleep_ms(&mut self, ms: u32);
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Reference computation in a wider integer type.
    fn elapsed_u64(start: u32, now: u32) -> u64 {
        let start = start as u64;
        let mut now = now as u64;
        if now < start {
            now += 1 << 32;
        }
        now - start
    }

    #[test]
    fn elapsed_simple() {
        assert_eq!(elapsed(0, 0), 0);
        assert_eq!(elapsed(0, 1), 1);
        assert_eq!(elapsed(1_000, 5_000), 4_000);
    }

    #[test]
    fn elapsed_across_wrap() {
        assert_eq!(elapsed(u32::MAX, 0), 1);
        assert_eq!(elapsed(u32::MAX - 10, 20), 31);
        assert_eq!(elapsed(0xFFFF_FF00, 0x0000_00FF), 0x1FF);
    }

    #[test]
    fn elapsed_matches_wide_reference() {
        let cases = [
            (0u32, 0u32),
            (0, u32::MAX),
            (u32::MAX, 0),
            (u32::MAX - 1, 3),
            (123_456_789, 987_654_321),
            (987_654_321, 123_456_789),
            (0x8000_0000, 0x7FFF_FFFF),
        ];
        for (start, now) in cases {
            assert_eq!(
                elapsed(start, now) as u64,
                elapsed_u64(start, now),
                "start={start:#x} now={now:#x}"
            );
        }
    }
}
