//! Mock implementations for testing without hardware.
//!
//! | Mock | Trait | Purpose |
//! |------|-------|---------|
//! | [`MockClock`] | [`Clock`] | Simulated time; sleeping advances it |
//! | [`MockTransport`] | [`Transport`] | Scripted RX bytes, captured writes |
//! | [`MockPump`] | [`PumpActuator`] | Counts physical toggle edges |
//! | [`ScriptedMoisture`] | [`MoistureSource`] | Queued readings |
//!
//! Because [`MockClock::sleep_ms`] advances simulated time instead of
//! blocking, the protocol's polling waits run instantly and
//! deterministically under test, including timeout expiry.
//!
//! # Example
//!
//! ```
//! use rs_irrigate::ProtocolSession;
//! use rs_irrigate::hal::{MockClock, MockTransport};
//!
//! let mut transport = MockTransport::new();
//! transport.reply_with(b"\nG\n");
//!
//! let mut session = ProtocolSession::new(transport, MockClock::new());
//! session.initialize(57_600, 12, 14).unwrap();
//! assert!(session.send_command("L 0 R 0 D 0 ", 5_000).is_ok());
//! ```

use std::collections::VecDeque;

use crate::clock::{Clock, ClockTime};
use crate::sensor::MoistureSample;
use crate::traits::{MoistureSource, PumpActuator, Transport};

/// Controllable time source for testing.
///
/// # Example
///
/// ```
/// use rs_irrigate::hal::MockClock;
/// use rs_irrigate::Clock;
///
/// let mut clock = MockClock::new();
/// clock.set(1_000);
/// clock.sleep_ms(500);
/// assert_eq!(clock.now_ms(), 1_500);
/// ```
#[derive(Debug, Default)]
pub struct MockClock {
    current_ms: ClockTime,
}

impl MockClock {
    /// Creates a clock starting at 0 ms.
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a clock starting at the given time, e.g. near the
    /// counter wrap.
    pub fn starting_at(ms: ClockTime) -> Self {
        Self { current_ms: ms }
    }

    /// Sets the current time.
    pub fn set(&mut self, ms: ClockTime) {
        self.current_ms = ms;
    }

    /// Advances the clock, wrapping like the real counter.
    pub fn advance(&mut self, ms: u32) {
        self.current_ms = self.current_ms.wrapping_add(ms);
    }
}

impl Clock for MockClock {
    fn now_ms(&self) -> ClockTime {
        self.current_ms
    }

    fn sleep_ms(&mut self, ms: u32) {
        self.advance(ms);
    }
}

/// Scripted transport channel for testing.
///
/// Received bytes come from two scripts: bytes queued with
/// [`queue_rx`](Self::queue_rx) are available immediately (unsolicited
/// chatter such as a startup banner), while replies queued with
/// [`reply_with`](Self::reply_with) become available one per write, in
/// order, simulating the board answering each command.
///
/// Everything written is captured per call in
/// [`writes`](Self::writes).
#[derive(Debug, Default)]
pub struct MockTransport {
    /// `(baud, rx_pin, tx_pin)` passed to `initialize`, if called.
    pub initialized: Option<(u32, u8, u8)>,
    /// Captured writes, one entry per `write` call.
    pub writes: Vec<Vec<u8>>,
    /// Fail the next `initialize` call.
    pub fail_initialize: bool,
    /// Fail all `write` calls.
    pub fail_writes: bool,
    rx: VecDeque<u8>,
    replies: VecDeque<Vec<u8>>,
}

impl MockTransport {
    /// Creates a transport with empty scripts.
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes bytes immediately available on the receive path.
    pub fn queue_rx(&mut self, bytes: &[u8]) {
        self.rx.extend(bytes.iter().copied());
    }

    /// Queues a reply to appear after the next unanswered write.
    pub fn reply_with(&mut self, bytes: &[u8]) {
        self.replies.push_back(bytes.to_vec());
    }

    /// Queues the same reply for `count` consecutive writes.
    pub fn reply_with_n(&mut self, count: usize, bytes: &[u8]) {
        for _ in 0..count {
            self.reply_with(bytes);
        }
    }

    /// Number of `write` calls so far.
    pub fn write_count(&self) -> usize {
        self.writes.len()
    }

    /// All written bytes, concatenated.
    pub fn written(&self) -> Vec<u8> {
        self.writes.concat()
    }
}

impl Transport for MockTransport {
    type Error = ();

    fn initialize(&mut self, baud: u32, rx_pin: u8, tx_pin: u8) -> Result<(), ()> {
        if self.fail_initialize {
            return Err(());
        }
        self.initialized = Some((baud, rx_pin, tx_pin));
        Ok(())
    }

    fn write(&mut self, bytes: &[u8]) -> Result<(), ()> {
        if self.fail_writes {
            return Err(());
        }
        self.writes.push(bytes.to_vec());
        if let Some(reply) = self.replies.pop_front() {
            self.rx.extend(reply);
        }
        Ok(())
    }

    fn bytes_available(&mut self) -> usize {
        self.rx.len()
    }

    fn read_byte(&mut self) -> Option<u8> {
        self.rx.pop_front()
    }
}

/// Pump mock that counts physical toggle edges.
///
/// # Example
///
/// ```
/// use rs_irrigate::hal::MockPump;
/// use rs_irrigate::PumpActuator;
///
/// let mut pump = MockPump::new();
/// pump.turn_on().unwrap();
/// pump.turn_on().unwrap(); // idempotent, no second toggle
/// assert_eq!(pump.toggles_on, 1);
/// ```
#[derive(Debug, Default)]
pub struct MockPump {
    /// Whether the pump is running.
    pub on: bool,
    /// Number of off→on edges.
    pub toggles_on: usize,
    /// Number of on→off edges.
    pub toggles_off: usize,
    /// Fail all actuation calls.
    pub fail: bool,
}

impl MockPump {
    /// Creates a stopped pump.
    pub fn new() -> Self {
        Self::default()
    }
}

impl PumpActuator for MockPump {
    type Error = ();

    fn turn_on(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        if !self.on {
            self.on = true;
            self.toggles_on += 1;
        }
        Ok(())
    }

    fn turn_off(&mut self) -> Result<(), ()> {
        if self.fail {
            return Err(());
        }
        if self.on {
            self.on = false;
            self.toggles_off += 1;
        }
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.on
    }
}

/// Moisture source returning queued samples.
///
/// The last sample repeats once the queue runs out, so a scenario can
/// script a change and then hold it.
#[derive(Debug)]
pub struct ScriptedMoisture {
    queue: VecDeque<MoistureSample>,
    last: MoistureSample,
}

impl ScriptedMoisture {
    /// Creates a source that holds `initial` until more is queued.
    pub fn new(initial: MoistureSample) -> Self {
        Self {
            queue: VecDeque::new(),
            last: initial,
        }
    }

    /// Queue one sample.
    pub fn push(&mut self, sample: MoistureSample) {
        self.queue.push_back(sample);
    }
}

impl MoistureSource for ScriptedMoisture {
    fn read(&mut self) -> MoistureSample {
        if let Some(sample) = self.queue.pop_front() {
            self.last = sample;
        }
        self.last
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_sleep_advances_time() {
        let mut clock = MockClock::new();
        clock.sleep_ms(100);
        clock.sleep_ms(50);
        assert_eq!(clock.now_ms(), 150);
    }

    #[test]
    fn clock_wraps_like_the_real_counter() {
        let mut clock = MockClock::starting_at(u32::MAX - 1);
        clock.advance(3);
        assert_eq!(clock.now_ms(), 1);
    }

    #[test]
    fn transport_replies_one_per_write() {
        let mut transport = MockTransport::new();
        transport.reply_with(b"ab");
        transport.reply_with(b"cd");

        assert_eq!(transport.bytes_available(), 0);
        transport.write(b"x").unwrap();
        assert_eq!(transport.bytes_available(), 2);
        assert_eq!(transport.read_byte(), Some(b'a'));
        assert_eq!(transport.read_byte(), Some(b'b'));

        transport.write(b"y").unwrap();
        assert_eq!(transport.read_byte(), Some(b'c'));
        assert_eq!(transport.read_byte(), Some(b'd'));
        assert_eq!(transport.read_byte(), None);

        assert_eq!(transport.write_count(), 2);
        assert_eq!(transport.written(), b"xy");
    }

    #[test]
    fn pump_counts_edges_not_calls() {
        let mut pump = MockPump::new();
        pump.turn_on().unwrap();
        pump.turn_on().unwrap();
        pump.turn_off().unwrap();
        pump.turn_off().unwrap();
        assert_eq!(pump.toggles_on, 1);
        assert_eq!(pump.toggles_off, 1);
    }

    #[test]
    fn scripted_moisture_repeats_last_sample() {
        let mut source = ScriptedMoisture::new(MoistureSample::Level(80));
        source.push(MoistureSample::Level(10));

        assert_eq!(source.read(), MoistureSample::Level(10));
        assert_eq!(source.read(), MoistureSample::Level(10));
    }
}
