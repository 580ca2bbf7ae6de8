//! Command protocol engine for the motorboard link.
//!
//! The motorboard executes motor directives sent as plain ASCII over a
//! half-duplex serial line. There is no framing: readiness for the next
//! command is signaled by the three-byte sentinel `\n` `G` `\n` followed
//! by silence on the wire. This module builds on that minimal contract:
//!
//! - detect readiness with a sliding-window scan of the receive path
//! - tolerate unsolicited output (the board prints a help banner at
//!   startup) by waiting the banner out before sending
//! - bound every wait, so a dropped link costs at most the timeout
//!
//! Commands are not parsed locally, so their execution time is unknown;
//! the caller picks the response timeout and owns the retry policy.
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
//! session.send_command("L 20 R 20 D 500 ", 5_000).unwrap();
//! ```

use log::trace;

use crate::clock::{elapsed, Clock, ClockTime};
use crate::error::ProtocolError;
use crate::traits::Transport;

/// The board's ready signal: newline, `G`, newline, then silence.
pub const READY_SENTINEL: [u8; 3] = [b'\n', b'G', b'\n'];

/// Default grace budget for waiting out an unsolicited startup banner.
pub const DEFAULT_BANNER_GRACE_MS: u32 = 4_000;

/// One command session over a transport channel.
///
/// Holds the initialized transport, the injected clock, and the
/// per-character transmission delay derived from the baud rate. The
/// session is stateless between commands and lives for the process
/// lifetime; it is never torn down.
pub struct ProtocolSession<T, C> {
    transport: T,
    clock: C,
    char_delay_ms: u32,
    banner_grace_ms: u32,
    initialized: bool,
}

impl<T: Transport, C: Clock> ProtocolSession<T, C> {
    /// Creates a session over the given transport and clock.
    ///
    /// The transport is not opened until [`initialize`](Self::initialize).
    pub fn new(transport: T, clock: C) -> Self {
        Self {
            transport,
            clock,
            char_delay_ms: 0,
            banner_grace_ms: DEFAULT_BANNER_GRACE_MS,
            initialized: false,
        }
    }

    /// Set the banner grace budget.
    pub fn with_banner_grace_ms(mut self, ms: u32) -> Self {
        self.banner_grace_ms = ms;
        self
    }

    /// Opens the transport and computes the per-character delay.
    pub fn initialize(&mut self, baud: u32, rx_pin: u8, tx_pin: u8) -> Result<(), ProtocolError> {
        self.transport
            .initialize(baud, rx_pin, tx_pin)
            .map_err(|_| ProtocolError::Transport)?;
        // Time to transfer one character: 10 bits on the wire per byte.
        self.char_delay_ms = 1_000 / (baud / 10).max(1) + 1;
        self.initialized = true;
        Ok(())
    }

    /// Whether [`initialize`](Self::initialize) has succeeded.
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// Per-character transmission delay in milliseconds.
    ///
    /// Also the poll interval of the ready-wait, so the CPU is not spun
    /// faster than bytes can arrive.
    pub fn char_delay_ms(&self) -> u32 {
        self.char_delay_ms
    }

    /// Current session time.
    pub fn now_ms(&self) -> ClockTime {
        self.clock.now_ms()
    }

    /// Suspend the session's clock.
    pub fn sleep_ms(&mut self, ms: u32) {
        self.clock.sleep_ms(ms);
    }

    /// Borrow the transport, for inspection in tests.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Borrow the transport mutably, for scripting in tests.
    pub fn transport_mut(&mut self) -> &mut T {
        &mut self.transport
    }

    /// Borrow the clock.
    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Sends one or more concatenated directives and waits for the
    /// ready signal.
    ///
    /// If the board is already talking unprompted (typically its startup
    /// banner), the banner is first waited out under the longer grace
    /// budget; if it never resolves into a ready signal the channel is
    /// considered desynchronized and nothing is sent.
    ///
    /// On [`ProtocolError::Timeout`] no part of the command may be
    /// assumed executed; the motor state is unknown and the caller may
    /// re-issue a neutral command defensively.
    pub fn send_command(&mut self, commands: &str, timeout_ms: u32) -> Result<(), ProtocolError> {
        if !self.initialized {
            return Err(ProtocolError::NotInitialized);
        }

        if self.transport.bytes_available() > 0 {
            // The board is sending something to us unprompted. Probably
            // its startup help text; the ready signal comes after the
            // text is fully printed.
            trace!("unsolicited bytes on the channel, waiting out the banner");
            if !self.wait_for_ready(self.banner_grace_ms) {
                return Err(ProtocolError::Desynchronized);
            }
        }

        self.transport
            .write(commands.as_bytes())
            .map_err(|_| ProtocolError::Transport)?;

        if self.wait_for_ready(timeout_ms) {
            Ok(())
        } else {
            Err(ProtocolError::Timeout { timeout_ms })
        }
    }

    /// [`send_command`](Self::send_command) plus the elapsed wall time,
    /// for ping measurement.
    pub fn send_command_timed(
        &mut self,
        commands: &str,
        timeout_ms: u32,
    ) -> (Result<(), ProtocolError>, u32) {
        let start = self.clock.now_ms();
        let result = self.send_command(commands, timeout_ms);
        (result, elapsed(start, self.clock.now_ms()))
    }

    /// Scans the receive path for the ready sentinel.
    ///
    /// Keeps a three-byte sliding window of the most recent bytes. On a
    /// sentinel match, waits one character delay and confirms the wire
    /// has gone silent; a match with bytes still pending is a false
    /// positive (the sentinel bytes were part of overlapping banner
    /// text), so detection state is cleared and scanning continues.
    fn wait_for_ready(&mut self, timeout_ms: u32) -> bool {
        let mut window = [0u8; 3];
        let start = self.clock.now_ms();

        while elapsed(start, self.clock.now_ms()) < timeout_ms {
            if let Some(byte) = self.transport.read_byte() {
                window[0] = window[1];
                window[1] = window[2];
                window[2] = byte;

                if window == READY_SENTINEL {
                    self.clock.sleep_ms(self.char_delay_ms);
                    if self.transport.bytes_available() == 0 {
                        return true;
                    }
                    // The board is still emitting; scan from scratch.
                    window = [0u8; 3];
                }
            }

            self.clock.sleep_ms(self.char_delay_ms);
        }

        false
    }
}
