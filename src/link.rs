//! Motorboard link: connection setup, ping measurement, self-test, and
//! pump actuation over the command protocol.
//!
//! This is the thin semantic layer above [`ProtocolSession`]: it knows
//! what the directives mean but leaves all wire handling to the
//! protocol engine.

use log::{debug, info, warn};

use crate::clock::{elapsed, Clock};
use crate::command::{MotorCommand, MAX_COMMAND_LEN};
use crate::config::LinkConfig;
use crate::error::{LinkError, ProtocolError};
use crate::protocol::ProtocolSession;
use crate::traits::{PumpActuator, Transport};

/// Capacity of a concatenated pump-run command.
const PUMP_RUN_COMMAND_LEN: usize = 32 * MAX_COMMAND_LEN;

type PumpRunCommand = heapless::String<PUMP_RUN_COMMAND_LEN>;

/// Semantic interface to the motorboard.
///
/// Wraps a [`ProtocolSession`] with connection establishment, round-trip
/// measurement, a diagnostic motor sweep, and a [`PumpActuator`]
/// implementation for the irrigation controller.
pub struct Motorboard<T, C> {
    session: ProtocolSession<T, C>,
    config: LinkConfig,
    link_up: bool,
    pump_on: bool,
    last_ping_ms: Option<u32>,
}

impl<T: Transport, C: Clock> Motorboard<T, C> {
    /// Creates an unconnected link.
    pub fn new(transport: T, clock: C, config: LinkConfig) -> Self {
        let session =
            ProtocolSession::new(transport, clock).with_banner_grace_ms(config.banner_grace_ms);
        Self {
            session,
            config,
            link_up: false,
            pump_on: false,
            last_ping_ms: None,
        }
    }

    /// Borrow the underlying session, for inspection in tests.
    pub fn session(&self) -> &ProtocolSession<T, C> {
        &self.session
    }

    /// Borrow the underlying session mutably.
    pub fn session_mut(&mut self) -> &mut ProtocolSession<T, C> {
        &mut self.session
    }

    /// Round-trip latency measured during [`establish`](Self::establish).
    pub fn last_ping_ms(&self) -> Option<u32> {
        self.last_ping_ms
    }

    /// Whether the board has ever answered a probe.
    ///
    /// While this is `false` the pump actuator refuses to run: a link
    /// that was never established must not carry motor commands.
    pub fn is_link_up(&self) -> bool {
        self.link_up
    }

    /// Initializes the transport and probes until the board answers.
    ///
    /// Probes with a short per-attempt timeout, retrying at a fixed
    /// interval until either success or the wall-clock budget runs out.
    /// The board takes a while to boot and prints a help banner first,
    /// so early probes are expected to fail. On success, measures ping.
    pub fn establish(&mut self) -> Result<(), LinkError> {
        info!("motorboard initialization");
        self.session
            .initialize(self.config.baud, self.config.rx_pin, self.config.tx_pin)?;

        let probe_timeout = self.probe_timeout_ms();
        let start = self.session.now_ms();

        let mut connected = self.probe(probe_timeout);
        while !connected
            && elapsed(start, self.session.now_ms()) < self.config.establish_budget_ms
        {
            self.session.sleep_ms(self.config.probe_retry_ms);
            connected = self.probe(probe_timeout);
        }

        if !connected {
            warn!(
                "motorboard did not answer within {} ms",
                self.config.establish_budget_ms
            );
            return Err(LinkError::Unavailable {
                budget_ms: self.config.establish_budget_ms,
            });
        }

        self.link_up = true;
        info!("motorboard link established");
        match self.measure_ping_ms(self.config.ping_probes) {
            Some(ping) => {
                info!("motorboard ping: {ping} ms");
                self.last_ping_ms = Some(ping);
            }
            None => warn!("ping measurement completed no probes"),
        }

        Ok(())
    }

    /// Tests connectivity with a single no-op command.
    ///
    /// A successful probe also brings a never-established link up, so a
    /// board that boots late can be recovered without a restart.
    pub fn test_connection(&mut self) -> bool {
        let timeout = self.probe_timeout_ms();
        let connected = self.probe(timeout);
        if connected {
            self.link_up = true;
        }
        connected
    }

    /// Measures round-trip latency over `probes` back-to-back no-op
    /// commands.
    ///
    /// The average is taken over the probes that actually completed; a
    /// probe failure stops the measurement. If the board stops
    /// responding before any probe completes, there is nothing to
    /// average and the result is `None`, never a division by zero.
    pub fn measure_ping_ms(&mut self, probes: u8) -> Option<u32> {
        let command = MotorCommand::neutral().render();
        let mut total_ms: u32 = 0;
        let mut completed: u32 = 0;

        for _ in 0..probes {
            let (result, took_ms) =
                self.session
                    .send_command_timed(&command, self.config.command_timeout_ms);
            if result.is_err() {
                break;
            }
            total_ms += took_ms;
            completed += 1;
        }

        if completed == 0 {
            return None;
        }
        Some(total_ms / completed)
    }

    /// Briefly spins the motors for operator verification of wiring and
    /// response. Diagnostic only, not part of the control path.
    ///
    /// Power traces one half-period of a sine wave, stepped in fixed
    /// angle increments from 0° to 180°, one short directive per step.
    pub fn self_test(&mut self) -> Result<(), ProtocolError> {
        const SWEEP_DURATION_MS: u16 = 800;
        const ANGLE_STEP_DEG: u16 = 15;
        const AMPLITUDE_PC: f32 = 100.0;

        let steps = 180 / ANGLE_STEP_DEG + 1;
        let step_ms = SWEEP_DURATION_MS / steps;

        info!("motors test: half-sine sweep, {steps} commands of {step_ms} ms");

        let mut angle_deg: u16 = 0;
        while angle_deg <= 180 {
            let power = (AMPLITUDE_PC * (angle_deg as f32).to_radians().sin()) as i8;
            let command = MotorCommand::uniform(power, step_ms).render();
            self.session
                .send_command(&command, self.config.command_timeout_ms)?;
            angle_deg += ANGLE_STEP_DEG;
        }

        info!("motors test done");
        Ok(())
    }

    /// Per-attempt timeout of a connectivity probe: long enough for the
    /// three sentinel characters plus slack.
    fn probe_timeout_ms(&self) -> u32 {
        3 * self.session.char_delay_ms() + 10
    }

    /// Concatenated full-power directives covering one whole pump run.
    ///
    /// The board caps a single directive's duration at the pulse
    /// length, so the run is tiled out of back-to-back pulses; the
    /// board executes them in sequence while `turn_off` can cut the
    /// run short with a neutral directive at any point.
    fn pump_run_command(&self) -> PumpRunCommand {
        let mut out = PumpRunCommand::new();
        let mut remaining = self.config.pump_run_ms;
        while remaining > 0 {
            let pulse = remaining.min(self.config.pump_pulse_ms.max(1) as u32) as u16;
            let directive = MotorCommand::uniform(self.config.pump_power_pc, pulse).render();
            if out.push_str(&directive).is_err() {
                warn!("pump run truncated at {} ms", self.config.pump_run_ms - remaining);
                break;
            }
            remaining -= pulse as u32;
        }
        out
    }

    fn probe(&mut self, timeout_ms: u32) -> bool {
        let command = MotorCommand::neutral().render();
        match self.session.send_command(&command, timeout_ms) {
            Ok(()) => true,
            Err(err) => {
                debug!("probe failed: {err}");
                false
            }
        }
    }
}

impl<T: Transport, C: Clock> PumpActuator for Motorboard<T, C> {
    type Error = LinkError;

    fn turn_on(&mut self) -> Result<(), LinkError> {
        if self.pump_on {
            return Ok(());
        }
        if !self.link_up {
            debug!("pump on requested while the link is down");
            return Err(LinkError::Unavailable {
                budget_ms: self.config.establish_budget_ms,
            });
        }
        let command = self.pump_run_command();
        self.session
            .send_command(&command, self.config.command_timeout_ms)?;
        self.pump_on = true;
        info!("pump on for up to {} ms", self.config.pump_run_ms);
        Ok(())
    }

    fn turn_off(&mut self) -> Result<(), LinkError> {
        if !self.pump_on {
            return Ok(());
        }
        let command = MotorCommand::neutral().render();
        // Only drop the flag once the board confirmed; after a timeout
        // the motor state is unknown and the stop must be re-issued.
        self.session
            .send_command(&command, self.config.command_timeout_ms)?;
        self.pump_on = false;
        info!("pump off");
        Ok(())
    }

    fn is_on(&self) -> bool {
        self.pump_on
    }
}
