//! Motorboard command text.
//!
//! The wire contract is an ASCII directive `"L <int> R <int> D <int> "`:
//! left and right motor power as signed percent in `[-100, 100]`, duration
//! in milliseconds, terminated by a trailing space. Several directives may
//! be concatenated into one send. There is no framing beyond this text:
//! no length prefix and no checksum.

use core::fmt::Write as _;

use heapless::String;

/// Maximum rendered length of a single directive.
///
/// Worst case is `"L -100 R -100 D 65535 "` at 22 bytes.
pub const MAX_COMMAND_LEN: usize = 32;

/// Rendered command text, fixed capacity, immutable after construction.
pub type CommandText = String<MAX_COMMAND_LEN>;

/// One motor directive: left/right power and a run duration.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotorCommand {
    left_pc: i8,
    right_pc: i8,
    duration_ms: u16,
}

impl MotorCommand {
    /// Creates a directive, clamping both powers into `[-100, 100]`.
    pub fn new(left_pc: i8, right_pc: i8, duration_ms: u16) -> Self {
        Self {
            left_pc: left_pc.clamp(-100, 100),
            right_pc: right_pc.clamp(-100, 100),
            duration_ms,
        }
    }

    /// Same power on both motors.
    pub fn uniform(power_pc: i8, duration_ms: u16) -> Self {
        Self::new(power_pc, power_pc, duration_ms)
    }

    /// The no-op directive `"L 0 R 0 D 0 "`.
    ///
    /// Used as the connectivity probe and as a defensive stop after a
    /// timeout left the board state unknown.
    pub fn neutral() -> Self {
        Self::new(0, 0, 0)
    }

    /// Left motor power in percent.
    pub fn left_pc(&self) -> i8 {
        self.left_pc
    }

    /// Right motor power in percent.
    pub fn right_pc(&self) -> i8 {
        self.right_pc
    }

    /// Run duration in milliseconds.
    pub fn duration_ms(&self) -> u16 {
        self.duration_ms
    }

    /// Renders the wire text, trailing space included.
    ///
    /// # Example
    ///
    /// ```
    /// use rs_irrigate::MotorCommand;
    ///
    /// let cmd = MotorCommand::new(50, -50, 1500);
    /// assert_eq!(cmd.render().as_str(), "L 50 R -50 D 1500 ");
    /// ```
    pub fn render(&self) -> CommandText {
        let mut out = CommandText::new();
        // Cannot overflow MAX_COMMAND_LEN, see the constant.
        let _ = write!(
            out,
            "L {} R {} D {} ",
            self.left_pc, self.right_pc, self.duration_ms
        );
        out
    }
}
