//! Error types for the motorboard protocol and link layers.
//!
//! Nothing here is fatal to the process. A timeout or a desynchronized
//! channel leaves the motor state unknown; the caller owns the retry
//! policy and may re-issue a neutral command defensively. The main loop
//! keeps running through all of these.

use thiserror::Error;

/// Failures of a single command exchange with the motorboard.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ProtocolError {
    /// The board did not confirm readiness within the budget.
    ///
    /// The link may be dropped, or the board may still be executing a
    /// long-running directive. The command must not be assumed executed.
    #[error("motorboard did not signal ready within {timeout_ms} ms")]
    Timeout {
        /// The wait budget that was exhausted.
        timeout_ms: u32,
    },

    /// Unsolicited leading traffic never resolved into a ready signal.
    #[error("unsolicited traffic never resolved into a ready signal")]
    Desynchronized,

    /// A command was issued before the transport was initialized.
    #[error("transport has not been initialized")]
    NotInitialized,

    /// The underlying transport failed to initialize or write.
    ///
    /// Transport implementations log the concrete cause themselves.
    #[error("transport write failed")]
    Transport,
}

/// Failures of link-level operations (setup, ping, self-test).
#[derive(Debug, Error, PartialEq, Eq)]
pub enum LinkError {
    /// Connectivity was not established within the retry budget.
    ///
    /// The system keeps running without ever issuing motor commands.
    #[error("motorboard link not established within {budget_ms} ms")]
    Unavailable {
        /// The wall-clock budget that was exhausted.
        budget_ms: u32,
    },

    /// A protocol exchange failed underneath a link operation.
    #[error(transparent)]
    Protocol(#[from] ProtocolError),
}
