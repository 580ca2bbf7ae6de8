//! Hardware Abstraction Layer implementations.
//!
//! Concrete implementations of the traits in [`crate::traits`]:
//!
//! - `mock`: deterministic test doubles for desktop development
//! - `serial`: real serial transport and system clock (requires the
//!   `serial` feature)

pub mod mock;

#[cfg(feature = "serial")]
pub mod serial;

pub use mock::*;

#[cfg(feature = "serial")]
pub use serial::*;
