//! Hardware Abstraction Layer
//!
//! This module provides the abstractions the training logic is written
//! against, so it never touches raw registers directly.
//!
//! # Modules
//!
//! - [`mmio`]: 32-bit register bus trait and the volatile MMIO window
//! - [`aux`]: AUX channel trait and the register-backed transport
//! - [`poll`]: Bounded polling used by every blocking wait
//!
//! # Delay Integration
//!
//! All types that require delays use `embedded_hal::delay::DelayNs` directly.
//! Pass any delay implementation from your HAL.

pub mod aux;
pub mod mmio;
pub mod poll;

// Re-export commonly used types
pub use aux::{AuxChannel, AuxReply, AuxRequest, AuxTransport, aux_clock_divider};
pub use mmio::{Mmio, RegisterBus};
pub use poll::{PollError, PollTimeout, poll_until, try_poll_until};
