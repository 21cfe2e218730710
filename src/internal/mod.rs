//! Internal Implementation Details
//!
//! This module contains implementation details that are not part of the public API.
//! Types in this module may change without notice between minor versions.
//!
//! # Contents
//!
//! - [`register`]: Transmitter core register offsets, volatile primitives and
//!   the [`register::tx::TxRegs`] facade
//! - [`constants`]: Timing budgets, iteration bounds and defaults
//!
//! # Stability
//!
//! **WARNING:** This module is `pub(crate)` only. Items needed by callers are
//! re-exported from the crate root.

pub(crate) mod constants;
pub(crate) mod register;
