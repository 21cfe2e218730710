//! DisplayPort Transmitter Link Training
//!
//! A `no_std`, `no_alloc` Rust driver that brings up the main link of a
//! DisplayPort transmitter (DPTX): AUX channel transactions, sink capability
//! discovery, link configuration selection and VESA link training.
//!
//! # Architecture
//!
//! The driver is organized into layers:
//!
//! 1. **Driver Layer** ([`driver`]): [`Dptx`] facade with init, detect, train
//!    and hot-plug handling
//! 2. **Training Layer** ([`training`]): Clock recovery, channel equalization
//!    and the rate-downshift orchestrator
//! 3. **Link Layer** ([`link`]): Link rates, lane counts, per-lane drive
//!    settings and configuration selection
//! 4. **DPCD Layer** ([`dpcd`]): Sink register access over AUX, capability
//!    and link status decoding
//! 5. **HAL Layer** ([`hal`]): Register bus, AUX transport and bounded polling
//!
//! ## Standard Compliance
//!
//! - **VESA DisplayPort 1.2**: DPCD layout, training patterns TPS1-TPS3,
//!   link rates RBR/HBR/HBR2, 1/2/4 lanes
//! - **Transmitter core**: AUX engine and PHY register layout of the
//!   Xilinx ZynqMP DisplayPort subsystem
//!
//! # Features
//!
//! - `defmt`: Enable defmt formatting and training trace output
//! - `critical-section`: Enable ISR-safe `SharedDptx` wrapper
//!
//! # Example
//!
//! ```ignore
//! use dptx_link::{ConnectionStatus, Dptx, DptxConfig, Mmio};
//!
//! // Your delay implementation (from your HAL)
//! let delay = /* your DelayNs + Clone implementation */;
//!
//! // SAFETY: DP_BASE is the transmitter core's register window
//! let bus = unsafe { Mmio::new(DP_BASE) };
//! let mut dp = Dptx::with_bus(bus, delay, DptxConfig::new());
//!
//! dp.init().unwrap();
//! if dp.detect() == ConnectionStatus::Connected && dp.mode_valid(148_500) {
//!     let link = dp.train(148_500).unwrap();
//!     // program the video pipeline for link.rate / link.lane_count
//! }
//!
//! // From the hot-plug interrupt
//! dp.handle_hpd_irq().ok();
//! ```

#![no_std]
#![deny(missing_docs)]
#![allow(unsafe_code)]
#![deny(unsafe_op_in_unsafe_fn)]
// Clippy lint levels live here; thresholds and config are in Cargo.toml.
#![deny(clippy::correctness)]
#![warn(
    clippy::suspicious,
    clippy::style,
    clippy::complexity,
    clippy::perf,
    clippy::cloned_instead_of_copied,
    clippy::explicit_iter_loop,
    clippy::implicit_clone,
    clippy::inconsistent_struct_constructor,
    clippy::manual_assert,
    clippy::manual_let_else,
    clippy::match_same_arms,
    clippy::needless_pass_by_value,
    clippy::semicolon_if_nothing_returned,
    clippy::uninlined_format_args,
    clippy::unnested_or_patterns,
    clippy::std_instead_of_core,
    clippy::std_instead_of_alloc,
    clippy::alloc_instead_of_core
)]
#![allow(
    clippy::mod_module_files,
    clippy::self_named_module_files,
    clippy::similar_names,
    clippy::too_many_arguments,
    clippy::struct_excessive_bools,
    clippy::fn_params_excessive_bools,
    clippy::type_complexity,
    clippy::must_use_candidate,
    clippy::assertions_on_constants,
    clippy::cast_possible_truncation,
    clippy::cast_possible_wrap,
    clippy::cast_sign_loss,
    clippy::cast_precision_loss,
    clippy::cast_lossless,
    clippy::panic_in_result_fn,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::module_name_repetitions,
    clippy::wildcard_imports,
    clippy::items_after_statements
)]

// =============================================================================
// Modules
// =============================================================================

pub mod dpcd;
pub mod driver;
pub mod hal;
pub mod link;
pub mod training;

// Internal implementation details (pub(crate) only)
mod internal;

#[cfg(feature = "critical-section")]
#[cfg_attr(docsrs, doc(cfg(feature = "critical-section")))]
pub mod sync;

// Test utilities (only available during testing)
#[cfg(test)]
pub(crate) mod test_utils;

// =============================================================================
// Re-exports
// =============================================================================

pub use driver::config::{ColorFormat, DptxConfig, SUPPORTED_BPC, State};
pub use driver::dptx::{ConnectionStatus, Dptx};
pub use driver::error::{
    AuxError, AuxResult, ConfigError, ConfigResult, Error, LinkError, LinkResult, Result,
    TrainingError, TrainingResult,
};
pub use hal::{AuxChannel, AuxReply, AuxRequest, AuxTransport, Mmio, RegisterBus};
pub use link::{LaneCount, LinkCapability, LinkConfig, LinkRate};
pub use training::TrainingLimits;

/// Low-level register accessors for advanced use.
///
/// These are intentionally separated from the primary facade. Most users should
/// prefer the driver APIs instead of touching registers directly.
///
/// Direct register access bypasses driver invariants. Use only if you fully
/// understand the transmitter core and accept responsibility for correct
/// sequencing with training.
pub mod unsafe_registers {
    pub use crate::internal::register::tx::{TrainingPattern, TxRegs};
}

// Re-export sync types when critical-section is enabled
#[cfg(feature = "critical-section")]
pub use sync::SharedDptx;

/// Shared driver constants.
///
/// These are grouped into a dedicated module to keep the top-level facade
/// focused on driver types.
pub mod constants {
    pub use crate::internal::constants::{
        // AUX channel
        AUX_MAX_PAYLOAD,
        AUX_MAX_POLLS,
        AUX_MIN_APB_CLOCK_HZ,
        AUX_POLL_INTERVAL_US,
        AUX_RETRY_ATTEMPTS,
        AUX_RETRY_INTERVAL_US,
        // Settle delays
        AUX_RD_INTERVAL_MAX,
        AUX_RD_INTERVAL_UNIT_US,
        CAPS_READ_ATTEMPTS,
        CR_DEFAULT_SETTLE_US,
        // Training bounds
        CR_MAX_ITERATIONS,
        CR_RBR_SETTLE_US,
        CR_STAGNATION_LIMIT,
        // Defaults
        DEFAULT_APB_CLOCK_HZ,
        DEFAULT_BPC,
        DEFAULT_MAX_PIXEL_CLOCK_KHZ,
        EQ_DEFAULT_SETTLE_US,
        EQ_MAX_ITERATIONS,
        // Hot-plug and PHY polling
        HPD_MAX_POLLS,
        HPD_POLL_INTERVAL_MS,
        MAX_PRE_EMPHASIS,
        MAX_VOLTAGE_SWING,
        PHY_READY_MAX_POLLS,
        PHY_READY_POLL_INTERVAL_US,
    };
}
