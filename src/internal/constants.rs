//! Centralized Constants
//!
//! This module provides a single source of truth for the timing budgets,
//! iteration bounds and protocol sizes used by the link-training driver.
//!
//! # Organization
//!
//! Constants are grouped by category:
//! - **AUX channel**: payload limits and reply polling
//! - **Training bounds**: iteration ceilings and stagnation threshold
//! - **Settle delays**: clock recovery / equalization wait times
//! - **PHY and hot-plug polling**: readiness and detection budgets
//! - **Defaults**: source capabilities and pixel format
//!
//! # Note
//!
//! Register offsets and bit definitions remain in `internal::register` and
//! `dpcd` as they are specific to those register spaces.

// =============================================================================
// AUX Channel
// =============================================================================

/// Maximum payload of a single AUX transaction in bytes
pub const AUX_MAX_PAYLOAD: usize = 16;

/// Interval between AUX reply polls in microseconds
pub const AUX_POLL_INTERVAL_US: u32 = 1_000;

/// Number of AUX reply status checks before giving up
pub const AUX_MAX_POLLS: u32 = 3;

/// Lowest APB clock able to drive the AUX clock divider (1 MHz)
pub const AUX_MIN_APB_CLOCK_HZ: u32 = 1_000_000;

/// Wait between retries of a deferred or failed DPCD transaction (µs)
pub const AUX_RETRY_INTERVAL_US: u32 = 400;

/// Transaction attempts before a DPCD access gives up
///
/// 125 attempts 400 µs apart give the sink about 50 ms to answer.
pub const AUX_RETRY_ATTEMPTS: u32 = 125;

// =============================================================================
// Training Bounds
// =============================================================================

/// Clock recovery iteration ceiling
///
/// 4 lanes x 4 swing levels need at most 256 iterations; this bound only
/// guards against pathological sinks.
pub const CR_MAX_ITERATIONS: u16 = 512;

/// Identical lane-0 swing iterations after which clock recovery gives up
pub const CR_STAGNATION_LIMIT: u8 = 5;

/// Channel equalization iteration bound
pub const EQ_MAX_ITERATIONS: u8 = 5;

/// Highest voltage swing level
pub const MAX_VOLTAGE_SWING: u8 = 3;

/// Highest pre-emphasis level
pub const MAX_PRE_EMPHASIS: u8 = 2;

// =============================================================================
// Settle Delays
// =============================================================================

/// Clock recovery settle delay when the sink reports no read interval (µs)
pub const CR_DEFAULT_SETTLE_US: u32 = 100;

/// Clock recovery settle delay at RBR when the sink reports no interval (µs)
pub const CR_RBR_SETTLE_US: u32 = 400;

/// Channel equalization settle delay when the sink reports no interval (µs)
pub const EQ_DEFAULT_SETTLE_US: u32 = 400;

/// Unit of the sink's TRAINING_AUX_RD_INTERVAL field (µs)
pub const AUX_RD_INTERVAL_UNIT_US: u32 = 4_000;

/// Largest TRAINING_AUX_RD_INTERVAL value honored (16 ms)
pub const AUX_RD_INTERVAL_MAX: u8 = 4;

// =============================================================================
// PHY and Hot-Plug Polling
// =============================================================================

/// Interval between PHY ready polls in microseconds
pub const PHY_READY_POLL_INTERVAL_US: u32 = 1_000;

/// Number of PHY ready checks before giving up
pub const PHY_READY_MAX_POLLS: u32 = 100;

/// Interval between hot-plug detect polls in milliseconds
pub const HPD_POLL_INTERVAL_MS: u32 = 100;

/// Number of hot-plug detect checks
pub const HPD_MAX_POLLS: u32 = 10;

/// Receiver capability reads attempted by detection
pub const CAPS_READ_ATTEMPTS: u32 = 2;

// =============================================================================
// Defaults
// =============================================================================

/// Default APB clock feeding the AUX clock divider (100 MHz)
pub const DEFAULT_APB_CLOCK_HZ: u32 = 100_000_000;

/// Default highest pixel clock the source pipeline can drive (kHz)
pub const DEFAULT_MAX_PIXEL_CLOCK_KHZ: u32 = 300_000;

/// Default bits per color component
pub const DEFAULT_BPC: u8 = 8;
