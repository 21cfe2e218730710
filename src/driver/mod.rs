//! Core driver components for the DisplayPort transmitter.
//!
//! This module contains the top-level building blocks for bringing up a
//! DisplayPort link:
//!
//! - [`config`] - Configuration types and builder patterns
//! - [`error`] - Error types and result aliases
//! - [`dptx`] - The transmitter driver
//!
//! # Example
//!
//! ```ignore
//! use dptx_link::driver::{ColorFormat, DptxConfig};
//! use dptx_link::link::{LaneCount, LinkRate};
//!
//! let config = DptxConfig::new()
//!     .with_max_link_rate(LinkRate::Hbr)
//!     .with_phy_lanes(LaneCount::Two)
//!     .with_color(ColorFormat::Rgb, 8);
//! ```

// Submodules
pub mod config;
pub mod dptx;
pub mod error;

// Re-exports for convenience
pub use config::{ColorFormat, DptxConfig, SUPPORTED_BPC, State};
pub use dptx::{ConnectionStatus, Dptx};
pub use error::{
    AuxError, AuxResult, ConfigError, ConfigResult, Error, LinkError, LinkResult, Result,
    TrainingError, TrainingResult,
};
