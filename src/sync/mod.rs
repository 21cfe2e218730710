//! Synchronization Support
//!
//! This module provides synchronization primitives and an ISR-safe wrapper
//! for the transmitter driver:
//!
//! - **Primitives** (`primitives`): Low-level synchronization types
//!   - [`CriticalSectionCell`] - ISR-safe interior mutability
//!
//! - **Shared Wrapper** (`shared`): ISR-safe driver slot
//!   - [`SharedDptx`] - Critical-section protected transmitter
//!
//! # Feature Flags
//!
//! - `critical-section`: Enables this module
//!
//! # Example
//!
//! ```ignore
//! use dptx_link::sync::SharedDptx;
//!
//! static DP: SharedDptx<AuxTransport<Mmio, Delay>, Mmio, Delay> = SharedDptx::new();
//!
//! fn main() {
//!     DP.install(Dptx::with_bus(bus, delay, DptxConfig::new()));
//!     DP.with(|dp| {
//!         dp.init().unwrap();
//!         if dp.detect() == ConnectionStatus::Connected {
//!             dp.train(148_500).ok();
//!         }
//!     });
//! }
//!
//! #[interrupt]
//! fn DP_IRQ() {
//!     // Retrains if the sink reports a lost link
//!     DP.handle_hpd_irq();
//! }
//! ```

mod primitives;

pub use primitives::CriticalSectionCell;

mod shared;

pub use shared::SharedDptx;
