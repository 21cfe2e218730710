//! Memory-mapped register definitions for the DisplayPort transmitter core
//!
//! This module provides volatile primitives used by [`crate::hal::mmio::Mmio`]
//! and the accessor macros used by the transmitter register facade in
//! [`tx`]. All offsets are byte offsets from the core base address.

pub mod tx;

/// Read a 32-bit register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn read_reg(addr: usize) -> u32 {
    unsafe { core::ptr::read_volatile(addr as *const u32) }
}

/// Write a 32-bit value to a register at the given address
///
/// # Safety
/// The caller must ensure the address is valid and properly aligned.
#[inline(always)]
pub unsafe fn write_reg(addr: usize, value: u32) {
    unsafe { core::ptr::write_volatile(addr as *mut u32, value) }
}

// =============================================================================
// Register Access Macros
// =============================================================================

/// Generate read/write accessor methods for a register on a bus-backed facade.
///
/// # Example
/// ```ignore
/// impl<B: RegisterBus> TxRegs<B> {
///     reg_rw!(lane_count, set_lane_count, TX_LANE_CNT_SET, "lane count register");
/// }
/// ```
macro_rules! reg_rw {
    ($read_fn:ident, $write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&mut self) -> u32 {
            self.bus.read($offset)
        }

        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(&mut self, value: u32) {
            self.bus.write($offset, value)
        }
    };
}

/// Generate a read-only accessor method for a register.
macro_rules! reg_ro {
    ($read_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Read ", $doc)]
        #[inline(always)]
        pub fn $read_fn(&mut self) -> u32 {
            self.bus.read($offset)
        }
    };
}

/// Generate a write-only accessor method for a register.
macro_rules! reg_wo {
    ($write_fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Write ", $doc)]
        #[inline(always)]
        pub fn $write_fn(&mut self, value: u32) {
            self.bus.write($offset, value)
        }
    };
}

/// Generate a boolean enable/disable method for a single-bit register.
macro_rules! reg_enable {
    ($fn:ident, $offset:expr, $doc:expr) => {
        #[doc = concat!("Enable or disable ", $doc)]
        #[inline(always)]
        pub fn $fn(&mut self, enable: bool) {
            self.bus.write($offset, u32::from(enable))
        }
    };
}

pub(crate) use reg_enable;
pub(crate) use reg_ro;
pub(crate) use reg_rw;
pub(crate) use reg_wo;
