//! Register Bus Abstraction
//!
//! The transmitter core is a block of 32-bit registers. Driver code talks to
//! it through [`RegisterBus`] so the same training logic runs against real
//! memory-mapped hardware ([`Mmio`]) or a host mock.

use crate::internal::register::{read_reg, write_reg};

/// 32-bit register access at byte offsets from a core base
pub trait RegisterBus {
    /// Read the register at `offset`
    fn read(&mut self, offset: usize) -> u32;

    /// Write `value` to the register at `offset`
    fn write(&mut self, offset: usize, value: u32);

    /// Read-modify-write: set `bits`
    fn set_bits(&mut self, offset: usize, bits: u32) {
        let value = self.read(offset);
        self.write(offset, value | bits);
    }

    /// Read-modify-write: clear `bits`
    fn clear_bits(&mut self, offset: usize, bits: u32) {
        let value = self.read(offset);
        self.write(offset, value & !bits);
    }
}

/// Volatile memory-mapped register window
///
/// Copies of an `Mmio` alias the same hardware; the driver only ever uses
/// them from one context at a time (see [`crate::sync`] for shared use).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mmio {
    base: usize,
}

impl Mmio {
    /// Create a register window at `base`
    ///
    /// # Safety
    ///
    /// `base` must be the 4-byte aligned base address of a mapped
    /// DisplayPort transmitter core, valid for the lifetime of the window.
    pub const unsafe fn new(base: usize) -> Self {
        Self { base }
    }

    /// Base address of the window
    pub const fn base(&self) -> usize {
        self.base
    }
}

impl RegisterBus for Mmio {
    #[inline(always)]
    fn read(&mut self, offset: usize) -> u32 {
        // SAFETY: `Mmio::new` requires a valid, mapped core base address.
        unsafe { read_reg(self.base + offset) }
    }

    #[inline(always)]
    fn write(&mut self, offset: usize, value: u32) {
        // SAFETY: `Mmio::new` requires a valid, mapped core base address.
        unsafe { write_reg(self.base + offset, value) }
    }
}
