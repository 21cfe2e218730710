//! ISR-safe transmitter wrapper using critical sections.
//!
//! Provides [`SharedDptx`], a static-friendly slot holding a [`Dptx`] that
//! can be reached from thread code and from the hot-plug interrupt handler.

use embedded_hal::delay::DelayNs;

use super::primitives::CriticalSectionCell;
use crate::driver::dptx::Dptx;
use crate::driver::error::Result;
use crate::hal::aux::AuxChannel;
use crate::hal::mmio::RegisterBus;

/// ISR-safe transmitter wrapper using critical sections.
///
/// The slot starts empty so it can live in a `static`; the driver is moved
/// in with [`install`](Self::install) once its bus and delay exist. All
/// access goes through `critical_section::with()`, disabling interrupts for
/// the duration of the closure.
///
/// # Example
///
/// ```ignore
/// static DP: SharedDptx<AuxTransport<Mmio, Delay>, Mmio, Delay> = SharedDptx::new();
///
/// DP.install(Dptx::with_bus(bus, delay, DptxConfig::new()));
/// DP.with(|dp| dp.init());
///
/// #[interrupt]
/// fn DP_IRQ() {
///     DP.handle_hpd_irq();
/// }
/// ```
pub struct SharedDptx<A: AuxChannel, B: RegisterBus, D: DelayNs> {
    inner: CriticalSectionCell<Option<Dptx<A, B, D>>>,
}

impl<A: AuxChannel, B: RegisterBus, D: DelayNs> SharedDptx<A, B, D> {
    /// Create an empty slot (const, suitable for static initialization).
    pub const fn new() -> Self {
        Self {
            inner: CriticalSectionCell::new(None),
        }
    }

    /// Move a driver into the slot, returning the one it replaces.
    pub fn install(&self, dptx: Dptx<A, B, D>) -> Option<Dptx<A, B, D>> {
        self.inner.with(|slot| slot.replace(dptx))
    }

    /// Move the driver out of the slot.
    pub fn take(&self) -> Option<Dptx<A, B, D>> {
        self.inner.with(Option::take)
    }

    /// Whether a driver is installed.
    pub fn is_installed(&self) -> bool {
        self.inner.with(|slot| slot.is_some())
    }

    /// Execute a closure with exclusive access to the driver.
    ///
    /// Returns `None` when no driver is installed.
    #[inline]
    pub fn with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Dptx<A, B, D>) -> R,
    {
        self.inner.with(|slot| slot.as_mut().map(f))
    }

    /// Try to execute a closure, returning `None` if the slot is empty or
    /// already borrowed.
    #[inline]
    pub fn try_with<R, F>(&self, f: F) -> Option<R>
    where
        F: FnOnce(&mut Dptx<A, B, D>) -> R,
    {
        self.inner.try_with(|slot| slot.as_mut().map(f)).flatten()
    }

    /// Service a hot-plug interrupt pulse.
    ///
    /// Returns `None` when no driver is installed or it is in use by the
    /// interrupted context.
    pub fn handle_hpd_irq(&self) -> Option<Result<bool>> {
        self.try_with(Dptx::handle_hpd_irq)
    }
}

impl<A: AuxChannel, B: RegisterBus, D: DelayNs> Default for SharedDptx<A, B, D> {
    fn default() -> Self {
        Self::new()
    }
}
