//! Bounded Polling
//!
//! Every blocking wait in the driver (AUX reply, PHY ready, hot-plug detect)
//! is an instance of [`poll_until`] or [`try_poll_until`]: check a condition
//! up to `max_attempts` times, sleeping `interval_us` between checks.

use embedded_hal::delay::DelayNs;

/// The polled condition never became true within the attempt budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PollTimeout;

/// Outcome of a fallible poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PollError<E> {
    /// Attempt budget exhausted
    Timeout,
    /// The predicate itself failed
    Failed(E),
}

/// Poll `ready` until it returns true
///
/// The condition is checked at most `max_attempts` times. The delay is only
/// taken between checks, so a condition that is already true costs no wait.
/// A zero budget never checks and times out immediately.
pub fn poll_until<D, F>(
    delay: &mut D,
    interval_us: u32,
    max_attempts: u32,
    mut ready: F,
) -> Result<(), PollTimeout>
where
    D: DelayNs,
    F: FnMut() -> bool,
{
    match try_poll_until(delay, interval_us, max_attempts, || {
        Ok::<bool, core::convert::Infallible>(ready())
    }) {
        Ok(()) => Ok(()),
        Err(PollError::Timeout) => Err(PollTimeout),
        Err(PollError::Failed(never)) => match never {},
    }
}

/// Poll a fallible predicate until it returns `Ok(true)`
///
/// An `Err` from the predicate ends polling immediately.
pub fn try_poll_until<D, F, E>(
    delay: &mut D,
    interval_us: u32,
    max_attempts: u32,
    mut ready: F,
) -> Result<(), PollError<E>>
where
    D: DelayNs,
    F: FnMut() -> Result<bool, E>,
{
    for attempt in 0..max_attempts {
        if attempt > 0 {
            delay.delay_us(interval_us);
        }
        if ready().map_err(PollError::Failed)? {
            return Ok(());
        }
    }
    Err(PollError::Timeout)
}
