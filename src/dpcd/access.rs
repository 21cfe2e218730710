//! DPCD access over the AUX channel
//!
//! Native AUX transfers are limited to 16 bytes, so larger accesses are split
//! into consecutive transactions. Non-ACK replies become errors.
//!
//! Sinks answer DEFER while busy and a transaction can time out on a noisy
//! line. [`RetryingAux`] resubmits each transaction within a bounded
//! [`AuxRetry`] budget before the reply reaches the accessors.

use embedded_hal::delay::DelayNs;

use crate::driver::error::{AuxError, AuxResult};
use crate::hal::aux::{AuxChannel, AuxReply, AuxRequest};
use crate::hal::poll::{PollError, try_poll_until};
use crate::internal::constants::{AUX_MAX_PAYLOAD, AUX_RETRY_ATTEMPTS, AUX_RETRY_INTERVAL_US};

/// DPCD read/write helpers, available on every [`AuxChannel`]
pub trait Dpcd: AuxChannel {
    /// Read `buffer.len()` bytes starting at `address`
    fn dpcd_read(&mut self, address: u32, buffer: &mut [u8]) -> AuxResult<()> {
        let mut offset = address;
        for chunk in buffer.chunks_mut(AUX_MAX_PAYLOAD) {
            let reply = self.submit(AuxRequest::NativeRead, offset, chunk)?;
            check_reply(reply)?;
            offset += chunk.len() as u32;
        }
        Ok(())
    }

    /// Write `data` starting at `address`
    fn dpcd_write(&mut self, address: u32, data: &[u8]) -> AuxResult<()> {
        let mut offset = address;
        let mut scratch = [0u8; AUX_MAX_PAYLOAD];
        for chunk in data.chunks(AUX_MAX_PAYLOAD) {
            let payload = &mut scratch[..chunk.len()];
            payload.copy_from_slice(chunk);
            let reply = self.submit(AuxRequest::NativeWrite, offset, payload)?;
            check_reply(reply)?;
            offset += chunk.len() as u32;
        }
        Ok(())
    }

    /// Read a single byte
    fn dpcd_readb(&mut self, address: u32) -> AuxResult<u8> {
        let mut byte = [0u8; 1];
        self.dpcd_read(address, &mut byte)?;
        Ok(byte[0])
    }

    /// Write a single byte
    fn dpcd_writeb(&mut self, address: u32, value: u8) -> AuxResult<()> {
        self.dpcd_write(address, &[value])
    }
}

impl<T: AuxChannel + ?Sized> Dpcd for T {}

// =============================================================================
// Transaction Retry
// =============================================================================

/// Retry budget of a single AUX transaction
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AuxRetry {
    /// Wait between attempts in microseconds
    pub interval_us: u32,
    /// Submissions before giving up, the first one included
    pub attempts: u32,
}

impl AuxRetry {
    /// Default budget of about 50 ms
    pub const fn new() -> Self {
        Self {
            interval_us: AUX_RETRY_INTERVAL_US,
            attempts: AUX_RETRY_ATTEMPTS,
        }
    }
}

impl Default for AuxRetry {
    fn default() -> Self {
        Self::new()
    }
}

/// AUX channel that resubmits deferred and transiently failed transactions
///
/// A DEFER reply or an error for which [`AuxError::is_transient`] holds is
/// retried until the budget runs out; the last reply or error is then
/// returned as is. NACK and every other reply are returned at once.
pub struct RetryingAux<'a, A: AuxChannel, D: DelayNs> {
    aux: &'a mut A,
    delay: &'a mut D,
    retry: AuxRetry,
}

impl<'a, A: AuxChannel, D: DelayNs> RetryingAux<'a, A, D> {
    /// Wrap `aux`, waiting on `delay` between attempts
    pub fn new(aux: &'a mut A, delay: &'a mut D, retry: AuxRetry) -> Self {
        Self { aux, delay, retry }
    }

    /// Retry budget in use
    pub fn retry(&self) -> AuxRetry {
        self.retry
    }
}

impl<A: AuxChannel, D: DelayNs> AuxChannel for RetryingAux<'_, A, D> {
    fn submit(
        &mut self,
        request: AuxRequest,
        address: u32,
        buffer: &mut [u8],
    ) -> AuxResult<AuxReply> {
        let aux = &mut *self.aux;
        let mut last = Err(AuxError::Timeout);
        let outcome = try_poll_until(
            &mut *self.delay,
            self.retry.interval_us,
            self.retry.attempts,
            || {
                last = aux.submit(request, address, &mut *buffer);
                match last {
                    Ok(reply) => Ok(!reply.is_defer()),
                    Err(e) if e.is_transient() => Ok(false),
                    Err(e) => Err(e),
                }
            },
        );

        match outcome {
            Ok(()) => last,
            Err(PollError::Failed(e)) => Err(e),
            Err(PollError::Timeout) => {
                #[cfg(feature = "defmt")]
                defmt::debug!(
                    "aux {:#x}: gave up after {} attempts: {}",
                    address,
                    self.retry.attempts,
                    last
                );
                last
            }
        }
    }
}

fn check_reply(reply: AuxReply) -> AuxResult<()> {
    match reply {
        AuxReply::Ack => Ok(()),
        AuxReply::Nack | AuxReply::I2cNack => Err(AuxError::Nack),
        AuxReply::Defer | AuxReply::I2cDefer => Err(AuxError::Defer),
    }
}
