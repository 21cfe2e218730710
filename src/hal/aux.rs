//! AUX Channel Transport
//!
//! The AUX channel is a half-duplex command/reply link to the sink. One call
//! to [`AuxChannel::submit`] is one AUX transaction of at most
//! [`AUX_MAX_PAYLOAD`] bytes; nothing is retried here. DEFER replies and
//! transient failures are retried by [`crate::dpcd::RetryingAux`], and
//! larger transfers are split by [`crate::dpcd::Dpcd`].

use embedded_hal::delay::DelayNs;

use crate::driver::error::{AuxError, AuxResult, ConfigError, ConfigResult};
use crate::hal::mmio::RegisterBus;
use crate::hal::poll::{PollError, try_poll_until};
use crate::internal::constants::{
    AUX_MAX_PAYLOAD, AUX_MAX_POLLS, AUX_MIN_APB_CLOCK_HZ, AUX_POLL_INTERVAL_US,
};
use crate::internal::register::tx::{
    TX_AUX_ADDRESS, TX_AUX_COMMAND, TX_AUX_COMMAND_ADDRESS_ONLY, TX_AUX_COMMAND_BYTES_SHIFT,
    TX_AUX_COMMAND_CMD_SHIFT, TX_AUX_REPLY_CODE, TX_AUX_REPLY_DATA, TX_AUX_WRITE_FIFO,
    TX_CLK_DIVIDER_AUX_FILTER_SHIFT, TX_INTR_SIGNAL_STATE, TX_INTR_SIGNAL_STATE_REPLY,
    TX_INTR_SIGNAL_STATE_REPLY_TIMEOUT, TX_INTR_SIGNAL_STATE_REQUEST, TX_REPLY_DATA_CNT,
    TX_REPLY_DATA_CNT_MASK,
};

// =============================================================================
// Request / Reply
// =============================================================================

/// AUX request type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxRequest {
    /// Native AUX write (DPCD)
    NativeWrite,
    /// Native AUX read (DPCD)
    NativeRead,
    /// I2C-over-AUX write
    I2cWrite {
        /// Middle-of-transaction: keep the I2C bus claimed afterwards
        mot: bool,
    },
    /// I2C-over-AUX read
    I2cRead {
        /// Middle-of-transaction: keep the I2C bus claimed afterwards
        mot: bool,
    },
}

impl AuxRequest {
    const NATIVE_WRITE: u32 = 0x8;
    const NATIVE_READ: u32 = 0x9;
    const I2C_WRITE: u32 = 0x0;
    const I2C_READ: u32 = 0x1;
    const I2C_MOT: u32 = 0x4;

    /// Request code as placed in the AUX command register
    pub const fn code(self) -> u32 {
        match self {
            AuxRequest::NativeWrite => Self::NATIVE_WRITE,
            AuxRequest::NativeRead => Self::NATIVE_READ,
            AuxRequest::I2cWrite { mot } => Self::I2C_WRITE | if mot { Self::I2C_MOT } else { 0 },
            AuxRequest::I2cRead { mot } => Self::I2C_READ | if mot { Self::I2C_MOT } else { 0 },
        }
    }

    /// Whether the request reads data back from the sink
    pub const fn is_read(self) -> bool {
        self.code() & 0x1 != 0
    }

    /// Whether this is an I2C-over-AUX request
    pub const fn is_i2c(self) -> bool {
        matches!(self, AuxRequest::I2cWrite { .. } | AuxRequest::I2cRead { .. })
    }
}

/// AUX reply status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxReply {
    /// Request acknowledged
    Ack,
    /// Native request not acknowledged
    Nack,
    /// Native request deferred, retry later
    Defer,
    /// I2C transaction not acknowledged
    I2cNack,
    /// I2C transaction deferred
    I2cDefer,
}

impl AuxReply {
    const CODE_NACK: u32 = 1 << 0;
    const CODE_DEFER: u32 = 1 << 1;
    const CODE_I2C_NACK: u32 = 1 << 2;
    const CODE_I2C_DEFER: u32 = 1 << 3;

    /// Decode the AUX_REPLY_CODE register
    pub const fn from_code(code: u32) -> Self {
        if code & Self::CODE_NACK != 0 {
            AuxReply::Nack
        } else if code & Self::CODE_DEFER != 0 {
            AuxReply::Defer
        } else if code & Self::CODE_I2C_NACK != 0 {
            AuxReply::I2cNack
        } else if code & Self::CODE_I2C_DEFER != 0 {
            AuxReply::I2cDefer
        } else {
            AuxReply::Ack
        }
    }

    /// Whether the sink acknowledged the request
    pub const fn is_ack(self) -> bool {
        matches!(self, AuxReply::Ack)
    }

    /// Whether the sink asked for the request to be repeated later
    pub const fn is_defer(self) -> bool {
        matches!(self, AuxReply::Defer | AuxReply::I2cDefer)
    }
}

// =============================================================================
// Channel Trait
// =============================================================================

/// A single-transaction AUX channel
///
/// `buffer.len()` is the transfer length. For writes the buffer holds the
/// payload; for reads it is filled from the reply on ACK.
pub trait AuxChannel {
    /// Submit one AUX transaction and wait for its reply
    fn submit(&mut self, request: AuxRequest, address: u32, buffer: &mut [u8])
    -> AuxResult<AuxReply>;
}

impl<T: AuxChannel + ?Sized> AuxChannel for &mut T {
    fn submit(
        &mut self,
        request: AuxRequest,
        address: u32,
        buffer: &mut [u8],
    ) -> AuxResult<AuxReply> {
        (**self).submit(request, address, buffer)
    }
}

// =============================================================================
// Register-backed Transport
// =============================================================================

/// AUX transport driving the transmitter's AUX engine registers
#[derive(Debug)]
pub struct AuxTransport<B: RegisterBus, D: DelayNs> {
    bus: B,
    delay: D,
    poll_interval_us: u32,
    max_polls: u32,
}

impl<B: RegisterBus, D: DelayNs> AuxTransport<B, D> {
    /// Create a transport with the default reply polling budget
    pub fn new(bus: B, delay: D) -> Self {
        Self {
            bus,
            delay,
            poll_interval_us: AUX_POLL_INTERVAL_US,
            max_polls: AUX_MAX_POLLS,
        }
    }

    /// Create a transport with a custom reply polling budget
    pub fn with_polling(bus: B, delay: D, poll_interval_us: u32, max_polls: u32) -> Self {
        Self {
            bus,
            delay,
            poll_interval_us,
            max_polls,
        }
    }

    /// Reply polling interval in microseconds
    pub fn poll_interval_us(&self) -> u32 {
        self.poll_interval_us
    }

    /// Number of reply status checks
    pub fn max_polls(&self) -> u32 {
        self.max_polls
    }

    fn wait_reply(&mut self) -> AuxResult<()> {
        let bus = &mut self.bus;
        try_poll_until(&mut self.delay, self.poll_interval_us, self.max_polls, || {
            let state = bus.read(TX_INTR_SIGNAL_STATE);
            if state & TX_INTR_SIGNAL_STATE_REPLY != 0 {
                Ok(true)
            } else if state & TX_INTR_SIGNAL_STATE_REPLY_TIMEOUT != 0 {
                Err(AuxError::ReplyTimeout)
            } else {
                Ok(false)
            }
        })
        .map_err(|e| match e {
            PollError::Timeout => AuxError::Timeout,
            PollError::Failed(e) => e,
        })
    }
}

impl<B: RegisterBus, D: DelayNs> AuxChannel for AuxTransport<B, D> {
    fn submit(
        &mut self,
        request: AuxRequest,
        address: u32,
        buffer: &mut [u8],
    ) -> AuxResult<AuxReply> {
        let len = buffer.len();
        if len > AUX_MAX_PAYLOAD {
            return Err(AuxError::InvalidLength);
        }

        if self.bus.read(TX_INTR_SIGNAL_STATE) & TX_INTR_SIGNAL_STATE_REQUEST != 0 {
            return Err(AuxError::Busy);
        }

        self.bus.write(TX_AUX_ADDRESS, address);

        let is_read = request.is_read();
        if !is_read {
            for &byte in buffer.iter() {
                self.bus.write(TX_AUX_WRITE_FIFO, u32::from(byte));
            }
        }

        let mut command = request.code() << TX_AUX_COMMAND_CMD_SHIFT;
        if len == 0 {
            command |= TX_AUX_COMMAND_ADDRESS_ONLY;
        } else {
            command |= ((len - 1) as u32) << TX_AUX_COMMAND_BYTES_SHIFT;
        }
        self.bus.write(TX_AUX_COMMAND, command);

        self.wait_reply()?;

        let reply = AuxReply::from_code(self.bus.read(TX_AUX_REPLY_CODE));
        if is_read && reply.is_ack() {
            let count = (self.bus.read(TX_REPLY_DATA_CNT) & TX_REPLY_DATA_CNT_MASK) as usize;
            if count != len {
                #[cfg(feature = "defmt")]
                defmt::debug!("aux short read: {} of {} bytes at {:#x}", count, len, address);
                return Err(AuxError::ShortRead);
            }
            for byte in buffer.iter_mut() {
                *byte = self.bus.read(TX_AUX_REPLY_DATA) as u8;
            }
        }

        Ok(reply)
    }
}

// =============================================================================
// Clock Divider
// =============================================================================

/// Compute the AUX clock divider register value for an APB clock
///
/// The pulse-width filter is the smallest multiple of 8 (up to 48) that
/// keeps the filter window between 0.4 µs and 0.6 µs; the low byte divides
/// the clock down to 1 MHz.
pub fn aux_clock_divider(apb_clock_hz: u32) -> ConfigResult<u32> {
    if apb_clock_hz < AUX_MIN_APB_CLOCK_HZ {
        return Err(ConfigError::InvalidClock);
    }

    let rate = u64::from(apb_clock_hz);
    let low = 4 * rate / 10_000_000;
    let high = 6 * rate / 10_000_000;

    (8u32..=48)
        .step_by(8)
        .find(|&w| u64::from(w) >= low && u64::from(w) <= high)
        .map(|w| (w << TX_CLK_DIVIDER_AUX_FILTER_SHIFT) | (apb_clock_hz / 1_000_000))
        .ok_or(ConfigError::InvalidClock)
}
