//! Sink link status
//!
//! Decodes the six-byte block at `LANE0_1_STATUS`: two lanes per status
//! byte, two lanes per adjust-request byte, low nibble first.

use super::{
    ADJUST_PRE_EMPHASIS_SHIFT, ADJUST_VOLTAGE_SWING_MASK, INTERLANE_ALIGN_DONE,
    LANE_CHANNEL_EQ_DONE, LANE_CR_DONE, LANE_SYMBOL_LOCKED, LANE0_1_STATUS, LINK_STATUS_SIZE,
    LINK_STATUS_UPDATED,
};
use crate::driver::error::AuxResult;
use crate::dpcd::access::Dpcd;
use crate::hal::aux::AuxChannel;
use crate::link::LaneCount;

/// Snapshot of the sink's link status block
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStatus {
    raw: [u8; LINK_STATUS_SIZE],
}

impl LinkStatus {
    /// Wrap raw bytes read from `LANE0_1_STATUS`
    pub const fn from_bytes(raw: [u8; LINK_STATUS_SIZE]) -> Self {
        Self { raw }
    }

    /// Raw status bytes
    pub const fn as_bytes(&self) -> &[u8; LINK_STATUS_SIZE] {
        &self.raw
    }

    const fn nibble(byte: u8, lane: usize) -> u8 {
        (byte >> ((lane & 1) * 4)) & 0xf
    }

    /// Status nibble of `lane`
    pub const fn lane_status(&self, lane: usize) -> u8 {
        Self::nibble(self.raw[lane / 2], lane)
    }

    /// Clock recovery done on `lane`
    pub const fn cr_done(&self, lane: usize) -> bool {
        self.lane_status(lane) & LANE_CR_DONE != 0
    }

    /// Channel equalization done on `lane`
    pub const fn eq_done(&self, lane: usize) -> bool {
        self.lane_status(lane) & LANE_CHANNEL_EQ_DONE != 0
    }

    /// Symbols locked on `lane`
    pub const fn symbol_locked(&self, lane: usize) -> bool {
        self.lane_status(lane) & LANE_SYMBOL_LOCKED != 0
    }

    /// Clock recovery done on every active lane
    pub fn all_cr_done(&self, lanes: LaneCount) -> bool {
        (0..lanes.count() as usize).all(|lane| self.cr_done(lane))
    }

    /// Equalization done and symbols locked on every active lane
    pub fn all_eq_locked(&self, lanes: LaneCount) -> bool {
        (0..lanes.count() as usize).all(|lane| self.eq_done(lane) && self.symbol_locked(lane))
    }

    /// Interlane alignment reported by the sink
    pub const fn interlane_aligned(&self) -> bool {
        self.raw[2] & INTERLANE_ALIGN_DONE != 0
    }

    /// The sink flagged a link status change
    pub const fn link_status_updated(&self) -> bool {
        self.raw[2] & LINK_STATUS_UPDATED != 0
    }

    /// Requested (voltage swing, pre-emphasis) levels for `lane`
    pub const fn adjust_request(&self, lane: usize) -> (u8, u8) {
        let adjust = Self::nibble(self.raw[4 + lane / 2], lane);
        (
            adjust & ADJUST_VOLTAGE_SWING_MASK,
            (adjust >> ADJUST_PRE_EMPHASIS_SHIFT) & ADJUST_VOLTAGE_SWING_MASK,
        )
    }
}

/// Read the link status block from the sink
pub fn read_link_status<A: AuxChannel + ?Sized>(aux: &mut A) -> AuxResult<LinkStatus> {
    let mut raw = [0u8; LINK_STATUS_SIZE];
    aux.dpcd_read(LANE0_1_STATUS, &mut raw)?;
    Ok(LinkStatus::from_bytes(raw))
}
