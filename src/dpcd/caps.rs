//! Receiver capability reader
//!
//! The receiver capability block is read once per detection and reduced to
//! a [`LinkCapability`] bounded by what the source can drive.

use super::{
    DPCD_REV, DPCD_REV_12, ENHANCED_FRAME_CAP, MAX_DOWNSPREAD, MAX_DOWNSPREAD_0_5,
    MAX_LANE_COUNT, MAX_LANE_COUNT_MASK, MAX_LINK_RATE, RECEIVER_CAP_SIZE, TPS3_SUPPORTED,
    TRAINING_AUX_RD_INTERVAL, TRAINING_AUX_RD_INTERVAL_MASK,
};
use crate::driver::error::AuxResult;
use crate::dpcd::access::Dpcd;
use crate::hal::aux::AuxChannel;
use crate::link::{LaneCount, LinkCapability, LinkRate};

/// Read the receiver capability block and combine it with source limits
pub fn read_capability<A: AuxChannel + ?Sized>(
    aux: &mut A,
    source_max_rate: LinkRate,
    source_lanes: LaneCount,
) -> AuxResult<LinkCapability> {
    let mut caps = [0u8; RECEIVER_CAP_SIZE];
    aux.dpcd_read(DPCD_REV, &mut caps)?;

    let capability = parse_capability(&caps, source_max_rate, source_lanes);

    #[cfg(feature = "defmt")]
    defmt::debug!(
        "sink caps: rev {:#x}, {} x {}, tps3 {}",
        capability.dpcd_rev,
        capability.max_rate,
        capability.max_lanes,
        capability.supports_tps3
    );

    Ok(capability)
}

/// Decode a receiver capability block
pub fn parse_capability(
    caps: &[u8; RECEIVER_CAP_SIZE],
    source_max_rate: LinkRate,
    source_lanes: LaneCount,
) -> LinkCapability {
    let dpcd_rev = caps[DPCD_REV as usize];
    let lane_byte = caps[MAX_LANE_COUNT as usize];

    let sink_rate = LinkRate::from_bw_code_floor(caps[MAX_LINK_RATE as usize]);
    let sink_lanes = LaneCount::from_count_floor(lane_byte & MAX_LANE_COUNT_MASK);

    LinkCapability {
        max_rate: sink_rate.min(source_max_rate),
        max_lanes: sink_lanes.min(source_lanes),
        supports_tps3: dpcd_rev >= DPCD_REV_12 && lane_byte & TPS3_SUPPORTED != 0,
        supports_enhanced_framing: lane_byte & ENHANCED_FRAME_CAP != 0,
        supports_downspread: caps[MAX_DOWNSPREAD as usize] & MAX_DOWNSPREAD_0_5 != 0,
        dpcd_rev,
        aux_rd_interval: caps[TRAINING_AUX_RD_INTERVAL as usize] & TRAINING_AUX_RD_INTERVAL_MASK,
    }
}
