//! Transmitter core registers
//!
//! Link configuration, training pattern, AUX engine and PHY lane registers
//! of the DisplayPort transmitter. [`TxRegs`] wraps a [`RegisterBus`] and
//! exposes typed accessors; AUX engine registers are driven by
//! [`crate::hal::aux::AuxTransport`].

use super::{reg_enable, reg_ro, reg_rw, reg_wo};
use crate::hal::mmio::RegisterBus;
use crate::link::phy_table::PhyParams;
use crate::link::{LaneCount, LinkRate};

// =============================================================================
// Link Configuration Registers
// =============================================================================

/// Link bandwidth (rate) code
pub const TX_LINK_BW_SET: usize = 0x000;
/// Active lane count
pub const TX_LANE_CNT_SET: usize = 0x004;
/// Enhanced framing enable
pub const TX_ENHANCED_FRAME_EN: usize = 0x008;
/// Training pattern select
pub const TX_TRAINING_PATTERN_SET: usize = 0x00c;
/// Scrambling disable (override during training)
pub const TX_SCRAMBLING_DISABLE: usize = 0x014;
/// Downspread control
pub const TX_DOWNSPREAD_CTL: usize = 0x018;
/// Transmitter enable
pub const TX_ENABLE: usize = 0x080;

// =============================================================================
// AUX Engine Registers
// =============================================================================

/// AUX command register
pub const TX_AUX_COMMAND: usize = 0x100;
/// Request code field shift in AUX_COMMAND
pub const TX_AUX_COMMAND_CMD_SHIFT: u32 = 8;
/// Address-only transaction flag in AUX_COMMAND
pub const TX_AUX_COMMAND_ADDRESS_ONLY: u32 = 1 << 12;
/// Byte count (minus one) field shift in AUX_COMMAND
pub const TX_AUX_COMMAND_BYTES_SHIFT: u32 = 0;
/// AUX write FIFO
pub const TX_AUX_WRITE_FIFO: usize = 0x104;
/// AUX address register
pub const TX_AUX_ADDRESS: usize = 0x108;
/// AUX clock divider
pub const TX_CLK_DIVIDER: usize = 0x10c;
/// AUX pulse-width filter field shift in CLK_DIVIDER
pub const TX_CLK_DIVIDER_AUX_FILTER_SHIFT: u32 = 8;
/// Interrupt signal state
pub const TX_INTR_SIGNAL_STATE: usize = 0x130;
/// Hot-plug detect asserted
pub const TX_INTR_SIGNAL_STATE_HPD: u32 = 1 << 0;
/// AUX request pending
pub const TX_INTR_SIGNAL_STATE_REQUEST: u32 = 1 << 1;
/// AUX reply received
pub const TX_INTR_SIGNAL_STATE_REPLY: u32 = 1 << 2;
/// AUX reply timed out
pub const TX_INTR_SIGNAL_STATE_REPLY_TIMEOUT: u32 = 1 << 3;
/// AUX reply data FIFO
pub const TX_AUX_REPLY_DATA: usize = 0x134;
/// AUX reply code
pub const TX_AUX_REPLY_CODE: usize = 0x138;
/// AUX reply byte count
pub const TX_REPLY_DATA_CNT: usize = 0x148;
/// Valid bits of REPLY_DATA_CNT
pub const TX_REPLY_DATA_CNT_MASK: u32 = 0xff;

// =============================================================================
// PHY Registers
// =============================================================================

/// Voltage swing (differential voltage) of lane 0; lanes follow at 4-byte stride
pub const TX_PHY_VOLTAGE_DIFF_LANE_0: usize = 0x220;
/// PHY clock feedback setting (rate dependent)
pub const TX_PHY_CLOCK_FEEDBACK_SETTING: usize = 0x234;
/// Clock feedback value for 1.62 Gb/s
pub const TX_PHY_CLOCK_FEEDBACK_SETTING_162: u32 = 0x1;
/// Clock feedback value for 2.7 Gb/s
pub const TX_PHY_CLOCK_FEEDBACK_SETTING_270: u32 = 0x3;
/// Clock feedback value for 5.4 Gb/s
pub const TX_PHY_CLOCK_FEEDBACK_SETTING_540: u32 = 0x5;
/// Pre-emphasis (pre-cursor) of lane 0; lanes follow at 4-byte stride
pub const TX_PHY_PRECURSOR_LANE_0: usize = 0x23c;
/// Post-cursor of lane 0; lanes follow at 4-byte stride
pub const TX_PHY_POSTCURSOR_LANE_0: usize = 0x24c;
/// PHY status (one ready bit per lane in bits 3:0)
pub const TX_PHY_STATUS: usize = 0x280;
/// Lane-ready bits of PHY_STATUS
pub const TX_PHY_STATUS_LANES_READY_MASK: u32 = 0xf;

/// Register stride between consecutive lanes
pub const TX_PHY_LANE_STRIDE: usize = 4;

/// Training pattern values shared by the local register and the DPCD
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum TrainingPattern {
    /// Training disabled (normal video)
    Disabled = 0,
    /// TPS1, used by clock recovery
    Pattern1 = 1,
    /// TPS2, used by channel equalization
    Pattern2 = 2,
    /// TPS3, used by channel equalization when both ends support it
    Pattern3 = 3,
}

impl TrainingPattern {
    /// Raw register / DPCD value
    pub const fn bits(self) -> u8 {
        self as u8
    }
}

/// Local transmitter register facade
#[derive(Debug)]
pub struct TxRegs<B: RegisterBus> {
    bus: B,
}

impl<B: RegisterBus> TxRegs<B> {
    /// Wrap a register bus
    pub const fn new(bus: B) -> Self {
        Self { bus }
    }

    reg_rw!(link_bw, set_link_bw, TX_LINK_BW_SET, "link bandwidth code");
    reg_rw!(lane_count, set_lane_count_raw, TX_LANE_CNT_SET, "active lane count");
    reg_enable!(set_enhanced_framing, TX_ENHANCED_FRAME_EN, "enhanced framing");
    reg_rw!(
        training_pattern,
        set_training_pattern_raw,
        TX_TRAINING_PATTERN_SET,
        "training pattern select"
    );
    reg_enable!(set_scrambling_disabled, TX_SCRAMBLING_DISABLE, "the scrambling override");
    reg_enable!(set_downspread, TX_DOWNSPREAD_CTL, "downspread");
    reg_enable!(set_tx_enabled, TX_ENABLE, "the transmitter");
    reg_wo!(set_clock_divider, TX_CLK_DIVIDER, "AUX clock divider");
    reg_ro!(signal_state, TX_INTR_SIGNAL_STATE, "interrupt signal state");
    reg_wo!(
        set_clock_feedback,
        TX_PHY_CLOCK_FEEDBACK_SETTING,
        "PHY clock feedback setting"
    );
    reg_ro!(phy_status, TX_PHY_STATUS, "PHY status");

    /// Program the local link rate and matching PHY clock feedback
    pub fn set_link_rate(&mut self, rate: LinkRate) {
        self.set_link_bw(u32::from(rate.bw_code()));
        let feedback = match rate {
            LinkRate::Rbr => TX_PHY_CLOCK_FEEDBACK_SETTING_162,
            LinkRate::Hbr => TX_PHY_CLOCK_FEEDBACK_SETTING_270,
            LinkRate::Hbr2 => TX_PHY_CLOCK_FEEDBACK_SETTING_540,
        };
        self.set_clock_feedback(feedback);
    }

    /// Program the local lane count
    pub fn set_lane_count(&mut self, lanes: LaneCount) {
        self.set_lane_count_raw(u32::from(lanes.count()));
    }

    /// Select the transmitted training pattern
    pub fn set_training_pattern(&mut self, pattern: TrainingPattern) {
        self.set_training_pattern_raw(u32::from(pattern.bits()));
    }

    /// Whether the hot-plug detect line is asserted
    pub fn hpd_asserted(&mut self) -> bool {
        self.signal_state() & TX_INTR_SIGNAL_STATE_HPD != 0
    }

    /// Whether every lane in `mask` reports PHY ready
    pub fn phy_lanes_ready(&mut self, mask: u32) -> bool {
        self.phy_status() & TX_PHY_STATUS_LANES_READY_MASK & mask == mask
    }

    /// Write swing, pre-emphasis and post-cursor for one lane
    pub fn apply_phy_params(&mut self, lane: usize, params: PhyParams) {
        let stride = lane * TX_PHY_LANE_STRIDE;
        self.bus.write(
            TX_PHY_VOLTAGE_DIFF_LANE_0 + stride,
            u32::from(params.voltage_swing),
        );
        self.bus.write(
            TX_PHY_PRECURSOR_LANE_0 + stride,
            u32::from(params.pre_emphasis),
        );
        self.bus.write(
            TX_PHY_POSTCURSOR_LANE_0 + stride,
            u32::from(params.post_cursor),
        );
    }
}
