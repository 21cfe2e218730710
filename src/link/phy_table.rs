//! PHY drive parameter tables
//!
//! Maps DisplayPort voltage swing / pre-emphasis levels to the transmitter
//! PHY's register values. Tables are indexed `[pre_emphasis][voltage_swing]`;
//! combinations the PHY cannot drive hold [`SENTINEL`].

use crate::internal::constants::{MAX_PRE_EMPHASIS, MAX_VOLTAGE_SWING};

/// Marker for an undefined swing / pre-emphasis combination
pub const SENTINEL: u8 = 0xff;

const LEVELS: usize = 4;

const VOLTAGE_SWING: [[u8; LEVELS]; LEVELS] = [
    [0x2a, 0x27, 0x24, 0x20],
    [0x27, 0x23, 0x20, 0xff],
    [0x24, 0x20, 0xff, 0xff],
    [0xff, 0xff, 0xff, 0xff],
];

const PRE_EMPHASIS: [[u8; LEVELS]; LEVELS] = [
    [0x02, 0x02, 0x02, 0x02],
    [0x01, 0x01, 0x01, 0xff],
    [0x00, 0x00, 0xff, 0xff],
    [0xff, 0xff, 0xff, 0xff],
];

/// Register values for one lane
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PhyParams {
    /// Differential voltage register value
    pub voltage_swing: u8,
    /// Pre-cursor register value
    pub pre_emphasis: u8,
    /// Post-cursor register value
    pub post_cursor: u8,
}

impl PhyParams {
    const INVALID: Self = Self {
        voltage_swing: SENTINEL,
        pre_emphasis: SENTINEL,
        post_cursor: 0,
    };

    /// Whether the combination is drivable
    pub const fn is_valid(&self) -> bool {
        self.voltage_swing != SENTINEL && self.pre_emphasis != SENTINEL
    }
}

/// Look up register values for a swing / pre-emphasis level pair
pub const fn lookup(voltage_swing: u8, pre_emphasis: u8) -> PhyParams {
    if !in_range(voltage_swing, pre_emphasis) {
        return PhyParams::INVALID;
    }
    let (v, p) = (voltage_swing as usize, pre_emphasis as usize);
    PhyParams {
        voltage_swing: VOLTAGE_SWING[p][v],
        pre_emphasis: PRE_EMPHASIS[p][v],
        post_cursor: 0,
    }
}

/// Highest pre-emphasis level the table defines for `voltage_swing`
pub const fn max_valid_pre_emphasis(voltage_swing: u8) -> u8 {
    let mut level = MAX_PRE_EMPHASIS;
    while level > 0 && !lookup(voltage_swing, level).is_valid() {
        level -= 1;
    }
    level
}

/// Whether a level pair is within DisplayPort's defined range
pub const fn in_range(voltage_swing: u8, pre_emphasis: u8) -> bool {
    voltage_swing <= MAX_VOLTAGE_SWING && pre_emphasis <= MAX_PRE_EMPHASIS
}
