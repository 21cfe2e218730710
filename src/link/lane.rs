//! Per-lane drive settings

use crate::dpcd::{
    TRAIN_MAX_PRE_EMPHASIS_REACHED, TRAIN_MAX_SWING_REACHED, TRAIN_PRE_EMPHASIS_MASK,
    TRAIN_PRE_EMPHASIS_SHIFT, TRAIN_VOLTAGE_SWING_MASK,
};
use crate::link::phy_table::{self, PhyParams};

/// Drive settings of one lane during training
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LaneTrainingState {
    /// Voltage swing level, 0..=3
    pub voltage_swing: u8,
    /// Pre-emphasis level, 0..=2
    pub pre_emphasis: u8,
    /// The swing cannot be raised further
    pub max_swing_reached: bool,
    /// The pre-emphasis cannot be raised further
    pub max_pre_emphasis_reached: bool,
}

impl LaneTrainingState {
    /// Lowest drive, no flags
    pub const fn new() -> Self {
        Self {
            voltage_swing: 0,
            pre_emphasis: 0,
            max_swing_reached: false,
            max_pre_emphasis_reached: false,
        }
    }

    /// Encode as a DPCD `TRAINING_LANEx_SET` byte
    pub const fn to_train_set(&self) -> u8 {
        let mut set = (self.voltage_swing & TRAIN_VOLTAGE_SWING_MASK)
            | ((self.pre_emphasis << TRAIN_PRE_EMPHASIS_SHIFT) & TRAIN_PRE_EMPHASIS_MASK);
        if self.max_swing_reached {
            set |= TRAIN_MAX_SWING_REACHED;
        }
        if self.max_pre_emphasis_reached {
            set |= TRAIN_MAX_PRE_EMPHASIS_REACHED;
        }
        set
    }

    /// Decode a DPCD `TRAINING_LANEx_SET` byte
    pub const fn from_train_set(set: u8) -> Self {
        Self {
            voltage_swing: set & TRAIN_VOLTAGE_SWING_MASK,
            pre_emphasis: (set & TRAIN_PRE_EMPHASIS_MASK) >> TRAIN_PRE_EMPHASIS_SHIFT,
            max_swing_reached: set & TRAIN_MAX_SWING_REACHED != 0,
            max_pre_emphasis_reached: set & TRAIN_MAX_PRE_EMPHASIS_REACHED != 0,
        }
    }

    /// PHY register values for the current levels
    pub const fn phy_params(&self) -> PhyParams {
        phy_table::lookup(self.voltage_swing, self.pre_emphasis)
    }
}
