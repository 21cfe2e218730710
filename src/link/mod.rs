//! Link configuration types
//!
//! Rates, lane counts, negotiated capabilities and the bandwidth model used
//! to pick a configuration for a requested pixel clock.
//!
//! # Modules
//!
//! - [`select`]: Link configuration selector and mode check
//! - [`phy_table`]: Swing / pre-emphasis to PHY register values
//! - [`lane`]: Per-lane drive settings

pub mod lane;
pub mod phy_table;
pub mod select;

pub use lane::LaneTrainingState;
pub use phy_table::PhyParams;
pub use select::{mode_valid, select};

/// Main link symbol rate
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkRate {
    /// Reduced bit rate, 1.62 Gb/s per lane
    Rbr,
    /// High bit rate, 2.7 Gb/s per lane
    Hbr,
    /// High bit rate 2, 5.4 Gb/s per lane
    Hbr2,
}

impl LinkRate {
    /// All rates, highest first
    pub const DESCENDING: [LinkRate; 3] = [LinkRate::Hbr2, LinkRate::Hbr, LinkRate::Rbr];

    /// DPCD bandwidth code
    pub const fn bw_code(self) -> u8 {
        match self {
            LinkRate::Rbr => 0x06,
            LinkRate::Hbr => 0x0a,
            LinkRate::Hbr2 => 0x14,
        }
    }

    /// Link rate in units of 10 kb/s per lane (bandwidth code × 27 000)
    pub const fn link_rate(self) -> u32 {
        self.bw_code() as u32 * 27_000
    }

    /// Highest supported rate not above `code`, RBR at the bottom
    pub const fn from_bw_code_floor(code: u8) -> Self {
        if code >= 0x14 {
            LinkRate::Hbr2
        } else if code >= 0x0a {
            LinkRate::Hbr
        } else {
            LinkRate::Rbr
        }
    }
}

/// Number of active main link lanes
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LaneCount {
    /// One lane
    One,
    /// Two lanes
    Two,
    /// Four lanes
    Four,
}

impl LaneCount {
    /// All lane counts, fewest first
    pub const ASCENDING: [LaneCount; 3] = [LaneCount::One, LaneCount::Two, LaneCount::Four];

    /// Number of lanes
    pub const fn count(self) -> u8 {
        match self {
            LaneCount::One => 1,
            LaneCount::Two => 2,
            LaneCount::Four => 4,
        }
    }

    /// Largest supported lane count not above `count`, one at the bottom
    pub const fn from_count_floor(count: u8) -> Self {
        if count >= 4 {
            LaneCount::Four
        } else if count >= 2 {
            LaneCount::Two
        } else {
            LaneCount::One
        }
    }

    /// PHY status ready mask covering the lanes
    pub const fn ready_mask(self) -> u32 {
        (1 << self.count()) - 1
    }
}

/// Negotiated capability of a source/sink pair
///
/// Read once when the sink is detected and not changed by training.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkCapability {
    /// Highest rate both ends support
    pub max_rate: LinkRate,
    /// Highest lane count both ends support
    pub max_lanes: LaneCount,
    /// Sink supports training pattern 3
    pub supports_tps3: bool,
    /// Sink supports enhanced framing
    pub supports_enhanced_framing: bool,
    /// Sink supports 0.5% downspread
    pub supports_downspread: bool,
    /// Sink DPCD revision
    pub dpcd_rev: u8,
    /// Sink TRAINING_AUX_RD_INTERVAL in 4 ms units (0 = default delays)
    pub aux_rd_interval: u8,
}

/// A trained (or candidate) link configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkConfig {
    /// Symbol rate
    pub rate: LinkRate,
    /// Active lanes
    pub lane_count: LaneCount,
    /// Bits per pixel carried by the link
    pub bits_per_pixel: u8,
}

impl LinkConfig {
    /// Pixel clock (kHz) this configuration can carry
    pub const fn bandwidth(&self) -> u32 {
        bandwidth(self.rate, self.lane_count, self.bits_per_pixel)
    }
}

/// Highest pixel clock (kHz) a rate and lane count can carry at `bpp`
///
/// `link_rate × lanes × 8 / bpp`; zero for a zero `bpp`.
pub const fn bandwidth(rate: LinkRate, lanes: LaneCount, bpp: u8) -> u32 {
    if bpp == 0 {
        return 0;
    }
    rate.link_rate() * lanes.count() as u32 * 8 / bpp as u32
}
