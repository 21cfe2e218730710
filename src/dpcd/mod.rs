//! DisplayPort Configuration Data (DPCD)
//!
//! Register map of the sink's DPCD address space as used by link training,
//! plus typed access over an [`AuxChannel`](crate::hal::aux::AuxChannel).
//!
//! # Modules
//!
//! - [`access`]: Chunked read/write helpers mapping AUX replies to errors,
//!   and the bounded transaction retry
//! - [`caps`]: Receiver capability block decoding
//! - [`status`]: Lane status / adjust request decoding

pub mod access;
pub mod caps;
pub mod status;

pub use access::{AuxRetry, Dpcd, RetryingAux};
pub use caps::{parse_capability, read_capability};
pub use status::{LinkStatus, read_link_status};

// =============================================================================
// Receiver Capability
// =============================================================================

/// DPCD revision
pub const DPCD_REV: u32 = 0x000;
/// Maximum link rate (bandwidth code)
pub const MAX_LINK_RATE: u32 = 0x001;
/// Maximum lane count and capability flags
pub const MAX_LANE_COUNT: u32 = 0x002;
/// Lane count field of MAX_LANE_COUNT
pub const MAX_LANE_COUNT_MASK: u8 = 0x1f;
/// Training pattern 3 supported
pub const TPS3_SUPPORTED: u8 = 1 << 6;
/// Enhanced framing supported
pub const ENHANCED_FRAME_CAP: u8 = 1 << 7;
/// Maximum downspread
pub const MAX_DOWNSPREAD: u32 = 0x003;
/// 0.5% downspread supported
pub const MAX_DOWNSPREAD_0_5: u8 = 1 << 0;
/// Training AUX read interval
pub const TRAINING_AUX_RD_INTERVAL: u32 = 0x00e;
/// Interval field of TRAINING_AUX_RD_INTERVAL
pub const TRAINING_AUX_RD_INTERVAL_MASK: u8 = 0x7f;
/// Size of the receiver capability block read at detection
pub const RECEIVER_CAP_SIZE: usize = 0xf;
/// First DPCD revision that may advertise TPS3 (1.2)
pub const DPCD_REV_12: u8 = 0x12;

// =============================================================================
// Link Configuration
// =============================================================================

/// Link bandwidth set
pub const LINK_BW_SET: u32 = 0x100;
/// Lane count set
pub const LANE_COUNT_SET: u32 = 0x101;
/// Enhanced framing enable in LANE_COUNT_SET
pub const LANE_COUNT_ENHANCED_FRAME_EN: u8 = 1 << 7;
/// Training pattern set
pub const TRAINING_PATTERN_SET: u32 = 0x102;
/// Training pattern field of TRAINING_PATTERN_SET
pub const TRAINING_PATTERN_MASK: u8 = 0x3;
/// Scrambling disable in TRAINING_PATTERN_SET
pub const LINK_SCRAMBLING_DISABLE: u8 = 1 << 5;
/// Training settings of lane 0; lanes 1..3 follow
pub const TRAINING_LANE0_SET: u32 = 0x103;
/// Downspread control
pub const DOWNSPREAD_CTRL: u32 = 0x107;
/// 0.5% downspread amplitude
pub const SPREAD_AMP_0_5: u8 = 1 << 4;
/// Main link channel coding set
pub const MAIN_LINK_CHANNEL_CODING_SET: u32 = 0x108;
/// ANSI 8B/10B channel coding
pub const SET_ANSI_8B10B: u8 = 1 << 0;

/// Voltage swing field of TRAINING_LANEx_SET
pub const TRAIN_VOLTAGE_SWING_MASK: u8 = 0x3;
/// Maximum swing reached flag of TRAINING_LANEx_SET
pub const TRAIN_MAX_SWING_REACHED: u8 = 1 << 2;
/// Pre-emphasis field shift of TRAINING_LANEx_SET
pub const TRAIN_PRE_EMPHASIS_SHIFT: u8 = 3;
/// Pre-emphasis field of TRAINING_LANEx_SET
pub const TRAIN_PRE_EMPHASIS_MASK: u8 = 0x3 << TRAIN_PRE_EMPHASIS_SHIFT;
/// Maximum pre-emphasis reached flag of TRAINING_LANEx_SET
pub const TRAIN_MAX_PRE_EMPHASIS_REACHED: u8 = 1 << 5;

// =============================================================================
// Link / Sink Status
// =============================================================================

/// Sink count
pub const SINK_COUNT: u32 = 0x200;
/// Status of lanes 0 and 1
pub const LANE0_1_STATUS: u32 = 0x202;
/// Status of lanes 2 and 3
pub const LANE2_3_STATUS: u32 = 0x203;
/// Interlane alignment and status-updated flags
pub const LANE_ALIGN_STATUS_UPDATED: u32 = 0x204;
/// Interlane alignment done
pub const INTERLANE_ALIGN_DONE: u8 = 1 << 0;
/// Link status changed since last read
pub const LINK_STATUS_UPDATED: u8 = 1 << 7;
/// Adjust request for lanes 0 and 1
pub const ADJUST_REQUEST_LANE0_1: u32 = 0x206;
/// Adjust request for lanes 2 and 3
pub const ADJUST_REQUEST_LANE2_3: u32 = 0x207;
/// Size of the link status block starting at LANE0_1_STATUS
pub const LINK_STATUS_SIZE: usize = 6;

/// Clock recovery done (lane nibble)
pub const LANE_CR_DONE: u8 = 1 << 0;
/// Channel equalization done (lane nibble)
pub const LANE_CHANNEL_EQ_DONE: u8 = 1 << 1;
/// Symbol locked (lane nibble)
pub const LANE_SYMBOL_LOCKED: u8 = 1 << 2;

/// Requested voltage swing field of an adjust request nibble
pub const ADJUST_VOLTAGE_SWING_MASK: u8 = 0x3;
/// Requested pre-emphasis field shift of an adjust request nibble
pub const ADJUST_PRE_EMPHASIS_SHIFT: u8 = 2;
