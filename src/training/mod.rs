//! Link Training
//!
//! Training runs in two phases per attempt, clock recovery then channel
//! equalization, driven by the orchestrator which downshifts the link rate
//! when an attempt fails.
//!
//! # Modules
//!
//! - [`clock_recovery`]: TPS1 phase, adapts swing until every lane recovers
//! - [`channel_eq`]: TPS2/TPS3 phase, waits for equalization and symbol lock
//! - [`orchestrator`]: Attempt loop with rate downshift
//!
//! All per-attempt state lives in a [`TrainingSession`] owned by one
//! training call; nothing is kept between calls.

pub mod channel_eq;
pub mod clock_recovery;
pub mod orchestrator;

pub use channel_eq::ChannelEqualization;
pub use clock_recovery::ClockRecovery;
pub use orchestrator::{Orchestrator, TrainState};

use embedded_hal::delay::DelayNs;

use crate::driver::error::AuxResult;
use crate::dpcd::status::LinkStatus;
use crate::dpcd::{
    AuxRetry, Dpcd, LINK_SCRAMBLING_DISABLE, RetryingAux, TRAINING_LANE0_SET,
    TRAINING_PATTERN_SET,
};
use crate::hal::aux::AuxChannel;
use crate::hal::mmio::RegisterBus;
use crate::internal::constants::{
    AUX_RD_INTERVAL_MAX, AUX_RD_INTERVAL_UNIT_US, CR_MAX_ITERATIONS, CR_STAGNATION_LIMIT,
    EQ_MAX_ITERATIONS, MAX_PRE_EMPHASIS, MAX_VOLTAGE_SWING,
};
use crate::internal::register::tx::{TrainingPattern, TxRegs};
use crate::link::phy_table::max_valid_pre_emphasis;
use crate::link::{LaneTrainingState, LinkConfig};

/// Maximum number of main link lanes
pub const MAX_LANES: usize = 4;

// =============================================================================
// Limits
// =============================================================================

/// Iteration bounds of the training phases
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrainingLimits {
    /// Clock recovery iteration ceiling
    pub cr_max_iterations: u16,
    /// Identical lane-0 swing iterations that end clock recovery
    pub cr_stagnation_limit: u8,
    /// Channel equalization iterations
    pub eq_max_iterations: u8,
}

impl TrainingLimits {
    /// Default bounds
    pub const fn new() -> Self {
        Self {
            cr_max_iterations: CR_MAX_ITERATIONS,
            cr_stagnation_limit: CR_STAGNATION_LIMIT,
            eq_max_iterations: EQ_MAX_ITERATIONS,
        }
    }
}

impl Default for TrainingLimits {
    fn default() -> Self {
        Self::new()
    }
}

// =============================================================================
// Phase State
// =============================================================================

/// Progress of a single training phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhaseState {
    /// Not started
    #[default]
    Idle,
    /// Iterating
    Training,
    /// Succeeded
    Done,
    /// Gave up
    Failed,
}

// =============================================================================
// Session
// =============================================================================

/// Per-attempt training state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TrainingSession {
    /// Configuration being trained
    pub config: LinkConfig,
    /// Drive settings, only the first `config.lane_count` entries are used
    pub lanes: [LaneTrainingState; MAX_LANES],
    /// Lane-0 swing seen on the previous clock recovery iteration
    pub last_swing: u8,
    /// Consecutive clock recovery iterations with unchanged lane-0 swing
    pub stagnation: u8,
}

impl TrainingSession {
    /// Fresh session for `config`
    pub const fn new(config: LinkConfig) -> Self {
        Self {
            config,
            lanes: [LaneTrainingState::new(); MAX_LANES],
            last_swing: 0,
            stagnation: 0,
        }
    }

    /// Start over with `config`, zeroing all lanes
    pub fn reset(&mut self, config: LinkConfig) {
        *self = Self::new(config);
    }

    /// Number of active lanes
    pub const fn lane_count(&self) -> usize {
        self.config.lane_count.count() as usize
    }

    /// Drive settings of the active lanes
    pub fn active_lanes(&self) -> &[LaneTrainingState] {
        &self.lanes[..self.lane_count()]
    }

    /// Apply the sink's adjust requests link-wide
    ///
    /// The highest requested swing and pre-emphasis over the active lanes is
    /// applied to every lane. Pre-emphasis is clamped to what the PHY can
    /// drive at that swing.
    pub fn adjust(&mut self, status: &LinkStatus) {
        let lanes = self.lane_count();
        let (mut swing, mut pre_emphasis) = (0u8, 0u8);
        for lane in 0..lanes {
            let (v, p) = status.adjust_request(lane);
            swing = swing.max(v);
            pre_emphasis = pre_emphasis.max(p);
        }

        let swing = swing.min(MAX_VOLTAGE_SWING);
        let pre_emphasis = pre_emphasis.min(max_valid_pre_emphasis(swing));
        let adjusted = LaneTrainingState {
            voltage_swing: swing,
            pre_emphasis,
            max_swing_reached: swing >= MAX_VOLTAGE_SWING,
            max_pre_emphasis_reached: pre_emphasis >= MAX_PRE_EMPHASIS,
        };

        for lane in &mut self.lanes[..lanes] {
            *lane = adjusted;
        }
    }
}

// =============================================================================
// Hardware Access
// =============================================================================

/// Borrowed hardware used by a training attempt
///
/// Sink accesses go through [`dpcd`](Self::dpcd) so that every transaction
/// gets the `retry` budget.
pub struct TrainingIo<'a, A: AuxChannel, B: RegisterBus, D: DelayNs> {
    /// AUX channel to the sink
    pub aux: &'a mut A,
    /// Local transmitter registers
    pub tx: &'a mut TxRegs<B>,
    /// Delay provider
    pub delay: &'a mut D,
    /// Per-transaction retry budget
    pub retry: AuxRetry,
}

impl<'a, A: AuxChannel, B: RegisterBus, D: DelayNs> TrainingIo<'a, A, B, D> {
    /// Bundle borrowed hardware with the default retry budget
    pub fn new(aux: &'a mut A, tx: &'a mut TxRegs<B>, delay: &'a mut D) -> Self {
        Self {
            aux,
            tx,
            delay,
            retry: AuxRetry::new(),
        }
    }

    /// Replace the retry budget
    #[must_use]
    pub fn with_retry(mut self, retry: AuxRetry) -> Self {
        self.retry = retry;
        self
    }

    /// The sink's DPCD, with transactions retried
    pub fn dpcd(&mut self) -> RetryingAux<'_, A, D> {
        RetryingAux::new(&mut *self.aux, &mut *self.delay, self.retry)
    }

    /// Select a training pattern locally and on the sink
    ///
    /// Scrambling is disabled on both ends while a pattern is active and
    /// re-enabled when training is disabled. The local side is programmed
    /// first so it is restored even if the AUX write fails.
    pub fn set_pattern(&mut self, pattern: TrainingPattern) -> AuxResult<()> {
        let training = pattern != TrainingPattern::Disabled;
        self.tx.set_training_pattern(pattern);
        self.tx.set_scrambling_disabled(training);

        let mut value = pattern.bits();
        if training {
            value |= LINK_SCRAMBLING_DISABLE;
        }
        self.dpcd().dpcd_writeb(TRAINING_PATTERN_SET, value)
    }

    /// Program every active lane's drive settings
    ///
    /// PHY registers are written on every call, then the lane sets are
    /// written to the sink in one transfer.
    pub fn write_lane_settings(&mut self, session: &TrainingSession) -> AuxResult<()> {
        let mut sets = [0u8; MAX_LANES];
        for (lane, state) in session.active_lanes().iter().enumerate() {
            self.tx.apply_phy_params(lane, state.phy_params());
            sets[lane] = state.to_train_set();
        }
        let count = session.lane_count();
        self.dpcd().dpcd_write(TRAINING_LANE0_SET, &sets[..count])
    }
}

/// Settle delay derived from the sink's TRAINING_AUX_RD_INTERVAL
///
/// `interval × 4 ms`, capped at 16 ms; `default_us` when the sink reports 0.
pub const fn settle_delay_us(aux_rd_interval: u8, default_us: u32) -> u32 {
    if aux_rd_interval == 0 {
        return default_us;
    }
    let units = if aux_rd_interval > AUX_RD_INTERVAL_MAX {
        AUX_RD_INTERVAL_MAX
    } else {
        aux_rd_interval
    };
    units as u32 * AUX_RD_INTERVAL_UNIT_US
}
