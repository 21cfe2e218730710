//! Clock recovery phase
//!
//! Transmits TPS1 and raises drive levels as the sink requests until every
//! active lane reports clock recovery done.

use embedded_hal::delay::DelayNs;

use super::{PhaseState, TrainingIo, TrainingLimits, TrainingSession, settle_delay_us};
use crate::driver::error::{TrainingError, TrainingResult};
use crate::dpcd::status::read_link_status;
use crate::hal::aux::AuxChannel;
use crate::hal::mmio::RegisterBus;
use crate::internal::constants::{CR_DEFAULT_SETTLE_US, CR_RBR_SETTLE_US};
use crate::internal::register::tx::TrainingPattern;
use crate::link::LinkRate;

/// Clock recovery phase runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ClockRecovery {
    state: PhaseState,
    max_iterations: u16,
    stagnation_limit: u8,
    aux_rd_interval: u8,
    iterations: u16,
}

impl ClockRecovery {
    /// Create a runner bounded by `limits`
    ///
    /// `aux_rd_interval` is the sink's TRAINING_AUX_RD_INTERVAL.
    pub const fn new(limits: &TrainingLimits, aux_rd_interval: u8) -> Self {
        Self {
            state: PhaseState::Idle,
            max_iterations: limits.cr_max_iterations,
            stagnation_limit: limits.cr_stagnation_limit,
            aux_rd_interval,
            iterations: 0,
        }
    }

    /// Current phase state
    pub const fn state(&self) -> PhaseState {
        self.state
    }

    /// Iterations performed by the last run
    pub const fn iterations(&self) -> u16 {
        self.iterations
    }

    /// Wait between programming the lanes and reading their status
    pub const fn settle_us(&self, rate: LinkRate) -> u32 {
        let default_us = match rate {
            LinkRate::Rbr => CR_RBR_SETTLE_US,
            _ => CR_DEFAULT_SETTLE_US,
        };
        settle_delay_us(self.aux_rd_interval, default_us)
    }

    /// Run clock recovery for `session`
    ///
    /// The session's lanes are left at the last settings tried. AUX errors
    /// are returned unchanged; the training pattern is left enabled.
    pub fn run<A, B, D>(
        &mut self,
        io: &mut TrainingIo<'_, A, B, D>,
        session: &mut TrainingSession,
    ) -> TrainingResult<()>
    where
        A: AuxChannel,
        B: RegisterBus,
        D: DelayNs,
    {
        self.state = PhaseState::Training;
        self.iterations = 0;

        let result = self.train(io, session);
        self.state = if result.is_ok() {
            PhaseState::Done
        } else {
            PhaseState::Failed
        };
        result
    }

    fn train<A, B, D>(
        &mut self,
        io: &mut TrainingIo<'_, A, B, D>,
        session: &mut TrainingSession,
    ) -> TrainingResult<()>
    where
        A: AuxChannel,
        B: RegisterBus,
        D: DelayNs,
    {
        io.set_pattern(TrainingPattern::Pattern1)?;

        let lanes = session.config.lane_count;
        let settle_us = self.settle_us(session.config.rate);

        while self.iterations < self.max_iterations {
            self.iterations += 1;

            io.write_lane_settings(session)?;
            io.delay.delay_us(settle_us);
            let status = read_link_status(&mut io.dpcd())?;

            if status.all_cr_done(lanes) {
                #[cfg(feature = "defmt")]
                defmt::debug!("clock recovery done after {} iterations", self.iterations);
                return Ok(());
            }

            let exhausted = session
                .active_lanes()
                .iter()
                .enumerate()
                .filter(|(lane, _)| !status.cr_done(*lane))
                .all(|(_, state)| state.max_swing_reached);
            if exhausted {
                #[cfg(feature = "defmt")]
                defmt::debug!("clock recovery: max swing reached");
                return Err(TrainingError::NoClockRecovery.into());
            }

            let swing = session.lanes[0].voltage_swing;
            if swing == session.last_swing {
                session.stagnation += 1;
            } else {
                session.stagnation = 0;
            }
            if session.stagnation >= self.stagnation_limit {
                #[cfg(feature = "defmt")]
                defmt::debug!("clock recovery: swing stuck at {}", swing);
                return Err(TrainingError::NoClockRecovery.into());
            }
            session.last_swing = swing;

            session.adjust(&status);

            #[cfg(feature = "defmt")]
            defmt::debug!(
                "clock recovery: swing {} pre-emphasis {}",
                session.lanes[0].voltage_swing,
                session.lanes[0].pre_emphasis
            );
        }

        Err(TrainingError::NoClockRecovery.into())
    }
}
