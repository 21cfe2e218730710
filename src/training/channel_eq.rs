//! Channel equalization phase
//!
//! Transmits TPS2 (or TPS3 when both ends support it) until every active
//! lane reports equalization done and symbol lock. Training is disabled on
//! exit whatever the outcome.

use embedded_hal::delay::DelayNs;

use super::{PhaseState, TrainingIo, TrainingLimits, TrainingSession, settle_delay_us};
use crate::driver::error::{TrainingError, TrainingResult};
use crate::dpcd::status::read_link_status;
use crate::hal::aux::AuxChannel;
use crate::hal::mmio::RegisterBus;
use crate::internal::constants::EQ_DEFAULT_SETTLE_US;
use crate::internal::register::tx::TrainingPattern;

/// Channel equalization phase runner
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct ChannelEqualization {
    state: PhaseState,
    pattern: TrainingPattern,
    max_iterations: u8,
    aux_rd_interval: u8,
    iterations: u8,
}

impl ChannelEqualization {
    /// Create a runner bounded by `limits`
    ///
    /// TPS3 is used only when both `source_tps3` and `sink_tps3` are set.
    pub const fn new(
        limits: &TrainingLimits,
        source_tps3: bool,
        sink_tps3: bool,
        aux_rd_interval: u8,
    ) -> Self {
        Self {
            state: PhaseState::Idle,
            pattern: if source_tps3 && sink_tps3 {
                TrainingPattern::Pattern3
            } else {
                TrainingPattern::Pattern2
            },
            max_iterations: limits.eq_max_iterations,
            aux_rd_interval,
            iterations: 0,
        }
    }

    /// Current phase state
    pub const fn state(&self) -> PhaseState {
        self.state
    }

    /// Pattern transmitted during the phase
    pub const fn pattern(&self) -> TrainingPattern {
        self.pattern
    }

    /// Iterations performed by the last run
    pub const fn iterations(&self) -> u8 {
        self.iterations
    }

    /// Wait between programming the lanes and reading their status
    pub const fn settle_us(&self) -> u32 {
        settle_delay_us(self.aux_rd_interval, EQ_DEFAULT_SETTLE_US)
    }

    /// Run channel equalization for `session`, then disable training
    ///
    /// A failure to disable training is reported only when equalization
    /// itself succeeded.
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
        let cleanup = io.set_pattern(TrainingPattern::Disabled);

        let result = match (result, cleanup) {
            (Ok(()), Err(e)) => Err(e.into()),
            (result, _) => result,
        };
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
        io.set_pattern(self.pattern)?;

        let lanes = session.config.lane_count;
        let settle_us = self.settle_us();

        while self.iterations < self.max_iterations {
            self.iterations += 1;

            io.write_lane_settings(session)?;
            io.delay.delay_us(settle_us);
            let status = read_link_status(&mut io.dpcd())?;

            if status.all_eq_locked(lanes) {
                #[cfg(feature = "defmt")]
                defmt::debug!("channel equalization done after {} iterations", self.iterations);
                return Ok(());
            }

            session.adjust(&status);
        }

        #[cfg(feature = "defmt")]
        defmt::debug!("channel equalization failed");
        Err(TrainingError::NoChannelEqualization.into())
    }
}
