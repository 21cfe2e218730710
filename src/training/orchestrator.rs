//! Training orchestrator
//!
//! Drives complete training attempts: select a configuration, program both
//! ends of the link, run clock recovery and channel equalization, and on
//! failure retry at the next lower rate. AUX errors and phase failures end
//! the attempt; only a PHY that never becomes ready or running out of
//! configurations ends the session.

use embedded_hal::delay::DelayNs;

use super::{ChannelEqualization, ClockRecovery, TrainingIo, TrainingLimits, TrainingSession};
use crate::driver::error::{Error, LinkError, LinkResult, TrainingResult};
use crate::dpcd::{
    Dpcd, DOWNSPREAD_CTRL, LANE_COUNT_ENHANCED_FRAME_EN, LANE_COUNT_SET, LINK_BW_SET,
    MAIN_LINK_CHANNEL_CODING_SET, SET_ANSI_8B10B, SPREAD_AMP_0_5,
};
use crate::hal::aux::AuxChannel;
use crate::hal::mmio::RegisterBus;
use crate::hal::poll::poll_until;
use crate::internal::constants::{PHY_READY_MAX_POLLS, PHY_READY_POLL_INTERVAL_US};
use crate::internal::register::tx::TrainingPattern;
use crate::link::select::select;
use crate::link::{LaneCount, LinkCapability, LinkConfig, LinkRate};

/// Orchestrator progress
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrainState {
    /// Choosing the next configuration
    #[default]
    SelectConfig,
    /// Clock recovery running
    ClockRecovery,
    /// Channel equalization running
    ChannelEqualization,
    /// Link trained
    Complete,
    /// Attempt failed, retrying at a lower rate
    Downshift,
    /// Session ended without a link
    GiveUp,
}

/// Training session driver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Orchestrator {
    limits: TrainingLimits,
    source_tps3: bool,
    phy_lanes: LaneCount,
    phy_ready_interval_us: u32,
    phy_ready_attempts: u32,
    state: TrainState,
    downshifts: u8,
}

impl Orchestrator {
    /// Create an orchestrator with default PHY ready polling
    ///
    /// `phy_lanes` is the number of lanes the transmitter PHY has; all of
    /// them must report ready after a rate change.
    pub const fn new(limits: TrainingLimits, source_tps3: bool, phy_lanes: LaneCount) -> Self {
        Self {
            limits,
            source_tps3,
            phy_lanes,
            phy_ready_interval_us: PHY_READY_POLL_INTERVAL_US,
            phy_ready_attempts: PHY_READY_MAX_POLLS,
            state: TrainState::SelectConfig,
            downshifts: 0,
        }
    }

    /// Override PHY ready polling
    pub const fn with_phy_ready_polling(mut self, interval_us: u32, attempts: u32) -> Self {
        self.phy_ready_interval_us = interval_us;
        self.phy_ready_attempts = attempts;
        self
    }

    /// Current state
    pub const fn state(&self) -> TrainState {
        self.state
    }

    /// Downshifts taken by the last session
    pub const fn downshifts(&self) -> u8 {
        self.downshifts
    }

    /// Train a link able to carry `pixel_clock_khz` at `bits_per_pixel`
    pub fn train<A, B, D>(
        &mut self,
        io: &mut TrainingIo<'_, A, B, D>,
        pixel_clock_khz: u32,
        capability: &LinkCapability,
        bits_per_pixel: u8,
    ) -> LinkResult<LinkConfig>
    where
        A: AuxChannel,
        B: RegisterBus,
        D: DelayNs,
    {
        self.downshifts = 0;
        let mut ceiling: Option<LinkRate> = None;

        loop {
            self.state = TrainState::SelectConfig;
            let config = match select(pixel_clock_khz, capability, bits_per_pixel, ceiling) {
                Ok(config) => config,
                Err(e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("link training: no configuration left for {} kHz", pixel_clock_khz);
                    self.state = TrainState::GiveUp;
                    return Err(e);
                }
            };

            #[cfg(feature = "defmt")]
            defmt::debug!("link training: trying {} x {}", config.rate, config.lane_count);

            match self.attempt(io, config, capability) {
                Ok(()) => {
                    #[cfg(feature = "defmt")]
                    defmt::info!(
                        "link trained: {} x {} after {} downshifts",
                        config.rate,
                        config.lane_count,
                        self.downshifts
                    );
                    self.state = TrainState::Complete;
                    return Ok(config);
                }
                Err(e) if e.is_recoverable() => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("link training failed at {}: {}, downshifting", config.rate, e);
                    self.state = TrainState::Downshift;
                    self.downshifts = self.downshifts.saturating_add(1);
                    ceiling = Some(config.rate);
                }
                Err(e) => {
                    #[cfg(feature = "defmt")]
                    defmt::warn!("link training aborted: {}", e);
                    self.state = TrainState::GiveUp;
                    return Err(match e {
                        Error::Link(link) => link,
                        _ => LinkError::LinkExhausted,
                    });
                }
            }
        }
    }

    fn attempt<A, B, D>(
        &mut self,
        io: &mut TrainingIo<'_, A, B, D>,
        config: LinkConfig,
        capability: &LinkCapability,
    ) -> TrainingResult<()>
    where
        A: AuxChannel,
        B: RegisterBus,
        D: DelayNs,
    {
        self.program_link(io, config, capability)?;
        self.wait_phy_ready(io)?;

        let mut session = TrainingSession::new(config);

        self.state = TrainState::ClockRecovery;
        let mut cr = ClockRecovery::new(&self.limits, capability.aux_rd_interval);
        if let Err(e) = cr.run(io, &mut session) {
            // the clock recovery failure is what gets reported
            if let Err(_cleanup) = io.set_pattern(TrainingPattern::Disabled) {
                #[cfg(feature = "defmt")]
                defmt::warn!("link training: disabling pattern after CR failure: {}", _cleanup);
            }
            return Err(e);
        }

        self.state = TrainState::ChannelEqualization;
        let mut eq = ChannelEqualization::new(
            &self.limits,
            self.source_tps3,
            capability.supports_tps3,
            capability.aux_rd_interval,
        );
        eq.run(io, &mut session)
    }

    fn program_link<A, B, D>(
        &self,
        io: &mut TrainingIo<'_, A, B, D>,
        config: LinkConfig,
        capability: &LinkCapability,
    ) -> TrainingResult<()>
    where
        A: AuxChannel,
        B: RegisterBus,
        D: DelayNs,
    {
        let mut lane_count_set = config.lane_count.count();

        io.tx.set_lane_count(config.lane_count);
        io.tx.set_enhanced_framing(capability.supports_enhanced_framing);
        if capability.supports_enhanced_framing {
            lane_count_set |= LANE_COUNT_ENHANCED_FRAME_EN;
        }

        io.tx.set_downspread(capability.supports_downspread);
        let downspread = if capability.supports_downspread {
            SPREAD_AMP_0_5
        } else {
            0
        };
        let mut dpcd = io.dpcd();
        dpcd.dpcd_writeb(DOWNSPREAD_CTRL, downspread)?;
        dpcd.dpcd_writeb(LANE_COUNT_SET, lane_count_set)?;
        dpcd.dpcd_writeb(MAIN_LINK_CHANNEL_CODING_SET, SET_ANSI_8B10B)?;
        dpcd.dpcd_writeb(LINK_BW_SET, config.rate.bw_code())?;

        io.tx.set_link_rate(config.rate);
        Ok(())
    }

    fn wait_phy_ready<A, B, D>(&self, io: &mut TrainingIo<'_, A, B, D>) -> TrainingResult<()>
    where
        A: AuxChannel,
        B: RegisterBus,
        D: DelayNs,
    {
        let mask = self.phy_lanes.ready_mask();
        let tx = &mut *io.tx;
        poll_until(
            &mut *io.delay,
            self.phy_ready_interval_us,
            self.phy_ready_attempts,
            || tx.phy_lanes_ready(mask),
        )
        .map_err(|_| Error::Link(LinkError::PhyNotReady))
    }
}

#[cfg(test)]
mod tests {
    extern crate std;

    use std::vec::Vec;

    use super::*;
    use crate::driver::error::{AuxError, AuxResult, TrainingError};
    use crate::dpcd::{TRAINING_LANE0_SET, TRAINING_PATTERN_SET};
    use crate::hal::aux::{AuxReply, AuxRequest};
    use crate::internal::register::tx::{
        TX_DOWNSPREAD_CTL, TX_ENHANCED_FRAME_EN, TX_LANE_CNT_SET, TX_LINK_BW_SET,
        TX_PHY_LANE_STRIDE, TX_PHY_POSTCURSOR_LANE_0, TX_PHY_PRECURSOR_LANE_0, TX_PHY_STATUS,
        TX_PHY_VOLTAGE_DIFF_LANE_0, TX_TRAINING_PATTERN_SET, TxRegs,
    };
    use crate::link::LaneTrainingState;
    use crate::link::phy_table::PhyParams;
    use crate::test_utils::{MockDelay, MockRegisterBus, SimSink};

    /// One TRAINING_LANEx_SET write as the sink received it
    struct LaneSetWrite {
        bw_code: u8,
        sets: Vec<u8>,
        phy: Vec<PhyParams>,
    }

    /// Sink wrapper that snapshots the local PHY drive registers whenever
    /// the lane sets are written
    struct LaneSetRecorder {
        sink: SimSink,
        bus: MockRegisterBus,
        writes: Vec<LaneSetWrite>,
    }

    impl LaneSetRecorder {
        fn new(sink: SimSink, bus: MockRegisterBus) -> Self {
            Self {
                sink,
                bus,
                writes: Vec::new(),
            }
        }

        fn phy(&self, lane: usize) -> PhyParams {
            let stride = lane * TX_PHY_LANE_STRIDE;
            PhyParams {
                voltage_swing: self.bus.get_register(TX_PHY_VOLTAGE_DIFF_LANE_0 + stride) as u8,
                pre_emphasis: self.bus.get_register(TX_PHY_PRECURSOR_LANE_0 + stride) as u8,
                post_cursor: self.bus.get_register(TX_PHY_POSTCURSOR_LANE_0 + stride) as u8,
            }
        }
    }

    impl AuxChannel for LaneSetRecorder {
        fn submit(
            &mut self,
            request: AuxRequest,
            address: u32,
            buffer: &mut [u8],
        ) -> AuxResult<AuxReply> {
            if request == AuxRequest::NativeWrite && address == TRAINING_LANE0_SET {
                let write = LaneSetWrite {
                    bw_code: self.sink.peek(LINK_BW_SET),
                    sets: buffer.to_vec(),
                    phy: (0..buffer.len()).map(|lane| self.phy(lane)).collect(),
                };
                self.writes.push(write);
            }
            self.sink.submit(request, address, buffer)
        }
    }

    fn capability() -> LinkCapability {
        LinkCapability {
            max_rate: LinkRate::Hbr2,
            max_lanes: LaneCount::Four,
            supports_tps3: true,
            supports_enhanced_framing: true,
            supports_downspread: true,
            dpcd_rev: 0x12,
            aux_rd_interval: 0,
        }
    }

    struct Rig {
        bus: MockRegisterBus,
        tx: TxRegs<MockRegisterBus>,
        delay: MockDelay,
    }

    impl Rig {
        fn new() -> Self {
            let bus = MockRegisterBus::new();
            bus.set_register(TX_PHY_STATUS, 0xf);
            Self {
                tx: TxRegs::new(bus.clone()),
                bus,
                delay: MockDelay::new(),
            }
        }

        fn train(
            &mut self,
            sink: &mut SimSink,
            orchestrator: &mut Orchestrator,
            pixel_clock_khz: u32,
        ) -> LinkResult<LinkConfig> {
            let mut io = TrainingIo::new(sink, &mut self.tx, &mut self.delay);
            orchestrator.train(&mut io, pixel_clock_khz, &capability(), 24)
        }
    }

    fn orchestrator() -> Orchestrator {
        Orchestrator::new(TrainingLimits::new(), true, LaneCount::Four)
    }

    #[test]
    fn scenario_a_picks_two_lanes_at_hbr2() {
        let mut rig = Rig::new();
        let mut sink = SimSink::new();
        let mut orch = orchestrator();

        let config = rig.train(&mut sink, &mut orch, 300_000).unwrap();

        assert_eq!(
            config,
            LinkConfig {
                rate: LinkRate::Hbr2,
                lane_count: LaneCount::Two,
                bits_per_pixel: 24,
            }
        );
        // 540 000 × 2 × 8 / 24
        assert_eq!(config.bandwidth(), 360_000);
    }

    #[test]
    fn scenario_b_cr_never_succeeds() {
        let mut rig = Rig::new();
        let mut sink = SimSink::new();
        sink.set_cr_success_swing(None);
        let mut orch = orchestrator();

        let result = rig.train(&mut sink, &mut orch, 300_000);

        assert_eq!(result, Err(LinkError::LinkExhausted));
        assert_eq!(orch.state(), TrainState::GiveUp);
        // HBR2 x2 then HBR x4; RBR x4 carries only 216 000 kHz
        assert_eq!(orch.downshifts(), 2);
        assert_eq!(
            sink.writes_to(crate::dpcd::LINK_BW_SET),
            std::vec![std::vec![0x14], std::vec![0x0a]]
        );
    }

    #[test]
    fn scenario_c_first_attempt_succeeds() {
        let mut rig = Rig::new();
        let mut sink = SimSink::new();
        let mut orch = orchestrator();

        let config = rig.train(&mut sink, &mut orch, 600_000).unwrap();

        assert_eq!(config.rate, LinkRate::Hbr2);
        assert_eq!(config.lane_count, LaneCount::Four);
        assert_eq!(orch.downshifts(), 0);
        assert_eq!(orch.state(), TrainState::Complete);
        assert_eq!(sink.writes_to(crate::dpcd::LINK_BW_SET).len(), 1);
    }

    #[test]
    fn programs_both_ends() {
        let mut rig = Rig::new();
        let mut sink = SimSink::new();
        let mut orch = orchestrator();

        rig.train(&mut sink, &mut orch, 300_000).unwrap();

        assert_eq!(sink.peek(LINK_BW_SET), 0x14);
        assert_eq!(sink.peek(LANE_COUNT_SET), 0x82);
        assert_eq!(sink.peek(DOWNSPREAD_CTRL), SPREAD_AMP_0_5);
        assert_eq!(sink.peek(MAIN_LINK_CHANNEL_CODING_SET), SET_ANSI_8B10B);
        assert_eq!(rig.bus.get_register(TX_LINK_BW_SET), 0x14);
        assert_eq!(rig.bus.get_register(TX_LANE_CNT_SET), 2);
        assert_eq!(rig.bus.get_register(TX_ENHANCED_FRAME_EN), 1);
        assert_eq!(rig.bus.get_register(TX_DOWNSPREAD_CTL), 1);
    }

    #[test]
    fn failing_rate_downshifts_to_working_rate() {
        let mut rig = Rig::new();
        let mut sink = SimSink::new();
        sink.set_max_working_rate(Some(LinkRate::Hbr));
        let mut orch = orchestrator();

        let config = rig.train(&mut sink, &mut orch, 300_000).unwrap();

        assert_eq!(config.rate, LinkRate::Hbr);
        assert_eq!(config.lane_count, LaneCount::Four);
        assert_eq!(orch.downshifts(), 1);
    }

    #[test]
    fn cr_failure_disables_training_pattern() {
        let mut rig = Rig::new();
        let mut sink = SimSink::new();
        sink.set_cr_success_swing(None);
        let mut orch = orchestrator();

        let _ = rig.train(&mut sink, &mut orch, 300_000);

        let disables = sink
            .writes_to(TRAINING_PATTERN_SET)
            .iter()
            .filter(|data| data[0] == 0)
            .count();
        assert_eq!(disables, 2);
    }

    #[test]
    fn cr_failure_reported_over_cleanup_failure() {
        let mut rig = Rig::new();
        let mut sink = SimSink::new();
        sink.set_cr_success_swing(None);
        sink.fail_writes_of(TRAINING_PATTERN_SET, 0x00, AuxError::Nack);
        let mut orch = orchestrator();
        let config = LinkConfig {
            rate: LinkRate::Hbr2,
            lane_count: LaneCount::Two,
            bits_per_pixel: 24,
        };

        let mut io = TrainingIo::new(&mut sink, &mut rig.tx, &mut rig.delay);
        let result = orch.attempt(&mut io, config, &capability());

        assert_eq!(result, Err(Error::Training(TrainingError::NoClockRecovery)));
        assert_eq!(rig.bus.get_register(TX_TRAINING_PATTERN_SET), 0);
        assert_eq!(
            sink.writes_to(TRAINING_PATTERN_SET).last(),
            Some(&std::vec![0x00])
        );

        // the session still downshifts past the failed disable
        let result = rig.train(&mut sink, &mut orch, 300_000);
        assert_eq!(result, Err(LinkError::LinkExhausted));
        assert_eq!(orch.downshifts(), 2);
    }

    #[test]
    fn aux_error_while_programming_downshifts() {
        let mut rig = Rig::new();
        let mut sink = SimSink::new();
        sink.fail_writes_of(LINK_BW_SET, 0x14, AuxError::Timeout);
        let mut orch = orchestrator();

        let config = rig.train(&mut sink, &mut orch, 300_000).unwrap();

        assert_eq!(config.rate, LinkRate::Hbr);
        assert_eq!(orch.downshifts(), 1);
    }

    #[test]
    fn phy_not_ready_is_fatal() {
        let mut rig = Rig::new();
        rig.bus.set_register(TX_PHY_STATUS, 0b0011);
        let mut sink = SimSink::new();
        let mut orch = orchestrator();

        let result = rig.train(&mut sink, &mut orch, 300_000);

        assert_eq!(result, Err(LinkError::PhyNotReady));
        assert_eq!(orch.state(), TrainState::GiveUp);
        assert_eq!(orch.downshifts(), 0);
        // 100 checks, 99 waits of 1 ms
        assert_eq!(rig.delay.total_us(), 99_000);
    }

    #[test]
    fn unreachable_clock_fails_without_programming() {
        let mut rig = Rig::new();
        let mut sink = SimSink::new();
        let mut orch = orchestrator();

        assert_eq!(
            rig.train(&mut sink, &mut orch, 800_000),
            Err(LinkError::LinkExhausted)
        );
        assert_eq!(sink.transactions(), 0);
    }

    #[test]
    fn phy_holds_drive_settings_before_sink_is_told() {
        let mut rig = Rig::new();
        let sink = SimSink::new();
        sink.set_cr_success_swing(Some(2));
        let mut recorder = LaneSetRecorder::new(sink, rig.bus.clone());
        let mut orch = orchestrator();

        let mut io = TrainingIo::new(&mut recorder, &mut rig.tx, &mut rig.delay);
        let config = orch.train(&mut io, 300_000, &capability(), 24).unwrap();
        assert_eq!(config.lane_count, LaneCount::Two);

        // swing 0, 1 and 2 during clock recovery, then equalization
        assert!(recorder.writes.len() >= 4);
        for write in &recorder.writes {
            for (lane, &set) in write.sets.iter().enumerate() {
                let expected = LaneTrainingState::from_train_set(set).phy_params();
                assert_eq!(write.phy[lane], expected, "lane {} set {:#x}", lane, set);
            }
        }
    }

    #[test]
    fn downshifted_attempt_starts_from_zero_drive() {
        let mut rig = Rig::new();
        let sink = SimSink::new();
        sink.set_max_working_rate(Some(LinkRate::Hbr));
        let mut recorder = LaneSetRecorder::new(sink, rig.bus.clone());
        let mut orch = orchestrator();

        // one lane carries 80 000 kHz at both HBR2 and HBR
        let mut io = TrainingIo::new(&mut recorder, &mut rig.tx, &mut rig.delay);
        let config = orch.train(&mut io, 80_000, &capability(), 24).unwrap();
        assert_eq!((config.rate, config.lane_count), (LinkRate::Hbr, LaneCount::One));
        assert_eq!(orch.downshifts(), 1);

        let hbr2_peak = recorder
            .writes
            .iter()
            .filter(|w| w.bw_code == LinkRate::Hbr2.bw_code())
            .map(|w| LaneTrainingState::from_train_set(w.sets[0]).voltage_swing)
            .max();
        assert_eq!(hbr2_peak, Some(3));

        let first_hbr = recorder
            .writes
            .iter()
            .find(|w| w.bw_code == LinkRate::Hbr.bw_code())
            .unwrap();
        assert_eq!(first_hbr.sets, std::vec![0x00]);
        assert_eq!(first_hbr.phy[0], LaneTrainingState::new().phy_params());
    }
}
