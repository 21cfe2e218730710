//! Testing utilities and mock implementations
//!
//! This module provides mock implementations for testing the transmitter
//! driver on the host without hardware access.
//!
//! Only available when running `cargo test`.

// Note: The #[cfg(test)] attribute is applied in lib.rs where this module is declared
#![allow(missing_docs)]
#![allow(clippy::std_instead_of_core, clippy::std_instead_of_alloc)]

extern crate std;

use core::cell::{Cell, RefCell};
use std::collections::{HashMap, VecDeque};
use std::rc::Rc;
use std::vec;
use std::vec::Vec;

use crate::dpcd::{
    ENHANCED_FRAME_CAP, INTERLANE_ALIGN_DONE, LANE_CHANNEL_EQ_DONE, LANE_COUNT_SET, LANE_CR_DONE,
    LANE_SYMBOL_LOCKED, LINK_BW_SET, LINK_STATUS_UPDATED, MAX_LANE_COUNT_MASK, TPS3_SUPPORTED,
    TRAINING_LANE0_SET, TRAINING_PATTERN_MASK, TRAINING_PATTERN_SET,
};
use crate::driver::error::{AuxError, AuxResult};
use crate::hal::aux::{AuxChannel, AuxReply, AuxRequest};
use crate::hal::mmio::RegisterBus;
use crate::internal::constants::AUX_MAX_PAYLOAD;
use crate::link::LinkRate;

// =============================================================================
// Mock Register Bus
// =============================================================================

#[derive(Debug, Default)]
struct BusState {
    registers: HashMap<usize, u32>,
    read_queues: HashMap<usize, VecDeque<u32>>,
    write_log: Vec<(usize, u32)>,
}

/// Mock register bus for testing register-level code without hardware
///
/// Clones share state, so a test can keep a handle while the driver owns
/// another. Reads pop scripted values first, then fall back to the last
/// written (or set) register value.
///
/// # Example
///
/// ```ignore
/// let bus = MockRegisterBus::new();
/// bus.set_register(TX_PHY_STATUS, 0xf);
///
/// let mut regs = TxRegs::new(bus.clone());
/// assert!(regs.phy_lanes_ready(0xf));
/// ```
#[derive(Debug, Clone, Default)]
pub struct MockRegisterBus {
    state: Rc<RefCell<BusState>>,
}

impl MockRegisterBus {
    /// Create a new mock register bus
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a register value without logging a write
    pub fn set_register(&self, offset: usize, value: u32) {
        self.state.borrow_mut().registers.insert(offset, value);
    }

    /// Get the current value of a register (for test verification)
    pub fn get_register(&self, offset: usize) -> u32 {
        self.state
            .borrow()
            .registers
            .get(&offset)
            .copied()
            .unwrap_or(0)
    }

    /// Queue values returned by successive reads of `offset`
    pub fn push_reads(&self, offset: usize, values: &[u32]) {
        self.state
            .borrow_mut()
            .read_queues
            .entry(offset)
            .or_default()
            .extend(values.iter().copied());
    }

    /// Get all writes that have been made
    pub fn writes(&self) -> Vec<(usize, u32)> {
        self.state.borrow().write_log.clone()
    }

    /// Get the values written to one register
    pub fn writes_to(&self, offset: usize) -> Vec<u32> {
        self.state
            .borrow()
            .write_log
            .iter()
            .filter(|(o, _)| *o == offset)
            .map(|(_, v)| *v)
            .collect()
    }

    /// Clear the write log
    pub fn clear_writes(&self) {
        self.state.borrow_mut().write_log.clear();
    }
}

impl RegisterBus for MockRegisterBus {
    fn read(&mut self, offset: usize) -> u32 {
        let mut state = self.state.borrow_mut();
        if let Some(value) = state
            .read_queues
            .get_mut(&offset)
            .and_then(|queue| queue.pop_front())
        {
            return value;
        }
        state.registers.get(&offset).copied().unwrap_or(0)
    }

    fn write(&mut self, offset: usize, value: u32) {
        let mut state = self.state.borrow_mut();
        state.registers.insert(offset, value);
        state.write_log.push((offset, value));
    }
}

// =============================================================================
// Mock Delay
// =============================================================================

/// Mock delay for testing without actual timing
///
/// Records delays for verification without actually waiting. Clones share
/// the same counter.
#[derive(Debug, Clone, Default)]
pub struct MockDelay {
    /// Total nanoseconds delayed
    total_ns: Rc<Cell<u64>>,
}

impl MockDelay {
    /// Create a new mock delay
    pub fn new() -> Self {
        Self::default()
    }

    /// Get total nanoseconds that were "delayed"
    pub fn total_ns(&self) -> u64 {
        self.total_ns.get()
    }

    /// Get total microseconds that were "delayed"
    pub fn total_us(&self) -> u64 {
        self.total_ns() / 1_000
    }

    /// Get total milliseconds that were "delayed"
    pub fn total_ms(&self) -> u64 {
        self.total_ns() / 1_000_000
    }

    /// Reset the delay counter
    pub fn reset(&self) {
        self.total_ns.set(0);
    }
}

impl embedded_hal::delay::DelayNs for MockDelay {
    fn delay_ns(&mut self, ns: u32) {
        self.total_ns.set(self.total_ns.get() + u64::from(ns));
    }
}

// =============================================================================
// Simulated Sink
// =============================================================================

/// How the simulated sink fills its adjust-request fields
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdjustMode {
    /// Ask for one more swing level on lanes without clock recovery
    Climb,
    /// Always ask for the given (swing, pre-emphasis)
    Fixed(u8, u8),
    /// Flip between swing 1 and 2
    Alternate,
}

const DPCD_SIZE: usize = 0x1000;

#[derive(Debug)]
struct SinkState {
    dpcd: Vec<u8>,
    cr_success_swing: Option<u8>,
    eq_lane_mask: u8,
    max_working_rate: Option<LinkRate>,
    adjust_mode: AdjustMode,
    link_status_updated: bool,
    alignment_lost: bool,
    script: VecDeque<AuxResult<AuxReply>>,
    failing_reads: Vec<(u32, AuxError)>,
    failing_writes: Vec<(u32, u8, AuxError)>,
    write_log: Vec<(u32, Vec<u8>)>,
    transactions: usize,
}

/// Simulated DisplayPort sink behind an AUX channel
///
/// Holds a DPCD image and synthesizes the link status block from the
/// training settings the source has written. By default the sink is a
/// DPCD 1.2 HBR2 x4 receiver with TPS3, enhanced framing and downspread
/// that recovers its clock and equalizes on the first try.
///
/// # Example
///
/// ```ignore
/// let sink = SimSink::new();
/// sink.set_cr_success_swing(Some(2));   // needs swing level 2
/// sink.set_eq_lane_mask(0b0001);        // only lane 0 ever equalizes
/// ```
#[derive(Debug, Clone)]
pub struct SimSink {
    state: Rc<RefCell<SinkState>>,
}

impl Default for SimSink {
    fn default() -> Self {
        Self::new()
    }
}

impl SimSink {
    /// Create a well-behaved HBR2 x4 sink
    pub fn new() -> Self {
        let mut dpcd = vec![0u8; DPCD_SIZE];
        dpcd[0x000] = 0x12;
        dpcd[0x001] = LinkRate::Hbr2.bw_code();
        dpcd[0x002] = 4 | TPS3_SUPPORTED | ENHANCED_FRAME_CAP;
        dpcd[0x003] = 0x01;
        dpcd[0x200] = 1;

        Self {
            state: Rc::new(RefCell::new(SinkState {
                dpcd,
                cr_success_swing: Some(0),
                eq_lane_mask: 0xf,
                max_working_rate: None,
                adjust_mode: AdjustMode::Climb,
                link_status_updated: false,
                alignment_lost: false,
                script: VecDeque::new(),
                failing_reads: Vec::new(),
                failing_writes: Vec::new(),
                write_log: Vec::new(),
                transactions: 0,
            })),
        }
    }

    /// Swing level at which lanes recover their clock (`None`: never)
    pub fn set_cr_success_swing(&self, swing: Option<u8>) {
        self.state.borrow_mut().cr_success_swing = swing;
    }

    /// Lanes that equalize once their clock is recovered
    pub fn set_eq_lane_mask(&self, mask: u8) {
        self.state.borrow_mut().eq_lane_mask = mask;
    }

    /// Highest rate at which the sink can recover the clock (`None`: any)
    pub fn set_max_working_rate(&self, rate: Option<LinkRate>) {
        self.state.borrow_mut().max_working_rate = rate;
    }

    /// Adjust request behavior
    pub fn set_adjust_mode(&self, mode: AdjustMode) {
        self.state.borrow_mut().adjust_mode = mode;
    }

    /// Raise or clear the link-status-updated flag
    pub fn set_link_status_updated(&self, updated: bool) {
        self.state.borrow_mut().link_status_updated = updated;
    }

    /// Report the lanes as misaligned even when every lane is equalized
    pub fn set_alignment_lost(&self, lost: bool) {
        self.state.borrow_mut().alignment_lost = lost;
    }

    /// Queue the outcome of the next transaction
    ///
    /// `Ok(AuxReply::Ack)` performs the transaction normally; any other
    /// reply or error is returned without touching the DPCD image.
    pub fn script_reply(&self, reply: AuxResult<AuxReply>) {
        self.state.borrow_mut().script.push_back(reply);
    }

    /// Fail every native read starting at `address`
    pub fn fail_reads_at(&self, address: u32, error: AuxError) {
        self.state.borrow_mut().failing_reads.push((address, error));
    }

    /// Fail every native write to `address` whose first byte is `value`
    pub fn fail_writes_of(&self, address: u32, value: u8, error: AuxError) {
        self.state
            .borrow_mut()
            .failing_writes
            .push((address, value, error));
    }

    /// Stop failing reads and writes
    pub fn clear_failures(&self) {
        let mut state = self.state.borrow_mut();
        state.failing_reads.clear();
        state.failing_writes.clear();
    }

    /// Set a DPCD byte directly
    pub fn poke(&self, address: u32, value: u8) {
        self.state.borrow_mut().dpcd[address as usize] = value;
    }

    /// Read a DPCD byte as the sink sees it
    pub fn peek(&self, address: u32) -> u8 {
        self.state.borrow().read_byte(address)
    }

    /// Number of AUX transactions submitted
    pub fn transactions(&self) -> usize {
        self.state.borrow().transactions
    }

    /// Payloads of all native writes starting at `address`
    pub fn writes_to(&self, address: u32) -> Vec<Vec<u8>> {
        self.state
            .borrow()
            .write_log
            .iter()
            .filter(|(a, _)| *a == address)
            .map(|(_, data)| data.clone())
            .collect()
    }
}

impl SinkState {
    fn lane_swing(&self, lane: usize) -> u8 {
        self.dpcd[TRAINING_LANE0_SET as usize + lane] & 0x3
    }

    fn rate_ok(&self) -> bool {
        let code = self.dpcd[LINK_BW_SET as usize];
        self.max_working_rate
            .is_none_or(|rate| code <= rate.bw_code())
    }

    fn lane_cr(&self, lane: usize) -> bool {
        self.rate_ok()
            && self
                .cr_success_swing
                .is_some_and(|swing| self.lane_swing(lane) >= swing)
    }

    fn lane_eq(&self, lane: usize) -> bool {
        let pattern = self.dpcd[TRAINING_PATTERN_SET as usize] & TRAINING_PATTERN_MASK;
        // TPS1 only trains the clock; a disabled pattern keeps the trained state
        self.lane_cr(lane) && pattern != 1 && self.eq_lane_mask & (1 << lane) != 0
    }

    fn lane_nibble(&self, lane: usize) -> u8 {
        let mut nibble = 0;
        if self.lane_cr(lane) {
            nibble |= LANE_CR_DONE;
        }
        if self.lane_eq(lane) {
            nibble |= LANE_CHANNEL_EQ_DONE | LANE_SYMBOL_LOCKED;
        }
        nibble
    }

    fn adjust_nibble(&self, lane: usize) -> u8 {
        let swing = self.lane_swing(lane);
        let (v, p) = match self.adjust_mode {
            AdjustMode::Climb if self.lane_cr(lane) => (swing, 0),
            AdjustMode::Climb => ((swing + 1).min(3), 0),
            AdjustMode::Fixed(v, p) => (v & 0x3, p & 0x3),
            AdjustMode::Alternate => (if swing == 1 { 2 } else { 1 }, 0),
        };
        v | (p << 2)
    }

    fn active_lanes(&self) -> usize {
        match self.dpcd[LANE_COUNT_SET as usize] & MAX_LANE_COUNT_MASK {
            0 => 4,
            n => (n as usize).min(4),
        }
    }

    fn read_byte(&self, address: u32) -> u8 {
        match address {
            0x202 => self.lane_nibble(0) | (self.lane_nibble(1) << 4),
            0x203 => self.lane_nibble(2) | (self.lane_nibble(3) << 4),
            0x204 => {
                let mut value = 0;
                if !self.alignment_lost && (0..self.active_lanes()).all(|lane| self.lane_eq(lane)) {
                    value |= INTERLANE_ALIGN_DONE;
                }
                if self.link_status_updated {
                    value |= LINK_STATUS_UPDATED;
                }
                value
            }
            0x206 => self.adjust_nibble(0) | (self.adjust_nibble(1) << 4),
            0x207 => self.adjust_nibble(2) | (self.adjust_nibble(3) << 4),
            a if (a as usize) < DPCD_SIZE => self.dpcd[a as usize],
            _ => 0,
        }
    }
}

impl AuxChannel for SimSink {
    fn submit(
        &mut self,
        request: AuxRequest,
        address: u32,
        buffer: &mut [u8],
    ) -> AuxResult<AuxReply> {
        let mut state = self.state.borrow_mut();
        state.transactions += 1;

        if let Some(scripted) = state.script.pop_front() {
            match scripted {
                Ok(AuxReply::Ack) => {}
                other => return other,
            }
        }

        if buffer.len() > AUX_MAX_PAYLOAD {
            return Err(AuxError::InvalidLength);
        }

        match request {
            AuxRequest::NativeWrite => {
                state.write_log.push((address, buffer.to_vec()));
                let failure = state
                    .failing_writes
                    .iter()
                    .find(|(a, v, _)| *a == address && buffer.first() == Some(v))
                    .map(|(_, _, e)| *e);
                if let Some(error) = failure {
                    return Err(error);
                }
                for (i, &byte) in buffer.iter().enumerate() {
                    let index = address as usize + i;
                    if index < DPCD_SIZE {
                        state.dpcd[index] = byte;
                    }
                }
                Ok(AuxReply::Ack)
            }
            AuxRequest::NativeRead => {
                let failure = state
                    .failing_reads
                    .iter()
                    .find(|(a, _)| *a == address)
                    .map(|(_, e)| *e);
                if let Some(error) = failure {
                    return Err(error);
                }
                for (i, byte) in buffer.iter_mut().enumerate() {
                    *byte = state.read_byte(address + i as u32);
                }
                Ok(AuxReply::Ack)
            }
            AuxRequest::I2cWrite { .. } | AuxRequest::I2cRead { .. } => Ok(AuxReply::I2cNack),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dpcd::Dpcd;
    use embedded_hal::delay::DelayNs;

    #[test]
    fn mock_bus_queues_then_registers() {
        let mut bus = MockRegisterBus::new();
        bus.set_register(0x10, 7);
        bus.push_reads(0x10, &[1, 2]);

        assert_eq!(bus.read(0x10), 1);
        assert_eq!(bus.read(0x10), 2);
        assert_eq!(bus.read(0x10), 7);

        bus.write(0x20, 9);
        assert_eq!(bus.get_register(0x20), 9);
        assert_eq!(bus.writes(), vec![(0x20, 9)]);
    }

    #[test]
    fn mock_bus_clones_share_state() {
        let bus = MockRegisterBus::new();
        let mut other = bus.clone();
        other.write(0x4, 2);

        assert_eq!(bus.get_register(0x4), 2);
        assert_eq!(bus.writes_to(0x4), vec![2]);
        bus.clear_writes();
        assert!(other.writes().is_empty());
    }

    #[test]
    fn mock_delay_tracking() {
        let delay = MockDelay::new();
        let mut handle = delay.clone();

        handle.delay_ns(1000);
        handle.delay_us(2);
        assert_eq!(delay.total_ns(), 3000);
        assert_eq!(delay.total_ms(), 0);

        handle.delay_ms(1);
        assert_eq!(delay.total_ms(), 1);
        delay.reset();
        assert_eq!(delay.total_ns(), 0);
    }

    #[test]
    fn sim_sink_reports_training_progress() {
        let mut sink = SimSink::new();
        sink.set_cr_success_swing(Some(1));

        sink.dpcd_write(0x101, &[2]).unwrap();
        sink.dpcd_write(0x102, &[0x21]).unwrap();
        sink.dpcd_write(0x103, &[0x00, 0x00]).unwrap();
        assert_eq!(sink.peek(0x202), 0x00);
        assert_eq!(sink.peek(0x206), 0x11);

        sink.dpcd_write(0x103, &[0x01, 0x01]).unwrap();
        assert_eq!(sink.peek(0x202), 0x11);

        sink.dpcd_write(0x102, &[0x22]).unwrap();
        assert_eq!(sink.peek(0x202), 0x77);
        assert_eq!(sink.peek(0x204) & INTERLANE_ALIGN_DONE, INTERLANE_ALIGN_DONE);
    }

    #[test]
    fn sim_sink_i2c_is_nacked() {
        let mut sink = SimSink::new();
        let mut buf = [0u8; 1];
        assert_eq!(
            sink.submit(AuxRequest::I2cRead { mot: false }, 0x50, &mut buf),
            Ok(AuxReply::I2cNack)
        );
    }
}
