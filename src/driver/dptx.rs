//! DisplayPort Transmitter Driver
//!
//! This module provides the main driver that ties the AUX channel, the
//! transmitter registers and link training together: initialization,
//! hot-plug detection, capability discovery, training and link monitoring.

use embedded_hal::delay::DelayNs;

use super::config::{ColorFormat, DptxConfig, SUPPORTED_BPC, State};
use super::error::{ConfigError, ConfigResult, LinkError, LinkResult, Result};
use crate::dpcd::caps::read_capability;
use crate::dpcd::status::LinkStatus;
use crate::dpcd::{Dpcd, LINK_STATUS_SIZE, RetryingAux, SINK_COUNT};
use crate::hal::aux::{AuxChannel, AuxTransport, aux_clock_divider};
use crate::hal::mmio::RegisterBus;
use crate::hal::poll::poll_until;
use crate::internal::constants::CAPS_READ_ATTEMPTS;
use crate::internal::register::tx::TxRegs;
use crate::link::select::mode_valid;
use crate::link::{LinkCapability, LinkConfig};
use crate::training::{Orchestrator, TrainingIo};

/// Bytes read by the link check: SINK_COUNT through ADJUST_REQUEST_LANE2_3
const LINK_CHECK_SIZE: usize = 2 + LINK_STATUS_SIZE;

/// Result of hot-plug detection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConnectionStatus {
    /// A sink is attached and its capabilities were read
    Connected,
    /// No sink, or the sink did not answer
    Disconnected,
}

/// DisplayPort transmitter driver
///
/// Owns the AUX channel, the transmitter register window and a delay
/// provider. All operations are blocking and bounded.
///
/// # Example
///
/// ```ignore
/// let bus = unsafe { Mmio::new(DP_BASE) };
/// let mut dp = Dptx::with_bus(bus, delay, DptxConfig::new());
/// dp.init()?;
/// if dp.detect() == ConnectionStatus::Connected {
///     let link = dp.train(148_500)?;
/// }
/// ```
#[derive(Debug)]
pub struct Dptx<A: AuxChannel, B: RegisterBus, D: DelayNs> {
    aux: A,
    tx: TxRegs<B>,
    delay: D,
    config: DptxConfig,
    state: State,
    capability: Option<LinkCapability>,
    link: Option<LinkConfig>,
    pixel_clock_khz: Option<u32>,
}

impl<B, D> Dptx<AuxTransport<B, D>, B, D>
where
    B: RegisterBus + Clone,
    D: DelayNs + Clone,
{
    /// Create a driver whose AUX channel is the transmitter's own AUX engine
    pub fn with_bus(bus: B, delay: D, config: DptxConfig) -> Self {
        let aux = AuxTransport::with_polling(
            bus.clone(),
            delay.clone(),
            config.aux_poll_interval_us,
            config.aux_max_polls,
        );
        Self::new(aux, bus, delay, config)
    }
}

impl<A: AuxChannel, B: RegisterBus, D: DelayNs> Dptx<A, B, D> {
    /// Create a driver from its parts
    pub fn new(aux: A, bus: B, delay: D, config: DptxConfig) -> Self {
        Self {
            aux,
            tx: TxRegs::new(bus),
            delay,
            config,
            state: State::Uninitialized,
            capability: None,
            link: None,
            pixel_clock_khz: None,
        }
    }

    /// Validate the configuration, program the AUX clock and enable the
    /// transmitter
    pub fn init(&mut self) -> Result<()> {
        self.config.validate()?;
        let divider = aux_clock_divider(self.config.apb_clock_hz)?;

        self.tx.set_clock_divider(divider);
        self.tx.set_tx_enabled(true);
        self.state = State::Initialized;

        #[cfg(feature = "defmt")]
        defmt::info!("dptx initialized, aux divider {:#x}", divider);

        Ok(())
    }

    /// Wait for hot-plug and read the sink's capabilities
    ///
    /// Each AUX transaction gets the configured retry budget and the whole
    /// capability read is attempted twice. Any previous capability and
    /// trained link are forgotten first.
    pub fn detect(&mut self) -> ConnectionStatus {
        self.capability = None;
        self.link = None;
        if self.state != State::Uninitialized {
            self.state = State::Initialized;
        }

        let tx = &mut self.tx;
        let hpd = poll_until(
            &mut self.delay,
            self.config.hpd_poll_interval_ms.saturating_mul(1_000),
            self.config.hpd_poll_attempts,
            || tx.hpd_asserted(),
        );
        if hpd.is_err() {
            #[cfg(feature = "defmt")]
            defmt::debug!("no hot-plug detected");
            return ConnectionStatus::Disconnected;
        }

        let retry = self.config.aux_retry();
        for _attempt in 0..CAPS_READ_ATTEMPTS {
            match read_capability(
                &mut RetryingAux::new(&mut self.aux, &mut self.delay, retry),
                self.config.max_link_rate,
                self.config.phy_lanes,
            ) {
                Ok(capability) => {
                    self.capability = Some(capability);
                    self.state = State::Connected;
                    return ConnectionStatus::Connected;
                }
                Err(_e) => {
                    #[cfg(feature = "defmt")]
                    defmt::debug!("capability read attempt {} failed: {}", _attempt, _e);
                }
            }
        }

        #[cfg(feature = "defmt")]
        defmt::warn!("sink asserted hot-plug but capabilities are unreadable");
        ConnectionStatus::Disconnected
    }

    /// Current driver state
    pub fn state(&self) -> State {
        self.state
    }

    /// Driver configuration
    pub fn config(&self) -> &DptxConfig {
        &self.config
    }

    /// Capability found by the last successful [`detect`](Self::detect)
    pub fn capability(&self) -> Option<LinkCapability> {
        self.capability
    }

    /// Configuration of the currently trained link
    pub fn link_config(&self) -> Option<LinkConfig> {
        self.link
    }

    /// Whether a mode with `pixel_clock_khz` can be displayed
    pub fn mode_valid(&self, pixel_clock_khz: u32) -> bool {
        match &self.capability {
            Some(capability) => mode_valid(
                pixel_clock_khz,
                capability,
                self.config.bits_per_pixel(),
                self.config.max_pixel_clock_khz,
            ),
            None => false,
        }
    }

    /// Train the link for `pixel_clock_khz`
    ///
    /// Retries at lower rates until the link trains or no configuration is
    /// left.
    pub fn train(&mut self, pixel_clock_khz: u32) -> LinkResult<LinkConfig> {
        let capability = self.capability.ok_or(LinkError::NotConnected)?;
        self.link = None;
        self.pixel_clock_khz = Some(pixel_clock_khz);

        let mut orchestrator = Orchestrator::new(
            self.config.limits,
            self.config.source_tps3,
            self.config.phy_lanes,
        )
        .with_phy_ready_polling(
            self.config.phy_ready_interval_us,
            self.config.phy_ready_attempts,
        );

        let mut io = TrainingIo::new(&mut self.aux, &mut self.tx, &mut self.delay)
            .with_retry(self.config.aux_retry());
        let result = orchestrator.train(
            &mut io,
            pixel_clock_khz,
            &capability,
            self.config.bits_per_pixel(),
        );

        match result {
            Ok(config) => {
                self.link = Some(config);
                self.state = State::Trained;
            }
            Err(_) => self.state = State::Connected,
        }
        result
    }

    /// Whether the trained link has dropped and needs training again
    ///
    /// Reads SINK_COUNT through the adjust requests in one transfer. The
    /// link is lost when the sink flags a status change, or when any active
    /// lane lost clock recovery, equalization or symbol lock, or when the
    /// lanes are no longer aligned. Returns `false` when no link is trained.
    pub fn link_needs_retrain(&mut self) -> Result<bool> {
        let Some(link) = self.link else {
            return Ok(false);
        };

        let mut buf = [0u8; LINK_CHECK_SIZE];
        RetryingAux::new(&mut self.aux, &mut self.delay, self.config.aux_retry())
            .dpcd_read(SINK_COUNT, &mut buf)?;

        let mut raw = [0u8; LINK_STATUS_SIZE];
        raw.copy_from_slice(&buf[2..]);
        let status = LinkStatus::from_bytes(raw);

        Ok(status.link_status_updated()
            || !status.all_cr_done(link.lane_count)
            || !status.all_eq_locked(link.lane_count)
            || !status.interlane_aligned())
    }

    /// Service a hot-plug interrupt pulse
    ///
    /// Re-trains with the last requested pixel clock when the link has
    /// dropped. Returns whether training ran.
    pub fn handle_hpd_irq(&mut self) -> Result<bool> {
        if !self.link_needs_retrain()? {
            return Ok(false);
        }
        let Some(pixel_clock_khz) = self.pixel_clock_khz else {
            return Ok(false);
        };

        #[cfg(feature = "defmt")]
        defmt::info!("link lost, retraining");

        self.train(pixel_clock_khz)?;
        Ok(true)
    }

    /// Change the pixel color format
    ///
    /// Takes effect at the next training.
    pub fn set_color(&mut self, color: ColorFormat, bpc: u8) -> ConfigResult<()> {
        if !SUPPORTED_BPC.contains(&bpc) {
            return Err(ConfigError::InvalidColorDepth);
        }
        self.config.color = color;
        self.config.bpc = bpc;
        Ok(())
    }
}
