//! Configuration types for the DisplayPort transmitter driver

use crate::dpcd::AuxRetry;
use crate::driver::error::{ConfigError, ConfigResult};
use crate::internal::constants::{
    AUX_MAX_POLLS, AUX_POLL_INTERVAL_US, AUX_RETRY_ATTEMPTS, AUX_RETRY_INTERVAL_US,
    DEFAULT_APB_CLOCK_HZ, DEFAULT_BPC,
    DEFAULT_MAX_PIXEL_CLOCK_KHZ, HPD_MAX_POLLS, HPD_POLL_INTERVAL_MS, PHY_READY_MAX_POLLS,
    PHY_READY_POLL_INTERVAL_US,
};
use crate::link::{LaneCount, LinkRate};
use crate::training::TrainingLimits;

/// Bits per color component accepted by the pipeline
pub const SUPPORTED_BPC: [u8; 5] = [6, 8, 10, 12, 16];

/// Pixel color format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ColorFormat {
    /// RGB, three components
    #[default]
    Rgb,
    /// YCbCr 4:2:2, two components per pixel
    YCbCr422,
    /// YCbCr 4:4:4, three components
    YCbCr444,
    /// Luma only
    YOnly,
}

impl ColorFormat {
    /// Components transmitted per pixel
    #[must_use]
    pub const fn components(self) -> u8 {
        match self {
            ColorFormat::Rgb | ColorFormat::YCbCr444 => 3,
            ColorFormat::YCbCr422 => 2,
            ColorFormat::YOnly => 1,
        }
    }
}

/// Driver state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum State {
    /// Not initialized
    #[default]
    Uninitialized,
    /// AUX clock programmed, transmitter enabled
    Initialized,
    /// Sink detected and capabilities read
    Connected,
    /// Link trained
    Trained,
}

/// Complete transmitter configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DptxConfig {
    /// Highest rate the source PHY supports
    pub max_link_rate: LinkRate,
    /// Lanes wired to the source PHY
    pub phy_lanes: LaneCount,
    /// Pixel color format
    pub color: ColorFormat,
    /// Bits per color component
    pub bpc: u8,
    /// Source can transmit training pattern 3
    pub source_tps3: bool,
    /// APB clock feeding the AUX clock divider in Hz
    pub apb_clock_hz: u32,
    /// Highest pixel clock the source pipeline can drive in kHz
    pub max_pixel_clock_khz: u32,
    /// Training phase iteration bounds
    pub limits: TrainingLimits,
    /// Interval between AUX reply checks in microseconds
    pub aux_poll_interval_us: u32,
    /// Number of AUX reply checks
    pub aux_max_polls: u32,
    /// Wait between retries of a deferred or failed DPCD transaction in
    /// microseconds
    pub aux_retry_interval_us: u32,
    /// Submissions of one DPCD transaction before giving up
    pub aux_retry_attempts: u32,
    /// Interval between PHY ready checks in microseconds
    pub phy_ready_interval_us: u32,
    /// Number of PHY ready checks
    pub phy_ready_attempts: u32,
    /// Interval between hot-plug checks in milliseconds
    pub hpd_poll_interval_ms: u32,
    /// Number of hot-plug checks
    pub hpd_poll_attempts: u32,
}

impl Default for DptxConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl DptxConfig {
    /// Create a new configuration with defaults
    #[must_use]
    pub const fn new() -> Self {
        Self {
            max_link_rate: LinkRate::Hbr2,
            phy_lanes: LaneCount::Four,
            color: ColorFormat::Rgb,
            bpc: DEFAULT_BPC,
            source_tps3: true,
            apb_clock_hz: DEFAULT_APB_CLOCK_HZ,
            max_pixel_clock_khz: DEFAULT_MAX_PIXEL_CLOCK_KHZ,
            limits: TrainingLimits::new(),
            aux_poll_interval_us: AUX_POLL_INTERVAL_US,
            aux_max_polls: AUX_MAX_POLLS,
            aux_retry_interval_us: AUX_RETRY_INTERVAL_US,
            aux_retry_attempts: AUX_RETRY_ATTEMPTS,
            phy_ready_interval_us: PHY_READY_POLL_INTERVAL_US,
            phy_ready_attempts: PHY_READY_MAX_POLLS,
            hpd_poll_interval_ms: HPD_POLL_INTERVAL_MS,
            hpd_poll_attempts: HPD_MAX_POLLS,
        }
    }

    /// Set the highest source link rate
    #[must_use]
    pub const fn with_max_link_rate(mut self, rate: LinkRate) -> Self {
        self.max_link_rate = rate;
        self
    }

    /// Set the number of PHY lanes
    #[must_use]
    pub const fn with_phy_lanes(mut self, lanes: LaneCount) -> Self {
        self.phy_lanes = lanes;
        self
    }

    /// Set the color format and bits per component
    #[must_use]
    pub const fn with_color(mut self, color: ColorFormat, bpc: u8) -> Self {
        self.color = color;
        self.bpc = bpc;
        self
    }

    /// Enable or disable training pattern 3 on the source
    #[must_use]
    pub const fn with_source_tps3(mut self, enabled: bool) -> Self {
        self.source_tps3 = enabled;
        self
    }

    /// Set the APB clock frequency
    #[must_use]
    pub const fn with_apb_clock_hz(mut self, hz: u32) -> Self {
        self.apb_clock_hz = hz;
        self
    }

    /// Set the source pixel clock ceiling
    #[must_use]
    pub const fn with_max_pixel_clock_khz(mut self, khz: u32) -> Self {
        self.max_pixel_clock_khz = khz;
        self
    }

    /// Set the training iteration bounds
    #[must_use]
    pub const fn with_limits(mut self, limits: TrainingLimits) -> Self {
        self.limits = limits;
        self
    }

    /// Set AUX reply polling
    #[must_use]
    pub const fn with_aux_polling(mut self, interval_us: u32, polls: u32) -> Self {
        self.aux_poll_interval_us = interval_us;
        self.aux_max_polls = polls;
        self
    }

    /// Set the DPCD transaction retry budget
    #[must_use]
    pub const fn with_aux_retry(mut self, interval_us: u32, attempts: u32) -> Self {
        self.aux_retry_interval_us = interval_us;
        self.aux_retry_attempts = attempts;
        self
    }

    /// Set PHY ready polling
    #[must_use]
    pub const fn with_phy_ready_polling(mut self, interval_us: u32, attempts: u32) -> Self {
        self.phy_ready_interval_us = interval_us;
        self.phy_ready_attempts = attempts;
        self
    }

    /// Set hot-plug polling
    #[must_use]
    pub const fn with_hpd_polling(mut self, interval_ms: u32, attempts: u32) -> Self {
        self.hpd_poll_interval_ms = interval_ms;
        self.hpd_poll_attempts = attempts;
        self
    }

    /// Bits per pixel on the link
    #[must_use]
    pub const fn bits_per_pixel(&self) -> u8 {
        self.bpc.saturating_mul(self.color.components())
    }

    /// DPCD transaction retry budget
    #[must_use]
    pub const fn aux_retry(&self) -> AuxRetry {
        AuxRetry {
            interval_us: self.aux_retry_interval_us,
            attempts: self.aux_retry_attempts,
        }
    }

    /// Check the configuration for values the driver cannot work with
    pub fn validate(&self) -> ConfigResult<()> {
        if !SUPPORTED_BPC.contains(&self.bpc) {
            return Err(ConfigError::InvalidColorDepth);
        }
        if self.aux_max_polls == 0
            || self.aux_retry_attempts == 0
            || self.phy_ready_attempts == 0
            || self.hpd_poll_attempts == 0
            || self.limits.cr_max_iterations == 0
            || self.limits.cr_stagnation_limit == 0
            || self.limits.eq_max_iterations == 0
        {
            return Err(ConfigError::InvalidConfig);
        }
        if self.max_pixel_clock_khz == 0 {
            return Err(ConfigError::InvalidConfig);
        }
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
