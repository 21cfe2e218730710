//! Error types for the DisplayPort transmitter driver
//!
//! Errors are organized by domain for better diagnostics:
//! - [`AuxError`]: AUX channel transaction failures
//! - [`TrainingError`]: A training phase failed at the current link rate
//! - [`LinkError`]: Fatal outcomes of a training session
//! - [`ConfigError`]: Invalid driver configuration
//!
//! The unified [`Error`] enum wraps all domain errors. [`Error::is_recoverable`]
//! tells the training orchestrator whether a failure is answered with a rate
//! downshift or ends the session.

// =============================================================================
// AUX Errors
// =============================================================================

/// AUX channel transaction errors
///
/// Raised by the AUX transport. The transport never retries on its own;
/// [`crate::dpcd::RetryingAux`] resubmits transactions that failed with a
/// transient error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AuxError {
    /// A request was already in flight when a new one was submitted
    Busy,
    /// No reply arrived within the polling budget
    Timeout,
    /// The AUX engine flagged a reply timeout
    ReplyTimeout,
    /// The sink returned fewer bytes than requested
    ShortRead,
    /// The sink answered with NACK
    Nack,
    /// The sink answered with DEFER
    Defer,
    /// Payload longer than a single AUX transaction can carry
    InvalidLength,
}

impl core::fmt::Display for AuxError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl AuxError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            AuxError::Busy => "aux request already pending",
            AuxError::Timeout => "aux reply timed out",
            AuxError::ReplyTimeout => "aux reply timeout flagged by hardware",
            AuxError::ShortRead => "aux short read",
            AuxError::Nack => "aux request not acknowledged",
            AuxError::Defer => "aux request deferred",
            AuxError::InvalidLength => "invalid aux payload length",
        }
    }

    /// Whether the same transaction may succeed if submitted again
    ///
    /// NACK and an oversized payload are answers, not glitches.
    #[must_use]
    pub const fn is_transient(&self) -> bool {
        !matches!(self, AuxError::Nack | AuxError::InvalidLength)
    }
}

// =============================================================================
// Training Errors
// =============================================================================

/// Training phase failures
///
/// Both are recoverable: the orchestrator answers them with a downshift.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TrainingError {
    /// Clock recovery exhausted its adaptation space or stagnated
    NoClockRecovery,
    /// Channel equalization did not lock all lanes within its iteration bound
    NoChannelEqualization,
}

impl core::fmt::Display for TrainingError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TrainingError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            TrainingError::NoClockRecovery => "clock recovery failed",
            TrainingError::NoChannelEqualization => "channel equalization failed",
        }
    }
}

// =============================================================================
// Link Errors
// =============================================================================

/// Fatal training session outcomes
///
/// These are the only errors [`crate::Dptx::train`] reports to its caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum LinkError {
    /// The local PHY never reported ready after a rate/lane change
    PhyNotReady,
    /// No rate/lane pair at or below the current ceiling carries the mode
    LinkExhausted,
    /// No sink capability is known (no sink detected)
    NotConnected,
}

impl core::fmt::Display for LinkError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl LinkError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            LinkError::PhyNotReady => "PHY not ready",
            LinkError::LinkExhausted => "no link configuration left",
            LinkError::NotConnected => "no sink connected",
        }
    }
}

// =============================================================================
// Configuration Errors
// =============================================================================

/// Configuration errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Invalid configuration parameter
    InvalidConfig,
    /// Bits per component not supported
    InvalidColorDepth,
    /// APB clock cannot produce a valid AUX clock
    InvalidClock,
}

impl core::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl ConfigError {
    /// Returns a human-readable description of the error
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            ConfigError::InvalidConfig => "invalid configuration",
            ConfigError::InvalidColorDepth => "unsupported bits per component",
            ConfigError::InvalidClock => "invalid AUX clock configuration",
        }
    }
}

// =============================================================================
// Unified Error Type
// =============================================================================

/// This enum wraps all domain-specific errors for unified error handling.
///
/// ```ignore
/// match result {
///     Err(Error::Aux(AuxError::Timeout)) => { /* ... */ }
///     Err(Error::Training(TrainingError::NoClockRecovery)) => { /* ... */ }
///     Err(Error::Link(LinkError::PhyNotReady)) => { /* ... */ }
///     _ => {}
/// }
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// AUX channel error
    Aux(AuxError),
    /// Training phase error
    Training(TrainingError),
    /// Fatal link error
    Link(LinkError),
    /// Configuration error
    Config(ConfigError),
}

impl Error {
    /// Whether a training attempt failing with this error may be retried at
    /// a lower link rate.
    ///
    /// AUX failures and phase failures are treated as "this attempt failed".
    pub const fn is_recoverable(&self) -> bool {
        matches!(self, Error::Aux(_) | Error::Training(_))
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::Aux(e) => write!(f, "aux: {}", e.as_str()),
            Error::Training(e) => write!(f, "training: {}", e.as_str()),
            Error::Link(e) => write!(f, "link: {}", e.as_str()),
            Error::Config(e) => write!(f, "config: {}", e.as_str()),
        }
    }
}

impl From<AuxError> for Error {
    fn from(e: AuxError) -> Self {
        Error::Aux(e)
    }
}

impl From<TrainingError> for Error {
    fn from(e: TrainingError) -> Self {
        Error::Training(e)
    }
}

impl From<LinkError> for Error {
    fn from(e: LinkError) -> Self {
        Error::Link(e)
    }
}

impl From<ConfigError> for Error {
    fn from(e: ConfigError) -> Self {
        Error::Config(e)
    }
}

/// Result type alias for driver operations
pub type Result<T> = core::result::Result<T, Error>;

/// Result type alias for AUX transactions
pub type AuxResult<T> = core::result::Result<T, AuxError>;

/// Result type alias for a single training phase
pub type TrainingResult<T> = core::result::Result<T, Error>;

/// Result type alias for a complete training session
pub type LinkResult<T> = core::result::Result<T, LinkError>;

/// Result type alias for configuration operations
pub type ConfigResult<T> = core::result::Result<T, ConfigError>;

// =============================================================================
// Unit Tests
// =============================================================================
