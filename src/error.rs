//! Error types.
//!
//! A missing echo is not an error: it is reported as
//! [`MeasurementResult::Timeout`](crate::MeasurementResult::Timeout). The
//! types here cover pin I/O failures and rejected configuration.

use core::fmt;

use embedded_hal::digital::{self, ErrorKind};

/// A pin operation failed while measuring.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    /// Driving the trigger pin failed.
    Trigger(ErrorKind),
    /// Reading the echo pin failed.
    Echo(ErrorKind),
}

impl Error {
    pub(crate) fn trigger<E: digital::Error>(e: E) -> Self {
        Error::Trigger(e.kind())
    }

    pub(crate) fn echo<E: digital::Error>(e: E) -> Self {
        Error::Echo(e.kind())
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Trigger(kind) => write!(f, "trigger pin error: {:?}", kind),
            Error::Echo(kind) => write!(f, "echo pin error: {:?}", kind),
        }
    }
}

/// A [`MeasurementConfig`](crate::MeasurementConfig) failed validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// The LOW settle time before the trigger pulse is below the minimum.
    TriggerSettleTooShort { settle_us: u32 },
    /// The trigger pulse is narrower than the sensor accepts.
    TriggerWidthTooShort { width_us: u32 },
    /// The timeout budget is zero.
    ZeroTimeout,
    /// The deadline overflows or exceeds half the clock range, so elapsed
    /// time could no longer be told apart from a wraparound.
    DeadlineTooLong,
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::TriggerSettleTooShort { settle_us } => {
                write!(f, "trigger settle time of {} us is too short", settle_us)
            }
            ConfigError::TriggerWidthTooShort { width_us } => {
                write!(f, "trigger pulse of {} us is too short", width_us)
            }
            ConfigError::ZeroTimeout => write!(f, "timeout must be non-zero"),
            ConfigError::DeadlineTooLong => write!(f, "timeout exceeds the clock range"),
        }
    }
}
