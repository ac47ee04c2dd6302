//! Measurement configuration.
//!
//! Every timing constant a measurement needs lives in [`MeasurementConfig`].
//! Build one per sensor, run [`MeasurementConfig::validate`] once, then hand
//! it to the driver. The measurement core trusts a validated config and never
//! re-checks it.

use core::num::NonZeroU32;

use crate::clock::Micros;
use crate::error::ConfigError;

/// Shortest LOW period allowed before the trigger pulse.
pub const MIN_TRIGGER_SETTLE_US: u32 = 2;

/// Shortest trigger pulse the HC-SR04 datasheet accepts.
pub const MIN_TRIGGER_WIDTH_US: u32 = 10;

/// Default echo width below which a pulse is treated as line noise.
pub const DEFAULT_MIN_PULSE_WIDTH_US: u32 = 10;

/// Default one-way range limit; the sensor is rated to roughly 4 m.
pub const DEFAULT_TIMEOUT: Timeout = Timeout::Centimeters(400);

/// Microseconds per centimeter of one-way travel at about 20 °C.
pub const DEFAULT_SPEED_OF_SOUND_DIVISOR: NonZeroU32 = match NonZeroU32::new(29) {
    Some(divisor) => divisor,
    None => panic!("divisor must be non-zero"),
};

/// Minimum spacing between two measurement cycles, in milliseconds.
///
/// Residual echoes from one burst can be picked up by the next one if the
/// sensor is re-triggered sooner.
pub const MIN_CYCLE_INTERVAL_MS: u32 = 29;

/// Longest deadline accepted. Half the clock range keeps wrapping
/// subtraction unambiguous.
pub const MAX_DEADLINE_US: Micros = u32::MAX / 2;

/// How long to wait for an echo before giving up.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Timeout {
    /// Give up once an echo from this one-way distance would have returned.
    Centimeters(u32),
    /// Give up after this many microseconds of polling.
    Micros(u32),
}

impl Timeout {
    /// The polling deadline in microseconds, or `None` on overflow.
    ///
    /// A one-way distance becomes `cm * 2 * divisor` microseconds of round
    /// trip.
    pub fn deadline_us(self, speed_of_sound_divisor: NonZeroU32) -> Option<Micros> {
        match self {
            Timeout::Centimeters(cm) => cm
                .checked_mul(2)?
                .checked_mul(speed_of_sound_divisor.get()),
            Timeout::Micros(us) => Some(us),
        }
    }
}

/// Shape of the trigger pulse.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TriggerTiming {
    /// LOW time before the pulse, guarantees a clean rising edge.
    pub settle_us: u32,
    /// HIGH time of the pulse itself.
    pub width_us: u32,
}

impl Default for TriggerTiming {
    fn default() -> Self {
        Self {
            settle_us: MIN_TRIGGER_SETTLE_US,
            width_us: MIN_TRIGGER_WIDTH_US,
        }
    }
}

/// The configuration for one sensor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct MeasurementConfig {
    pub trigger: TriggerTiming,
    /// Echo pulses narrower than this are discarded and polling resumes.
    pub min_pulse_width_us: u32,
    pub timeout: Timeout,
    /// Microseconds per centimeter of one-way travel. The round-trip echo
    /// width is divided by this and then by two.
    pub speed_of_sound_divisor: NonZeroU32,
}

impl Default for MeasurementConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl MeasurementConfig {
    /// Datasheet defaults: 2 µs settle, 10 µs trigger, 10 µs noise floor,
    /// 400 cm range and a divisor of 29.
    pub const fn new() -> Self {
        Self {
            trigger: TriggerTiming {
                settle_us: MIN_TRIGGER_SETTLE_US,
                width_us: MIN_TRIGGER_WIDTH_US,
            },
            min_pulse_width_us: DEFAULT_MIN_PULSE_WIDTH_US,
            timeout: DEFAULT_TIMEOUT,
            speed_of_sound_divisor: DEFAULT_SPEED_OF_SOUND_DIVISOR,
        }
    }

    pub const fn with_trigger_timing(mut self, trigger: TriggerTiming) -> Self {
        self.trigger = trigger;
        self
    }

    pub const fn with_min_pulse_width(mut self, min_pulse_width_us: u32) -> Self {
        self.min_pulse_width_us = min_pulse_width_us;
        self
    }

    pub const fn with_timeout(mut self, timeout: Timeout) -> Self {
        self.timeout = timeout;
        self
    }

    pub const fn with_speed_of_sound_divisor(mut self, divisor: NonZeroU32) -> Self {
        self.speed_of_sound_divisor = divisor;
        self
    }

    /// Check the configuration and hand it back if it is usable.
    pub fn validate(self) -> Result<Self, ConfigError> {
        if self.trigger.settle_us < MIN_TRIGGER_SETTLE_US {
            return Err(ConfigError::TriggerSettleTooShort {
                settle_us: self.trigger.settle_us,
            });
        }
        if self.trigger.width_us < MIN_TRIGGER_WIDTH_US {
            return Err(ConfigError::TriggerWidthTooShort {
                width_us: self.trigger.width_us,
            });
        }
        match self.timeout.deadline_us(self.speed_of_sound_divisor) {
            Some(0) => Err(ConfigError::ZeroTimeout),
            Some(deadline) if deadline <= MAX_DEADLINE_US => Ok(self),
            _ => Err(ConfigError::DeadlineTooLong),
        }
    }

    /// Polling deadline in microseconds. Saturates for configs that would
    /// not pass [`validate`](Self::validate).
    pub fn deadline_us(&self) -> Micros {
        self.timeout
            .deadline_us(self.speed_of_sound_divisor)
            .map_or(MAX_DEADLINE_US, |deadline| deadline.min(MAX_DEADLINE_US))
    }

    /// Convert a round-trip echo width to one-way centimeters, truncating.
    pub fn distance_cm(&self, echo_width_us: Micros) -> u32 {
        echo_width_us / self.speed_of_sound_divisor.get() / 2
    }
}
