//! Echo pulse timing.
//!
//! [`EchoTimer::detect`] polls the echo line in a tight loop and feeds every
//! sample into an [`EchoTimerState`]. The state machine itself is a pure
//! function of `(level, timestamp)` samples, so it can be driven from a
//! script as easily as from real pins.
//!
//! ```text
//!  WaitForRise --LOW->HIGH--> Measuring --HIGH->LOW--> Validating --wide enough--> Done
//!       ^                                                  |
//!       +-------------------- too narrow (noise) ----------+
//! ```
//!
//! The deadline runs from the first poll and is not reset when a noise pulse
//! is thrown away.

use core::hint::spin_loop;

use embedded_hal::digital::{InputPin, PinState};

use crate::clock::{elapsed, Micros, Now};
use crate::config::MeasurementConfig;
use crate::error::Error;

/// Outcome of one measurement cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum MeasurementResult {
    /// A valid echo was timed; distance to the object in centimeters.
    Distance(u32),
    /// No valid echo arrived before the deadline. The object is out of range
    /// or there is none.
    Timeout,
}

impl MeasurementResult {
    pub fn centimeters(self) -> Option<u32> {
        match self {
            MeasurementResult::Distance(cm) => Some(cm),
            MeasurementResult::Timeout => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Phase {
    WaitForRise,
    Measuring,
    Validating,
    Done,
}

/// Mutable state of one in-flight measurement.
///
/// Created at the start of every [`EchoTimer::detect`] call and dropped when
/// it returns, so nothing carries over from one cycle to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EchoTimerState {
    phase: Phase,
    poll_start: Micros,
    pulse_start: Micros,
    pulse_end: Micros,
    previous: Option<PinState>,
    rejected: u32,
}

impl EchoTimerState {
    pub fn new(poll_start: Micros) -> Self {
        Self {
            phase: Phase::WaitForRise,
            poll_start,
            pulse_start: poll_start,
            pulse_end: poll_start,
            previous: None,
            rejected: 0,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// Pulses thrown away as noise so far.
    pub fn rejected(&self) -> u32 {
        self.rejected
    }

    /// Whether the deadline has passed while still waiting on the line.
    pub fn timed_out(&self, now: Micros, deadline_us: Micros) -> bool {
        matches!(self.phase, Phase::WaitForRise | Phase::Measuring)
            && elapsed(self.poll_start, now) >= deadline_us
    }

    /// Feed one sample. Returns the pulse width once a pulse of at least
    /// `min_pulse_width_us` has been seen; the state is then [`Phase::Done`].
    ///
    /// The first sample only seeds the previous level. A line that is already
    /// HIGH must fall and rise again before it counts.
    pub fn advance(
        &mut self,
        level: PinState,
        now: Micros,
        min_pulse_width_us: Micros,
    ) -> Option<Micros> {
        let Some(previous) = self.previous.replace(level) else {
            if level == PinState::High {
                warn!("echo line already high when polling started");
            }
            return None;
        };

        match (self.phase, previous, level) {
            (Phase::WaitForRise, PinState::Low, PinState::High) => {
                self.pulse_start = now;
                self.phase = Phase::Measuring;
                None
            }
            (Phase::Measuring, PinState::High, PinState::Low) => {
                self.pulse_end = now;
                self.phase = Phase::Validating;
                self.validate(min_pulse_width_us)
            }
            _ => None,
        }
    }

    fn validate(&mut self, min_pulse_width_us: Micros) -> Option<Micros> {
        let width = elapsed(self.pulse_start, self.pulse_end);
        if width >= min_pulse_width_us {
            self.phase = Phase::Done;
            Some(width)
        } else {
            self.rejected = self.rejected.saturating_add(1);
            trace!("rejected {=u32} us pulse as noise", width);
            self.phase = Phase::WaitForRise;
            None
        }
    }
}

/// Times the echo pulse that follows a trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EchoTimer {
    config: MeasurementConfig,
}

impl EchoTimer {
    pub const fn new(config: MeasurementConfig) -> Self {
        Self { config }
    }

    /// Poll `echo` until a valid pulse has been timed or the deadline passes.
    ///
    /// Blocks the caller for at most the configured deadline. Must only be
    /// called after the trigger pulse has fully completed.
    pub fn detect<P, C>(&self, echo: &mut P, clock: &C) -> Result<MeasurementResult, Error>
    where
        P: InputPin,
        C: Now + ?Sized,
    {
        let deadline_us = self.config.deadline_us();
        let min_pulse_width_us = self.config.min_pulse_width_us;
        let mut state = EchoTimerState::new(clock.now_micros());

        loop {
            let now = clock.now_micros();
            if state.timed_out(now, deadline_us) {
                debug!(
                    "no echo within {=u32} us, {=u32} pulses rejected",
                    deadline_us,
                    state.rejected()
                );
                return Ok(MeasurementResult::Timeout);
            }

            let level = PinState::from(echo.is_high().map_err(Error::echo)?);
            if let Some(width) = state.advance(level, now, min_pulse_width_us) {
                let cm = self.config.distance_cm(width);
                debug!("echo of {=u32} us, {=u32} cm", width, cm);
                return Ok(MeasurementResult::Distance(cm));
            }
            spin_loop();
        }
    }
}

/// Time one echo with `config`. See [`EchoTimer::detect`].
pub fn detect<P, C>(
    echo: &mut P,
    clock: &C,
    config: &MeasurementConfig,
) -> Result<MeasurementResult, Error>
where
    P: InputPin,
    C: Now + ?Sized,
{
    EchoTimer::new(*config).detect(echo, clock)
}
