//! Trigger pulse generation.

use embedded_hal::digital::OutputPin;

use crate::clock::{busy_wait, Now};
use crate::config::TriggerTiming;
use crate::error::Error;

/// Drives the trigger line through LOW → HIGH → LOW.
///
/// Both waits spin on the clock instead of using a delay provider: the pulse
/// is only about 12 µs long and has to be accurate to well under a
/// microsecond. A missing or stuck sensor is not detected here, it shows up
/// as a timeout on the echo side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PulseEmitter {
    timing: TriggerTiming,
}

impl PulseEmitter {
    pub const fn new(timing: TriggerTiming) -> Self {
        Self { timing }
    }

    pub fn timing(&self) -> TriggerTiming {
        self.timing
    }

    /// Send one trigger pulse. Returns once the line is LOW again.
    pub fn emit<P, C>(&self, trigger: &mut P, clock: &C) -> Result<(), Error>
    where
        P: OutputPin,
        C: Now + ?Sized,
    {
        // a clean rising edge needs the line LOW first, whatever state it was left in
        trigger.set_low().map_err(Error::trigger)?;
        busy_wait(clock, self.timing.settle_us);

        trigger.set_high().map_err(Error::trigger)?;
        busy_wait(clock, self.timing.width_us);

        trigger.set_low().map_err(Error::trigger)?;
        trace!("trigger pulse sent");
        Ok(())
    }
}

impl Default for PulseEmitter {
    fn default() -> Self {
        Self::new(TriggerTiming::default())
    }
}
