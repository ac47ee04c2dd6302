//! The ranging capability: trigger, then time the echo.

use embedded_hal::digital::{InputPin, OutputPin};

use crate::clock::Now;
use crate::config::MeasurementConfig;
use crate::echo::{EchoTimer, MeasurementResult};
use crate::emitter::PulseEmitter;
use crate::error::{ConfigError, Error};

/// A way of taking one distance measurement.
///
/// Callers that are generic over `Ranging` can swap timing strategies (pure
/// polling, timer-assisted capture, a recorded trace in tests) without
/// changing. One [`emit`](Ranging::emit) must precede each
/// [`detect`](Ranging::detect); [`measure`](Ranging::measure) does both.
pub trait Ranging {
    type Error;

    /// Fire the sensor.
    fn emit(&mut self) -> Result<(), Self::Error>;

    /// Wait for and time the echo of the last emit.
    fn detect(&mut self) -> Result<MeasurementResult, Self::Error>;

    /// One full measurement cycle.
    fn measure(&mut self) -> Result<MeasurementResult, Self::Error> {
        self.emit()?;
        self.detect()
    }
}

/// The poll-based strategy: busy-wait trigger, tight-loop echo polling.
///
/// # Note
///
/// `detect` without a preceding `emit` fires the sensor first, so every
/// detection is paired with exactly one trigger pulse.
pub struct PollingRanger<TRIGPIN, ECHOPIN, CLOCK> {
    trigger: TRIGPIN,
    echo: ECHOPIN,
    clock: CLOCK,
    emitter: PulseEmitter,
    timer: EchoTimer,
    config: MeasurementConfig,
    armed: bool,
}

impl<TRIGPIN, ECHOPIN, CLOCK> PollingRanger<TRIGPIN, ECHOPIN, CLOCK>
where
    TRIGPIN: OutputPin,
    ECHOPIN: InputPin,
    CLOCK: Now,
{
    /// Initialize a new sensor.
    /// Requires trigger pin and an echo pin, measurements are taken on the echo pin.
    /// Requires a clock that will provide the time in microseconds via the `Now` trait.
    /// The config is validated here and fixed for the lifetime of the ranger.
    pub fn new(
        trigger: TRIGPIN,
        echo: ECHOPIN,
        clock: CLOCK,
        config: MeasurementConfig,
    ) -> Result<Self, ConfigError> {
        let config = config.validate()?;
        Ok(Self {
            trigger,
            echo,
            clock,
            emitter: PulseEmitter::new(config.trigger),
            timer: EchoTimer::new(config),
            config,
            armed: false,
        })
    }

    pub fn config(&self) -> &MeasurementConfig {
        &self.config
    }

    /// Give back the pins and the clock.
    pub fn release(self) -> (TRIGPIN, ECHOPIN, CLOCK) {
        (self.trigger, self.echo, self.clock)
    }
}

impl<TRIGPIN, ECHOPIN, CLOCK> Ranging for PollingRanger<TRIGPIN, ECHOPIN, CLOCK>
where
    TRIGPIN: OutputPin,
    ECHOPIN: InputPin,
    CLOCK: Now,
{
    type Error = Error;

    fn emit(&mut self) -> Result<(), Error> {
        self.armed = false;
        self.emitter.emit(&mut self.trigger, &self.clock)?;
        self.armed = true;
        Ok(())
    }

    fn detect(&mut self) -> Result<MeasurementResult, Error> {
        if !self.armed {
            self.emit()?;
        }
        self.armed = false;
        self.timer.detect(&mut self.echo, &self.clock)
    }
}

/// Take one measurement with borrowed pins.
///
/// `config` is expected to have passed [`MeasurementConfig::validate`].
pub fn measure<T, E, C>(
    trigger: &mut T,
    echo: &mut E,
    clock: &C,
    config: &MeasurementConfig,
) -> Result<MeasurementResult, Error>
where
    T: OutputPin,
    E: InputPin,
    C: Now + ?Sized,
{
    PulseEmitter::new(config.trigger).emit(trigger, clock)?;
    EchoTimer::new(*config).detect(echo, clock)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Timeout, TriggerTiming};
    use crate::testing::Bench;

    #[test]
    fn measures_the_echo_of_its_own_trigger() {
        let bench = Bench::new(0);
        bench.add_echo(450, 580);
        let mut ranger = PollingRanger::new(
            bench.trigger(),
            bench.echo(),
            bench.clock(),
            MeasurementConfig::new(),
        )
        .unwrap();

        assert_eq!(ranger.measure(), Ok(MeasurementResult::Distance(10)));
        assert_eq!(bench.triggers(), 1);
    }

    #[test]
    fn no_echo_is_a_timeout_not_an_error() {
        let bench = Bench::new(0);
        let mut ranger = PollingRanger::new(
            bench.trigger(),
            bench.echo(),
            bench.clock(),
            MeasurementConfig::new(),
        )
        .unwrap();

        assert_eq!(ranger.measure(), Ok(MeasurementResult::Timeout));
    }

    #[test]
    fn consecutive_measurements_are_identical() {
        let bench = Bench::new(0);
        bench.add_echo(300, 28);
        bench.add_echo(700, 2_320);
        let config = MeasurementConfig::new().with_min_pulse_width(100);
        let mut ranger =
            PollingRanger::new(bench.trigger(), bench.echo(), bench.clock(), config).unwrap();

        let first = ranger.measure();
        let second = ranger.measure();

        assert_eq!(first, Ok(MeasurementResult::Distance(40)));
        assert_eq!(first, second);
        assert_eq!(bench.triggers(), 2);
    }

    #[test]
    fn detect_without_emit_fires_the_sensor_first() {
        let bench = Bench::new(0);
        bench.add_echo(200, 1_160);
        let mut ranger = PollingRanger::new(
            bench.trigger(),
            bench.echo(),
            bench.clock(),
            MeasurementConfig::new(),
        )
        .unwrap();

        assert_eq!(ranger.detect(), Ok(MeasurementResult::Distance(20)));
        assert_eq!(bench.triggers(), 1);

        ranger.emit().unwrap();
        assert_eq!(ranger.detect(), Ok(MeasurementResult::Distance(20)));
        assert_eq!(bench.triggers(), 2);
    }

    #[test]
    fn rejects_an_invalid_config() {
        let bench = Bench::new(0);
        let config = MeasurementConfig::new().with_timeout(Timeout::Micros(0));

        let ranger = PollingRanger::new(bench.trigger(), bench.echo(), bench.clock(), config);

        assert!(matches!(ranger, Err(ConfigError::ZeroTimeout)));
    }

    #[test]
    fn free_function_measures_with_borrowed_pins() {
        let bench = Bench::new(u32::MAX - 200);
        bench.add_echo(150, 580);
        let config = MeasurementConfig::new().with_trigger_timing(TriggerTiming {
            settle_us: 4,
            width_us: 15,
        });
        let (mut trigger, mut echo) = (bench.trigger(), bench.echo());

        let result = measure(&mut trigger, &mut echo, &bench.clock(), &config);

        assert_eq!(result, Ok(MeasurementResult::Distance(10)));
    }

    #[test]
    fn release_returns_the_parts() {
        let bench = Bench::new(0);
        let ranger = PollingRanger::new(
            bench.trigger(),
            bench.echo(),
            bench.clock(),
            MeasurementConfig::new(),
        )
        .unwrap();
        assert_eq!(ranger.config().deadline_us(), 23_200);

        let (_trigger, _echo, clock) = ranger.release();
        assert_eq!(clock.now_micros(), 0);
    }

    /// Stand-in strategy proving callers only depend on the trait.
    struct Scripted {
        results: [MeasurementResult; 2],
        emitted: usize,
        detected: usize,
    }

    impl Ranging for Scripted {
        type Error = core::convert::Infallible;

        fn emit(&mut self) -> Result<(), Self::Error> {
            self.emitted += 1;
            Ok(())
        }

        fn detect(&mut self) -> Result<MeasurementResult, Self::Error> {
            let result = self.results[self.detected % 2];
            self.detected += 1;
            Ok(result)
        }
    }

    fn nearest<R: Ranging>(ranger: &mut R, cycles: usize) -> Option<u32> {
        (0..cycles)
            .filter_map(|_| ranger.measure().ok()?.centimeters())
            .min()
    }

    #[test]
    fn strategies_are_interchangeable() {
        let mut scripted = Scripted {
            results: [MeasurementResult::Timeout, MeasurementResult::Distance(33)],
            emitted: 0,
            detected: 0,
        };
        assert_eq!(nearest(&mut scripted, 4), Some(33));
        assert_eq!(scripted.emitted, 4);
        assert_eq!(scripted.detected, 4);

        let bench = Bench::new(0);
        bench.add_echo(500, 870);
        let mut polling = PollingRanger::new(
            bench.trigger(),
            bench.echo(),
            bench.clock(),
            MeasurementConfig::new(),
        )
        .unwrap();
        assert_eq!(nearest(&mut polling, 2), Some(15));
    }
}
