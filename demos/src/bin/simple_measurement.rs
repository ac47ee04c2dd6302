//! # Simple Measurement
//! This example demonstrates how to use the polling driver to measure distance in a loop.
//!
//! ## Note
//!
//! Most of the hc-sr04 sensors are rated for 5V. The Raspberry Pi Pico is a 3.3V device. While some hc-sr04 tolerate to be operated on 3.3V, it is not recommended to do so. At best the sensor will have a reduced precision.
//! When operating the sensor at 5V with a 3.3V controller like the Pi Pico, the following considerations must be taken into account:
//!
//! - The trigger pin can be directly connected to the controller. 3.3V should be enough to trigger the sensor.
//! - The echo pin must be connected to the controller through a voltage divider to reduce the voltage from 5V to 3.3V. The echo pin on the hc-sr04 will output 5V when the sensor is operated at 5V and that will then damage the controller.

#![no_std]
#![no_main]

use defmt::*;
use embassy_executor::Spawner;
use embassy_rp::gpio::{Input, Level, Output, Pull};
use embassy_time::{Duration, Instant, Timer};
use pulse_echo::{
    speed_of_sound, MeasurementConfig, MeasurementResult, Now, PollingRanger, Ranging, Timeout,
    MIN_CYCLE_INTERVAL_MS,
};
use {defmt_rtt as _, panic_probe as _};

/// The temperature of the environment, if known, can be used to adjust the speed of sound.
const TEMPERATURE_CELSIUS: f64 = 24.0;

#[embassy_executor::main]
async fn main(_spawner: Spawner) {
    let p = embassy_rp::init(Default::default());
    info!("Running!");

    let trigger = Output::new(p.PIN_13, Level::Low);
    let echo = Input::new(p.PIN_28, Pull::None);

    // Create clock function that returns microseconds, wrapping at u32::MAX
    struct EmbassyClock;

    impl Now for EmbassyClock {
        fn now_micros(&self) -> u32 {
            Instant::now().as_micros() as u32
        }
    }

    let mut config = MeasurementConfig::new()
        .with_timeout(Timeout::Centimeters(300))
        .with_min_pulse_width(100);
    if let Some(divisor) = speed_of_sound::divisor_for_celsius(TEMPERATURE_CELSIUS) {
        config = config.with_speed_of_sound_divisor(divisor);
    }

    let mut sensor = match PollingRanger::new(trigger, echo, EmbassyClock, config) {
        Ok(sensor) => sensor,
        Err(e) => defmt::panic!("invalid sensor config: {}", e),
    };

    loop {
        match sensor.measure() {
            Ok(MeasurementResult::Distance(cm)) => {
                info!("Distance: {} cm", cm);
            }
            Ok(MeasurementResult::Timeout) => {
                info!("No echo, nothing in range");
            }
            Err(e) => {
                info!("Error: {:?}", e);
            }
        }
        // leave the previous burst time to die down before the next trigger
        Timer::after(Duration::from_millis(MIN_CYCLE_INTERVAL_MS as u64 * 4)).await;
    }
}
