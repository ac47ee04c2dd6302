//! # pulse-echo
//!
//! A `no_std`, poll-based driver for HC-SR04 style ultrasonic distance sensors.
//!
//! The driver needs no interrupts and no async runtime: it fires the trigger
//! pulse by busy-waiting on a free-running microsecond clock, then polls the
//! echo line until a valid pulse has been timed or the deadline passes.
//! Short pulses caused by ringing on the echo line are discarded and the
//! search continues within the same deadline.
//!
//! Distances are reported in whole centimeters. A missing echo is a normal
//! outcome ([`MeasurementResult::Timeout`]), not an error.
//!
//! ## Features
//!
//! - `defmt`: log through `defmt` and derive `defmt::Format` on public types.
//!
//! # Example
//!
//! ```rust, ignore
//! #![no_std]
//! #![no_main]
//!
//! use defmt::*;
//! use embassy_executor::Spawner;
//! use embassy_rp::gpio::{Input, Level, Output, Pull};
//! use embassy_time::{Duration, Instant, Timer};
//! use pulse_echo::{MeasurementConfig, MeasurementResult, Now, PollingRanger, Ranging};
//! use {defmt_rtt as _, panic_probe as _};
//!
//! #[embassy_executor::main]
//! async fn main(_spawner: Spawner) {
//!     let p = embassy_rp::init(Default::default());
//!
//!     let trigger = Output::new(p.PIN_13, Level::Low);
//!     let echo = Input::new(p.PIN_28, Pull::None);
//!
//!     // Create clock function that returns microseconds
//!     struct EmbassyClock;
//!
//!     impl Now for EmbassyClock {
//!         fn now_micros(&self) -> u32 {
//!             Instant::now().as_micros() as u32
//!         }
//!     }
//!
//!     let mut sensor =
//!         PollingRanger::new(trigger, echo, EmbassyClock, MeasurementConfig::new()).unwrap();
//!
//!     loop {
//!         match sensor.measure() {
//!             Ok(MeasurementResult::Distance(cm)) => info!("Distance: {} cm", cm),
//!             Ok(MeasurementResult::Timeout) => info!("Nothing in range"),
//!             Err(e) => info!("Error: {:?}", e),
//!         }
//!         Timer::after(Duration::from_millis(100)).await;
//!     }
//! }
//! ```

#![cfg_attr(not(test), no_std)]

mod fmt; // must come first so the logging macros are visible below

pub mod clock;
pub mod config;
pub mod echo;
pub mod emitter;
pub mod error;
pub mod ranging;
pub mod speed_of_sound;

#[cfg(test)]
mod testing;

pub use clock::{Micros, Now};
pub use config::{
    MeasurementConfig, Timeout, TriggerTiming, DEFAULT_MIN_PULSE_WIDTH_US,
    DEFAULT_SPEED_OF_SOUND_DIVISOR, DEFAULT_TIMEOUT, MIN_CYCLE_INTERVAL_MS,
};
pub use echo::{detect, EchoTimer, EchoTimerState, MeasurementResult, Phase};
pub use emitter::PulseEmitter;
pub use error::{ConfigError, Error};
pub use ranging::{measure, PollingRanger, Ranging};
