//! Temperature-adjusted speed of sound.
//!
//! The default divisor of 29 µs/cm assumes air at roughly 20 °C. If the
//! ambient temperature is known these helpers give a better divisor to put
//! into [`MeasurementConfig`](crate::MeasurementConfig).

use core::num::NonZeroU32;

use libm::{round, sqrt};

/// Speed of sound in dry air in meters per second.
pub fn meters_per_second(celsius: f64) -> f64 {
    331.5 * sqrt(1.0 + (celsius / 273.15))
}

/// Microseconds per centimeter of one-way travel at `celsius`, rounded to
/// the nearest integer. `None` below absolute zero.
pub fn divisor_for_celsius(celsius: f64) -> Option<NonZeroU32> {
    let speed = meters_per_second(celsius);
    if speed.is_nan() || speed <= 0.0 {
        return None;
    }
    // 1 s / (speed m/s * 100 cm/m) expressed in microseconds
    let us_per_cm = 10_000.0 / speed;
    NonZeroU32::new(round(us_per_cm) as u32)
}

/// Same as [`divisor_for_celsius`] for a Fahrenheit reading.
pub fn divisor_for_fahrenheit(fahrenheit: f64) -> Option<NonZeroU32> {
    divisor_for_celsius((fahrenheit - 32.0) * 5.0 / 9.0)
}
