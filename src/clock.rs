//! Free-running microsecond clock.

use core::hint::spin_loop;

/// A clock reading in microseconds. Wraps around at `u32::MAX`.
pub type Micros = u32;

pub trait Now {
    /// The time elapsed since some fixed point in microseconds.
    ///
    /// Must be monotonically non-decreasing modulo 2^32 with a resolution of
    /// at least one microsecond. Wrapping past `u32::MAX` is expected.
    fn now_micros(&self) -> Micros;
}

impl<T: Now + ?Sized> Now for &T {
    fn now_micros(&self) -> Micros {
        (**self).now_micros()
    }
}

/// Microseconds from `since` to `now`, correct across one wraparound.
#[inline]
pub fn elapsed(since: Micros, now: Micros) -> Micros {
    now.wrapping_sub(since)
}

/// Spin on the clock until at least `us` microseconds have passed.
pub(crate) fn busy_wait<C: Now + ?Sized>(clock: &C, us: Micros) {
    let start = clock.now_micros();
    while elapsed(start, clock.now_micros()) < us {
        spin_loop();
    }
}
