//! Monotonic time source for the tick clock.

use basalt_wal::{Tick, ticks_from_nanos};

#[inline(always)]
pub fn mono_now_ns() -> u64 {
    let mut ts = libc::timespec {
        tv_sec: 0,
        tv_nsec: 0,
    };
    unsafe {
        libc::clock_gettime(libc::CLOCK_MONOTONIC, &mut ts);
    }
    (ts.tv_sec as u64) * 1_000_000_000 + ts.tv_nsec as u64
}

/// Current monotonic time as a wrapping 100 µs tick.
#[inline(always)]
pub fn now_ticks() -> Tick {
    ticks_from_nanos(mono_now_ns())
}
