//! 32-bit tick clock arithmetic.
//!
//! Task scheduling and heartbeats run on a 32-bit tick counter at 100 µs
//! per tick, which wraps roughly every five days. All comparisons go
//! through signed differences so ordering survives the wrap.

/// Tick duration in microseconds.
pub const TICK_MICROS: u64 = 100;

/// A point on the 32-bit tick clock.
pub type Tick = u32;

/// Signed distance from `since` to `now`, wrap-safe.
#[inline(always)]
pub fn tick_elapsed(now: Tick, since: Tick) -> i32 {
    now.wrapping_sub(since) as i32
}

/// True when `a` is strictly earlier than `b` on the wrapping clock.
#[inline(always)]
pub fn tick_before(a: Tick, b: Tick) -> bool {
    tick_elapsed(b, a) > 0
}

/// Converts a monotonic nanosecond reading to ticks.
#[inline(always)]
pub fn ticks_from_nanos(nanos: u64) -> Tick {
    (nanos / (TICK_MICROS * 1_000)) as Tick
}
