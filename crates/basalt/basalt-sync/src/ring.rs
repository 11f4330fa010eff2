//! SPSC FIFO ring: every pushed item is delivered in order, nothing is
//! overwritten.
//!
//! `CAP` is a compile-time power of two; one slot stays empty as the
//! full/empty sentinel, so `CAP - 1` items fit. Indices are masked
//! positions: the producer owns `head` (next slot to fill), the consumer
//! owns `tail` (next slot to drain). The release store of `head` publishes
//! an item; the release store of `tail` returns a slot to the producer.
//! Both operations are wait-free with no loops and no CAS.

use crate::layout::CacheAligned;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

#[repr(C)]
struct RingCore<T, const CAP: usize> {
    // head and tail each on their own cache line; the CacheAligned size
    // rounding also keeps buf[0] off tail's line.
    head: CacheAligned<AtomicUsize>,
    tail: CacheAligned<AtomicUsize>,
    buf: CacheAligned<[UnsafeCell<MaybeUninit<T>>; CAP]>,
}

// SAFETY: the producer writes only slot `head` before publishing it and the
// consumer reads only slot `tail` before releasing it; the release/acquire
// pairs on head and tail order slot reuse.
unsafe impl<T: Copy + Send, const CAP: usize> Sync for RingCore<T, CAP> {}

/// Owner of the slot array and both indices.
pub struct SpscRing<T: Copy, const CAP: usize> {
    core: Arc<RingCore<T, CAP>>,
}

impl<T: Copy, const CAP: usize> SpscRing<T, CAP> {
    /// Creates an empty ring.
    pub fn new() -> Self {
        const {
            assert!(
                CAP >= 2 && CAP.is_power_of_two(),
                "ring capacity must be a power of two and >= 2"
            );
        }

        Self {
            core: Arc::new(RingCore {
                head: CacheAligned::new(AtomicUsize::new(0)),
                tail: CacheAligned::new(AtomicUsize::new(0)),
                buf: CacheAligned::new(std::array::from_fn(|_| {
                    UnsafeCell::new(MaybeUninit::uninit())
                })),
            }),
        }
    }

    /// Splits into the single producer and single consumer handle.
    pub fn split(self) -> (RingWriter<T, CAP>, RingReader<T, CAP>) {
        let reader = RingReader {
            core: Arc::clone(&self.core),
        };
        (RingWriter { core: self.core }, reader)
    }

    /// Items the ring can hold at once: `CAP - 1` (one sentinel slot).
    pub const fn usable_capacity() -> usize {
        CAP - 1
    }
}

impl<T: Copy, const CAP: usize> Default for SpscRing<T, CAP> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle. Exactly one exists per ring.
pub struct RingWriter<T: Copy, const CAP: usize> {
    core: Arc<RingCore<T, CAP>>,
}

impl<T: Copy, const CAP: usize> RingWriter<T, CAP> {
    /// Enqueues `item`. Returns `false` without touching anything when the
    /// ring is full.
    ///
    /// `head` is loaded relaxed (producer-owned); `tail` acquire pairs with
    /// the consumer's release so the slot being filled is already vacated.
    #[inline(always)]
    #[must_use]
    pub fn push(&mut self, item: T) -> bool {
        let core = &*self.core;
        let head = core.head.load(Ordering::Relaxed);
        let next = (head + 1) & (CAP - 1);

        if next == core.tail.load(Ordering::Acquire) {
            return false;
        }

        // SAFETY: slot `head` is outside the consumer's [tail, head) window.
        unsafe {
            (*core.buf[head].get()).write(item);
        }

        core.head.store(next, Ordering::Release);
        true
    }

    /// Telemetry only. May be stale; establishes no ordering.
    pub fn full(&self) -> bool {
        let head = self.core.head.load(Ordering::Relaxed);
        let next = (head + 1) & (CAP - 1);
        next == self.core.tail.load(Ordering::Relaxed)
    }

    pub const fn usable_capacity(&self) -> usize {
        CAP - 1
    }
}

/// Consumer handle. Exactly one exists per ring.
pub struct RingReader<T: Copy, const CAP: usize> {
    core: Arc<RingCore<T, CAP>>,
}

impl<T: Copy, const CAP: usize> RingReader<T, CAP> {
    /// Dequeues into `out`. Returns `false` without touching `out` or the
    /// ring when it is empty.
    #[inline(always)]
    #[must_use]
    pub fn pop(&mut self, out: &mut T) -> bool {
        let core = &*self.core;
        let tail = core.tail.load(Ordering::Relaxed);

        if tail == core.head.load(Ordering::Acquire) {
            return false;
        }

        // SAFETY: slot `tail` was published by the producer's release store
        // of head, which the acquire load above observed.
        *out = unsafe { (*core.buf[tail].get()).assume_init_read() };

        core.tail.store((tail + 1) & (CAP - 1), Ordering::Release);
        true
    }

    /// Telemetry only. May be stale; establishes no ordering.
    pub fn empty(&self) -> bool {
        self.core.tail.load(Ordering::Relaxed) == self.core.head.load(Ordering::Relaxed)
    }

    pub const fn usable_capacity(&self) -> usize {
        CAP - 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Pair {
        x: i32,
        y: i32,
    }

    #[test]
    fn initial_state() {
        let ring = SpscRing::<Pair, 8>::new();
        assert_eq!(ring.core.head.load(Ordering::Relaxed), 0);
        assert_eq!(ring.core.tail.load(Ordering::Relaxed), 0);
    }

    #[test]
    fn usable_capacity_is_cap_minus_one() {
        assert_eq!(SpscRing::<Pair, 16>::usable_capacity(), 15);
        let (w, r) = SpscRing::<Pair, 16>::new().split();
        assert_eq!(w.usable_capacity(), 15);
        assert_eq!(r.usable_capacity(), 15);
    }

    #[test]
    fn pop_empty_returns_false_and_leaves_out_unchanged() {
        let (_w, mut r) = SpscRing::<Pair, 8>::new().split();
        let mut out = Pair { x: 99, y: 99 };
        assert!(!r.pop(&mut out));
        assert_eq!(out, Pair { x: 99, y: 99 });
    }

    #[test]
    fn push_then_pop() {
        let (mut w, mut r) = SpscRing::<Pair, 8>::new().split();
        assert!(w.push(Pair { x: 1, y: 2 }));
        let mut out = Pair { x: 0, y: 0 };
        assert!(r.pop(&mut out));
        assert_eq!(out, Pair { x: 1, y: 2 });
    }

    #[test]
    fn fifo_order() {
        let (mut w, mut r) = SpscRing::<Pair, 8>::new().split();
        for i in 0..7 {
            assert!(w.push(Pair { x: i, y: i }));
        }
        for i in 0..7 {
            let mut out = Pair { x: -1, y: -1 };
            assert!(r.pop(&mut out));
            assert_eq!(out, Pair { x: i, y: i });
        }
        let mut out = Pair { x: -1, y: -1 };
        assert!(!r.pop(&mut out));
    }

    #[test]
    fn push_full_returns_false_without_mutation() {
        let (mut w, mut r) = SpscRing::<Pair, 16>::new().split();
        for i in 0..15 {
            assert!(w.push(Pair { x: i, y: 0 }));
        }
        assert!(!w.push(Pair { x: -1, y: -1 }));

        // The refused push must not have clobbered anything.
        for i in 0..15 {
            let mut out = Pair { x: 0, y: 0 };
            assert!(r.pop(&mut out));
            assert_eq!(out.x, i);
        }
    }

    /// Fill to capacity, drain, and refill, three rounds. Wrap-around across
    /// the index modulus must preserve both values and order.
    #[test]
    fn fill_drain_refill_three_rounds() {
        let (mut w, mut r) = SpscRing::<Pair, 16>::new().split();
        for round in 0..3 {
            for i in 0..15 {
                assert!(w.push(Pair { x: i, y: round }));
            }
            assert!(!w.push(Pair { x: -1, y: -1 }));
            for i in 0..15 {
                let mut out = Pair { x: 0, y: 0 };
                assert!(r.pop(&mut out));
                assert_eq!(out, Pair { x: i, y: round });
            }
            let mut sentinel = Pair { x: -7, y: -7 };
            assert!(!r.pop(&mut sentinel));
            assert_eq!(sentinel, Pair { x: -7, y: -7 });
        }
    }

    #[test]
    fn empty_full_helpers() {
        let (mut w, mut r) = SpscRing::<Pair, 4>::new().split();
        assert!(r.empty());
        assert!(!w.full());
        for i in 0..3 {
            assert!(w.push(Pair { x: i, y: 0 }));
        }
        assert!(!r.empty());
        assert!(w.full());
        let mut out = Pair { x: 0, y: 0 };
        assert!(r.pop(&mut out));
        assert!(!w.full());
    }

    #[test]
    fn interleaved_push_pop_wraps_many_times() {
        let (mut w, mut r) = SpscRing::<Pair, 4>::new().split();
        for i in 0..1000 {
            assert!(w.push(Pair { x: i, y: -i }));
            let mut out = Pair { x: 0, y: 0 };
            assert!(r.pop(&mut out));
            assert_eq!(out, Pair { x: i, y: -i });
            assert!(r.empty());
        }
    }

    #[test]
    fn indices_on_separate_cache_lines() {
        use crate::layout::CACHE_LINE_BYTES;

        let ring = SpscRing::<Pair, 8>::new();
        let h = &ring.core.head as *const _ as usize;
        let t = &ring.core.tail as *const _ as usize;
        let b = &ring.core.buf as *const _ as usize;
        assert!(t.abs_diff(h) >= CACHE_LINE_BYTES);
        assert!(b.abs_diff(t) >= CACHE_LINE_BYTES);
    }
}
