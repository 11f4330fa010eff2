//! Snapshot channel: one producer, up to `N` concurrent readers, latest-wins.
//!
//! `N + 1` slots and two 64-bit control masks:
//!
//! - `last_published`: one-hot after the first publication (zero before it).
//!   Written only by the producer with a single release store; there is no
//!   "nothing published" window once the first snapshot lands.
//! - `busy`: readers set the bit of the slot they are copying with
//!   `fetch_or` and clear it with `fetch_and`.
//!
//! With at most `N` readers claiming at any instant, at most `N` of the
//! `N + 1` slot bits can be busy, so the producer always finds a free slot.
//! It prefers a slot free in *both* masks so a reader mid-claim on the
//! published slot keeps its copy undisturbed, and the publication flip it
//! implies is caught by the reader's verify load.
//!
//! Readers never block and never retry: a claim that loses the race against
//! a concurrent publication is released and reported as a miss for this
//! tick. Worst-case snapshot staleness is one publisher period plus two
//! reader periods.

use crate::layout::CacheAligned;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

#[repr(C)]
struct ChannelCore<T> {
    // N + 1 slots, each on its own cache line.
    slots: Box<[CacheAligned<UnsafeCell<MaybeUninit<T>>>]>,
    // One-hot publication mask. Producer-owned.
    last_published: CacheAligned<AtomicU64>,
    // Claim mask. Reader-owned, modified only by fetch_or / fetch_and.
    busy: CacheAligned<AtomicU64>,
}

// SAFETY: slot access follows the dual-mask claim protocol above; the
// release/acquire pairs on the two masks order every hand-over.
unsafe impl<T: Copy + Send> Sync for ChannelCore<T> {}

/// Mask covering the `N + 1` slot bits.
const fn slot_mask(slots: u32) -> u64 {
    if slots == 64 {
        u64::MAX
    } else {
        (1u64 << slots) - 1
    }
}

/// Owner of the slots and both masks, generic over the reader bound `N`.
pub struct SnapChannel<T: Copy, const N: usize> {
    core: Arc<ChannelCore<T>>,
}

impl<T: Copy, const N: usize> SnapChannel<T, N> {
    /// Creates the channel with both masks zero and all slots unwritten.
    pub fn new() -> Self {
        const {
            assert!(N >= 1, "channel needs at least one reader");
            assert!(N <= 63, "mask width limits the channel to 63 readers");
        }

        let slots = (0..N + 1)
            .map(|_| CacheAligned::new(UnsafeCell::new(MaybeUninit::uninit())))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        Self {
            core: Arc::new(ChannelCore {
                slots,
                last_published: CacheAligned::new(AtomicU64::new(0)),
                busy: CacheAligned::new(AtomicU64::new(0)),
            }),
        }
    }

    /// Splits into the producer handle and exactly `N` reader handles.
    ///
    /// Returning a fixed-size array is what enforces the reader bound: no
    /// further handles can ever be derived.
    pub fn split(self) -> (ChannelWriter<T, N>, [ChannelReader<T, N>; N]) {
        let readers = std::array::from_fn(|_| ChannelReader {
            core: Arc::clone(&self.core),
        });
        (ChannelWriter { core: self.core }, readers)
    }
}

impl<T: Copy, const N: usize> Default for SnapChannel<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle. Exactly one exists per channel.
pub struct ChannelWriter<T: Copy, const N: usize> {
    core: Arc<ChannelCore<T>>,
}

impl<T: Copy, const N: usize> ChannelWriter<T, N> {
    /// Publishes a new snapshot. Always succeeds; wait-free.
    #[inline(always)]
    pub fn publish(&mut self, value: T) {
        let core = &*self.core;
        let all = slot_mask(N as u32 + 1);

        let busy = core.busy.load(Ordering::Acquire);
        let published = core.last_published.load(Ordering::Acquire);

        // Prefer a slot that is neither claimed nor currently published;
        // fall back to any unclaimed slot. The fallback set is never empty:
        // at most N of the N + 1 bits can be busy.
        let preferred = !busy & !published & all;
        let candidates = if preferred != 0 {
            preferred
        } else {
            !busy & all
        };
        let j = candidates.trailing_zeros() as usize;

        // SAFETY: bit j was free in busy when loaded; a reader that claims
        // slot j after this point observes the publication flip below in its
        // verify load and discards the copy.
        unsafe {
            (*core.slots[j].get()).write(value);
        }

        // Publication point: single release store, one-hot.
        core.last_published.store(1 << j, Ordering::Release);
    }
}

/// Reader handle. `split` hands out exactly `N`; each is move-only.
pub struct ChannelReader<T: Copy, const N: usize> {
    core: Arc<ChannelCore<T>>,
}

impl<T: Copy, const N: usize> ChannelReader<T, N> {
    /// Attempts to copy the latest snapshot into `out`.
    ///
    /// Returns `false` when nothing has been published yet or a publication
    /// raced the claim; `out` is untouched in that case.
    #[inline(always)]
    #[must_use]
    pub fn try_read(&mut self, out: &mut T) -> bool {
        let core = &*self.core;

        let l1 = core.last_published.load(Ordering::Acquire);
        if l1 == 0 {
            return false;
        }
        let p = l1.trailing_zeros() as usize;
        let bit = 1u64 << p;

        // Claim: the release half is what the producer's acquire-load of
        // busy synchronizes with on its next publish.
        core.busy.fetch_or(bit, Ordering::AcqRel);

        let l2 = core.last_published.load(Ordering::Acquire);
        if l2 != l1 {
            // Publication moved between the two loads; the slot may be in
            // the producer's hands now.
            core.busy.fetch_and(!bit, Ordering::Release);
            return false;
        }

        // SAFETY: slot p was fully written before l1 was stored, and the
        // producer avoids claimed slots while the claim bit is visible.
        *out = unsafe { (*core.slots[p].get()).assume_init_read() };

        core.busy.fetch_and(!bit, Ordering::Release);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Clone, Copy, Debug, PartialEq, Eq)]
    struct Pair {
        x: i64,
        y: i64,
    }

    fn published<T: Copy, const N: usize>(r: &ChannelReader<T, N>) -> u64 {
        r.core.last_published.load(Ordering::Relaxed)
    }

    fn busy<T: Copy, const N: usize>(r: &ChannelReader<T, N>) -> u64 {
        r.core.busy.load(Ordering::Relaxed)
    }

    #[test]
    fn initial_state() {
        let (_w, readers) = SnapChannel::<Pair, 3>::new().split();
        assert_eq!(readers.len(), 3);
        assert_eq!(published(&readers[0]), 0);
        assert_eq!(busy(&readers[0]), 0);
    }

    #[test]
    fn slot_count_is_reader_bound_plus_one() {
        let chan = SnapChannel::<Pair, 4>::new();
        assert_eq!(chan.core.slots.len(), 5);
    }

    #[test]
    fn try_read_before_publish_misses() {
        let (_w, mut readers) = SnapChannel::<Pair, 2>::new().split();
        let mut out = Pair { x: 42, y: 42 };
        assert!(!readers[0].try_read(&mut out));
        assert_eq!(out, Pair { x: 42, y: 42 });
    }

    #[test]
    fn publish_then_read_every_reader() {
        let (mut w, mut readers) = SnapChannel::<Pair, 4>::new().split();
        w.publish(Pair { x: 11, y: -11 });
        for r in readers.iter_mut() {
            let mut out = Pair { x: 0, y: 0 };
            assert!(r.try_read(&mut out));
            assert_eq!(out, Pair { x: 11, y: -11 });
        }
        assert_eq!(busy(&readers[0]), 0);
    }

    #[test]
    fn latest_wins() {
        let (mut w, mut readers) = SnapChannel::<Pair, 2>::new().split();
        for i in 1..=10 {
            w.publish(Pair { x: i, y: -i });
        }
        let mut out = Pair { x: 0, y: 0 };
        assert!(readers[1].try_read(&mut out));
        assert_eq!(out, Pair { x: 10, y: -10 });
    }

    /// After any run of publications the mask must stay one-hot and inside
    /// the slot range.
    #[test]
    fn published_mask_stays_one_hot() {
        let (mut w, readers) = SnapChannel::<Pair, 3>::new().split();
        for i in 0..100 {
            w.publish(Pair { x: i, y: -i });
            let mask = published(&readers[0]);
            assert_eq!(mask.count_ones(), 1);
            assert!(mask.trailing_zeros() < 4);
        }
    }

    #[test]
    fn busy_clear_after_every_attempt() {
        let (mut w, mut readers) = SnapChannel::<Pair, 2>::new().split();
        let mut out = Pair { x: 0, y: 0 };
        assert!(!readers[0].try_read(&mut out));
        assert_eq!(busy(&readers[0]), 0);
        w.publish(Pair { x: 1, y: -1 });
        assert!(readers[0].try_read(&mut out));
        assert_eq!(busy(&readers[0]), 0);
    }

    #[test]
    fn masks_and_slots_on_separate_cache_lines() {
        use crate::layout::CACHE_LINE_BYTES;

        let chan = SnapChannel::<Pair, 2>::new();
        let lp = &chan.core.last_published as *const _ as usize;
        let b = &chan.core.busy as *const _ as usize;
        let s0 = &chan.core.slots[0] as *const _ as usize;
        let s1 = &chan.core.slots[1] as *const _ as usize;
        assert!(b.abs_diff(lp) >= CACHE_LINE_BYTES);
        assert!(s1.abs_diff(s0) >= CACHE_LINE_BYTES);
    }
}
