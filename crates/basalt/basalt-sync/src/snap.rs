//! Ping-pong snapshot buffer: single producer, single consumer, latest-wins.
//!
//! Two slots alternate between the roles. The producer always fills the slot
//! the `published` index does not name, then release-stores the new index;
//! the consumer acquire-loads the index and copies that slot. Neither side
//! can ever touch the slot the other is using, so both operations always
//! succeed and are wait-free.
//!
//! This is a snapshot primitive, not a queue: intermediate writes are lost
//! without notice. A `read` before the first `write` returns the
//! default-initialized payload; callers that need a "no data yet" signal
//! layer a validity field into `T` themselves.

use crate::layout::CacheAligned;
use std::cell::UnsafeCell;
use std::sync::Arc;
use std::sync::atomic::{AtomicU32, Ordering};

#[repr(C)]
struct SnapCore<T> {
    // Each slot on its own cache line: the producer fills one while the
    // consumer copies the other.
    slots: [CacheAligned<UnsafeCell<T>>; 2],
    // Index of the published slot, 0 or 1. Written only by the producer
    // (release), read by the consumer (acquire).
    published: CacheAligned<AtomicU32>,
}

// SAFETY: the split() handle pair is the only access path. The producer
// writes slot `1 - published` exclusively, the consumer reads slot
// `published` exclusively, and the release/acquire pair on `published`
// orders the hand-over.
unsafe impl<T: Copy + Send> Sync for SnapCore<T> {}

/// Owner of the two slots and the `published` index.
///
/// [`SnapBuffer::split`] consumes the buffer and yields exactly one writer
/// and one reader handle; the single-producer single-consumer contract is
/// therefore enforced at construction.
pub struct SnapBuffer<T: Copy> {
    core: Arc<SnapCore<T>>,
}

impl<T: Copy + Default> SnapBuffer<T> {
    /// Creates the buffer with both slots default-initialized and slot 0
    /// published.
    pub fn new() -> Self {
        Self {
            core: Arc::new(SnapCore {
                slots: [
                    CacheAligned::new(UnsafeCell::new(T::default())),
                    CacheAligned::new(UnsafeCell::new(T::default())),
                ],
                published: CacheAligned::new(AtomicU32::new(0)),
            }),
        }
    }

    /// Splits into the producer and consumer handles. Handles are move-only;
    /// each transfers its role to whatever thread it is moved to.
    pub fn split(self) -> (SnapWriter<T>, SnapReader<T>) {
        let reader = SnapReader {
            core: Arc::clone(&self.core),
        };
        (SnapWriter { core: self.core }, reader)
    }
}

impl<T: Copy + Default> Default for SnapBuffer<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle. Exactly one exists per buffer.
pub struct SnapWriter<T: Copy> {
    core: Arc<SnapCore<T>>,
}

impl<T: Copy> SnapWriter<T> {
    /// Publishes a new snapshot. Always succeeds; wait-free.
    ///
    /// `published` is loaded relaxed: the producer is its only writer, so no
    /// synchronization is needed to pick the inactive slot. The release store
    /// at the end is the publication point.
    #[inline(always)]
    pub fn write(&mut self, value: T) {
        let cur = self.core.published.load(Ordering::Relaxed);
        let next = cur ^ 1;

        // SAFETY: slot `next` is not published, and the consumer only reads
        // the published slot.
        unsafe {
            *self.core.slots[next as usize].get() = value;
        }

        self.core.published.store(next, Ordering::Release);
    }
}

/// Consumer handle. Exactly one exists per buffer.
pub struct SnapReader<T: Copy> {
    core: Arc<SnapCore<T>>,
}

impl<T: Copy> SnapReader<T> {
    /// Copies the latest published snapshot. Always succeeds; wait-free.
    #[inline(always)]
    pub fn read(&self) -> T {
        let idx = self.core.published.load(Ordering::Acquire);

        // SAFETY: the acquire load pairs with the producer's release store,
        // so the slot it names is fully written and the producer will not
        // write it again until after the next publication.
        unsafe { *self.core.slots[idx as usize].get() }
    }
}
