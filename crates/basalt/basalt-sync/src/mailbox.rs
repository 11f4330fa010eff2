//! Two-slot claim-verify snapshot mailbox: single producer, single consumer,
//! latest-wins.
//!
//! Unlike the ping-pong buffer, the reader here announces which slot it is
//! about to copy, so the primitive can report "nothing consistent available"
//! instead of handing back stale bytes.
//!
//! # Protocol
//!
//! Two single-byte control words, each owned by one role:
//!
//! - `pub_state`: `0`, `1`, or [`NONE`]. Written only by the producer.
//! - `lock_state`: `0`, `1`, or [`UNLOCKED`]. Written only by the consumer.
//!
//! **Producer** (`publish`):
//! 1. acquire-load `lock_state`; choose `j` so that `j != lock_state`
//!    (slot 1 when the reader holds nothing)
//! 2. if `pub_state == j`, release-store [`NONE`] first (invalidate)
//! 3. copy the value into slot `j`
//! 4. release-store `j` into `pub_state`
//!
//! **Consumer** (`try_read`):
//! 1. acquire-load `pub_state` into `p1`; [`NONE`] means miss
//! 2. release-store `p1` into `lock_state` (the claim)
//! 3. acquire-load `pub_state` into `p2`
//! 4. `p2 != p1` means the publication moved: unlock and miss
//! 5. copy slot `p1`, release-store [`UNLOCKED`]
//!
//! The reader's claim-store is ordered before the producer's next
//! acquire-load of `lock_state`, and the producer refuses to write the slot
//! that load names, so the claimed slot can never be overwritten mid-copy.
//! A miss is final for this attempt; the caller keeps its previous state and
//! tries again next tick. After every `try_read`, successful or not,
//! `lock_state` is [`UNLOCKED`].

use crate::layout::CacheAligned;
use std::cell::UnsafeCell;
use std::mem::MaybeUninit;
use std::sync::Arc;
use std::sync::atomic::{AtomicU8, Ordering};

/// `pub_state` value meaning "nothing published".
pub const NONE: u8 = 2;
/// `lock_state` value meaning "reader holds no slot".
pub const UNLOCKED: u8 = 2;

#[repr(C)]
struct MailboxCore<T> {
    // Each slot on its own cache line: the producer may fill one while the
    // consumer copies the other.
    slots: [CacheAligned<UnsafeCell<MaybeUninit<T>>>; 2],
    // Written by the producer on every publish, loaded by both roles.
    pub_state: CacheAligned<AtomicU8>,
    // Written by the consumer twice per attempt, loaded by the producer once
    // per publish. Kept off pub_state's line so the claim-store does not
    // invalidate the publication word.
    lock_state: CacheAligned<AtomicU8>,
}

// SAFETY: slot access is governed by the claim-verify protocol above; the
// release/acquire pairs on pub_state and lock_state order every hand-over.
unsafe impl<T: Copy + Send> Sync for MailboxCore<T> {}

/// Owner of the slots and both control words.
pub struct Mailbox<T: Copy> {
    core: Arc<MailboxCore<T>>,
}

impl<T: Copy> Mailbox<T> {
    /// Creates an empty mailbox: nothing published, nothing locked.
    pub fn new() -> Self {
        Self {
            core: Arc::new(MailboxCore {
                slots: [
                    CacheAligned::new(UnsafeCell::new(MaybeUninit::uninit())),
                    CacheAligned::new(UnsafeCell::new(MaybeUninit::uninit())),
                ],
                pub_state: CacheAligned::new(AtomicU8::new(NONE)),
                lock_state: CacheAligned::new(AtomicU8::new(UNLOCKED)),
            }),
        }
    }

    /// Splits into the single producer and single consumer handle.
    pub fn split(self) -> (MailboxWriter<T>, MailboxReader<T>) {
        let reader = MailboxReader {
            core: Arc::clone(&self.core),
        };
        (MailboxWriter { core: self.core }, reader)
    }
}

impl<T: Copy> Default for Mailbox<T> {
    fn default() -> Self {
        Self::new()
    }
}

/// Producer handle. Exactly one exists per mailbox.
pub struct MailboxWriter<T: Copy> {
    core: Arc<MailboxCore<T>>,
}

impl<T: Copy> MailboxWriter<T> {
    /// Publishes a new snapshot. Always succeeds; wait-free; intermediate
    /// snapshots are lost.
    #[inline(always)]
    pub fn publish(&mut self, value: T) {
        let core = &*self.core;

        // The reader holds at most one slot, so the other is always free.
        let locked = core.lock_state.load(Ordering::Acquire);
        let j = if locked == 1 { 0u8 } else { 1u8 };

        // Overwriting the published slot: take the publication down first so
        // a reader cannot start a claim on bytes being replaced.
        if core.pub_state.load(Ordering::Acquire) == j {
            core.pub_state.store(NONE, Ordering::Release);
        }

        // SAFETY: j != lock_state as observed above, and the reader never
        // copies a slot it has not locked.
        unsafe {
            (*core.slots[j as usize].get()).write(value);
        }

        core.pub_state.store(j, Ordering::Release);
    }
}

/// Consumer handle. Exactly one exists per mailbox.
pub struct MailboxReader<T: Copy> {
    core: Arc<MailboxCore<T>>,
}

impl<T: Copy> MailboxReader<T> {
    /// Attempts to copy the latest snapshot into `out`.
    ///
    /// Returns `false` when nothing is published or a publication raced the
    /// claim; `out` is untouched in that case. Never retries internally.
    #[inline(always)]
    #[must_use]
    pub fn try_read(&mut self, out: &mut T) -> bool {
        let core = &*self.core;

        let p1 = core.pub_state.load(Ordering::Acquire);
        if p1 == NONE {
            // lock_state is already UNLOCKED from the previous attempt.
            return false;
        }

        // Claim. The release half makes the claim visible to the producer's
        // next acquire-load of lock_state.
        core.lock_state.store(p1, Ordering::Release);

        let p2 = core.pub_state.load(Ordering::Acquire);
        if p2 != p1 {
            // Publication moved between the two loads.
            core.lock_state.store(UNLOCKED, Ordering::Release);
            return false;
        }

        // SAFETY: slot p1 was published before p1 was observed, and the
        // producer will not write a slot equal to the claimed lock_state.
        *out = unsafe { (*core.slots[p1 as usize].get()).assume_init_read() };

        core.lock_state.store(UNLOCKED, Ordering::Release);
        true
    }
}
