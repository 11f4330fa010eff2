//! Cache-line placement for fields shared between producer and consumer.
//!
//! Every atomic written by one role, and every data slot, is wrapped in
//! [`CacheAligned`] so it starts on its own cache line and never shares one
//! with state touched by the opposite role. Correctness never depends on this
//! separation; publication latency and jitter do.

use std::ops::{Deref, DerefMut};

/// Cache line width assumed for field placement.
///
/// 128 bytes on aarch64 (Apple Silicon prefetches line pairs), 64 everywhere
/// else.
#[cfg(target_arch = "aarch64")]
pub const CACHE_LINE_BYTES: usize = 128;
#[cfg(not(target_arch = "aarch64"))]
pub const CACHE_LINE_BYTES: usize = 64;

/// Wrapper that rounds its contents up to a full cache line.
///
/// Alignment forces the start of a line; the rounded size guarantees the next
/// field in a `#[repr(C)]` struct starts on a fresh line, so no extra padding
/// members are needed between writer-owned and reader-owned fields.
#[cfg_attr(target_arch = "aarch64", repr(align(128)))]
#[cfg_attr(not(target_arch = "aarch64"), repr(align(64)))]
#[derive(Debug, Default)]
pub struct CacheAligned<T>(pub T);

impl<T> CacheAligned<T> {
    pub const fn new(value: T) -> Self {
        Self(value)
    }
}

impl<T> Deref for CacheAligned<T> {
    type Target = T;

    #[inline(always)]
    fn deref(&self) -> &T {
        &self.0
    }
}

impl<T> DerefMut for CacheAligned<T> {
    #[inline(always)]
    fn deref_mut(&mut self) -> &mut T {
        &mut self.0
    }
}

const _: () = assert!(std::mem::align_of::<CacheAligned<u8>>() == CACHE_LINE_BYTES);
const _: () = assert!(std::mem::size_of::<CacheAligned<u8>>() == CACHE_LINE_BYTES);

#[cfg(test)]
mod tests {
    use super::*;
    use std::mem::{align_of, size_of};
    use std::sync::atomic::AtomicU32;

    #[test]
    fn aligned_atomic_fills_a_line() {
        assert_eq!(align_of::<CacheAligned<AtomicU32>>(), CACHE_LINE_BYTES);
        assert_eq!(size_of::<CacheAligned<AtomicU32>>(), CACHE_LINE_BYTES);
    }

    /// Consecutive `CacheAligned` fields in a `#[repr(C)]` struct must land on
    /// distinct cache lines, otherwise the placement policy is broken for
    /// every primitive built on it.
    #[test]
    fn repr_c_fields_on_distinct_lines() {
        #[repr(C)]
        struct TwoFields {
            a: CacheAligned<AtomicU32>,
            b: CacheAligned<AtomicU32>,
        }

        let v = TwoFields {
            a: CacheAligned::new(AtomicU32::new(0)),
            b: CacheAligned::new(AtomicU32::new(0)),
        };
        let a = &v.a as *const _ as usize;
        let b = &v.b as *const _ as usize;
        assert!(b.abs_diff(a) >= CACHE_LINE_BYTES);
    }
}
