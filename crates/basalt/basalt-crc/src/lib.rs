//! CRC-32C (Castagnoli) over a compile-time lookup table.
//!
//! The 256-entry table is generated in a `const` context from the reflected
//! polynomial, so there is no runtime initialization and no allocation. Both
//! entry points are `const fn` and usable in constant expressions.
//!
//! # Streaming
//!
//! [`crc32c_update`] carries a *pre-inverted* running state:
//!
//! - start:    `let mut s = !seed;` (seed 0 gives the standard `0xFFFF_FFFF` init)
//! - continue: `s = crc32c_update(s, chunk);`
//! - finish:   `let crc = !s;`
//!
//! Streaming any partition of a buffer produces the same finalized value as
//! the one-shot [`crc32c`] over the concatenation.

#![forbid(unsafe_code)]

/// CRC-32C reflected polynomial.
pub const CRC32C_POLY_REFLECTED: u32 = 0x82F6_3B78;

const fn table_entry(idx: u32) -> u32 {
    let mut r = idx;
    let mut k = 0;
    while k < 8 {
        r = if r & 1 != 0 {
            CRC32C_POLY_REFLECTED ^ (r >> 1)
        } else {
            r >> 1
        };
        k += 1;
    }
    r
}

const fn make_table() -> [u32; 256] {
    let mut t = [0u32; 256];
    let mut i = 0;
    while i < 256 {
        t[i] = table_entry(i as u32);
        i += 1;
    }
    t
}

/// Process-wide read-only lookup table, built at compile time.
pub const CRC32C_TABLE: [u32; 256] = make_table();

/// Incremental update over a pre-inverted running state.
///
/// `state` must come from `!seed` or from a previous `crc32c_update` call.
/// The caller finalizes with bitwise NOT.
#[inline]
pub const fn crc32c_update(state: u32, data: &[u8]) -> u32 {
    let mut s = state;
    let mut i = 0;
    while i < data.len() {
        s = CRC32C_TABLE[((s ^ data[i] as u32) & 0xFF) as usize] ^ (s >> 8);
        i += 1;
    }
    s
}

/// One-shot CRC-32C with the standard init (`0xFFFF_FFFF`) and final XOR.
///
/// An empty input returns `0`.
#[inline]
pub const fn crc32c(data: &[u8]) -> u32 {
    crc32c_seeded(data, 0)
}

/// One-shot CRC-32C continuing from `seed` (a previously finalized checksum).
///
/// Seed 0 reproduces [`crc32c`]. Chaining finalized checksums this way is
/// non-standard; for concatenation use [`crc32c_update`].
#[inline]
pub const fn crc32c_seeded(data: &[u8], seed: u32) -> u32 {
    !crc32c_update(!seed, data)
}

// Table/algorithm self-check against the standard test vector.
const _: () = assert!(crc32c(b"123456789") == 0xE306_9283);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_vector() {
        assert_eq!(crc32c(b"123456789"), 0xE306_9283);
    }

    /// RFC 3720 appendix B.4 reference vectors, 32-byte inputs.
    #[test]
    fn rfc3720_vectors() {
        assert_eq!(crc32c(&[0x00; 32]), 0xAA36_918A);
        assert_eq!(crc32c(&[0xFF; 32]), 0x43AB_A862);

        let mut incrementing = [0u8; 32];
        for (i, b) in incrementing.iter_mut().enumerate() {
            *b = 0x1C + i as u8;
        }
        assert_eq!(crc32c(&incrementing), 0x4E79_DD46);
    }

    #[test]
    fn empty_input_returns_zero() {
        assert_eq!(crc32c(&[]), 0x0000_0000);
    }

    #[test]
    fn table_entry_0_is_zero() {
        assert_eq!(CRC32C_TABLE[0], 0);
    }

    #[test]
    fn table_entry_1_is_reflected_polynomial() {
        assert_eq!(CRC32C_TABLE[1], table_entry(1));
        assert_eq!(CRC32C_TABLE[1], 0xF26B_8303);
    }

    #[test]
    fn incremental_two_chunks_equals_one_shot() {
        let buf = *b"The quick brown fox jumps over the lazy dog";
        for split in 0..buf.len() {
            let (a, b) = buf.split_at(split);
            let mut s = !0u32;
            s = crc32c_update(s, a);
            s = crc32c_update(s, b);
            assert_eq!(!s, crc32c(&buf), "split at {split}");
        }
    }

    #[test]
    fn incremental_byte_by_byte_equals_one_shot() {
        let buf = *b"123456789";
        let mut s = !0u32;
        for byte in buf {
            s = crc32c_update(s, &[byte]);
        }
        assert_eq!(!s, 0xE306_9283);
    }

    #[test]
    fn seed_zero_is_default() {
        let buf = [0x5A_u8; 17];
        assert_eq!(crc32c_seeded(&buf, 0), crc32c(&buf));
    }

    #[test]
    fn different_seeds_produce_different_results() {
        let buf = [0x5A_u8; 17];
        assert_ne!(crc32c_seeded(&buf, 0), crc32c_seeded(&buf, 1));
    }

    #[test]
    fn bit_flip_changes_checksum() {
        let mut buf = [0x11_u8; 24];
        let before = crc32c(&buf);
        buf[12] ^= 0x01;
        assert_ne!(crc32c(&buf), before);
    }

    #[test]
    fn position_sensitivity() {
        assert_ne!(crc32c(&[1, 0, 0]), crc32c(&[0, 1, 0]));
    }

    #[test]
    fn const_evaluation() {
        const CRC: u32 = crc32c(b"123456789");
        assert_eq!(CRC, 0xE306_9283);
    }
}
