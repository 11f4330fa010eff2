//! The 64-byte journal record envelope.
//!
//! On-media layout, little-endian:
//!
//! ```text
//! ┌────────┬─────────┬────────────┬───────┬─────────────┬────────────┐
//! │ crc32  │ version │ event_type │ flags │ producer_id │ global_seq │
//! │ [0..4) │   [4]   │    [5]     │  [6]  │     [7]     │  [8..16)   │
//! ├────────┴─────────┼────────────┼───────┴─────────────┼────────────┤
//! │    commit_ts     │  event_ts  │    producer_seq     │  reserved  │
//! │     [16..24)     │  [24..32)  │      [32..40)       │  [40..50)  │
//! ├──────────────────┴────────────┴─────────────────────┴────────────┤
//! │                          payload [50..64)                        │
//! └──────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The CRC-32C covers bytes `[4..64)` and is written last, so a record is
//! verifiable the moment it is complete. Recovery treats the first record
//! with a CRC mismatch or an unsupported version as the end of the journal.

use basalt_crc::crc32c;

/// Encoded size of one record.
pub const RECORD_BYTES: usize = 64;

/// Envelope format version this crate writes and accepts.
pub const RECORD_VERSION: u8 = 2;

/// Bytes of opaque event payload carried by one record.
pub const PAYLOAD_BYTES: usize = 14;

/// Verification failure for a decoded record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    #[error("crc mismatch: stored {stored:#010x}, computed {computed:#010x}")]
    CrcMismatch { stored: u32, computed: u32 },

    #[error("unsupported record version {0}")]
    UnsupportedVersion(u8),
}

/// One journal record. Plain `Copy` data, exactly 64 bytes, suitable as the
/// payload of every hand-off primitive.
#[repr(C)]
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct LogRecord {
    /// CRC-32C over bytes `[4..64)` of the encoded record.
    pub crc32: u32,
    pub version: u8,
    pub event_type: u8,
    pub flags: u8,
    pub producer_id: u8,
    /// Total journal order, assigned by the dispatcher.
    pub global_seq: u64,
    /// Commit time, 100 µs ticks.
    pub commit_ts: u64,
    /// Event time at the producer, 100 µs ticks.
    pub event_ts: u64,
    /// Per-producer order.
    pub producer_seq: u64,
    pub reserved: [u8; 10],
    pub payload: [u8; PAYLOAD_BYTES],
}

const _: () = assert!(std::mem::size_of::<LogRecord>() == RECORD_BYTES);
const _: () = assert!(std::mem::align_of::<LogRecord>() == 8);

impl Default for LogRecord {
    fn default() -> Self {
        Self {
            crc32: 0,
            version: RECORD_VERSION,
            event_type: 0,
            flags: 0,
            producer_id: 0,
            global_seq: 0,
            commit_ts: 0,
            event_ts: 0,
            producer_seq: 0,
            reserved: [0; 10],
            payload: [0; PAYLOAD_BYTES],
        }
    }
}

impl LogRecord {
    /// Encodes to the on-media little-endian layout.
    pub fn to_bytes(&self) -> [u8; RECORD_BYTES] {
        let mut b = [0u8; RECORD_BYTES];
        b[0..4].copy_from_slice(&self.crc32.to_le_bytes());
        b[4] = self.version;
        b[5] = self.event_type;
        b[6] = self.flags;
        b[7] = self.producer_id;
        b[8..16].copy_from_slice(&self.global_seq.to_le_bytes());
        b[16..24].copy_from_slice(&self.commit_ts.to_le_bytes());
        b[24..32].copy_from_slice(&self.event_ts.to_le_bytes());
        b[32..40].copy_from_slice(&self.producer_seq.to_le_bytes());
        b[40..50].copy_from_slice(&self.reserved);
        b[50..64].copy_from_slice(&self.payload);
        b
    }

    /// Decodes from the on-media layout. No validation; pair with
    /// [`LogRecord::verify`].
    pub fn from_bytes(b: &[u8; RECORD_BYTES]) -> Self {
        Self {
            crc32: u32::from_le_bytes(b[0..4].try_into().unwrap()),
            version: b[4],
            event_type: b[5],
            flags: b[6],
            producer_id: b[7],
            global_seq: u64::from_le_bytes(b[8..16].try_into().unwrap()),
            commit_ts: u64::from_le_bytes(b[16..24].try_into().unwrap()),
            event_ts: u64::from_le_bytes(b[24..32].try_into().unwrap()),
            producer_seq: u64::from_le_bytes(b[32..40].try_into().unwrap()),
            reserved: b[40..50].try_into().unwrap(),
            payload: b[50..64].try_into().unwrap(),
        }
    }

    /// Computes the checksum over the current field values and stores it.
    /// Call after every other field is final.
    pub fn seal(&mut self) {
        self.crc32 = self.body_crc();
    }

    /// Checks version support and checksum integrity.
    pub fn verify(&self) -> Result<(), RecordError> {
        if self.version != RECORD_VERSION {
            return Err(RecordError::UnsupportedVersion(self.version));
        }
        let computed = self.body_crc();
        if self.crc32 != computed {
            return Err(RecordError::CrcMismatch {
                stored: self.crc32,
                computed,
            });
        }
        Ok(())
    }

    fn body_crc(&self) -> u32 {
        crc32c(&self.to_bytes()[4..])
    }
}
