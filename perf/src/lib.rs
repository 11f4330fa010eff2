//! Shared helpers for the primitive benchmarks.

use basalt_wal::LogRecord;

/// A realistic 64-byte payload: one sealed journal record.
pub fn make_test_record() -> LogRecord {
    let mut rec = LogRecord {
        event_type: 1,
        producer_id: 1,
        global_seq: 123_456,
        commit_ts: 987_654,
        event_ts: 987_650,
        producer_seq: 123_000,
        ..LogRecord::default()
    };
    rec.payload[..8].copy_from_slice(&0xA5A5_A5A5_A5A5_A5A5_u64.to_le_bytes());
    rec.seal();
    rec
}
