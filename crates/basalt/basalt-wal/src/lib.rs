//! `basalt-wal`: the journal record envelope and tick clock shared by the
//! producer and consumer domains.

pub mod record;
pub mod ticks;

pub use record::{LogRecord, PAYLOAD_BYTES, RECORD_BYTES, RECORD_VERSION, RecordError};
pub use ticks::{TICK_MICROS, Tick, tick_before, tick_elapsed, ticks_from_nanos};
