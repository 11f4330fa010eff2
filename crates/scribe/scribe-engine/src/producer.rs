//! The demo RT producer task.
//!
//! Each step builds one record, submits it through the dispatcher, and
//! publishes a status snapshot through the ping-pong buffer. Everything on
//! this path is bounded: no allocation, no IO, no locks.

use crate::task::Steppable;
use basalt_journal::JournalSubmitter;
use basalt_sync::SnapWriter;
use basalt_wal::{LogRecord, Tick};

/// Event type tag used by the demo producer.
pub const EVENT_DEMO_COUNTER: u8 = 1;

/// Latest producer state, published as a snapshot for the supervisor.
///
/// `seq` is the validity flag the snapshot buffer itself does not provide:
/// zero means "no status published yet".
#[derive(Clone, Copy, Debug, Default)]
pub struct ProducerStatus {
    pub seq: u64,
    pub submitted: u64,
    pub dropped: u64,
    pub last_tick: Tick,
}

pub struct RecordProducer<const CAP: usize> {
    submitter: JournalSubmitter<CAP>,
    status: SnapWriter<ProducerStatus>,
    producer_id: u8,
    producer_seq: u64,
}

impl<const CAP: usize> RecordProducer<CAP> {
    pub fn new(
        submitter: JournalSubmitter<CAP>,
        status: SnapWriter<ProducerStatus>,
        producer_id: u8,
    ) -> Self {
        Self {
            submitter,
            status,
            producer_id,
            producer_seq: 0,
        }
    }

    pub fn submitted(&self) -> u64 {
        self.submitter.submitted()
    }

    pub fn dropped(&self) -> u64 {
        self.submitter.dropped()
    }
}

impl<const CAP: usize> Steppable for RecordProducer<CAP> {
    fn step(&mut self, now: Tick) {
        self.producer_seq += 1;

        let mut rec = LogRecord {
            event_type: EVENT_DEMO_COUNTER,
            producer_id: self.producer_id,
            event_ts: now as u64,
            producer_seq: self.producer_seq,
            ..LogRecord::default()
        };
        rec.payload[..8].copy_from_slice(&self.producer_seq.to_le_bytes());

        // A refused submit is the ring's back-pressure; the record is lost
        // and the drop shows up in the status snapshot.
        let _ = self.submitter.submit(rec, now);

        self.status.write(ProducerStatus {
            seq: self.producer_seq,
            submitted: self.submitter.submitted(),
            dropped: self.submitter.dropped(),
            last_tick: now,
        });
    }
}
