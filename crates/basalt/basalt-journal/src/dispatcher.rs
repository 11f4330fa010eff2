//! The dispatcher: the seam between the RT producer domain and the non-RT
//! drain domain.
//!
//! The submit half lives with the producer. It stamps the global sequence
//! and commit time, seals the checksum, and pushes onto the SPSC ring; all
//! of that is bounded, allocation-free work. A full ring is reported to the
//! caller and counted, never waited out.
//!
//! The drain half lives with the consumer. It pops records into a batch
//! buffer and hands the batch to a [`Backend`].

use crate::backend::{Backend, BackendError};
use basalt_sync::{RingReader, RingWriter, SpscRing};
use basalt_wal::{LogRecord, Tick};
use tracing::trace;

/// Creates the dispatcher pair over a ring of `CAP` slots.
pub fn dispatcher<const CAP: usize>() -> (JournalSubmitter<CAP>, JournalDrainer<CAP>) {
    let (ring_writer, ring_reader) = SpscRing::<LogRecord, CAP>::new().split();
    (
        JournalSubmitter {
            ring: ring_writer,
            next_global_seq: 1,
            submitted: 0,
            dropped: 0,
        },
        JournalDrainer {
            ring: ring_reader,
            batch: Vec::new(),
            drained: 0,
        },
    )
}

/// RT-side half: submit records without blocking or allocating.
pub struct JournalSubmitter<const CAP: usize> {
    ring: RingWriter<LogRecord, CAP>,
    next_global_seq: u64,
    submitted: u64,
    dropped: u64,
}

impl<const CAP: usize> JournalSubmitter<CAP> {
    /// Stamps, seals, and enqueues `rec`. Returns `false` when the ring is
    /// full; the record is dropped and counted, and the sequence number is
    /// not consumed.
    #[inline]
    #[must_use]
    pub fn submit(&mut self, mut rec: LogRecord, now: Tick) -> bool {
        rec.global_seq = self.next_global_seq;
        rec.commit_ts = now as u64;
        rec.seal();

        if self.ring.push(rec) {
            self.next_global_seq += 1;
            self.submitted += 1;
            true
        } else {
            self.dropped += 1;
            false
        }
    }

    /// Records accepted so far.
    pub fn submitted(&self) -> u64 {
        self.submitted
    }

    /// Records refused because the ring was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

/// Non-RT half: drain the ring into a backend in bounded batches.
pub struct JournalDrainer<const CAP: usize> {
    ring: RingReader<LogRecord, CAP>,
    batch: Vec<LogRecord>,
    drained: u64,
}

impl<const CAP: usize> JournalDrainer<CAP> {
    /// Pops up to `max_records` and commits them as one batch. Returns the
    /// number of records committed; zero means the ring was empty.
    pub fn drain_into<B: Backend>(
        &mut self,
        backend: &mut B,
        max_records: usize,
    ) -> Result<usize, BackendError> {
        self.batch.clear();
        let mut rec = LogRecord::default();
        while self.batch.len() < max_records && self.ring.pop(&mut rec) {
            self.batch.push(rec);
        }

        if self.batch.is_empty() {
            return Ok(0);
        }

        backend.submit_batch(&self.batch)?;
        self.drained += self.batch.len() as u64;
        trace!(records = self.batch.len(), "drained batch");
        Ok(self.batch.len())
    }

    /// Drains until the ring reports empty, then flushes the backend.
    pub fn flush<B: Backend>(
        &mut self,
        backend: &mut B,
        max_records: usize,
    ) -> Result<u64, BackendError> {
        let mut total = 0u64;
        loop {
            let n = self.drain_into(backend, max_records)?;
            if n == 0 {
                break;
            }
            total += n as u64;
        }
        backend.flush()?;
        Ok(total)
    }

    /// Records committed to the backend so far.
    pub fn drained(&self) -> u64 {
        self.drained
    }
}
